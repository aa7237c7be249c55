//! `HttpPortalApi` against a mock portal deployment.

use fairstall::{
    ApiError, HttpPortalApi, PortalApi, APPLICATIONS_LIST_PATH, SUBMIT_APPLICATION_PATH,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetch_hits_the_list_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(APPLICATIONS_LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let api = HttpPortalApi::new(&server.uri()).unwrap();
    let response = api.fetch_applications().await.unwrap();

    assert_eq!(response.status(), 200);
    let list: Vec<serde_json::Value> = response.json().unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn submit_posts_a_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_APPLICATION_PATH))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"received": true})),
        )
        .mount(&server)
        .await;

    let api = HttpPortalApi::new(&server.uri()).unwrap();
    let response = api
        .submit_application(br#"{"tradingName":"Willow Woodcraft"}"#.to_vec())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn non_200_statuses_are_returned_not_erred() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_APPLICATION_PATH))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let api = HttpPortalApi::new(&server.uri()).unwrap();
    let response = api.submit_application(b"{}".to_vec()).await.unwrap();

    // Status interpretation belongs to the manager, not the transport.
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn unreachable_portal_is_a_network_error() {
    // TCP port 9 (discard) is near-certain to refuse connections.
    let api = HttpPortalApi::new("http://127.0.0.1:9/").unwrap();

    let err = api.fetch_applications().await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
}

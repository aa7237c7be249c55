//! End-to-end flows over the applications manager with an in-process,
//! scripted portal API and in-memory draft storage.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fairstall::{
    ApiError, ApiResponse, Application, ApplicationStatus, ApplicationsManager, DraftApplication,
    DraftId, DraftPool, EditingStore, ElectricalOption, MemoryStorage, PitchType, PortalApi,
    SubmitError, SubmittedApplication, REFRESH_ERROR_MESSAGE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordedCall {
    FetchApplications,
    SubmitApplication { body: Vec<u8> },
}

/// Portal stub that replays scripted replies and records all traffic.
#[derive(Default)]
struct ScriptedApi {
    fetch_replies: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    submit_replies: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedApi {
    fn push_fetch(&self, reply: Result<ApiResponse, ApiError>) {
        self.fetch_replies.lock().unwrap().push_back(reply);
    }

    fn push_submit(&self, reply: Result<ApiResponse, ApiError>) {
        self.submit_replies.lock().unwrap().push_back(reply);
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortalApi for ScriptedApi {
    async fn fetch_applications(&self) -> Result<ApiResponse, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::FetchApplications);
        self.fetch_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(200, b"[]".to_vec())))
    }

    async fn submit_application(&self, body: Vec<u8>) -> Result<ApiResponse, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::SubmitApplication { body: body.clone() });
        self.submit_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(500, Vec::new())))
    }
}

struct Harness {
    api: Arc<ScriptedApi>,
    drafts: Arc<DraftPool<MemoryStorage>>,
    editing: Arc<EditingStore>,
    manager: Arc<ApplicationsManager<MemoryStorage, ScriptedApi>>,
    notifications: Arc<AtomicUsize>,
}

fn harness() -> Harness {
    let api = Arc::new(ScriptedApi::default());
    let drafts = Arc::new(DraftPool::new(Arc::new(MemoryStorage::new())));
    let editing = Arc::new(EditingStore::new());
    let manager = Arc::new(ApplicationsManager::new(
        Arc::clone(&api),
        Arc::clone(&drafts),
        Arc::clone(&editing),
    ));

    let notifications = Arc::new(AtomicUsize::new(0));
    {
        let notifications = Arc::clone(&notifications);
        manager.subscribe(move || {
            notifications.fetch_add(1, Ordering::SeqCst);
        });
    }

    Harness {
        api,
        drafts,
        editing,
        manager,
        notifications,
    }
}

fn draft(index: usize) -> DraftApplication {
    DraftApplication {
        draft_id: DraftId::new(index).unwrap(),
        trading_name: "Willow Woodcraft".into(),
        address_line_1: "1 Fair Lane".into(),
        address_line_2: String::new(),
        city: "Ulverston".into(),
        state: "Cumbria".into(),
        postcode: "LA12 7AA".into(),
        country: "UK".into(),
        contact_first_names: "Ada".into(),
        contact_last_name: "Weaver".into(),
        email: "ada@example.com".into(),
        landline: String::new(),
        mobile: "07700 900000".into(),
        website: String::new(),
        description_of_stall: "Hand-turned bowls".into(),
        pitch_type: PitchType::StandardNoShelter,
        pitch_additional_width: 0,
        pitch_van_space_required: false,
        pitch_electrical_options: ElectricalOption::None,
        camping_required: false,
        tables: 0,
        total_cost: 460,
    }
}

fn submitted(db_id: u32, status: ApplicationStatus) -> SubmittedApplication {
    SubmittedApplication {
        db_id,
        user_id: "user-1".into(),
        status,
        created: "2024-03-01T10:00:00Z".into(),
        trading_name: "Willow Woodcraft".into(),
        address_line_1: "1 Fair Lane".into(),
        address_line_2: String::new(),
        city: "Ulverston".into(),
        state: "Cumbria".into(),
        postcode: "LA12 7AA".into(),
        country: "UK".into(),
        contact_first_names: "Ada".into(),
        contact_last_name: "Weaver".into(),
        email: "ada@example.com".into(),
        landline: String::new(),
        mobile: "07700 900000".into(),
        website: String::new(),
        description_of_stall: "Hand-turned bowls".into(),
        pitch_type: PitchType::StandardNoShelter,
        pitch_additional_width: 0,
        pitch_van_space_required: false,
        pitch_electrical_options: ElectricalOption::None,
        camping_required: false,
        tables: 0,
        total_cost: 460,
        deposit_order_number: 0,
        deposit_order_key: String::new(),
        deposit_amount: None,
        deposit_amount_paid: None,
        document_folder: None,
    }
}

fn ok_json<T: serde::Serialize>(value: &T) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::new(200, serde_json::to_vec(value).unwrap()))
}

#[tokio::test]
async fn submit_without_staged_application_sends_nothing() {
    let h = harness();

    let err = h.manager.submit_editing_application().await.unwrap_err();

    assert!(matches!(err, SubmitError::NothingStaged));
    assert!(h.api.calls().is_empty(), "no request may be issued");
    assert_eq!(h.notifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_draft_submission_promotes_the_draft() {
    let h = harness();

    let staged = draft(3);
    h.drafts.write(&staged).unwrap();
    h.editing.stage(Application::Draft(staged.clone()));

    let record = submitted(17, ApplicationStatus::PendingDeposit);
    h.api.push_submit(ok_json(&record));

    h.manager.submit_editing_application().await.unwrap();

    // Body was encoded exactly once and carries the staged draft.
    let calls = h.api.calls();
    assert_eq!(calls.len(), 1);
    let RecordedCall::SubmitApplication { body } = &calls[0] else {
        panic!("expected a submission");
    };
    let sent: DraftApplication = serde_json::from_slice(body).unwrap();
    assert_eq!(sent, staged);

    // Pool slot cleared, record appended, editing store emptied.
    assert_eq!(h.drafts.draft(staged.draft_id).unwrap(), None);
    assert_eq!(h.manager.applications(), vec![record]);
    assert!(!h.editing.is_staged());
    assert_eq!(h.notifications.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_200_submission_status_is_a_typed_error() {
    let h = harness();
    h.editing.stage(Application::Draft(draft(0)));
    h.api.push_submit(Ok(ApiResponse::new(403, Vec::new())));

    let err = h.manager.submit_editing_application().await.unwrap_err();

    assert!(matches!(err, SubmitError::UnexpectedStatus { status: 403 }));
    // The staged application survives for a retry.
    assert!(h.editing.is_staged());
    assert!(h.manager.applications().is_empty());
    assert_eq!(h.notifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_submission_response_is_a_hard_error() {
    let h = harness();
    h.editing.stage(Application::Draft(draft(0)));
    h.api
        .push_submit(Ok(ApiResponse::new(200, b"{\"nope\":true}".to_vec())));

    let err = h.manager.submit_editing_application().await.unwrap_err();

    assert!(matches!(err, SubmitError::InvalidResponse { .. }));
    // The server accepted the submission, so the editing slot is gone even
    // though the response could not be understood.
    assert!(!h.editing.is_staged());
    assert!(h.manager.applications().is_empty());
}

#[tokio::test]
async fn resubmission_replaces_the_cache_entry_in_place() {
    let h = harness();

    h.api.push_fetch(ok_json(&vec![
        submitted(5, ApplicationStatus::Submitted),
        submitted(9, ApplicationStatus::PendingDeposit),
    ]));
    h.manager.refresh_applications().await;
    assert_eq!(h.notifications.load(Ordering::SeqCst), 2);

    let mut updated = submitted(5, ApplicationStatus::Submitted);
    updated.trading_name = "Willow & Oak".into();
    h.manager
        .prepare_existing_submission_for_editing(submitted(5, ApplicationStatus::Submitted));
    h.api.push_submit(ok_json(&updated));

    h.manager.submit_editing_application().await.unwrap();

    let applications = h.manager.applications();
    assert_eq!(applications.len(), 2, "no duplicate may be appended");
    assert_eq!(applications[0], updated, "entry keeps its position");
    assert_eq!(applications[1].db_id, 9);
    assert_eq!(h.notifications.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn resubmission_against_a_stale_cache_refetches_the_list() {
    let h = harness();

    // Cache is empty, so the updated record's id cannot be found in it.
    let record = submitted(7, ApplicationStatus::Submitted);
    h.manager.prepare_existing_submission_for_editing(record.clone());
    h.api.push_submit(ok_json(&record));
    h.api.push_fetch(ok_json(&vec![record.clone()]));

    h.manager.submit_editing_application().await.unwrap();

    assert_eq!(
        h.api.calls(),
        vec![
            RecordedCall::SubmitApplication {
                body: serde_json::to_vec(&record).unwrap()
            },
            RecordedCall::FetchApplications,
        ]
    );
    assert_eq!(h.manager.applications(), vec![record]);
    // The fallback refresh notifies around the fetch; nothing was spliced.
    assert_eq!(h.notifications.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refresh_replaces_the_cache_on_success() {
    let h = harness();
    h.api.push_fetch(ok_json(&vec![
        submitted(1, ApplicationStatus::Submitted),
        submitted(2, ApplicationStatus::Accepted),
    ]));

    h.manager.refresh_applications().await;

    assert_eq!(h.manager.applications().len(), 2);
    assert_eq!(h.manager.applications_error(), None);
    assert!(!h.manager.is_refreshing());
    assert_eq!(h.notifications.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refresh_schema_failure_empties_the_cache_and_records_the_error() {
    let h = harness();

    // Seed the cache so staleness cannot hide behind an empty list.
    h.api
        .push_fetch(ok_json(&vec![submitted(1, ApplicationStatus::Submitted)]));
    h.manager.refresh_applications().await;
    assert_eq!(h.manager.applications().len(), 1);

    h.api
        .push_fetch(Ok(ApiResponse::new(200, b"{\"unexpected\":true}".to_vec())));
    h.manager.refresh_applications().await;

    assert!(h.manager.applications().is_empty(), "no stale data retained");
    assert_eq!(
        h.manager.applications_error().as_deref(),
        Some(REFRESH_ERROR_MESSAGE)
    );
    assert!(!h.manager.is_refreshing());
}

#[tokio::test]
async fn refresh_transport_failure_degrades_the_same_way() {
    let h = harness();
    h.api.push_fetch(Err(ApiError::Network {
        path: "/api/getApplications".into(),
        message: "connection refused".into(),
    }));

    h.manager.refresh_applications().await;

    assert!(h.manager.applications().is_empty());
    assert_eq!(
        h.manager.applications_error().as_deref(),
        Some(REFRESH_ERROR_MESSAGE)
    );
    assert!(!h.manager.is_refreshing());
    assert_eq!(h.notifications.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refresh_notifies_loading_then_settled() {
    let h = harness();
    h.api.push_fetch(ok_json(&Vec::<SubmittedApplication>::new()));

    let phases = Arc::new(Mutex::new(Vec::new()));
    {
        let phases = Arc::clone(&phases);
        let manager = Arc::clone(&h.manager);
        h.manager.subscribe(move || {
            phases.lock().unwrap().push(manager.is_refreshing());
        });
    }

    h.manager.refresh_applications().await;

    assert_eq!(*phases.lock().unwrap(), vec![true, false]);
}

#[tokio::test]
async fn refresh_clears_a_previous_error() {
    let h = harness();

    h.api.push_fetch(Err(ApiError::Network {
        path: "/api/getApplications".into(),
        message: "offline".into(),
    }));
    h.manager.refresh_applications().await;
    assert!(h.manager.applications_error().is_some());

    h.api.push_fetch(ok_json(&Vec::<SubmittedApplication>::new()));
    h.manager.refresh_applications().await;
    assert_eq!(h.manager.applications_error(), None);
}

#[tokio::test]
async fn preparing_an_existing_submission_stages_it_without_cache_changes() {
    let h = harness();
    let record = submitted(11, ApplicationStatus::PendingDocumentUpload);

    h.manager.prepare_existing_submission_for_editing(record.clone());

    let staged = h.editing.load().unwrap();
    assert_eq!(staged.as_submitted(), Some(&record));
    assert!(h.manager.applications().is_empty());
    assert_eq!(h.notifications.load(Ordering::SeqCst), 0);
}

//! The applications manager.
//!
//! Owns the in-memory cache of submitted applications and the submission
//! workflow, and is the single source of truth the UI subscribes to. One
//! manager instance exists per signed-in session; construct it with its
//! collaborators and drop it (or [`reset`](ApplicationsManager::reset) it)
//! to tear the session state down.
//!
//! Failure policy differs deliberately between the two workflows: a refresh
//! degrades into observable state (error message, empty cache) so the UI can
//! offer a retry, while a submit propagates typed errors to the caller.
//! Neither retries on its own.

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::api::{ApiError, ApiResponse, PortalApi};
use crate::application::{Application, SubmittedApplication};
use crate::drafts::DraftPool;
use crate::editing::EditingStore;
use crate::storage::LocalStorage;

/// Error recorded on the manager when a list refresh fails.
pub const REFRESH_ERROR_MESSAGE: &str = "Error processing list of applications from server";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no application is staged for submission")]
    NothingStaged,

    #[error("failed to serialize application for submission: {0}")]
    Serialize(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("status code {status} when submitting application")]
    UnexpectedStatus { status: u16 },

    #[error("submission response did not match the submitted application shape: {reason}")]
    InvalidResponse { reason: String },
}

/// Opaque handle returned by [`ApplicationsManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

type Subscriber = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct ListState {
    applications: Vec<SubmittedApplication>,
    error: Option<String>,
    refreshing: bool,
}

#[derive(Default)]
struct Subscribers {
    next_handle: u64,
    entries: Vec<(SubscriptionHandle, Subscriber)>,
}

enum RefreshFailure {
    Transport(ApiError),
    Schema(serde_json::Error),
}

pub struct ApplicationsManager<S: LocalStorage, A: PortalApi> {
    api: Arc<A>,
    drafts: Arc<DraftPool<S>>,
    editing: Arc<EditingStore>,
    state: RwLock<ListState>,
    subscribers: RwLock<Subscribers>,
    // Serializes refresh and submit so an in-flight refresh cannot clobber a
    // concurrent submit's reconciliation. Accessors never touch this lock.
    op_lock: Mutex<()>,
}

impl<S: LocalStorage, A: PortalApi> ApplicationsManager<S, A> {
    pub fn new(api: Arc<A>, drafts: Arc<DraftPool<S>>, editing: Arc<EditingStore>) -> Self {
        Self {
            api,
            drafts,
            editing,
            state: RwLock::new(ListState::default()),
            subscribers: RwLock::new(Subscribers::default()),
            op_lock: Mutex::new(()),
        }
    }

    /// Register a callback invoked after every change to the applications
    /// list. Callbacks run synchronously, in registration order.
    ///
    /// A callback must not subscribe or unsubscribe from within itself.
    pub fn subscribe(&self, subscriber: impl Fn() + Send + Sync + 'static) -> SubscriptionHandle {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let handle = SubscriptionHandle(subs.next_handle);
        subs.next_handle += 1;
        subs.entries.push((handle, Box::new(subscriber)));
        handle
    }

    /// Deregister a callback. Returns whether the handle was registered.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subs.entries.len();
        subs.entries.retain(|(registered, _)| *registered != handle);
        subs.entries.len() != before
    }

    /// Snapshot of the submitted-applications cache.
    #[must_use]
    pub fn applications(&self) -> Vec<SubmittedApplication> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .applications
            .clone()
    }

    /// The last refresh error, or `None` when the list is healthy.
    #[must_use]
    pub fn applications_error(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .error
            .clone()
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .refreshing
    }

    /// Fetch the full submitted-applications list from the portal.
    ///
    /// Subscribers are notified once before the network call (so the UI can
    /// show a loading state) and exactly once after it completes, whatever
    /// the outcome. Failures are not returned: they land in
    /// [`applications_error`](Self::applications_error) and empty the cache.
    pub async fn refresh_applications(&self) {
        let _guard = self.op_lock.lock().await;
        self.refresh_inner().await;
    }

    #[instrument(skip(self))]
    async fn refresh_inner(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.refreshing = true;
            state.error = None;
        }
        self.notify_subscribers();

        let outcome = self.fetch_list().await;

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            match outcome {
                Ok(applications) => {
                    info!(count = applications.len(), "refreshed application list");
                    state.applications = applications;
                }
                Err(RefreshFailure::Transport(err)) => {
                    warn!(error = %err, "application list request failed");
                    state.error = Some(REFRESH_ERROR_MESSAGE.to_string());
                    state.applications = Vec::new();
                }
                Err(RefreshFailure::Schema(err)) => {
                    error!(
                        error = %err,
                        line = err.line(),
                        column = err.column(),
                        "application list failed schema validation"
                    );
                    state.error = Some(REFRESH_ERROR_MESSAGE.to_string());
                    state.applications = Vec::new();
                }
            }
            state.refreshing = false;
        }
        self.notify_subscribers();
    }

    async fn fetch_list(&self) -> Result<Vec<SubmittedApplication>, RefreshFailure> {
        let response = self
            .api
            .fetch_applications()
            .await
            .map_err(RefreshFailure::Transport)?;
        response
            .json::<Vec<SubmittedApplication>>()
            .map_err(RefreshFailure::Schema)
    }

    /// Submit the staged editing application to the portal.
    ///
    /// Requires a staged application and fails before any network call if
    /// none is present. Only HTTP 200 counts as success. On success the
    /// editing store is cleared and the cache reconciled: a promoted draft is
    /// removed from the pool and the new record appended; a re-submitted
    /// application replaces its cache entry in place, or triggers a full
    /// refresh when the cache turns out to be stale.
    #[instrument(skip(self))]
    pub async fn submit_editing_application(&self) -> Result<(), SubmitError> {
        let _guard = self.op_lock.lock().await;

        let staged = self.editing.load().ok_or(SubmitError::NothingStaged)?;

        let body = serde_json::to_vec(&staged)
            .map_err(|err| SubmitError::Serialize(err.to_string()))?;

        let response = self.api.submit_application(body).await?;
        if response.status() != 200 {
            return Err(SubmitError::UnexpectedStatus {
                status: response.status(),
            });
        }

        self.editing.clear();

        let submitted = parse_submitted(&response)?;

        match staged {
            Application::Draft(draft) => {
                // The draft has been promoted; its pool slot is stale now.
                // The submission already succeeded server-side, so a failure
                // here is logged rather than surfaced.
                if let Err(err) = self.drafts.clear(draft.draft_id) {
                    warn!(
                        slot = draft.draft_id.index(),
                        error = %err,
                        "failed to clear promoted draft slot"
                    );
                }

                info!(db_id = submitted.db_id, "draft promoted to submitted application");
                {
                    let mut state =
                        self.state.write().unwrap_or_else(PoisonError::into_inner);
                    state.applications.push(submitted);
                }
                self.notify_subscribers();
            }
            Application::Submitted(_) => {
                let db_id = submitted.db_id;
                let replaced = {
                    let mut state =
                        self.state.write().unwrap_or_else(PoisonError::into_inner);
                    match state
                        .applications
                        .iter_mut()
                        .find(|application| application.db_id == db_id)
                    {
                        Some(entry) => {
                            *entry = submitted;
                            true
                        }
                        None => false,
                    }
                };

                if replaced {
                    info!(db_id, "updated submitted application in place");
                    self.notify_subscribers();
                } else {
                    // Cache is out of sync with the server; fetch the truth
                    // rather than guessing a position.
                    info!(db_id, "submitted application missing from cache, refreshing list");
                    self.refresh_inner().await;
                }
            }
        }

        Ok(())
    }

    /// Stage a submitted application for modification. No cache mutation.
    pub fn prepare_existing_submission_for_editing(&self, application: SubmittedApplication) {
        self.editing.stage(Application::Submitted(application));
    }

    /// Restore pristine state: empty cache, no error, no subscribers.
    /// Intended for test isolation and session teardown.
    pub fn reset(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = ListState::default();
        }
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subs.entries.clear();
    }

    fn notify_subscribers(&self) {
        let subs = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, subscriber) in &subs.entries {
            subscriber();
        }
    }
}

fn parse_submitted(response: &ApiResponse) -> Result<SubmittedApplication, SubmitError> {
    response
        .json::<SubmittedApplication>()
        .map_err(|err| SubmitError::InvalidResponse {
            reason: err.to_string(),
        })
}

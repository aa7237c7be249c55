//! Application-state core for a craft fair vendor portal.
//!
//! Vendors apply for stall pitches through the portal; a SharePoint list is
//! the system of record. This crate is the client-side state layer between
//! the two: a bounded pool of locally persisted drafts, a single-slot store
//! for the application being edited, and a subscription-driven cache of
//! submitted applications reconciled against the remote API after every
//! submission round-trip.
//!
//! The pieces compose like this:
//!
//! - [`drafts::DraftPool`] keeps up to [`MAX_DRAFTS`] in-progress
//!   applications in client-local storage ([`storage::LocalStorage`]);
//! - [`editing::EditingStore`] stages the one application a form is working
//!   on;
//! - [`manager::ApplicationsManager`] owns the submitted-applications cache,
//!   the refresh and submit workflows, and change notification to UI
//!   subscribers;
//! - [`application`] carries the domain model, including the status-driven
//!   action predicates presentation code renders from;
//! - [`pricing`] and [`sharepoint`] cover stall pricing and list-item
//!   marshalling.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod application;
pub mod drafts;
pub mod editing;
pub mod manager;
pub mod pricing;
pub mod sharepoint;
pub mod storage;

/// Number of slots in the locally persisted draft pool.
pub const MAX_DRAFTS: usize = 10;

/// Client-local storage key holding the serialized draft pool.
pub const DRAFTS_STORAGE_KEY: &str = "vendorPortalDrafts";

/// Portal endpoint returning the caller's submitted applications.
pub const APPLICATIONS_LIST_PATH: &str = "/api/getApplications";

/// Portal endpoint accepting an application submission.
pub const SUBMIT_APPLICATION_PATH: &str = "/api/submitCraftApplication";

pub use api::{ApiError, ApiResponse, HttpPortalApi, PortalApi};
pub use application::{
    Application, ApplicationStatus, DraftApplication, DraftId, ElectricalOption, InvalidDraftId,
    PitchType, SubmittedApplication,
};
pub use drafts::{DraftPool, DraftPoolError};
pub use editing::EditingStore;
pub use manager::{
    ApplicationsManager, SubmitError, SubscriptionHandle, REFRESH_ERROR_MESSAGE,
};
pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::MAX_DRAFTS;

/// Lifecycle status of a submitted application.
///
/// Wire values match the portal's status column verbatim, spaces included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "Pending Deposit")]
    PendingDeposit,
    Submitted,
    #[serde(rename = "Pending Document Upload")]
    PendingDocumentUpload,
    #[serde(rename = "Accepted Pending Payment")]
    AcceptedPendingPayment,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    /// Every status, for exhaustive table-driven tests.
    pub const ALL: [Self; 6] = [
        Self::PendingDeposit,
        Self::Submitted,
        Self::PendingDocumentUpload,
        Self::AcceptedPendingPayment,
        Self::Accepted,
        Self::Rejected,
    ];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending Deposit" => Some(Self::PendingDeposit),
            "Submitted" => Some(Self::Submitted),
            "Pending Document Upload" => Some(Self::PendingDocumentUpload),
            "Accepted Pending Payment" => Some(Self::AcceptedPendingPayment),
            "Accepted" => Some(Self::Accepted),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingDeposit => "Pending Deposit",
            Self::Submitted => "Submitted",
            Self::PendingDocumentUpload => "Pending Document Upload",
            Self::AcceptedPendingPayment => "Accepted Pending Payment",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }

    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(
            self,
            Self::Submitted | Self::PendingDeposit | Self::PendingDocumentUpload
        )
    }

    #[must_use]
    pub const fn is_deletable(self) -> bool {
        matches!(self, Self::Submitted | Self::PendingDeposit)
    }

    #[must_use]
    pub const fn is_payable(self) -> bool {
        matches!(self, Self::PendingDeposit | Self::AcceptedPendingPayment)
    }

    #[must_use]
    pub const fn is_documents_uploadable(self) -> bool {
        matches!(self, Self::PendingDocumentUpload)
    }

    #[must_use]
    pub const fn is_completable(self) -> bool {
        matches!(self, Self::PendingDocumentUpload)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stall pitch variants offered by the fair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchType {
    #[serde(rename = "standardNoShelter")]
    StandardNoShelter,
    #[serde(rename = "extraLargeNoShelter")]
    ExtraLargeNoShelter,
    #[serde(rename = "standardInMarquee")]
    StandardInMarquee,
    #[serde(rename = "doubleInMarquee")]
    DoubleInMarquee,
}

impl PitchType {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standardNoShelter" => Some(Self::StandardNoShelter),
            "extraLargeNoShelter" => Some(Self::ExtraLargeNoShelter),
            "standardInMarquee" => Some(Self::StandardInMarquee),
            "doubleInMarquee" => Some(Self::DoubleInMarquee),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StandardNoShelter => "standardNoShelter",
            Self::ExtraLargeNoShelter => "extraLargeNoShelter",
            Self::StandardInMarquee => "standardInMarquee",
            Self::DoubleInMarquee => "doubleInMarquee",
        }
    }
}

/// Electrical hook-up options, priced as flat fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElectricalOption {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "1 x 13amp socket")]
    Socket13Amp,
    #[serde(rename = "1 x 16amp socket")]
    Socket16Amp,
    #[serde(rename = "2 x 13amp socket")]
    TwinSocket13Amp,
    #[serde(rename = "1 x 32amp supply")]
    Supply32Amp,
}

impl ElectricalOption {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "1 x 13amp socket" => Some(Self::Socket13Amp),
            "1 x 16amp socket" => Some(Self::Socket16Amp),
            "2 x 13amp socket" => Some(Self::TwinSocket13Amp),
            "1 x 32amp supply" => Some(Self::Supply32Amp),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Socket13Amp => "1 x 13amp socket",
            Self::Socket16Amp => "1 x 16amp socket",
            Self::TwinSocket13Amp => "2 x 13amp socket",
            Self::Supply32Amp => "1 x 32amp supply",
        }
    }
}

/// Validated index of a slot in the draft pool.
///
/// Constructing one outside `[0, MAX_DRAFTS)` fails, so out-of-range pool
/// access is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct DraftId(usize);

impl DraftId {
    pub fn new(index: usize) -> Result<Self, InvalidDraftId> {
        if index >= MAX_DRAFTS {
            return Err(InvalidDraftId { index });
        }
        Ok(Self(index))
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for DraftId {
    type Error = InvalidDraftId;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<DraftId> for usize {
    fn from(id: DraftId) -> Self {
        id.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("draft slot {index} is out of range for a pool of {} slots", MAX_DRAFTS)]
pub struct InvalidDraftId {
    pub index: usize,
}

/// A locally held application that has never been submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftApplication {
    pub draft_id: DraftId,
    pub trading_name: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub contact_first_names: String,
    pub contact_last_name: String,
    pub email: String,
    pub landline: String,
    pub mobile: String,
    pub website: String,
    pub description_of_stall: String,
    pub pitch_type: PitchType,
    pub pitch_additional_width: u32,
    pub pitch_van_space_required: bool,
    pub pitch_electrical_options: ElectricalOption,
    pub camping_required: bool,
    pub tables: u32,
    pub total_cost: u32,
}

impl DraftApplication {
    /// Cost implied by the current pitch selection.
    #[must_use]
    pub fn computed_cost(&self) -> u32 {
        crate::pricing::total_cost(
            self.pitch_type,
            self.pitch_additional_width,
            self.pitch_electrical_options,
            self.camping_required,
            self.tables,
        )
    }

    pub fn recompute_total_cost(&mut self) {
        self.total_cost = self.computed_cost();
    }
}

/// A server-held application, identified by the id the server assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedApplication {
    pub db_id: u32,
    pub user_id: String,
    pub status: ApplicationStatus,
    pub created: String,
    pub trading_name: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub contact_first_names: String,
    pub contact_last_name: String,
    pub email: String,
    pub landline: String,
    pub mobile: String,
    pub website: String,
    pub description_of_stall: String,
    pub pitch_type: PitchType,
    pub pitch_additional_width: u32,
    pub pitch_van_space_required: bool,
    pub pitch_electrical_options: ElectricalOption,
    pub camping_required: bool,
    pub tables: u32,
    pub total_cost: u32,
    pub deposit_order_number: u32,
    pub deposit_order_key: String,
    #[serde(default)]
    pub deposit_amount: Option<f64>,
    #[serde(default)]
    pub deposit_amount_paid: Option<f64>,
    #[serde(default)]
    pub document_folder: Option<String>,
}

impl SubmittedApplication {
    #[must_use]
    pub fn computed_cost(&self) -> u32 {
        crate::pricing::total_cost(
            self.pitch_type,
            self.pitch_additional_width,
            self.pitch_electrical_options,
            self.camping_required,
            self.tables,
        )
    }

    pub fn recompute_total_cost(&mut self) {
        self.total_cost = self.computed_cost();
    }
}

/// Either side of the application lifecycle.
///
/// Serialized untagged: the two variants are distinguished by which identity
/// field is present (`draftId` vs `dbId`), matching the portal wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Application {
    Submitted(SubmittedApplication),
    Draft(DraftApplication),
}

impl Application {
    #[must_use]
    pub const fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }

    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    #[must_use]
    pub const fn as_draft(&self) -> Option<&DraftApplication> {
        match self {
            Self::Draft(draft) => Some(draft),
            Self::Submitted(_) => None,
        }
    }

    #[must_use]
    pub const fn as_submitted(&self) -> Option<&SubmittedApplication> {
        match self {
            Self::Submitted(submitted) => Some(submitted),
            Self::Draft(_) => None,
        }
    }

    /// Status of a submitted application; drafts have none.
    #[must_use]
    pub const fn status(&self) -> Option<ApplicationStatus> {
        match self {
            Self::Submitted(submitted) => Some(submitted.status),
            Self::Draft(_) => None,
        }
    }

    #[must_use]
    pub fn trading_name(&self) -> &str {
        match self {
            Self::Submitted(submitted) => &submitted.trading_name,
            Self::Draft(draft) => &draft.trading_name,
        }
    }

    #[must_use]
    pub const fn total_cost(&self) -> u32 {
        match self {
            Self::Submitted(submitted) => submitted.total_cost,
            Self::Draft(draft) => draft.total_cost,
        }
    }

    /// Drafts are always editable; submissions only in pre-acceptance states.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        match self {
            Self::Draft(_) => true,
            Self::Submitted(submitted) => submitted.status.is_editable(),
        }
    }

    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        match self {
            Self::Draft(_) => true,
            Self::Submitted(submitted) => submitted.status.is_deletable(),
        }
    }

    /// Unsubmitted applications cannot be paid for.
    #[must_use]
    pub const fn is_payable(&self) -> bool {
        match self {
            Self::Draft(_) => false,
            Self::Submitted(submitted) => submitted.status.is_payable(),
        }
    }

    #[must_use]
    pub const fn is_documents_uploadable(&self) -> bool {
        match self {
            Self::Draft(_) => false,
            Self::Submitted(submitted) => submitted.status.is_documents_uploadable(),
        }
    }

    #[must_use]
    pub const fn is_completable(&self) -> bool {
        match self {
            Self::Draft(_) => false,
            Self::Submitted(submitted) => submitted.status.is_completable(),
        }
    }
}

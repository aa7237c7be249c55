//! SharePoint list-item marshalling.
//!
//! The portal's system of record is a SharePoint list; records cross that
//! boundary as PascalCase list-item fields. Mapping back is lenient: columns
//! edited by hand or by older versions of the portal fall back to safe
//! defaults instead of failing the whole row.
//!
//! The generic list CRUD transport itself is a hosted service binding and is
//! not part of this crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::application::{ApplicationStatus, ElectricalOption, PitchType, SubmittedApplication};

/// Document library holding per-application folders.
pub const DOCUMENTS_LIBRARY_NAME: &str = "Application Documents";

#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("list item has no ID; it has not been persisted")]
    MissingId,

    #[error("invalid site URL '{url}': {reason}")]
    InvalidSiteUrl { url: String, reason: String },
}

/// SharePoint's hyperlink field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUrlValue {
    #[serde(rename = "__metadata")]
    pub metadata: FieldUrlMetadata,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldUrlMetadata {
    #[serde(rename = "type")]
    pub type_name: String,
}

impl FieldUrlValue {
    #[must_use]
    pub fn document_folder(url: impl Into<String>) -> Self {
        Self {
            metadata: FieldUrlMetadata {
                type_name: "SP.FieldUrlValue".to_string(),
            },
            description: "Related Documents".to_string(),
            url: url.into(),
        }
    }
}

/// One row of the craft applications list, in column form.
///
/// Enumerated columns stay as raw strings here; the lenient fallbacks apply
/// when converting to the domain type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationListItem {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub title: String,
    pub status: String,
    pub description_of_stall: String,
    pub address_line_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub user_id: String,
    pub total_cost: u32,
    pub pitch_type: String,
    pub pitch_additional_width: u32,
    pub pitch_van_space_required: bool,
    pub pitch_electrical_options: String,
    pub camping_required: bool,
    pub tables: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_order_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_order_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_amount_paid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_folder: Option<FieldUrlValue>,
}

/// Flatten an application into list-item columns. `ID` and `Created` are
/// server-managed and never written.
#[must_use]
pub fn application_to_list_item(application: &SubmittedApplication) -> ApplicationListItem {
    ApplicationListItem {
        id: None,
        title: application.trading_name.clone(),
        status: application.status.as_str().to_string(),
        description_of_stall: application.description_of_stall.clone(),
        address_line_1: application.address_line_1.clone(),
        address_line_2: Some(application.address_line_2.clone()),
        city: application.city.clone(),
        state: application.state.clone(),
        postcode: application.postcode.clone(),
        country: application.country.clone(),
        contact_first_name: application.contact_first_names.clone(),
        contact_last_name: application.contact_last_name.clone(),
        contact_email: application.email.clone(),
        landline: Some(application.landline.clone()),
        mobile: Some(application.mobile.clone()),
        website: Some(application.website.clone()),
        user_id: application.user_id.clone(),
        total_cost: application.total_cost,
        pitch_type: application.pitch_type.as_str().to_string(),
        pitch_additional_width: application.pitch_additional_width,
        pitch_van_space_required: application.pitch_van_space_required,
        pitch_electrical_options: application.pitch_electrical_options.as_str().to_string(),
        camping_required: application.camping_required,
        tables: application.tables,
        created: None,
        deposit_order_number: Some(application.deposit_order_number),
        deposit_order_key: Some(application.deposit_order_key.clone()),
        deposit_amount: application.deposit_amount,
        deposit_amount_paid: application.deposit_amount_paid,
        document_folder: application
            .document_folder
            .as_ref()
            .map(|url| FieldUrlValue::document_folder(url.clone())),
    }
}

/// Rebuild the domain record from list-item columns.
///
/// Unrecognized enumerated values fall back: status to `Pending Deposit`,
/// pitch type to `standardNoShelter`, electrical option to `none`. Missing
/// optional columns become empty strings or zero.
pub fn list_item_to_application(
    item: &ApplicationListItem,
) -> Result<SubmittedApplication, MarshalError> {
    let db_id = item.id.ok_or(MarshalError::MissingId)?;

    let status =
        ApplicationStatus::parse(&item.status).unwrap_or(ApplicationStatus::PendingDeposit);
    let pitch_type = PitchType::parse(&item.pitch_type).unwrap_or(PitchType::StandardNoShelter);
    let pitch_electrical_options =
        ElectricalOption::parse(&item.pitch_electrical_options).unwrap_or(ElectricalOption::None);

    Ok(SubmittedApplication {
        db_id,
        user_id: item.user_id.clone(),
        status,
        created: item.created.clone().unwrap_or_default(),
        trading_name: item.title.clone(),
        address_line_1: item.address_line_1.clone(),
        address_line_2: item.address_line_2.clone().unwrap_or_default(),
        city: item.city.clone(),
        state: item.state.clone(),
        postcode: item.postcode.clone(),
        country: item.country.clone(),
        contact_first_names: item.contact_first_name.clone(),
        contact_last_name: item.contact_last_name.clone(),
        email: item.contact_email.clone(),
        landline: item.landline.clone().unwrap_or_default(),
        mobile: item.mobile.clone().unwrap_or_default(),
        website: item.website.clone().unwrap_or_default(),
        description_of_stall: item.description_of_stall.clone(),
        pitch_type,
        pitch_additional_width: item.pitch_additional_width,
        pitch_van_space_required: item.pitch_van_space_required,
        pitch_electrical_options,
        camping_required: item.camping_required,
        tables: item.tables,
        total_cost: item.total_cost,
        deposit_order_number: item.deposit_order_number.unwrap_or(0),
        deposit_order_key: item.deposit_order_key.clone().unwrap_or_default(),
        deposit_amount: item.deposit_amount,
        deposit_amount_paid: item.deposit_amount_paid,
        document_folder: item.document_folder.as_ref().map(|field| field.url.clone()),
    })
}

/// Folder name for an application's documents inside the library.
#[must_use]
pub fn document_folder_name(db_id: u32, trading_name: &str) -> String {
    format!("{db_id} - {trading_name}")
}

/// Absolute URL of a document folder given the vendor site URL and the
/// folder's server-relative path.
pub fn document_folder_href(
    site_url: &str,
    server_relative_url: &str,
) -> Result<String, MarshalError> {
    let base = Url::parse(site_url).map_err(|err| MarshalError::InvalidSiteUrl {
        url: site_url.to_string(),
        reason: err.to_string(),
    })?;
    let joined = base
        .join(server_relative_url)
        .map_err(|err| MarshalError::InvalidSiteUrl {
            url: site_url.to_string(),
            reason: err.to_string(),
        })?;
    Ok(joined.to_string())
}

use serde::Serialize;
use utoipa::ToSchema;

pub use sipkl_models::dashboard::{DashboardData, DashboardUser, StatsResponse};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub url: String,
    pub file_name: String,
    pub rows: usize,
}

/// Column titles of the exported report.
pub const EXPORT_HEADER: [&str; 7] = [
    "No",
    "Identifier",
    "Student Name",
    "Student Phone",
    "Guardian Phone",
    "Address",
    "Photo",
];

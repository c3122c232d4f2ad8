use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::accounts::{Department, Role};

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUser {
    pub identifier: String,
    pub name: String,
    pub role: Role,
    pub department: Department,
    pub year: String,
    /// The password is still the one set by an admin reset or setup.
    pub is_default_password: bool,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub user: DashboardUser,
    pub is_admin: bool,
}

/// Student count per department sheet.
#[derive(Serialize, Debug, PartialEq, ToSchema)]
pub struct StatsResponse {
    pub stats: BTreeMap<String, usize>,
    pub total: usize,
}

use serde::Serialize;
use utoipa::ToSchema;

pub use sipkl_models::requests::{
    ChangePasswordRequest, CredentialsUpdate, IdentifierRequest, TransferRequest,
};

/// Which halves of a hard delete found something to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DeleteOutcome {
    Both,
    AccountOnly,
    ProfileOnly,
}

impl DeleteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Both => "Student deleted permanently.",
            Self::AccountOnly => "Login account deleted; no profile row was found.",
            Self::ProfileOnly => "Profile deleted; no login account was found.",
        }
    }
}

/// How a department transfer handled the profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum TransferOutcome {
    /// The existing row was moved to the new sheet.
    Moved,
    /// No row existed; a minimal one was created in the new sheet.
    Recreated,
    /// Old and new department are the same sheet.
    Unchanged,
}

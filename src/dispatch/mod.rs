//! Single-endpoint action dispatcher.
//!
//! Every client call is an action name plus a JSON payload. [`dispatch`]
//! resolves the session, applies role and department scoping and hands the
//! decoded payload to the matching service. The result is always an
//! [`ApiResponse`] envelope, never an HTTP error.

pub mod controller;
pub mod envelope;
pub mod router;

use anyhow::anyhow;
use serde_json::{Map, Value, json};
use sipkl_core::errors::AppError;
use sipkl_models::accounts::{AccountSummary, Department};
use tracing::instrument;

pub use envelope::{ApiResponse, RpcRequest, SESSION_EXPIRED};

use crate::modules::accounts::model::{
    ChangePasswordRequest, CredentialsUpdate, IdentifierRequest, TransferRequest,
};
use crate::modules::accounts::service::AccountService;
use crate::modules::auth::model::{LoginRequest, RegisterRequest};
use crate::modules::auth::service::AuthService;
use crate::modules::dashboard::service::DashboardService;
use crate::modules::students::model::{DepartmentQuery, DetailForm, PhotoUpload, ProfileForm};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::parse_payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    GetDashboardData,
    GetStudentProfile,
    SaveStudentProfile,
    UploadPhoto,
    ChangePassword,
    AdminUpdateCredentials,
    AdminGetStudentDetail,
    AdminSaveStudentDetail,
    GetAdminStats,
    GetDashboardYears,
    GetAdminData,
    AdminCreateUser,
    GetAdminUsers,
    AdminDeleteUser,
    AdminResetPassword,
    AdminChangeDepartment,
    AdminExportSheet,
    GetAvailableYears,
}

impl Action {
    pub const ALL: [Action; 20] = [
        Self::Login,
        Self::Register,
        Self::GetDashboardData,
        Self::GetStudentProfile,
        Self::SaveStudentProfile,
        Self::UploadPhoto,
        Self::ChangePassword,
        Self::AdminUpdateCredentials,
        Self::AdminGetStudentDetail,
        Self::AdminSaveStudentDetail,
        Self::GetAdminStats,
        Self::GetDashboardYears,
        Self::GetAdminData,
        Self::AdminCreateUser,
        Self::GetAdminUsers,
        Self::AdminDeleteUser,
        Self::AdminResetPassword,
        Self::AdminChangeDepartment,
        Self::AdminExportSheet,
        Self::GetAvailableYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::GetDashboardData => "getDashboardData",
            Self::GetStudentProfile => "getStudentProfile",
            Self::SaveStudentProfile => "saveStudentProfile",
            Self::UploadPhoto => "uploadPhoto",
            Self::ChangePassword => "changePassword",
            Self::AdminUpdateCredentials => "adminUpdateCredentials",
            Self::AdminGetStudentDetail => "adminGetStudentDetail",
            Self::AdminSaveStudentDetail => "adminSaveStudentDetail",
            Self::GetAdminStats => "getAdminStats",
            Self::GetDashboardYears => "getDashboardYears",
            Self::GetAdminData => "getAdminData",
            Self::AdminCreateUser => "adminCreateUser",
            Self::GetAdminUsers => "getAdminUsers",
            Self::AdminDeleteUser => "adminDeleteUser",
            Self::AdminResetPassword => "adminResetPassword",
            Self::AdminChangeDepartment => "adminChangeDepartment",
            Self::AdminExportSheet => "adminExportSheet",
            Self::GetAvailableYears => "getAvailableYears",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Callable without a session token.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            Self::Login
                | Self::Register
                | Self::GetDashboardData
                | Self::GetStudentProfile
                | Self::SaveStudentProfile
                | Self::UploadPhoto
                | Self::ChangePassword
        )
    }
}

/// Run one action and wrap its outcome in the response envelope.
#[instrument(skip(state, payload))]
pub async fn dispatch(state: &AppState, action: &str, payload: Value) -> ApiResponse {
    let payload = match payload {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    let result = match Action::parse(action).filter(Action::is_public) {
        Some(public) => run_public(state, public, payload).await,
        None => {
            let token = payload.get("sessionToken").and_then(Value::as_str);
            let session = AuthService::validate_token(&*state.store, token).await;
            match session {
                Ok(Some(actor)) => run_authenticated(state, action, &actor, payload).await,
                Ok(None) => return ApiResponse::session_expired(),
                Err(e) => Err(e),
            }
        }
    };

    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => {
            if e.status.is_server_error() {
                tracing::error!(action, error = %e.error, "Action failed");
            } else {
                tracing::info!(action, status = %e.status, error = %e.error, "Action rejected");
            }
            ApiResponse::failure(&e)
        }
    }
}

async fn run_public(state: &AppState, action: Action, payload: Value) -> Result<Value, AppError> {
    let store = &*state.store;
    match action {
        Action::Login => {
            let req: LoginRequest = parse_payload(payload)?;
            let session = AuthService::login(
                store,
                &state.lock,
                state.lock_config.write_timeout,
                &req.identifier,
                &req.password,
            )
            .await?;
            Ok(serde_json::to_value(session)?)
        }
        Action::Register => {
            let form: RegisterRequest = parse_payload(payload)?;
            let message = AuthService::register(
                store,
                &state.lock,
                state.lock_config.write_timeout,
                form,
            )
            .await?;
            Ok(json!({ "message": message }))
        }
        other => Err(AppError::internal(anyhow!(
            "{} is not a public action",
            other.as_str()
        ))),
    }
}

async fn run_authenticated(
    state: &AppState,
    action: &str,
    actor: &AccountSummary,
    payload: Value,
) -> Result<Value, AppError> {
    let Some(action) = Action::parse(action) else {
        return Err(AppError::bad_request(anyhow!(
            "Unknown API action: {}",
            action
        )));
    };

    if action.requires_admin() && !actor.is_admin() {
        return Err(AppError::forbidden("Access denied"));
    }

    let payload = scope_payload(actor, payload);
    let store = &*state.store;
    let storage = &*state.storage;
    let lock = &state.lock;
    let wait = state.lock_config.write_timeout;

    match action {
        Action::GetDashboardData => {
            let data = DashboardService::dashboard_data(store, actor).await?;
            Ok(json!({ "data": data }))
        }
        Action::GetStudentProfile => {
            let profile = StudentService::get_profile(store, storage, actor).await?;
            Ok(json!({ "profile": profile }))
        }
        Action::SaveStudentProfile => {
            let form_data = payload
                .get("formData")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            let form: ProfileForm = parse_payload(form_data)?;
            let message = StudentService::save_profile(store, storage, lock, wait, actor, form).await?;
            Ok(json!({ "message": message }))
        }
        Action::UploadPhoto => {
            let upload: PhotoUpload = parse_payload(payload)?;
            let uploaded = StudentService::upload_photo(storage, &actor.identifier, upload).await?;
            Ok(serde_json::to_value(uploaded)?)
        }
        Action::ChangePassword => {
            let req: ChangePasswordRequest = parse_payload(payload)?;
            let message =
                AccountService::change_password(store, lock, wait, actor, &req.new_password)
                    .await?;
            Ok(json!({ "message": message }))
        }
        Action::AdminUpdateCredentials => {
            let update: CredentialsUpdate = parse_payload(payload)?;
            let message = AccountService::update_own_credentials(
                store,
                lock,
                state.lock_config.credential_timeout,
                actor,
                update,
            )
            .await?;
            Ok(json!({ "message": message }))
        }
        Action::AdminGetStudentDetail => {
            let req: IdentifierRequest = parse_payload(payload)?;
            let department = selected_department(req.department.as_deref())?;
            let data = StudentService::get_detail(store, &req.identifier, department).await?;
            Ok(json!({ "data": data }))
        }
        Action::AdminSaveStudentDetail => {
            let form: DetailForm = parse_payload(payload)?;
            let department = selected_department(form.department.as_deref())?.to_string();
            let message =
                StudentService::save_detail(store, storage, lock, wait, form, &department).await?;
            Ok(json!({ "message": message }))
        }
        Action::GetAdminStats => {
            let query: DepartmentQuery = parse_payload(payload)?;
            let stats = DashboardService::stats(store, query.year_filter(), &actor.department)
                .await?;
            Ok(serde_json::to_value(stats)?)
        }
        Action::GetDashboardYears => {
            let years = DashboardService::dashboard_years(store).await?;
            Ok(json!({ "years": years }))
        }
        Action::GetAdminData => {
            let query: DepartmentQuery = parse_payload(payload)?;
            let department = selected_department(query.department.as_deref())?;
            let students =
                StudentService::list_by_department(store, storage, department, query.year_filter())
                    .await?;
            Ok(json!({ "students": students }))
        }
        Action::AdminCreateUser => {
            let form: RegisterRequest = parse_payload(payload)?;
            let department = form
                .department
                .clone()
                .ok_or_else(|| AppError::bad_request(anyhow!("Department is required")))?;
            let message = AccountService::create_account(
                store,
                lock,
                wait,
                form,
                &department,
            )
            .await?;
            Ok(json!({ "message": message }))
        }
        Action::GetAdminUsers => {
            let users = AccountService::list_accounts(store, &actor.department).await?;
            Ok(json!({ "users": users }))
        }
        Action::AdminDeleteUser => {
            let req: IdentifierRequest = parse_payload(payload)?;
            let outcome = AccountService::delete_account(
                store,
                lock,
                wait,
                &req.identifier,
                req.department.as_deref(),
                &actor.department,
            )
            .await?;
            Ok(json!({ "message": outcome.message(), "outcome": outcome }))
        }
        Action::AdminResetPassword => {
            let req: IdentifierRequest = parse_payload(payload)?;
            let message =
                AccountService::reset_password(store, lock, wait, &req.identifier, &actor.department)
                    .await?;
            Ok(json!({ "message": message }))
        }
        Action::AdminChangeDepartment => {
            if !actor.is_super_admin() {
                return Err(AppError::forbidden(
                    "Only the super admin can move students between departments",
                ));
            }
            let req: TransferRequest = parse_payload(payload)?;
            let outcome = AccountService::transfer_department(
                store,
                lock,
                wait,
                &req.identifier,
                req.old_department.as_deref(),
                &req.new_department,
            )
            .await?;
            Ok(json!({
                "message": format!("Student moved to {}.", req.new_department.trim()),
                "outcome": outcome,
            }))
        }
        Action::AdminExportSheet => {
            let query: DepartmentQuery = parse_payload(payload)?;
            let department = selected_department(query.department.as_deref())?;
            let export =
                DashboardService::export_department(store, storage, department, query.year_filter())
                    .await?;
            Ok(json!({
                "url": export.url,
                "fileName": export.file_name,
                "message": format!("Report exported with {} students.", export.rows),
            }))
        }
        Action::GetAvailableYears => {
            let query: DepartmentQuery = parse_payload(payload)?;
            let years = match query.department.as_deref() {
                Some(department) => StudentService::available_years(store, department).await?,
                None => Vec::new(),
            };
            Ok(json!({ "years": years }))
        }
        Action::Login | Action::Register => Err(AppError::internal(anyhow!(
            "{} must be dispatched without a session",
            action.as_str()
        ))),
    }
}

/// Pin a department admin's requests to their own department.
///
/// Whatever `department` the client sent is replaced, so a scoped admin can
/// never read or write another department's sheet.
fn scope_payload(actor: &AccountSummary, mut payload: Value) -> Value {
    if !actor.is_admin() || actor.department.is_all() {
        return payload;
    }
    if let Value::Object(map) = &mut payload {
        map.insert(
            "department".to_string(),
            Value::String(actor.department.as_str().to_string()),
        );
    }
    payload
}

fn selected_department(department: Option<&str>) -> Result<&str, AppError> {
    department
        .filter(|d| *d != Department::ALL)
        .ok_or_else(|| AppError::bad_request(anyhow!("Department must be selected")))
}

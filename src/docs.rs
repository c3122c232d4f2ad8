use utoipa::OpenApi;

use crate::dispatch::controller::HealthResponse;
use crate::dispatch::{ApiResponse, RpcRequest};
use crate::modules::accounts::model::{
    ChangePasswordRequest, CredentialsUpdate, DeleteOutcome, IdentifierRequest, TransferOutcome,
    TransferRequest,
};
use crate::modules::auth::model::{LoginRequest, LoginResponse, RegisterRequest};
use crate::modules::dashboard::model::{DashboardData, DashboardUser, StatsResponse};
use crate::modules::students::model::{
    DepartmentQuery, DetailForm, DetailView, PhotoUpload, ProfileForm, ProfileView,
    StudentListItem, UploadedPhoto,
};
use sipkl_models::accounts::{AccountSummary, Department, Role};

/// Every action goes through `POST /api/rpc`; the schemas below document the
/// `payload` each action expects and the fields its response adds.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::dispatch::controller::handle_rpc,
        crate::dispatch::controller::health,
    ),
    components(
        schemas(
            RpcRequest,
            ApiResponse,
            HealthResponse,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            Role,
            Department,
            AccountSummary,
            ChangePasswordRequest,
            CredentialsUpdate,
            IdentifierRequest,
            TransferRequest,
            DeleteOutcome,
            TransferOutcome,
            ProfileForm,
            ProfileView,
            PhotoUpload,
            UploadedPhoto,
            DetailForm,
            DetailView,
            DepartmentQuery,
            StudentListItem,
            DashboardData,
            DashboardUser,
            StatsResponse,
        )
    ),
    tags(
        (name = "Actions", description = "Session, profile and administration actions"),
        (name = "Health", description = "Liveness check"),
    ),
    info(
        title = "SIPKL API",
        version = "0.1.0",
        description = "Internship record keeping for vocational school departments"
    )
)]
pub struct ApiDoc;

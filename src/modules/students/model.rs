use serde::Serialize;
use utoipa::ToSchema;

pub use sipkl_models::requests::{DepartmentQuery, DetailForm, PhotoUpload, ProfileForm};
pub use sipkl_models::students::{DetailView, ProfileView, StudentListItem};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhoto {
    /// Storage key to send back as `photoId` when saving the profile.
    pub file_id: String,
    pub thumbnail_link: String,
}

pub const DEFAULT_PHOTO_MIME: &str = "image/jpeg";

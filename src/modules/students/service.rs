use std::time::Duration;

use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sipkl_core::errors::AppError;
use sipkl_core::file_storage::FileStorage;
use sipkl_core::text::{title_case, upper_case};
use sipkl_models::accounts::AccountSummary;
use sipkl_models::requests::year_filter;
use sipkl_models::schema::{marked, profiles as col};
use sipkl_models::students::{StudentProfile, image_formula};
use sipkl_sheets::{ScriptLock, StoreError, TabularStore};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::students::model::{
    DEFAULT_PHOTO_MIME, DetailForm, DetailView, PhotoUpload, ProfileForm, ProfileView,
    StudentListItem, UploadedPhoto,
};
use crate::tables::{self, storage_error};

/// Text columns as they will be written, already normalized.
struct TextFields {
    name: String,
    address: String,
    student_phone: String,
    guardian_phone: String,
}

impl TextFields {
    fn normalize(
        name: Option<&str>,
        address: Option<&str>,
        student_phone: Option<&str>,
        guardian_phone: Option<&str>,
    ) -> Self {
        Self {
            name: title_case(name.unwrap_or_default().trim()),
            address: upper_case(address.unwrap_or_default().trim()),
            student_phone: student_phone.unwrap_or_default().trim().to_string(),
            guardian_phone: guardian_phone.unwrap_or_default().trim().to_string(),
        }
    }
}

pub struct StudentService;

impl StudentService {
    /// The caller's own profile, or `None` if their sheet has no row for them.
    #[instrument(skip(store, storage), fields(identifier = %actor.identifier))]
    pub async fn get_profile(
        store: &dyn TabularStore,
        storage: &dyn FileStorage,
        actor: &AccountSummary,
    ) -> Result<Option<ProfileView>, AppError> {
        let found =
            tables::locate_profile(store, actor.department.as_str(), &actor.identifier).await?;

        Ok(found.map(|located| {
            let profile = located.record;
            let photo_url = profile
                .photo_key()
                .and_then(|key| storage.get_url(key).ok());
            ProfileView {
                name: profile.name,
                address: profile.address,
                student_phone: profile.student_phone,
                guardian_phone: profile.guardian_phone,
                photo_id: profile.photo_id,
                photo_url,
                year: profile.year,
            }
        }))
    }

    /// Self-service save. Appends a row when the student has none yet.
    ///
    /// The stored photo is replaced only when the form names a new one, and
    /// the year only when the form carries one. A replaced photo file is
    /// removed from storage.
    #[instrument(skip(store, storage, lock, form), fields(identifier = %actor.identifier))]
    pub async fn save_profile(
        store: &dyn TabularStore,
        storage: &dyn FileStorage,
        lock: &ScriptLock,
        timeout: Duration,
        actor: &AccountSummary,
        form: ProfileForm,
    ) -> Result<String, AppError> {
        let department = actor.department.as_str();
        let fields = TextFields::normalize(
            form.name.as_deref(),
            form.address.as_deref(),
            form.student_phone.as_deref(),
            form.guardian_phone.as_deref(),
        );
        let photo = match form.photo_id.as_deref() {
            Some(key) => Some(photo_cells(storage, key)?),
            None => None,
        };

        let _guard = lock.acquire(timeout).await?;
        match tables::locate_profile(store, department, &actor.identifier).await? {
            Some(located) => {
                write_text_fields(store, department, located.row, &fields).await?;
                if let Some((photo_id, preview)) = &photo {
                    write_photo(store, department, located.row, photo_id, preview).await?;
                    remove_replaced_photo(storage, &located.record, photo_id).await;
                }
                if let Some(year) = &form.year {
                    store
                        .write_cell(department, located.row, col::YEAR, year)
                        .await?;
                }
            }
            None => {
                let (photo_id, photo_preview) = photo.unwrap_or_default();
                let profile = StudentProfile {
                    identifier: actor.identifier.clone(),
                    name: fields.name,
                    address: fields.address,
                    student_phone: fields.student_phone,
                    guardian_phone: fields.guardian_phone,
                    photo_id,
                    photo_preview,
                    year: form.year.unwrap_or_default(),
                };
                store.append_row(department, profile.to_row()).await?;
                tracing::info!("Profile row created on first save");
            }
        }

        Ok("Profile saved.".to_string())
    }

    /// Store a base64-encoded photo and return its key and public URL.
    #[instrument(skip(storage, upload))]
    pub async fn upload_photo(
        storage: &dyn FileStorage,
        identifier: &str,
        upload: PhotoUpload,
    ) -> Result<UploadedPhoto, AppError> {
        let (prefix_mime, encoded) = split_data_url(upload.file_data.trim());
        let mime = upload
            .file_type
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .or(prefix_mime)
            .unwrap_or(DEFAULT_PHOTO_MIME);

        if !mime.starts_with("image/") {
            return Err(AppError::bad_request(anyhow!(
                "Only image files can be uploaded as a photo"
            )));
        }

        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|_| AppError::bad_request(anyhow!("Photo data is not valid base64")))?;
        if bytes.is_empty() {
            return Err(AppError::bad_request(anyhow!("Photo data is empty")));
        }

        let key = format!(
            "photos/{}_{}.{}",
            key_segment(identifier),
            Uuid::new_v4().simple(),
            extension(mime)
        );
        let key = storage
            .save(&key, &bytes, mime)
            .await
            .map_err(storage_error)?;
        let url = storage.get_url(&key).map_err(storage_error)?;

        tracing::info!(key = %key, bytes = bytes.len(), "Photo uploaded");
        Ok(UploadedPhoto {
            file_id: key,
            thumbnail_link: url,
        })
    }

    /// One student's profile for the admin edit form.
    #[instrument(skip(store))]
    pub async fn get_detail(
        store: &dyn TabularStore,
        identifier: &str,
        department: &str,
    ) -> Result<DetailView, AppError> {
        tables::locate_profile(store, department, identifier)
            .await?
            .map(|located| DetailView::from(located.record))
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    /// Admin save of another student's profile. The row must already exist.
    #[instrument(skip(store, storage, lock, form), fields(identifier = %form.identifier))]
    pub async fn save_detail(
        store: &dyn TabularStore,
        storage: &dyn FileStorage,
        lock: &ScriptLock,
        timeout: Duration,
        form: DetailForm,
        department: &str,
    ) -> Result<String, AppError> {
        let _guard = lock.acquire(timeout).await?;
        let located = tables::locate_profile(store, department, &form.identifier)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let photo = match form.photo.clone() {
            Some(upload) => {
                let uploaded = Self::upload_photo(storage, &located.record.identifier, upload)
                    .await
                    .map_err(|e| AppError::new(e.status, anyhow!("Photo upload failed: {}", e.message())))?;
                Some(photo_cells(storage, &uploaded.file_id)?)
            }
            None => None,
        };

        let fields = TextFields::normalize(
            form.name.as_deref(),
            form.address.as_deref(),
            form.student_phone.as_deref(),
            form.guardian_phone.as_deref(),
        );
        write_text_fields(store, department, located.row, &fields).await?;
        if let Some(year) = &form.year {
            store
                .write_cell(department, located.row, col::YEAR, year)
                .await?;
        }
        if let Some((photo_id, preview)) = &photo {
            write_photo(store, department, located.row, photo_id, preview).await?;
            remove_replaced_photo(storage, &located.record, photo_id).await;
        }

        Ok("Student data updated.".to_string())
    }

    /// Students of one department, optionally for one year, sorted by name.
    #[instrument(skip(store, storage))]
    pub async fn list_by_department(
        store: &dyn TabularStore,
        storage: &dyn FileStorage,
        department: &str,
        year: Option<&str>,
    ) -> Result<Vec<StudentListItem>, AppError> {
        let year = year_filter(year);
        let profiles = tables::load_display_profiles(store, department).await?;

        let mut students: Vec<StudentListItem> = profiles
            .into_iter()
            .filter(|p| !p.identifier.is_empty())
            .filter(|p| year.is_none_or(|y| p.year == y))
            .map(|p| {
                let photo_url = p
                    .photo_key()
                    .and_then(|key| storage.get_url(key).ok())
                    .unwrap_or_default();
                StudentListItem {
                    identifier: p.identifier,
                    name: p.name,
                    address: p.address,
                    student_phone: p.student_phone,
                    guardian_phone: p.guardian_phone,
                    photo_url,
                    year: p.year,
                }
            })
            .collect();

        students.sort_by_key(|s| s.name.to_lowercase());
        Ok(students)
    }

    /// Years present in a department, newest first. Unknown departments
    /// have no years.
    #[instrument(skip(store))]
    pub async fn available_years(
        store: &dyn TabularStore,
        department: &str,
    ) -> Result<Vec<String>, AppError> {
        let rows = match store.get_rows(department).await {
            Ok(rows) => rows,
            Err(StoreError::SheetNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let profiles: Vec<StudentProfile> =
            rows.iter().map(|row| StudentProfile::from_row(row)).collect();
        Ok(tables::distinct_years(profiles.iter().map(|p| p.year.as_str())))
    }
}

async fn write_text_fields(
    store: &dyn TabularStore,
    department: &str,
    row: usize,
    fields: &TextFields,
) -> Result<(), AppError> {
    store
        .write_cell(department, row, col::NAME, &marked(&fields.name))
        .await?;
    store
        .write_cell(department, row, col::ADDRESS, &marked(&fields.address))
        .await?;
    store
        .write_cell(department, row, col::STUDENT_PHONE, &marked(&fields.student_phone))
        .await?;
    store
        .write_cell(department, row, col::GUARDIAN_PHONE, &marked(&fields.guardian_phone))
        .await?;
    Ok(())
}

async fn write_photo(
    store: &dyn TabularStore,
    department: &str,
    row: usize,
    photo_id: &str,
    preview: &str,
) -> Result<(), AppError> {
    store
        .write_cell(department, row, col::PHOTO_ID, &marked(photo_id))
        .await?;
    store
        .write_cell(department, row, col::PHOTO_PREVIEW, preview)
        .await?;
    Ok(())
}

/// Delete the file a profile pointed at before `new_key` replaced it.
///
/// The row already references the new photo, so a failure here only leaves
/// an orphaned file behind.
async fn remove_replaced_photo(
    storage: &dyn FileStorage,
    previous: &StudentProfile,
    new_key: &str,
) {
    let Some(old_key) = previous.photo_key() else {
        return;
    };
    if old_key == new_key {
        return;
    }
    if let Err(e) = storage.delete(old_key).await {
        tracing::warn!(key = %old_key, error = %e, "Could not remove replaced photo");
    }
}

/// Photo id and the preview formula pointing at its public URL.
fn photo_cells(storage: &dyn FileStorage, key: &str) -> Result<(String, String), AppError> {
    let url = storage.get_url(key).map_err(storage_error)?;
    Ok((key.to_string(), image_formula(&url)))
}

/// Split `data:<mime>;base64,<payload>` into its MIME type and payload.
fn split_data_url(data: &str) -> (Option<&str>, &str) {
    match data.split_once("base64,") {
        Some((head, payload)) => {
            let mime = head
                .strip_prefix("data:")
                .map(|h| h.trim_end_matches(';'))
                .filter(|m| !m.is_empty());
            (mime, payload)
        }
        None => (None, data),
    }
}

fn extension(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/jpeg" | "image/jpg" => "jpg",
        _ => "img",
    }
}

/// Identifier reduced to characters valid in a storage key.
fn key_segment(identifier: &str) -> String {
    let segment: String = identifier
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if segment.is_empty() {
        "student".to_string()
    } else {
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_data_url() {
        assert_eq!(
            split_data_url("data:image/png;base64,AAAA"),
            (Some("image/png"), "AAAA")
        );
        assert_eq!(split_data_url("AAAA"), (None, "AAAA"));
    }

    #[test]
    fn test_key_segment_strips_unsafe_chars() {
        assert_eq!(key_segment("00123"), "00123");
        assert_eq!(key_segment("a/../b c"), "ab");
        assert_eq!(key_segment("../"), "student");
    }

    #[test]
    fn test_text_fields_normalization() {
        let fields = TextFields::normalize(
            Some(" budi SANTOSO "),
            Some("jl. mawar no. 5"),
            Some(" 0812 "),
            None,
        );
        assert_eq!(fields.name, "Budi Santoso");
        assert_eq!(fields.address, "JL. MAWAR NO. 5");
        assert_eq!(fields.student_phone, "0812");
        assert_eq!(fields.guardian_phone, "");
    }
}

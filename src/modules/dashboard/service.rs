use std::collections::BTreeMap;

use anyhow::anyhow;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Image, Workbook, XlsxError};
use sipkl_core::errors::AppError;
use sipkl_core::file_storage::{FileStorage, XLSX_MIME};
use sipkl_core::password::is_default_password;
use sipkl_models::accounts::{AccountSummary, Department, Role};
use sipkl_models::requests::year_filter;
use sipkl_models::students::StudentProfile;
use sipkl_sheets::TabularStore;
use tracing::instrument;

use crate::modules::dashboard::model::{
    DashboardData, DashboardUser, EXPORT_HEADER, ExportResult, StatsResponse,
};
use crate::tables::{self, storage_error};

pub struct DashboardService;

impl DashboardService {
    /// Session bootstrap: who is logged in and whether they still use the
    /// default password.
    #[instrument(skip(store), fields(identifier = %actor.identifier))]
    pub async fn dashboard_data(
        store: &dyn TabularStore,
        actor: &AccountSummary,
    ) -> Result<DashboardData, AppError> {
        let is_default = tables::locate_account(store, &actor.identifier)
            .await?
            .is_some_and(|a| is_default_password(&a.record.password_hash));

        let department = actor.department.as_str();
        let year = if actor.role == Role::Student && tables::is_department(store, department).await? {
            tables::locate_profile(store, department, &actor.identifier)
                .await?
                .map(|p| p.record.year)
                .unwrap_or_default()
        } else {
            String::new()
        };

        Ok(DashboardData {
            user: DashboardUser {
                identifier: actor.identifier.clone(),
                name: actor.name.clone(),
                role: actor.role,
                department: actor.department.clone(),
                year,
                is_default_password: is_default,
            },
            is_admin: actor.is_admin(),
        })
    }

    /// Student count per department sheet.
    ///
    /// A department admin gets zero for every department but their own.
    #[instrument(skip(store))]
    pub async fn stats(
        store: &dyn TabularStore,
        year: Option<&str>,
        scope: &Department,
    ) -> Result<StatsResponse, AppError> {
        let year = year_filter(year);
        let mut stats = BTreeMap::new();
        let mut total = 0;

        for department in tables::department_sheets(store).await? {
            if !scope.is_all() && department != scope.as_str() {
                stats.insert(department, 0);
                continue;
            }

            let count = tables::load_profiles(store, &department)
                .await?
                .iter()
                .filter(|p| !p.identifier.is_empty())
                .filter(|p| year.is_none_or(|y| p.year == y))
                .count();
            total += count;
            stats.insert(department, count);
        }

        Ok(StatsResponse { stats, total })
    }

    /// Years across every department, newest first.
    #[instrument(skip(store))]
    pub async fn dashboard_years(store: &dyn TabularStore) -> Result<Vec<String>, AppError> {
        let mut years = Vec::new();
        for department in tables::department_sheets(store).await? {
            years.extend(
                tables::load_profiles(store, &department)
                    .await?
                    .into_iter()
                    .map(|p| p.year),
            );
        }
        Ok(tables::distinct_years(years.iter().map(String::as_str)))
    }

    /// Write a department report as an `.xlsx` file and return its URL.
    #[instrument(skip(store, storage))]
    pub async fn export_department(
        store: &dyn TabularStore,
        storage: &dyn FileStorage,
        department: &str,
        year: Option<&str>,
    ) -> Result<ExportResult, AppError> {
        let year = year_filter(year);
        let mut profiles: Vec<StudentProfile> = tables::load_display_profiles(store, department)
            .await?
            .into_iter()
            .filter(|p| !p.identifier.is_empty())
            .filter(|p| year.is_none_or(|y| p.year == y))
            .collect();

        if profiles.is_empty() {
            return Err(AppError::bad_request(anyhow!(
                "No data available to export."
            )));
        }
        profiles.sort_by_key(|p| p.name.to_lowercase());

        let mut rows = Vec::with_capacity(profiles.len());
        for p in &profiles {
            let (photo, photo_url) = match p.photo_key() {
                Some(key) => (
                    read_photo(storage, key).await,
                    storage.get_url(key).unwrap_or_default(),
                ),
                None => (None, String::new()),
            };
            rows.push(ReportRow {
                identifier: p.identifier.clone(),
                name: p.name.clone(),
                student_phone: report_phone(&p.student_phone),
                guardian_phone: report_phone(&p.guardian_phone),
                address: p.address.clone(),
                photo,
                photo_url,
            });
        }

        let bytes = build_report(&rows)?;

        let file_name = report_file_name(department, year);
        let key = format!("exports/{}", file_name);
        let key = storage
            .save(&key, &bytes, XLSX_MIME)
            .await
            .map_err(storage_error)?;
        let url = storage.get_url(&key).map_err(storage_error)?;

        tracing::info!(department, rows = rows.len(), key = %key, "Report exported");
        Ok(ExportResult {
            url,
            file_name,
            rows: rows.len(),
        })
    }
}

struct ReportRow {
    identifier: String,
    name: String,
    student_phone: String,
    guardian_phone: String,
    address: String,
    /// Image bytes to embed; `photo_url` is written instead when absent.
    photo: Option<Vec<u8>>,
    photo_url: String,
}

/// Photo cell size in pixels, a 3x4 portrait.
const PHOTO_WIDTH: u32 = 120;
const PHOTO_HEIGHT: u32 = 160;
const PHOTO_ROW_HEIGHT: u16 = 170;

/// Stored photo bytes, or `None` if the file cannot be read.
async fn read_photo(storage: &dyn FileStorage, key: &str) -> Option<Vec<u8>> {
    match storage.read(key).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(key, error = %e, "Photo not readable, exporting its URL instead");
            None
        }
    }
}

fn build_report(rows: &[ReportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Report")?;

    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xE0E0E0))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let cell = Format::new().set_border(FormatBorder::Thin);
    let centered = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let wrapped = Format::new().set_border(FormatBorder::Thin).set_text_wrap();

    for (col, title) in EXPORT_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_number_with_format(r, 0, (i + 1) as f64, &centered)?;
        worksheet.write_string_with_format(r, 1, &row.identifier, &centered)?;
        worksheet.write_string_with_format(r, 2, &row.name, &cell)?;
        worksheet.write_string_with_format(r, 3, &row.student_phone, &centered)?;
        worksheet.write_string_with_format(r, 4, &row.guardian_phone, &centered)?;
        worksheet.write_string_with_format(r, 5, &row.address, &wrapped)?;

        let image = row
            .photo
            .as_deref()
            .and_then(|bytes| match Image::new_from_buffer(bytes) {
                Ok(image) => Some(image),
                Err(e) => {
                    tracing::warn!(error = %e, "Photo is not a supported image");
                    None
                }
            });
        match image {
            Some(mut image) => {
                image.set_scale_to_size(PHOTO_WIDTH, PHOTO_HEIGHT, true);
                worksheet.set_row_height_pixels(r, PHOTO_ROW_HEIGHT)?;
                worksheet.write_blank(r, 6, &cell)?;
                worksheet.insert_image_with_offset(r, 6, &image, 10, 5)?;
            }
            None => {
                worksheet.write_string_with_format(r, 6, &row.photo_url, &cell)?;
            }
        }
    }

    for (col, width) in [40, 110, 200, 110, 110, 250, 140].into_iter().enumerate() {
        worksheet.set_column_width_pixels(col as u16, width)?;
    }

    workbook.save_to_buffer()
}

/// Drop text markers and restore a leading zero lost to numeric conversion.
fn report_phone(raw: &str) -> String {
    let phone = raw.replace('\'', "").trim().to_string();
    if phone.len() > 5 && !phone.starts_with('0') && !phone.starts_with('+') {
        format!("0{}", phone)
    } else {
        phone
    }
}

fn report_file_name(department: &str, year: Option<&str>) -> String {
    let safe = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect()
    };
    let mut name = format!("report-{}", safe(department));
    if let Some(year) = year {
        name.push('-');
        name.push_str(&safe(year));
    }
    name.push_str(&chrono::Local::now().format("-%Y%m%d-%H%M%S").to_string());
    name.push_str(".xlsx");
    name
}

//! Row lookups shared by the services.
//!
//! Every helper re-reads the sheet it needs; nothing is cached between
//! calls. Positions returned here are data-row indices valid until the next
//! write to the same sheet.

use std::collections::BTreeSet;

use anyhow::anyhow;
use chrono::Datelike;
use sipkl_core::errors::AppError;
use sipkl_core::file_storage::StorageError;
use sipkl_models::accounts::Account;
use sipkl_models::schema::{self, ACCOUNTS_SHEET, normalize_identifier};
use sipkl_models::students::StudentProfile;
use sipkl_sheets::{StoreError, TabularStore};

/// A decoded record and the data row it was read from.
#[derive(Debug, Clone)]
pub struct Located<T> {
    pub row: usize,
    pub record: T,
}

/// All accounts in sheet order. A missing accounts sheet reads as empty.
pub async fn load_accounts(store: &dyn TabularStore) -> Result<Vec<Account>, AppError> {
    match store.get_rows(ACCOUNTS_SHEET).await {
        Ok(rows) => Ok(rows.iter().map(|row| Account::from_row(row)).collect()),
        Err(StoreError::SheetNotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

pub fn find_account(accounts: Vec<Account>, identifier: &str) -> Option<Located<Account>> {
    let target = normalize_identifier(identifier);
    if target.is_empty() {
        return None;
    }
    accounts
        .into_iter()
        .enumerate()
        .find(|(_, a)| a.identifier == target)
        .map(|(row, record)| Located { row, record })
}

pub async fn locate_account(
    store: &dyn TabularStore,
    identifier: &str,
) -> Result<Option<Located<Account>>, AppError> {
    Ok(find_account(load_accounts(store).await?, identifier))
}

/// Create the accounts sheet with its header if it does not exist yet.
pub async fn ensure_accounts_sheet(store: &dyn TabularStore) -> Result<(), AppError> {
    if !store.has_sheet(ACCOUNTS_SHEET).await? {
        store
            .create_sheet(ACCOUNTS_SHEET, schema::header(&schema::accounts::HEADER))
            .await?;
        tracing::info!("Created accounts sheet");
    }
    Ok(())
}

/// Every profile of a department, failing if the sheet does not exist.
pub async fn load_profiles(
    store: &dyn TabularStore,
    department: &str,
) -> Result<Vec<StudentProfile>, AppError> {
    let rows = store
        .get_rows(department)
        .await
        .map_err(|e| department_error(e, department))?;
    Ok(rows.iter().map(|row| StudentProfile::from_row(row)).collect())
}

/// Profiles decoded from the rendered grid; formulas read as empty text.
pub async fn load_display_profiles(
    store: &dyn TabularStore,
    department: &str,
) -> Result<Vec<StudentProfile>, AppError> {
    let rows = store
        .get_display_rows(department)
        .await
        .map_err(|e| department_error(e, department))?;
    Ok(rows.iter().map(|row| StudentProfile::from_row(row)).collect())
}

pub fn find_profile(
    profiles: Vec<StudentProfile>,
    identifier: &str,
) -> Option<Located<StudentProfile>> {
    let target = normalize_identifier(identifier);
    if target.is_empty() {
        return None;
    }
    profiles
        .into_iter()
        .enumerate()
        .find(|(_, p)| p.identifier == target)
        .map(|(row, record)| Located { row, record })
}

pub async fn locate_profile(
    store: &dyn TabularStore,
    department: &str,
    identifier: &str,
) -> Result<Option<Located<StudentProfile>>, AppError> {
    Ok(find_profile(load_profiles(store, department).await?, identifier))
}

/// Fail with a validation error unless `department` names a profile sheet.
pub async fn require_department(store: &dyn TabularStore, department: &str) -> Result<(), AppError> {
    if is_department(store, department).await? {
        Ok(())
    } else {
        Err(AppError::bad_request(anyhow!(
            "Department '{}' not found",
            department
        )))
    }
}

pub async fn is_department(store: &dyn TabularStore, department: &str) -> Result<bool, AppError> {
    if department.is_empty() || department == ACCOUNTS_SHEET {
        return Ok(false);
    }
    Ok(store.has_sheet(department).await?)
}

/// Profile sheets in creation order: every sheet except the accounts sheet.
pub async fn department_sheets(store: &dyn TabularStore) -> Result<Vec<String>, AppError> {
    Ok(store
        .sheet_names()
        .await?
        .into_iter()
        .filter(|name| name != ACCOUNTS_SHEET)
        .collect())
}

/// Distinct non-blank years, newest first.
pub fn distinct_years<'a>(years: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let set: BTreeSet<&str> = years
        .into_iter()
        .map(str::trim)
        .filter(|y| !y.is_empty())
        .collect();
    set.into_iter().rev().map(str::to_string).collect()
}

pub fn current_year() -> String {
    chrono::Local::now().year().to_string()
}

/// Storage rejections caused by the upload itself are the caller's fault.
pub fn storage_error(e: StorageError) -> AppError {
    match e {
        StorageError::IoError(_) => AppError::internal(e),
        _ => AppError::bad_request(e),
    }
}

fn department_error(e: StoreError, department: &str) -> AppError {
    match e {
        StoreError::SheetNotFound(_) => {
            AppError::not_found(anyhow!("Department '{}' not found", department))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sipkl_models::accounts::{Department, Role};

    fn account(identifier: &str) -> Account {
        Account {
            identifier: identifier.to_string(),
            password_hash: String::new(),
            role: Role::Student,
            department: Department::new("tjkt"),
            name: String::new(),
            token: String::new(),
        }
    }

    #[test]
    fn test_find_account_normalizes_query() {
        let accounts = vec![account("admin"), account("00123")];
        let found = find_account(accounts, " '00123 ").unwrap();
        assert_eq!(found.row, 1);
        assert_eq!(found.record.identifier, "00123");
    }

    #[test]
    fn test_distinct_years_newest_first() {
        let years = distinct_years(["2024", "2025", "", " 2024", "2023"]);
        assert_eq!(years, vec!["2025", "2024", "2023"]);
    }

    #[test]
    fn test_blank_identifier_never_matches() {
        assert!(find_account(vec![account("")], "  ").is_none());
    }
}

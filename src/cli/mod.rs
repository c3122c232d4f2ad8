//! Workbook setup and maintenance used by `sipkl-cli`.

use anyhow::anyhow;
use sipkl_core::errors::AppError;
use sipkl_core::password::{DEFAULT_PASSWORD, hash_password};
use sipkl_core::text::{title_case, upper_case};
use sipkl_models::accounts::{Account, Department, Role};
use sipkl_models::schema::{self, ACCOUNTS_SHEET, marked, profiles as col};
use sipkl_models::students::StudentProfile;
use sipkl_sheets::{CellValue, TabularStore};

use crate::tables;

/// Identifier, department and display name of the admins `setup-accounts`
/// creates.
pub const DEFAULT_ADMINS: [(&str, &str, &str); 6] = [
    ("admin", Department::ALL, "Super Admin"),
    ("admin_tjkt", "tjkt", "Admin TJKT"),
    ("admin_perhotelan", "perhotelan", "Admin Perhotelan"),
    ("admin_boga", "tata_boga", "Admin Tata Boga"),
    ("admin_busana", "tata_busana", "Admin Tata Busana"),
    ("admin_kecantikan", "tata_kecantikan", "Admin Tata Kecantikan"),
];

#[derive(Debug, Default)]
pub struct SetupReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Create the accounts sheet and the default admins, leaving existing
/// identifiers untouched.
pub async fn setup_accounts(store: &dyn TabularStore) -> Result<SetupReport, AppError> {
    tables::ensure_accounts_sheet(store).await?;

    let mut report = SetupReport::default();
    for (identifier, department, name) in DEFAULT_ADMINS {
        if create_admin(store, identifier, department, name, DEFAULT_PASSWORD).await? {
            report.created.push(identifier.to_string());
        } else {
            report.skipped.push(identifier.to_string());
        }
    }
    Ok(report)
}

/// Append one admin account. Returns `false` if the identifier is taken.
pub async fn create_admin(
    store: &dyn TabularStore,
    identifier: &str,
    department: &str,
    name: &str,
    password: &str,
) -> Result<bool, AppError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(AppError::bad_request(anyhow!("Identifier is required")));
    }

    tables::ensure_accounts_sheet(store).await?;
    if tables::locate_account(store, identifier).await?.is_some() {
        return Ok(false);
    }

    let account = Account {
        identifier: identifier.to_string(),
        password_hash: hash_password(password),
        role: Role::Admin,
        department: Department::new(department),
        name: name.to_string(),
        token: String::new(),
    };
    store.append_row(ACCOUNTS_SHEET, account.to_row()).await?;
    tracing::info!(identifier, department, "Admin account created");
    Ok(true)
}

/// Add an empty profile sheet for a new department.
pub async fn create_department(store: &dyn TabularStore, code: &str) -> Result<(), AppError> {
    let code = code.trim();
    if code.is_empty() || code == ACCOUNTS_SHEET || code == Department::ALL {
        return Err(AppError::bad_request(anyhow!(
            "'{}' cannot be used as a department code",
            code
        )));
    }
    if store.has_sheet(code).await? {
        return Err(AppError::bad_request(anyhow!(
            "Department '{}' already exists",
            code
        )));
    }

    store
        .create_sheet(code, schema::header(&schema::profiles::HEADER))
        .await?;
    tracing::info!(department = code, "Department sheet created");
    Ok(())
}

/// Re-apply name and address normalization to every profile row.
///
/// Returns the number of cells rewritten.
pub async fn fix_formats(store: &dyn TabularStore) -> Result<usize, AppError> {
    let mut rewritten = 0;

    for department in tables::department_sheets(store).await? {
        let rows = store.get_rows(&department).await?;
        for (row, cells) in rows.iter().enumerate() {
            let profile = StudentProfile::from_row(cells);
            if profile.identifier.is_empty() {
                continue;
            }

            let fixes = [
                (col::NAME, &profile.name, title_case(profile.name.trim())),
                (col::ADDRESS, &profile.address, upper_case(profile.address.trim())),
            ];
            for (column, current, fixed) in fixes {
                if fixed != *current || !stored_as_text(cells.get(column)) {
                    store
                        .write_cell(&department, row, column, &marked(&fixed))
                        .await?;
                    rewritten += 1;
                }
            }
        }
    }

    tracing::info!(rewritten, "Profile formats fixed");
    Ok(rewritten)
}

/// Numbers and formulas in free-text columns come from writes that skipped
/// the text marker.
fn stored_as_text(cell: Option<&CellValue>) -> bool {
    matches!(cell, None | Some(CellValue::Empty) | Some(CellValue::Text(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sipkl_sheets::WorkbookStore;

    #[tokio::test]
    async fn test_setup_accounts_is_repeatable() {
        let store = WorkbookStore::in_memory();

        let first = setup_accounts(&store).await.unwrap();
        assert_eq!(first.created.len(), DEFAULT_ADMINS.len());
        assert!(first.skipped.is_empty());

        let second = setup_accounts(&store).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped.len(), DEFAULT_ADMINS.len());

        let accounts = tables::load_accounts(&store).await.unwrap();
        assert_eq!(accounts.len(), DEFAULT_ADMINS.len());
        assert!(accounts.iter().all(|a| a.role == Role::Admin));
        assert!(accounts[0].department.is_all());
    }

    #[tokio::test]
    async fn test_create_department_rejects_duplicates_and_reserved_names() {
        let store = WorkbookStore::in_memory();
        create_department(&store, "tjkt").await.unwrap();

        assert!(create_department(&store, "tjkt").await.is_err());
        assert!(create_department(&store, "users").await.is_err());
        assert!(create_department(&store, " ").await.is_err());
    }

    #[tokio::test]
    async fn test_fix_formats_normalizes_names_and_addresses() {
        let store = WorkbookStore::in_memory();
        create_department(&store, "tjkt").await.unwrap();
        store
            .append_row(
                "tjkt",
                vec![
                    "'00123".to_string(),
                    "budi santoso".to_string(),
                    "jl. mawar 3".to_string(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(fix_formats(&store).await.unwrap(), 2);
        assert_eq!(fix_formats(&store).await.unwrap(), 0);

        let profiles = tables::load_profiles(&store, "tjkt").await.unwrap();
        assert_eq!(profiles[0].name, "Budi Santoso");
        assert_eq!(profiles[0].address, "JL. MAWAR 3");
    }

    #[tokio::test]
    async fn test_fix_formats_turns_numbers_and_formulas_into_text() {
        let store = WorkbookStore::in_memory();
        create_department(&store, "tjkt").await.unwrap();
        store
            .append_row(
                "tjkt",
                vec![
                    "'00124".to_string(),
                    "=HYPERLINK(\"x\")".to_string(),
                    "0012".to_string(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(fix_formats(&store).await.unwrap(), 2);

        let rows = store.get_rows("tjkt").await.unwrap();
        assert_eq!(rows[0][col::NAME], CellValue::Text("=Hyperlink(\"X\")".to_string()));
        assert_eq!(rows[0][col::ADDRESS], CellValue::Text("12".to_string()));
        assert_eq!(fix_formats(&store).await.unwrap(), 0);
    }
}

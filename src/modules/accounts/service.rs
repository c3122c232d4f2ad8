use std::fmt::Display;
use std::time::Duration;

use anyhow::anyhow;
use sipkl_core::errors::AppError;
use sipkl_core::password::{DEFAULT_PASSWORD, hash_password};
use sipkl_models::accounts::{Account, AccountSummary, Department};
use sipkl_models::schema::{ACCOUNTS_SHEET, accounts as col, marked};
use sipkl_models::students::StudentProfile;
use sipkl_sheets::{ScriptLock, TabularStore};
use tracing::instrument;

use crate::modules::accounts::model::{CredentialsUpdate, DeleteOutcome, TransferOutcome};
use crate::modules::auth::model::RegisterRequest;
use crate::modules::auth::service::AuthService;
use crate::tables::{self, Located, current_year};

pub struct AccountService;

impl AccountService {
    /// Admin-initiated enrollment into `department`.
    ///
    /// Unlike self sign-up, a missing department sheet does not stop the
    /// login account from being created; the result is a partial failure.
    #[instrument(skip(store, lock, form), fields(identifier = %form.identifier))]
    pub async fn create_account(
        store: &dyn TabularStore,
        lock: &ScriptLock,
        timeout: Duration,
        form: RegisterRequest,
        department: &str,
    ) -> Result<String, AppError> {
        let _guard = lock.acquire(timeout).await?;
        AuthService::enroll(store, &form, department).await?;

        tracing::info!(department, "Account created by admin");
        Ok("Account created.".to_string())
    }

    /// Accounts visible to `scope`, newest first.
    #[instrument(skip(store))]
    pub async fn list_accounts(
        store: &dyn TabularStore,
        scope: &Department,
    ) -> Result<Vec<AccountSummary>, AppError> {
        let accounts = tables::load_accounts(store).await?;
        Ok(accounts
            .iter()
            .rev()
            .filter(|a| !a.identifier.is_empty())
            .filter(|a| scope.is_all() || a.department == *scope)
            .map(Account::summary)
            .collect())
    }

    #[instrument(skip(store, lock))]
    pub async fn reset_password(
        store: &dyn TabularStore,
        lock: &ScriptLock,
        timeout: Duration,
        identifier: &str,
        scope: &Department,
    ) -> Result<String, AppError> {
        let _guard = lock.acquire(timeout).await?;
        let Located { row, record } = Self::require_account(store, identifier).await?;
        ensure_in_scope(scope, &record)?;

        store
            .write_cell(
                ACCOUNTS_SHEET,
                row,
                col::PASSWORD_HASH,
                &marked(&hash_password(DEFAULT_PASSWORD)),
            )
            .await?;

        tracing::info!(identifier = %record.identifier, "Password reset to default");
        Ok(format!("Password reset to {}", DEFAULT_PASSWORD))
    }

    /// Remove a student's profile row and login row.
    ///
    /// Each half is attempted independently; only when neither exists is the
    /// call an error. If the profile row is gone but the login row cannot be
    /// removed, the result is a partial failure.
    #[instrument(skip(store, lock))]
    pub async fn delete_account(
        store: &dyn TabularStore,
        lock: &ScriptLock,
        timeout: Duration,
        identifier: &str,
        department: Option<&str>,
        scope: &Department,
    ) -> Result<DeleteOutcome, AppError> {
        let _guard = lock.acquire(timeout).await?;
        let account = tables::locate_account(store, identifier).await?;
        if let Some(found) = &account {
            ensure_in_scope(scope, &found.record)?;
        }

        let department = department
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .or_else(|| {
                account
                    .as_ref()
                    .map(|a| a.record.department.clone())
                    .filter(|d| !d.is_all())
                    .map(|d| d.as_str().to_string())
            });

        let mut profile_deleted = false;
        if let Some(department) = department.as_deref() {
            if tables::is_department(store, department).await? {
                if let Some(profile) = tables::locate_profile(store, department, identifier).await? {
                    store.delete_row(department, profile.row).await?;
                    profile_deleted = true;
                }
            }
        }

        let account_deleted = match account {
            Some(found) => {
                if let Err(e) = store.delete_row(ACCOUNTS_SHEET, found.row).await {
                    if !profile_deleted {
                        return Err(e.into());
                    }
                    tracing::error!(error = %e, "Account delete failed after profile delete");
                    return Err(AppError::partial(format!(
                        "The profile row was deleted, but the login account could not be removed: {}",
                        e
                    )));
                }
                true
            }
            None => false,
        };

        let outcome = match (account_deleted, profile_deleted) {
            (true, true) => DeleteOutcome::Both,
            (true, false) => DeleteOutcome::AccountOnly,
            (false, true) => DeleteOutcome::ProfileOnly,
            (false, false) => {
                return Err(AppError::not_found(anyhow!("Student not found")));
            }
        };

        tracing::info!(?outcome, "Student deleted");
        Ok(outcome)
    }

    /// Move a student to another department.
    ///
    /// The new sheet is checked before anything is written. The profile row
    /// is copied to the new sheet and then removed from the old one; if the
    /// old sheet has no row for the student, a minimal one is created from
    /// the account instead. A failure after the account was updated is a
    /// partial failure naming the step that did not happen.
    #[instrument(skip(store, lock))]
    pub async fn transfer_department(
        store: &dyn TabularStore,
        lock: &ScriptLock,
        timeout: Duration,
        identifier: &str,
        old_department: Option<&str>,
        new_department: &str,
    ) -> Result<TransferOutcome, AppError> {
        let new_department = new_department.trim();
        let _guard = lock.acquire(timeout).await?;
        tables::require_department(store, new_department).await?;

        let Located { row, record } = Self::require_account(store, identifier).await?;
        let old_department = old_department
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| record.department.as_str().to_string());

        store
            .write_cell(ACCOUNTS_SHEET, row, col::DEPARTMENT, new_department)
            .await?;

        if old_department == new_department {
            return Ok(TransferOutcome::Unchanged);
        }

        let existing = if tables::is_department(store, &old_department)
            .await
            .map_err(|e| profile_not_moved(e.message()))?
        {
            tables::locate_profile(store, &old_department, &record.identifier)
                .await
                .map_err(|e| profile_not_moved(e.message()))?
        } else {
            None
        };

        let outcome = match existing {
            Some(profile) => {
                store
                    .append_row(new_department, profile.record.to_row())
                    .await
                    .map_err(profile_not_moved)?;
                if let Err(e) = store.delete_row(&old_department, profile.row).await {
                    tracing::error!(error = %e, "Old profile row left behind after copy");
                    return Err(AppError::partial(format!(
                        "The profile was copied to {}, but the old row in {} could not be removed: {}",
                        new_department, old_department, e
                    )));
                }
                TransferOutcome::Moved
            }
            None => {
                tracing::warn!(
                    old = %old_department,
                    "No profile row in old department, recreating it"
                );
                let profile =
                    StudentProfile::enrollment(&record.identifier, &record.name, &current_year());
                store
                    .append_row(new_department, profile.to_row())
                    .await
                    .map_err(profile_not_moved)?;
                TransferOutcome::Recreated
            }
        };

        tracing::info!(?outcome, old = %old_department, new = %new_department, "Department transferred");
        Ok(outcome)
    }

    /// Replace the caller's own password.
    #[instrument(skip(store, lock, new_password), fields(identifier = %actor.identifier))]
    pub async fn change_password(
        store: &dyn TabularStore,
        lock: &ScriptLock,
        timeout: Duration,
        actor: &AccountSummary,
        new_password: &str,
    ) -> Result<String, AppError> {
        let _guard = lock.acquire(timeout).await?;
        let Located { row, .. } = Self::require_account(store, &actor.identifier).await?;
        store
            .write_cell(
                ACCOUNTS_SHEET,
                row,
                col::PASSWORD_HASH,
                &marked(&hash_password(new_password)),
            )
            .await?;
        Ok("Password changed.".to_string())
    }

    /// Change the caller's own login name and/or password.
    ///
    /// Runs under the write lock so two admins cannot claim the same new
    /// identifier at once.
    #[instrument(skip(store, lock, update), fields(identifier = %actor.identifier))]
    pub async fn update_own_credentials(
        store: &dyn TabularStore,
        lock: &ScriptLock,
        timeout: Duration,
        actor: &AccountSummary,
        update: CredentialsUpdate,
    ) -> Result<String, AppError> {
        let new_identifier = update
            .new_identifier
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        let new_password = update.new_password.as_deref().filter(|p| !p.is_empty());

        if new_identifier.is_none() && new_password.is_none() {
            return Err(AppError::bad_request(anyhow!("Nothing to update")));
        }

        let _guard = lock.acquire(timeout).await?;
        let accounts = tables::load_accounts(store).await?;

        if let Some(id) = new_identifier.filter(|id| *id != actor.identifier) {
            if accounts.iter().any(|a| a.identifier == id) {
                return Err(AppError::bad_request(anyhow!(
                    "Identifier \"{}\" is already taken",
                    id
                )));
            }
        }

        let Some(Located { row, .. }) = tables::find_account(accounts, &actor.identifier) else {
            return Err(AppError::not_found(anyhow!("Admin account not found")));
        };

        if let Some(id) = new_identifier {
            store
                .write_cell(ACCOUNTS_SHEET, row, col::IDENTIFIER, &marked(id))
                .await?;
        }
        if let Some(password) = new_password {
            store
                .write_cell(
                    ACCOUNTS_SHEET,
                    row,
                    col::PASSWORD_HASH,
                    &marked(&hash_password(password)),
                )
                .await?;
        }

        tracing::info!(renamed = new_identifier.is_some(), "Admin credentials updated");
        Ok("Credentials updated. Please log in again with the new details.".to_string())
    }

    async fn require_account(
        store: &dyn TabularStore,
        identifier: &str,
    ) -> Result<Located<Account>, AppError> {
        tables::locate_account(store, identifier)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Account not found")))
    }
}

/// Department admins may only act on accounts of their own department.
fn ensure_in_scope(scope: &Department, account: &Account) -> Result<(), AppError> {
    if scope.is_all() || account.department == *scope {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Access to another department's students is not allowed",
        ))
    }
}

/// The account already points at the new department; the profile does not.
fn profile_not_moved(reason: impl Display) -> AppError {
    tracing::error!(error = %reason, "Profile move failed after account update");
    AppError::partial(format!(
        "Department updated on the login account, but the profile row could not be moved: {}",
        reason
    ))
}

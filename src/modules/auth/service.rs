use std::time::Duration;

use anyhow::anyhow;
use sipkl_core::errors::AppError;
use sipkl_core::password::{generate_token, hash_password};
use sipkl_core::text::title_case;
use sipkl_models::accounts::{Account, AccountSummary, Department, Role};
use sipkl_models::schema::{ACCOUNTS_SHEET, accounts as col, marked};
use sipkl_models::students::StudentProfile;
use sipkl_sheets::{ScriptLock, TabularStore};
use tracing::instrument;

use crate::modules::auth::model::{INVALID_CREDENTIALS, LoginResponse, RegisterRequest};
use crate::tables::{self, current_year};

pub struct AuthService;

impl AuthService {
    /// Check credentials and start a new session.
    ///
    /// The fresh token replaces whatever token the account held, so any
    /// earlier session of the same account stops validating. The token is
    /// written by row position, so the lookup and the write run under the
    /// write lock.
    #[instrument(skip(store, lock, password))]
    pub async fn login(
        store: &dyn TabularStore,
        lock: &ScriptLock,
        timeout: Duration,
        identifier: &str,
        password: &str,
    ) -> Result<LoginResponse, AppError> {
        let target = identifier.trim();
        let hash = hash_password(password);

        let _guard = lock.acquire(timeout).await?;
        let accounts = tables::load_accounts(store).await?;
        let Some((row, account)) = accounts
            .into_iter()
            .enumerate()
            .find(|(_, a)| !target.is_empty() && a.identifier == target && a.password_hash == hash)
        else {
            tracing::info!("Login rejected");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        let token = generate_token();
        store
            .write_cell(ACCOUNTS_SHEET, row, col::TOKEN, &marked(&token))
            .await?;

        tracing::info!(role = %account.role, department = %account.department, "Login succeeded");

        Ok(LoginResponse {
            session_token: token,
            role: account.role,
            department: account.department,
        })
    }

    /// Resolve a session token to its account.
    ///
    /// Blank tokens and tokens no account currently holds yield `None`.
    #[instrument(skip_all)]
    pub async fn validate_token(
        store: &dyn TabularStore,
        token: Option<&str>,
    ) -> Result<Option<AccountSummary>, AppError> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let accounts = tables::load_accounts(store).await?;
        Ok(accounts
            .iter()
            .find(|a| a.token == token)
            .map(Account::summary))
    }

    /// Public sign-up of a student into an existing department.
    #[instrument(skip(store, lock, form), fields(identifier = %form.identifier))]
    pub async fn register(
        store: &dyn TabularStore,
        lock: &ScriptLock,
        timeout: Duration,
        form: RegisterRequest,
    ) -> Result<String, AppError> {
        let department = form
            .department
            .clone()
            .ok_or_else(|| AppError::bad_request(anyhow!("Department is required")))?;

        let _guard = lock.acquire(timeout).await?;

        tables::require_department(store, &department).await?;
        Self::enroll(store, &form, &department).await?;

        tracing::info!(department = %department, "Student registered");
        Ok("Registration successful. Please log in.".to_string())
    }

    /// Append the login row and then the profile row of a new student.
    ///
    /// The caller must hold the write lock. The two appends are not atomic:
    /// if the profile cannot be written, the account stays and the outcome
    /// is a partial failure.
    pub(crate) async fn enroll(
        store: &dyn TabularStore,
        form: &RegisterRequest,
        department: &str,
    ) -> Result<(), AppError> {
        let identifier = form.identifier.trim();
        if identifier.is_empty() {
            return Err(AppError::bad_request(anyhow!("Identifier is required")));
        }

        tables::ensure_accounts_sheet(store).await?;
        if tables::locate_account(store, identifier).await?.is_some() {
            return Err(AppError::bad_request(anyhow!(
                "Identifier {} is already registered. Please log in.",
                identifier
            )));
        }

        let name = title_case(form.name.trim());
        let account = Account {
            identifier: identifier.to_string(),
            password_hash: hash_password(&form.password),
            role: Role::Student,
            department: Department::new(department),
            name: name.clone(),
            token: String::new(),
        };
        store.append_row(ACCOUNTS_SHEET, account.to_row()).await?;

        if !tables::is_department(store, department).await? {
            return Err(AppError::partial(format!(
                "Department sheet '{}' not found. The login account was created, but the profile was not.",
                department
            )));
        }

        let year = form.year.clone().unwrap_or_else(current_year);
        let profile = StudentProfile::enrollment(identifier, &name, &year);
        if let Err(e) = store.append_row(department, profile.to_row()).await {
            tracing::error!(error = %e, department, "Profile append failed after account append");
            return Err(AppError::partial(format!(
                "The login account was created, but the profile could not be saved: {}",
                e
            )));
        }

        Ok(())
    }
}

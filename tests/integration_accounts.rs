mod common;

use std::time::Duration;

use common::{FailingStore, call, login, login_admin, register, seeded_app, seeded_app_with_wait};
use serde_json::json;
use sipkl::modules::accounts::model::{DeleteOutcome, TransferOutcome};
use sipkl::modules::accounts::service::AccountService;
use sipkl::tables;
use sipkl_core::password::{DEFAULT_PASSWORD, hash_password};
use sipkl_models::accounts::Department;
use sipkl_models::schema::ACCOUNTS_SHEET;

#[tokio::test]
async fn test_department_admin_lists_only_own_department() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    register(&app, "00124", "ani", "tata_boga").await;
    register(&app, "00125", "citra", "tjkt").await;

    let token = login_admin(&app, "admin_tjkt").await;
    let body = call(&app, &token, "getAdminUsers", json!({"department": "tata_boga"})).await;
    assert_eq!(body["success"], true);

    let ids: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["identifier"].as_str().unwrap())
        .collect();
    // newest first, the department admin included
    assert_eq!(ids, vec!["00125", "00123", "admin_tjkt"]);
}

#[tokio::test]
async fn test_super_admin_lists_everyone() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;

    let users = AccountService::list_accounts(app.store(), &Department::all())
        .await
        .unwrap();
    assert_eq!(users.len(), 7);
    assert_eq!(users[0].identifier, "00123");
}

#[tokio::test]
async fn test_create_account_without_department_sheet_is_partial() {
    let app = seeded_app().await;
    let token = login_admin(&app, "admin").await;

    let body = call(
        &app,
        &token,
        "adminCreateUser",
        json!({"identifier": "00200", "password": "x", "name": "dodi", "department": "otomotif"}),
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(body["partial"], true);

    // the login half landed
    let account = tables::locate_account(app.store(), "00200").await.unwrap();
    assert_eq!(account.unwrap().record.department.as_str(), "otomotif");
}

#[tokio::test]
async fn test_department_admin_creates_into_own_department() {
    let app = seeded_app().await;
    let token = login_admin(&app, "admin_boga").await;

    let body = call(
        &app,
        &token,
        "adminCreateUser",
        json!({"identifier": "00300", "password": "x", "name": "eka", "department": "tjkt"}),
    )
    .await;
    assert_eq!(body["success"], true, "{}", body);

    assert!(tables::locate_profile(app.store(), "tata_boga", "00300").await.unwrap().is_some());
    assert!(tables::locate_profile(app.store(), "tjkt", "00300").await.unwrap().is_none());
}

#[tokio::test]
async fn test_transfer_moves_profile_row() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;

    let outcome = AccountService::transfer_department(
        app.store(),
        app.lock(),
        app.wait(),
        "00123",
        Some("tjkt"),
        "tata_boga",
    )
    .await
    .unwrap();
    assert_eq!(outcome, TransferOutcome::Moved);

    assert!(tables::locate_profile(app.store(), "tjkt", "00123").await.unwrap().is_none());
    let moved = tables::locate_profile(app.store(), "tata_boga", "00123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.record.name, "Budi");

    let account = tables::locate_account(app.store(), "00123").await.unwrap().unwrap();
    assert_eq!(account.record.department.as_str(), "tata_boga");
}

#[tokio::test]
async fn test_transfer_recreates_missing_profile_row() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let profile = tables::locate_profile(app.store(), "tjkt", "00123")
        .await
        .unwrap()
        .unwrap();
    app.store().delete_row("tjkt", profile.row).await.unwrap();

    let outcome = AccountService::transfer_department(
        app.store(),
        app.lock(),
        app.wait(),
        "00123",
        None,
        "tata_boga",
    )
    .await
    .unwrap();
    assert_eq!(outcome, TransferOutcome::Recreated);

    let created = tables::locate_profile(app.store(), "tata_boga", "00123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.record.name, "Budi");
    assert!(!created.record.year.is_empty());
}

#[tokio::test]
async fn test_transfer_to_unknown_department_changes_nothing() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;

    let err = AccountService::transfer_department(
        app.store(),
        app.lock(),
        app.wait(),
        "00123",
        None,
        "otomotif",
    )
    .await
    .unwrap_err();
    assert!(err.message().contains("otomotif"));

    let account = tables::locate_account(app.store(), "00123").await.unwrap().unwrap();
    assert_eq!(account.record.department.as_str(), "tjkt");
    assert!(tables::locate_profile(app.store(), "tjkt", "00123").await.unwrap().is_some());
}

#[tokio::test]
async fn test_only_super_admin_may_transfer() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;

    let token = login_admin(&app, "admin_tjkt").await;
    let body = call(
        &app,
        &token,
        "adminChangeDepartment",
        json!({"identifier": "00123", "newDepartment": "tata_boga"}),
    )
    .await;
    assert_eq!(body["success"], false);

    let token = login_admin(&app, "admin").await;
    let body = call(
        &app,
        &token,
        "adminChangeDepartment",
        json!({"identifier": "00123", "oldDepartment": "tjkt", "newDepartment": "tata_boga"}),
    )
    .await;
    assert_eq!(body["success"], true, "{}", body);
    assert_eq!(body["outcome"], "moved");
}

#[tokio::test]
async fn test_delete_outcomes() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    register(&app, "00124", "ani", "tjkt").await;
    let scope = Department::all();

    let outcome = AccountService::delete_account(
        app.store(),
        app.lock(),
        app.wait(),
        "00123",
        Some("tjkt"),
        &scope,
    )
    .await
    .unwrap();
    assert_eq!(outcome, DeleteOutcome::Both);

    // drop the profile by hand so only the login row is left
    let profile = tables::locate_profile(app.store(), "tjkt", "00124")
        .await
        .unwrap()
        .unwrap();
    app.store().delete_row("tjkt", profile.row).await.unwrap();
    let outcome = AccountService::delete_account(
        app.store(),
        app.lock(),
        app.wait(),
        "00124",
        None,
        &scope,
    )
    .await
    .unwrap();
    assert_eq!(outcome, DeleteOutcome::AccountOnly);

    let err = AccountService::delete_account(
        app.store(),
        app.lock(),
        app.wait(),
        "00124",
        Some("tjkt"),
        &scope,
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_profile_without_account() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let account = tables::locate_account(app.store(), "00123").await.unwrap().unwrap();
    app.store().delete_row(ACCOUNTS_SHEET, account.row).await.unwrap();

    let outcome = AccountService::delete_account(
        app.store(),
        app.lock(),
        app.wait(),
        "00123",
        Some("tjkt"),
        &Department::all(),
    )
    .await
    .unwrap();
    assert_eq!(outcome, DeleteOutcome::ProfileOnly);
}

#[tokio::test]
async fn test_department_admin_cannot_touch_other_departments() {
    let app = seeded_app().await;
    register(&app, "00124", "ani", "tata_boga").await;
    let scope = Department::new("tjkt");

    let reset =
        AccountService::reset_password(app.store(), app.lock(), app.wait(), "00124", &scope).await;
    assert!(reset.is_err());
    let deleted =
        AccountService::delete_account(app.store(), app.lock(), app.wait(), "00124", None, &scope)
            .await;
    assert!(deleted.is_err());
    assert!(tables::locate_account(app.store(), "00124").await.unwrap().is_some());
}

#[tokio::test]
async fn test_reset_password_restores_default() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let token = login_admin(&app, "admin_tjkt").await;

    let body = call(&app, &token, "adminResetPassword", json!({"identifier": "00123"})).await;
    assert_eq!(body["success"], true, "{}", body);

    let student = login(&app, "00123", DEFAULT_PASSWORD).await;
    let body = call(&app, &student, "getDashboardData", json!({})).await;
    assert_eq!(body["data"]["user"]["isDefaultPassword"], true);

    let body = call(&app, &token, "adminResetPassword", json!({"identifier": "nobody"})).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_change_own_password() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let token = login(&app, "00123", "rahasia").await;

    let body = call(&app, &token, "changePassword", json!({"newPassword": "baru"})).await;
    assert_eq!(body["success"], true);

    let account = tables::locate_account(app.store(), "00123").await.unwrap().unwrap();
    assert_eq!(account.record.password_hash, hash_password("baru"));
}

#[tokio::test]
async fn test_admin_updates_own_credentials() {
    let app = seeded_app().await;
    let token = login_admin(&app, "admin_tjkt").await;

    let body = call(
        &app,
        &token,
        "adminUpdateCredentials",
        json!({"newIdentifier": "admin_boga"}),
    )
    .await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("already taken"));

    let body = call(&app, &token, "adminUpdateCredentials", json!({})).await;
    assert_eq!(body["success"], false);

    let body = call(
        &app,
        &token,
        "adminUpdateCredentials",
        json!({"newIdentifier": "kaprog_tjkt", "newPassword": "rahasia"}),
    )
    .await;
    assert_eq!(body["success"], true, "{}", body);

    login(&app, "kaprog_tjkt", "rahasia").await;
    assert!(tables::locate_account(app.store(), "admin_tjkt").await.unwrap().is_none());
}

#[tokio::test]
async fn test_transfer_reports_profile_left_behind() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let store = FailingStore::new(app.state.store.clone()).failing_append("tata_boga");

    let err = AccountService::transfer_department(
        &store,
        app.lock(),
        app.wait(),
        "00123",
        Some("tjkt"),
        "tata_boga",
    )
    .await
    .unwrap_err();
    assert!(err.is_partial());
    assert!(err.message().starts_with(
        "Department updated on the login account, but the profile row could not be moved"
    ));

    let account = tables::locate_account(app.store(), "00123").await.unwrap().unwrap();
    assert_eq!(account.record.department.as_str(), "tata_boga");
    assert!(tables::locate_profile(app.store(), "tjkt", "00123").await.unwrap().is_some());
}

#[tokio::test]
async fn test_transfer_reports_old_row_not_removed() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let store = FailingStore::new(app.state.store.clone()).failing_delete("tjkt");

    let err = AccountService::transfer_department(
        &store,
        app.lock(),
        app.wait(),
        "00123",
        None,
        "tata_boga",
    )
    .await
    .unwrap_err();
    assert!(err.is_partial());
    assert!(err.message().contains("copied to tata_boga"));

    assert!(tables::locate_profile(app.store(), "tata_boga", "00123").await.unwrap().is_some());
    assert!(tables::locate_profile(app.store(), "tjkt", "00123").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_reports_account_left_behind() {
    let app = seeded_app().await;
    register(&app, "00123", "budi", "tjkt").await;
    let store = FailingStore::new(app.state.store.clone()).failing_delete(ACCOUNTS_SHEET);

    let err = AccountService::delete_account(
        &store,
        app.lock(),
        app.wait(),
        "00123",
        Some("tjkt"),
        &Department::all(),
    )
    .await
    .unwrap_err();
    assert!(err.is_partial());
    assert!(err.message().starts_with(
        "The profile row was deleted, but the login account could not be removed"
    ));

    assert!(tables::locate_profile(app.store(), "tjkt", "00123").await.unwrap().is_none());
    assert!(tables::locate_account(app.store(), "00123").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_without_profile_fails_plainly_when_account_delete_fails() {
    let app = seeded_app().await;
    let store = FailingStore::new(app.state.store.clone()).failing_delete(ACCOUNTS_SHEET);

    let err = AccountService::delete_account(
        &store,
        app.lock(),
        app.wait(),
        "admin_tjkt",
        None,
        &Department::all(),
    )
    .await
    .unwrap_err();
    assert!(!err.is_partial());
    assert!(tables::locate_account(app.store(), "admin_tjkt").await.unwrap().is_some());
}

#[tokio::test]
async fn test_row_deletes_wait_for_the_write_lock() {
    let app = seeded_app_with_wait(Duration::from_millis(30)).await;
    register(&app, "00123", "budi", "tjkt").await;
    let admin = login_admin(&app, "admin").await;

    let held = app.lock().acquire(Duration::from_millis(50)).await.unwrap();
    let body = call(&app, &admin, "adminDeleteUser", json!({"identifier": "00123"})).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("busy"));

    let body = call(&app, &admin, "adminResetPassword", json!({"identifier": "00123"})).await;
    assert_eq!(body["success"], false);
    drop(held);

    assert!(tables::locate_account(app.store(), "00123").await.unwrap().is_some());
    assert!(tables::locate_profile(app.store(), "tjkt", "00123").await.unwrap().is_some());

    let body = call(&app, &admin, "adminDeleteUser", json!({"identifier": "00123"})).await;
    assert_eq!(body["success"], true, "{}", body);
}

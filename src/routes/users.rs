use crate::{
    auth::{AdminUser, CurrentUser, PasswordHasher},
    error::AppError,
    models::{Account, AccountUpdate, PasswordChange, RoleChange},
};
use actix_web::{delete, get, patch, put, web, HttpResponse, Responder};
use log::info;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

async fn fetch_active_account(pool: &PgPool, id: i32) -> Result<Account, AppError> {
    Account::find_active_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))
}

/// Retrieves the authenticated account's own profile.
#[get("/me")]
pub async fn profile(user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(user.0))
}

/// Changes the authenticated account's own password.
///
/// The old password must verify against the stored digest; a mismatch is a
/// 400, not a 401, because the caller is already authenticated.
#[patch("/me/password")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    user: CurrentUser,
    password_data: web::Json<PasswordChange>,
) -> Result<impl Responder, AppError> {
    password_data.validate()?;
    let account = user.0;

    if !hasher.verify(&password_data.old_password, &account.password_hash) {
        return Err(AppError::BadRequest("Old password is incorrect".into()));
    }

    let new_hash = hasher.hash(&password_data.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
        .bind(&new_hash)
        .bind(account.id)
        .execute(&**pool)
        .await?;

    info!("password updated for account {}", account.id);
    Ok(HttpResponse::Ok().json(json!({ "detail": "Password updated successfully" })))
}

/// Lists all active accounts (admin only).
#[get("")]
pub async fn list_accounts(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let accounts = sqlx::query_as::<_, Account>(&format!(
        "SELECT {} FROM users WHERE is_active = TRUE ORDER BY id",
        Account::COLUMNS
    ))
    .fetch_all(&**pool)
    .await?;

    info!("total active accounts: {}", accounts.len());
    Ok(HttpResponse::Ok().json(accounts))
}

/// Lists soft-deleted accounts (admin only).
#[get("/deleted")]
pub async fn list_deleted_accounts(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let accounts = sqlx::query_as::<_, Account>(&format!(
        "SELECT {} FROM users WHERE is_active = FALSE ORDER BY id",
        Account::COLUMNS
    ))
    .fetch_all(&**pool)
    .await?;

    info!("total deleted accounts: {}", accounts.len());
    Ok(HttpResponse::Ok().json(accounts))
}

/// Retrieves a single active account by ID (admin only).
#[get("/{id}")]
pub async fn get_account(
    pool: web::Data<PgPool>,
    account_id: web::Path<i32>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let account = fetch_active_account(&pool, account_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// Full update of an account (admin only). Requires `full_name`.
#[put("/{id}")]
pub async fn update_account(
    pool: web::Data<PgPool>,
    account_id: web::Path<i32>,
    update_data: web::Json<AccountUpdate>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    update_data.validate()?;

    let full_name = update_data.full_name.as_deref().ok_or_else(|| {
        AppError::BadRequest("Missing required fields for full update".into())
    })?;

    let account = sqlx::query_as::<_, Account>(&format!(
        "UPDATE users SET full_name = $1, phone = $2, updated_at = now()
         WHERE id = $3 AND is_active = TRUE
         RETURNING {}",
        Account::COLUMNS
    ))
    .bind(full_name.trim())
    .bind(update_data.phone.as_deref().map(str::trim))
    .bind(account_id.into_inner())
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Account not found".into()))?;

    info!("account updated: {}", account.id);
    Ok(HttpResponse::Ok().json(account))
}

/// Partial update of an account (admin only).
#[patch("/{id}")]
pub async fn edit_account(
    pool: web::Data<PgPool>,
    account_id: web::Path<i32>,
    update_data: web::Json<AccountUpdate>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    update_data.validate()?;

    let account = sqlx::query_as::<_, Account>(&format!(
        "UPDATE users SET
            full_name = COALESCE($1, full_name),
            phone = COALESCE($2, phone),
            updated_at = now()
         WHERE id = $3 AND is_active = TRUE
         RETURNING {}",
        Account::COLUMNS
    ))
    .bind(update_data.full_name.as_deref().map(str::trim))
    .bind(update_data.phone.as_deref().map(str::trim))
    .bind(account_id.into_inner())
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Account not found".into()))?;

    info!("account edited: {}", account.id);
    Ok(HttpResponse::Ok().json(account))
}

/// Soft-deletes an account (admin only). Returns no content (204).
///
/// The row stays in place with `is_active = FALSE`; from that point every
/// auth check treats the account as non-existent.
#[delete("/{id}")]
pub async fn deactivate_account(
    pool: web::Data<PgPool>,
    account_id: web::Path<i32>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let id = account_id.into_inner();
    let result =
        sqlx::query("UPDATE users SET is_active = FALSE, updated_at = now() WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .execute(&**pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Account not found".into()));
    }

    info!("account deleted: {}", id);
    Ok(HttpResponse::NoContent().finish())
}

/// Reactivates a previously soft-deleted account (admin only).
#[patch("/{id}/activate")]
pub async fn activate_account(
    pool: web::Data<PgPool>,
    account_id: web::Path<i32>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "UPDATE users SET is_active = TRUE, updated_at = now()
         WHERE id = $1 AND is_active = FALSE
         RETURNING {}",
        Account::COLUMNS
    ))
    .bind(account_id.into_inner())
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Account not deleted or not found".into()))?;

    info!("account activated: {}", account.id);
    Ok(HttpResponse::Ok().json(account))
}

/// Changes an account's role (admin only).
#[patch("/{id}/role")]
pub async fn change_role(
    pool: web::Data<PgPool>,
    account_id: web::Path<i32>,
    role_data: web::Json<RoleChange>,
    admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "UPDATE users SET role = $1, updated_at = now()
         WHERE id = $2 AND is_active = TRUE
         RETURNING {}",
        Account::COLUMNS
    ))
    .bind(role_data.role)
    .bind(account_id.into_inner())
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Account not found".into()))?;

    info!(
        "account {} role changed to {} by admin {}",
        account.id, account.role, admin.0.id
    );
    Ok(HttpResponse::Ok().json(account))
}

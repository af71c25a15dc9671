use crate::{
    auth::{LoginRequest, PasswordHasher, SignupRequest, TokenKind, TokenPair, TokenService},
    config::Config,
    error::AppError,
    models::Account,
};
use actix_web::{post, web, HttpResponse, Responder};
use log::{info, warn};
use sqlx::PgPool;
use validator::Validate;

/// Register a new account
///
/// Creates a new account with the default user role and returns it with 201.
/// Duplicate emails are caught by the database's uniqueness constraint rather
/// than a pre-check, so concurrent signups with the same email cannot race
/// past each other.
#[post("/signup")]
pub async fn signup(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    signup_data.validate()?;

    let email = signup_data.email.trim().to_lowercase();
    let password_hash = hasher.hash(&signup_data.password)?;

    let account = sqlx::query_as::<_, Account>(&format!(
        "INSERT INTO users (full_name, email, phone, password_hash)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        Account::COLUMNS
    ))
    .bind(signup_data.full_name.trim())
    .bind(&email)
    .bind(signup_data.phone.as_deref().map(str::trim))
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                warn!("signup rejected, email already registered: {}", email);
                return AppError::Conflict(format!(
                    "Account with email {} already exists",
                    email
                ));
            }
        }
        AppError::from(e)
    })?;

    info!("new account created: {} (id={})", account.email, account.id);

    Ok(HttpResponse::Created().json(account))
}

/// Login
///
/// Authenticates by email and password and returns an access/refresh token
/// pair. Unknown emails, soft-deleted accounts, and wrong passwords all
/// produce the same 401 so nothing is revealed about which part failed.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    tokens: web::Data<TokenService>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let email = login_data.email.trim().to_lowercase();

    let account = Account::find_active_by_email(&pool, &email)
        .await?
        .ok_or_else(|| {
            warn!("login failed, no active account for submitted email");
            AppError::Unauthorized("Invalid credentials".into())
        })?;

    if !hasher.verify(&login_data.password, &account.password_hash) {
        warn!("login failed, bad password for account {}", account.id);
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let subject = account.id.to_string();
    let access_token = tokens.issue(&subject, config.access_token_ttl, TokenKind::Access)?;
    let refresh_token = tokens.issue(&subject, config.refresh_token_ttl, TokenKind::Refresh)?;

    info!("account logged in: {} (id={})", account.email, account.id);

    Ok(HttpResponse::Ok().json(TokenPair::new(access_token, refresh_token)))
}

use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::{Account, Role};

/// Exact-equality role gate.
///
/// Returns `Forbidden` when the authenticated account lacks the required
/// role, logging the subject id and the role that was demanded. No hierarchy:
/// an admin-only endpoint is admin-only.
pub fn require_role(account: &Account, required: Role) -> Result<(), AppError> {
    if account.role == required {
        Ok(())
    } else {
        log::warn!(
            "role denied: account {} requires role {}",
            account.id,
            required
        );
        Err(AppError::Forbidden(format!(
            "{} privileges required",
            required
        )))
    }
}

/// Extracts the authenticated account for the current request.
///
/// This extractor is intended to be used on routes protected by
/// `AuthMiddleware`, which validates the token and inserts the decoded
/// `Claims` into request extensions. From there it parses the subject id and
/// loads the account from the database, rejecting subjects that no longer
/// resolve to an active account. Every request re-checks activity status;
/// there is no caching in front of the lookup.
pub struct CurrentUser(pub Account);

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError converts into ActixError via ResponseError
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            // Missing claims means AuthMiddleware did not run or the route is
            // misconfigured; responding Unauthorized is the safe default.
            let claims = claims
                .ok_or_else(|| AppError::Unauthorized("Missing access token".to_string()))?;
            let pool = pool
                .ok_or_else(|| AppError::Internal("database pool not configured".to_string()))?;

            let account_id: i32 = claims.sub.parse().map_err(|_| {
                log::warn!("token subject is not an account id");
                AppError::Unauthorized("Token missing user identifier".to_string())
            })?;

            let account = Account::find_active_by_id(&pool, account_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| {
                    log::warn!("subject {} has no active account", account_id);
                    AppError::Unauthorized("Account not found".to_string())
                })?;

            Ok(CurrentUser(account))
        })
    }
}

/// Extracts the authenticated account and requires the admin role.
///
/// Composes [`CurrentUser`] with [`require_role`], so an unauthenticated
/// caller still gets 401 while an authenticated non-admin gets 403.
pub struct AdminUser(pub Account);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let current = CurrentUser::from_request(req, payload);
        Box::pin(async move {
            let CurrentUser(account) = current.await?;
            require_role(&account, Role::Admin)?;
            Ok(AdminUser(account))
        })
    }
}

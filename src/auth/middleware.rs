use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{TokenKind, TokenService};
use crate::config::Config;
use crate::error::AppError;

/// Verifies the bearer credential on every protected request.
///
/// Reads the configured header (raw token or `Bearer `-prefixed, per
/// deployment), verifies it through the shared `TokenService`, and inserts
/// the decoded `Claims` into request extensions for the identity extractors
/// downstream. Public paths (`/health`, the auth endpoints) pass through.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Skip authentication for the health check and auth endpoints
        let path = req.path();
        if path == "/health" || path.starts_with("/api/auth/") {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let (settings, tokens) = match (
            req.app_data::<web::Data<Config>>().cloned(),
            req.app_data::<web::Data<TokenService>>().cloned(),
        ) {
            (Some(settings), Some(tokens)) => (settings, tokens),
            _ => {
                let app_err = AppError::Internal("auth services not configured".into());
                return Box::pin(async move { Err(app_err.into()) });
            }
        };

        let header_value = req
            .headers()
            .get(settings.auth_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_owned());

        let token = match &header_value {
            Some(value) if settings.auth_bearer_scheme => value.strip_prefix("Bearer "),
            Some(value) => Some(value.as_str()),
            None => None,
        };

        match token {
            Some(token) => match tokens.verify(token) {
                Ok(claims) => {
                    if !settings.refresh_tokens_authenticate
                        && claims.kind == Some(TokenKind::Refresh)
                    {
                        log::warn!(
                            "refresh token presented at protected endpoint by subject {}",
                            claims.sub
                        );
                        let app_err = AppError::Unauthorized("Access token invalid".into());
                        return Box::pin(async move { Err(app_err.into()) });
                    }
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(kind) => {
                    log::warn!("token verification failed: {:?}", kind);
                    let app_err = AppError::from(kind);
                    Box::pin(async move { Err(app_err.into()) })
                }
            },
            None => {
                let app_err = AppError::Unauthorized("Missing access token".into());
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::Duration;
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;

use taskdeck::auth::{AuthMiddleware, PasswordHasher, TokenKind, TokenPair, TokenService};
use taskdeck::config::Config;
use taskdeck::routes;

const TEST_EMAIL: &str = "integration@example.com";
const TEST_PASSWORD: &str = "Password123!";

async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

async fn cleanup(pool: &PgPool, email: &str) {
    let _ = sqlx::query(
        "DELETE FROM tasks WHERE owner_id IN (SELECT id FROM users WHERE email = $1)",
    )
    .bind(email)
    .execute(pool)
    .await;
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

macro_rules! init_app {
    ($pool:expr, $config:expr) => {{
        let tokens = web::Data::new(TokenService::new(
            &$config.jwt_secret,
            $config.jwt_algorithm,
        ));
        let hasher = web::Data::new(PasswordHasher::new(4));
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new($config.clone()))
                .app_data(tokens)
                .app_data(hasher)
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    }};
}

// Requires a running Postgres with migrations applied; run with
// `cargo test -- --ignored` and DATABASE_URL/JWT_SECRET set.
#[ignore]
#[actix_rt::test]
async fn test_signup_login_and_protected_flow() {
    dotenv().ok();
    let pool = test_pool().await;
    let config = Config::from_env();
    cleanup(&pool, TEST_EMAIL).await;

    let app = init_app!(pool, config);

    // Signup
    let signup_payload = json!({
        "full_name": "Integration Tester",
        "email": TEST_EMAIL,
        "password": TEST_PASSWORD
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&signup_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        actix_web::http::StatusCode::CREATED,
        "Signup failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );
    let account: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(account["id"].is_number());
    assert_eq!(account["role"], "user");
    assert!(
        account.get("password_hash").is_none(),
        "Credential hash must never be serialized"
    );

    // Duplicate signup hits the uniqueness constraint
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&signup_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);

    // Login
    let login_payload = json!({
        "email": TEST_EMAIL,
        "password": TEST_PASSWORD
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&login_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let tokens: TokenPair = test::read_body_json(resp).await;
    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());
    assert_ne!(tokens.access_token, tokens.refresh_token);
    assert_eq!(tokens.token_type, "bearer");

    // Protected endpoint with the access token
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(("Authorization", format!("Bearer {}", tokens.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let me: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(me["email"], TEST_EMAIL);

    // Admin-only endpoint with a non-admin token
    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", format!("Bearer {}", tokens.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    // No token at all. The middleware rejects before routing, so the error
    // comes back as a service error rather than a response.
    let req = test::TestRequest::get().uri("/api/users/me").to_request();
    let err = test::try_call_service(&app, req)
        .await
        .err()
        .expect("request without a token must be rejected");
    let resp = err.error_response();
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["detail"], "Missing access token");

    cleanup(&pool, TEST_EMAIL).await;
}

// Requires a running Postgres with migrations applied; run with
// `cargo test -- --ignored` and DATABASE_URL/JWT_SECRET set.
#[ignore]
#[actix_rt::test]
async fn test_expired_token_detail_differs_from_invalid() {
    dotenv().ok();
    let pool = test_pool().await;
    let config = Config::from_env();
    let email = "expired-token@example.com";
    cleanup(&pool, email).await;

    let app = init_app!(pool, config);

    let signup_payload = json!({
        "full_name": "Expiry Tester Person",
        "email": email,
        "password": TEST_PASSWORD
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&signup_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let account: serde_json::Value = test::read_body_json(resp).await;
    let account_id = account["id"].as_i64().unwrap();

    // Mint an already-expired token for the fresh account
    let service = TokenService::new(&config.jwt_secret, config.jwt_algorithm);
    let expired = service
        .issue(
            &account_id.to_string(),
            Duration::seconds(-1),
            TokenKind::Access,
        )
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(("Authorization", format!("Bearer {}", expired)))
        .to_request();
    let err = test::try_call_service(&app, req)
        .await
        .err()
        .expect("expired token must be rejected");
    let resp = err.error_response();
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["detail"], "Access token expired");

    // A structurally invalid token gets a different detail, same status
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let err = test::try_call_service(&app, req)
        .await
        .err()
        .expect("malformed token must be rejected");
    let resp = err.error_response();
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["detail"], "Access token invalid");

    cleanup(&pool, email).await;
}

// Requires a running Postgres with migrations applied; run with
// `cargo test -- --ignored` and DATABASE_URL/JWT_SECRET set.
#[ignore]
#[actix_rt::test]
async fn test_deactivated_account_token_stops_resolving() {
    dotenv().ok();
    let pool = test_pool().await;
    let config = Config::from_env();
    let email = "deactivated@example.com";
    cleanup(&pool, email).await;

    let app = init_app!(pool, config);

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "full_name": "Deactivation Tester",
            "email": email,
            "password": TEST_PASSWORD
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let tokens: TokenPair = test::read_body_json(resp).await;

    // Soft-delete the account behind the token's back
    sqlx::query("UPDATE users SET is_active = FALSE WHERE email = $1")
        .bind(email)
        .execute(&pool)
        .await
        .unwrap();

    // The token still verifies cryptographically but no longer resolves
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(("Authorization", format!("Bearer {}", tokens.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Account not found");

    // And login is refused outright
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    cleanup(&pool, email).await;
}

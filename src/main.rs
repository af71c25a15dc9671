use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskdeck::auth::{AuthMiddleware, PasswordHasher, TokenService};
use taskdeck::config::Config;
use taskdeck::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // Auth services are built once from config and injected everywhere as
    // shared, immutable app data.
    let tokens = web::Data::new(TokenService::new(&config.jwt_secret, config.jwt_algorithm));
    let hasher = web::Data::new(PasswordHasher::new(config.bcrypt_cost));

    let bind_addr = (config.server_host.clone(), config.server_port);
    log::info!("starting TaskDeck server at {}", config.server_url());

    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .app_data(tokens.clone())
            .app_data(hasher.clone())
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
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}

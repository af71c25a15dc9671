pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Registers everything under the `/api` scope.
///
/// Literal paths (`/me`, `/deleted`) are registered before the `/{id}`
/// matchers so they are not swallowed by the path parameter.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::signup)
            .service(auth::login),
    )
    .service(
        web::scope("/users")
            .service(users::profile)
            .service(users::change_password)
            .service(users::list_accounts)
            .service(users::list_deleted_accounts)
            .service(users::activate_account)
            .service(users::change_role)
            .service(users::get_account)
            .service(users::update_account)
            .service(users::edit_account)
            .service(users::deactivate_account),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::create_task)
            .service(tasks::list_tasks)
            .service(tasks::list_deleted_tasks)
            .service(tasks::activate_task)
            .service(tasks::change_task_status)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::edit_task)
            .service(tasks::delete_task),
    );
}

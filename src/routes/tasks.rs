use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{StatusChange, Task, TaskInput, TaskStatus},
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use log::info;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str =
    "id, title, description, note, status, is_active, created_at, updated_at, owner_id";

/// Loads an active task owned by the caller, or 404.
///
/// Scoping the lookup by owner means another user's task id looks exactly
/// like a missing one.
async fn fetch_owned_task(pool: &PgPool, task_id: Uuid, owner_id: i32) -> Result<Task, AppError> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2 AND is_active = TRUE",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

/// Creates a new task owned by the authenticated account.
/// New tasks start in the `pending` status.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let title = task_data
        .title
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Title is required".into()))?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, note, status, owner_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(title.trim())
    .bind(task_data.description.as_deref().map(str::trim))
    .bind(task_data.note.as_deref().map(str::trim))
    .bind(TaskStatus::Pending)
    .bind(user.0.id)
    .fetch_one(&**pool)
    .await?;

    info!("new task created: {} (owner={})", task.id, task.owner_id);
    Ok(HttpResponse::Created().json(task))
}

/// Lists the caller's active tasks.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE owner_id = $1 AND is_active = TRUE ORDER BY created_at DESC",
        TASK_COLUMNS
    ))
    .bind(user.0.id)
    .fetch_all(&**pool)
    .await?;

    info!("total active tasks: {}", tasks.len());
    Ok(HttpResponse::Ok().json(tasks))
}

/// Lists the caller's soft-deleted tasks.
#[get("/deleted")]
pub async fn list_deleted_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE owner_id = $1 AND is_active = FALSE ORDER BY created_at DESC",
        TASK_COLUMNS
    ))
    .bind(user.0.id)
    .fetch_all(&**pool)
    .await?;

    info!("total deleted tasks: {}", tasks.len());
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves a single task by ID.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = fetch_owned_task(&pool, task_id.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Full update of a task. Requires `title`.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let title = task_data.title.as_deref().ok_or_else(|| {
        AppError::BadRequest("Missing required fields for full update".into())
    })?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET title = $1, description = $2, note = $3, updated_at = now()
         WHERE id = $4 AND owner_id = $5 AND is_active = TRUE
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(title.trim())
    .bind(task_data.description.as_deref().map(str::trim))
    .bind(task_data.note.as_deref().map(str::trim))
    .bind(task_id.into_inner())
    .bind(user.0.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    info!("task updated: {}", task.id);
    Ok(HttpResponse::Ok().json(task))
}

/// Partial update of a task.
#[patch("/{id}")]
pub async fn edit_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            note = COALESCE($3, note),
            updated_at = now()
         WHERE id = $4 AND owner_id = $5 AND is_active = TRUE
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task_data.title.as_deref().map(str::trim))
    .bind(task_data.description.as_deref().map(str::trim))
    .bind(task_data.note.as_deref().map(str::trim))
    .bind(task_id.into_inner())
    .bind(user.0.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    info!("task edited: {}", task.id);
    Ok(HttpResponse::Ok().json(task))
}

/// Soft-deletes a task. Returns no content (204).
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    let result = sqlx::query(
        "UPDATE tasks SET is_active = FALSE, updated_at = now()
         WHERE id = $1 AND owner_id = $2 AND is_active = TRUE",
    )
    .bind(id)
    .bind(user.0.id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    info!("task deleted: {}", id);
    Ok(HttpResponse::NoContent().finish())
}

/// Restores a previously soft-deleted task.
#[patch("/{id}/activate")]
pub async fn activate_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET is_active = TRUE, updated_at = now()
         WHERE id = $1 AND owner_id = $2 AND is_active = FALSE
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(user.0.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not deleted or not found".into()))?;

    info!("task activated: {}", task.id);
    Ok(HttpResponse::Ok().json(task))
}

/// Moves a task to a new status. A no-op transition is a 400.
#[patch("/{id}/status")]
pub async fn change_task_status(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    status_data: web::Json<StatusChange>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = fetch_owned_task(&pool, task_id.into_inner(), user.0.id).await?;

    if task.status == status_data.status {
        return Err(AppError::BadRequest(
            "Task is already in the requested status".into(),
        ));
    }

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET status = $1, updated_at = now()
         WHERE id = $2 AND owner_id = $3 AND is_active = TRUE
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(status_data.status)
    .bind(task.id)
    .bind(user.0.id)
    .fetch_one(&**pool)
    .await?;

    info!("task {} status changed to {:?}", task.id, task.status);
    Ok(HttpResponse::Ok().json(task))
}

// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::policy;
use crate::store::Store;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{
    Client, CreateClientPayload, CreateProjectPayload, CreateUserPayload, Project,
    UpdateClientPayload, UpdateProjectPayload, UpdateUserPayload, User,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, info};

lazy_static! {
    // The RFC-lite shape the frontend validates against: something@something.tld.
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Query filter for the users collection: exact email match.
#[derive(Deserialize, Debug, Default)]
pub struct UserFilter {
    pub email: Option<String>,
}

/// Query filter shared by clients and projects: exact owner match. The value
/// stays a string; the store compares identifiers by their string form.
#[derive(Deserialize, Debug, Default)]
pub struct OwnerFilter {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

// --- users ---

pub async fn list_users(
    State(store): State<Store>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = store.list_users(filter.email.as_deref());
    info!("Successfully retrieved {} users.", users.len());
    Ok(Json(users))
}

pub async fn get_user(
    State(store): State<Store>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, AppError> {
    match store.get_user(user_id) {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("User with ID {user_id} not found."),
        )),
    }
}

pub async fn create_user(
    State(store): State<Store>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<User>), AppError> {
    debug!("Received request to create user: {}", payload.email);
    if payload.name.trim().is_empty() {
        error!("Validation failed: user name is empty.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Please enter your name.",
        ));
    }
    if !is_email(&payload.email) {
        error!("Validation failed: malformed email.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Please enter a valid email address.",
        ));
    }
    if payload.password.len() < 6 {
        error!("Validation failed: password too short.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters.",
        ));
    }

    let new_user = store.create_user(payload)?;
    info!("User created successfully with ID: {}", new_user.id);
    Ok((StatusCode::CREATED, Json(new_user)))
}

pub async fn update_user(
    State(store): State<Store>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "Please enter your name.",
            ));
        }
    }
    if let Some(email) = &payload.email {
        if !is_email(email) {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "Please enter a valid email address.",
            ));
        }
    }
    if let Some(password) = &payload.password {
        if password.len() < 6 {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "Password must be at least 6 characters.",
            ));
        }
    }

    match store.update_user(user_id, payload)? {
        Some(user) => {
            info!("User {} updated.", user_id);
            Ok(Json(user))
        }
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("User with ID {user_id} not found."),
        )),
    }
}

/// Handler for the cascade-delete route: removing a user also removes every
/// client and project it owns. Absent user means 404 and no deletions.
pub async fn delete_user(
    State(store): State<Store>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Attempting to cascade-delete user with ID: {}", user_id);

    match store.delete_user_cascade(user_id)? {
        Some(outcome) => {
            info!(
                "User {} deleted with {} clients and {} projects.",
                user_id, outcome.clients_removed, outcome.projects_removed
            );
            Ok(StatusCode::NO_CONTENT)
        }
        None => {
            error!("User with ID {} not found for deletion.", user_id);
            Err(AppError::new(
                StatusCode::NOT_FOUND,
                &format!("User with ID {user_id} not found for deletion."),
            ))
        }
    }
}

// --- clients ---

pub async fn list_clients(
    State(store): State<Store>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = store.list_clients(filter.user_id.as_deref());
    info!("Successfully retrieved {} clients.", clients.len());
    Ok(Json(clients))
}

pub async fn get_client(
    State(store): State<Store>,
    Path(client_id): Path<i64>,
) -> Result<Json<Client>, AppError> {
    match store.get_client(client_id) {
        Some(client) => Ok(Json(client)),
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Client with ID {client_id} not found."),
        )),
    }
}

pub async fn create_client(
    State(store): State<Store>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    debug!("Received request to create client for user {}", payload.user_id);
    if payload.name.trim().is_empty() {
        error!("Validation failed: client name is empty.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Client name is required.",
        ));
    }
    // The email is optional but must look like one when present.
    if let Some(email) = &payload.email {
        if !is_email(email) {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "Please enter a valid email address.",
            ));
        }
    }

    let new_client = store.create_client(payload)?;
    info!("Client created successfully with ID: {}", new_client.id);
    Ok((StatusCode::CREATED, Json(new_client)))
}

pub async fn update_client(
    State(store): State<Store>,
    Path(client_id): Path<i64>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<Json<Client>, AppError> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "Client name is required.",
            ));
        }
    }
    if let Some(email) = &payload.email {
        // An empty string clears the address; anything else is shape-checked.
        if !email.trim().is_empty() && !is_email(email) {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "Please enter a valid email address.",
            ));
        }
    }

    match store.update_client(client_id, payload)? {
        Some(client) => Ok(Json(client)),
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Client with ID {client_id} not found."),
        )),
    }
}

pub async fn delete_client(
    State(store): State<Store>,
    Path(client_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if store.delete_client(client_id)? {
        info!("Client with ID {} deleted successfully.", client_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Client with ID {client_id} not found for deletion."),
        ))
    }
}

// --- projects ---

/// Prepares a stored project for a read response: tasks go out in display
/// order and the client name is resolved from the live client record when
/// the reference still holds, so a renamed client shows its current name.
fn project_view(store: &Store, mut project: Project) -> Project {
    if let Some(client_id) = project.client_id {
        if let Some(client) = store.get_client(client_id) {
            project.client_name = Some(client.name);
        }
    }
    policy::display_order(&mut project.tasks);
    project
}

pub async fn list_projects(
    State(store): State<Store>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects: Vec<Project> = store
        .list_projects(filter.user_id.as_deref())
        .into_iter()
        .map(|p| project_view(&store, p))
        .collect();
    info!("Successfully retrieved {} projects.", projects.len());
    Ok(Json(projects))
}

pub async fn get_project(
    State(store): State<Store>,
    Path(project_id): Path<i64>,
) -> Result<Json<Project>, AppError> {
    match store.get_project(project_id) {
        Some(project) => Ok(Json(project_view(&store, project))),
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Project with ID {project_id} not found."),
        )),
    }
}

pub async fn create_project(
    State(store): State<Store>,
    Json(mut payload): Json<CreateProjectPayload>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    debug!("Received request to create project: {}", payload.name);
    if payload.name.trim().is_empty() {
        error!("Validation failed: project name is empty.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Project title is required.",
        ));
    }

    // Any tasks arriving with the project get their due dates capped at the
    // project's due date before they are stored.
    let mut tasks = payload.tasks.take().unwrap_or_default();
    policy::cap_task_dues(payload.due, &mut tasks);

    let new_project = store.create_project(payload, tasks)?;
    info!("Project created successfully with ID: {}", new_project.id);
    Ok((StatusCode::CREATED, Json(new_project)))
}

pub async fn update_project(
    State(store): State<Store>,
    Path(project_id): Path<i64>,
    Json(mut payload): Json<UpdateProjectPayload>,
) -> Result<Json<Project>, AppError> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                "Project title is required.",
            ));
        }
    }

    let Some(current) = store.get_project(project_id) else {
        return Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Project with ID {project_id} not found."),
        ));
    };

    // Task creation and edits both travel as a full replacement array, so
    // the cap applies to every incoming task. The limit is the due date the
    // project will have after this patch. A patch that changes only the due
    // date does not rewrite tasks already in storage.
    if let Some(tasks) = &mut payload.tasks {
        let effective_due = match payload.due {
            Some(due) => due,
            None => current.due,
        };
        policy::cap_task_dues(effective_due, tasks);
    }

    match store.update_project(project_id, payload)? {
        Some(project) => {
            info!("Project {} updated.", project_id);
            Ok(Json(project))
        }
        None => Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Project with ID {project_id} not found."),
        )),
    }
}

pub async fn delete_project(
    State(store): State<Store>,
    Path(project_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if store.delete_project(project_id)? {
        info!("Project with ID {} deleted successfully.", project_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Project with ID {project_id} not found for deletion."),
        ))
    }
}

// --- Custom Error Handling ---
// This is a good practice for transforming our internal errors
// (e.g., from the store) into appropriate HTTP responses.

/// Our custom error type for the application.
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

/// Allows converting an `anyhow::Error` (coming from `store.rs`)
/// into our `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Log the internal error for debugging.
        tracing::error!("Internal server error: {:?}", err);
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred.".to_string(),
        }
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::{Priority, Task};
    use tempfile::TempDir;

    fn test_store() -> (TempDir, Store) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::open(dir.path().join("db.json")).expect("Failed to open store");
        (dir, store)
    }

    fn user_json(name: &str, email: &str, password: &str) -> Json<CreateUserPayload> {
        Json(CreateUserPayload {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        })
    }

    #[tokio::test]
    async fn test_create_user_validation_bad_email() {
        let (_dir, store) = test_store();
        let payload = user_json("Ada", "not-an-email", "hunter22");

        let result = create_user(State(store), payload).await;

        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Please enter a valid email address.");
    }

    #[tokio::test]
    async fn test_create_user_validation_short_password() {
        let (_dir, store) = test_store();
        let payload = user_json("Ada", "ada@example.com", "short");

        let result = create_user(State(store), payload).await;

        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Password must be at least 6 characters.");
    }

    #[tokio::test]
    async fn test_create_client_validation_empty_name() {
        let (_dir, store) = test_store();
        let payload = Json(CreateClientPayload {
            user_id: 1,
            name: "  ".to_string(),
            email: None,
        });

        let result = create_client(State(store), payload).await;

        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Client name is required.");
    }

    #[tokio::test]
    async fn test_update_project_caps_incoming_task_dues() {
        let (_dir, store) = test_store();
        let project_due = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let project = store
            .create_project(
                CreateProjectPayload {
                    user_id: 1,
                    name: "Site refresh".to_string(),
                    description: None,
                    due: Some(project_due),
                    folder: Some("Tech".to_string()),
                    done: None,
                    client_id: None,
                    client_name: None,
                    tasks: None,
                },
                Vec::new(),
            )
            .unwrap();

        let patch = Json(UpdateProjectPayload {
            tasks: Some(vec![Task {
                id: "t1".to_string(),
                text: "ship it".to_string(),
                done: false,
                due: NaiveDate::from_ymd_opt(2025, 6, 15),
                priority: Priority::High,
            }]),
            ..Default::default()
        });

        let updated = update_project(State(store), Path(project.id), patch)
            .await
            .map_err(|e| e.message)
            .unwrap();
        assert_eq!(updated.0.tasks[0].due, Some(project_due));
    }

    #[tokio::test]
    async fn test_update_missing_project_is_not_found() {
        let (_dir, store) = test_store();
        let result = update_project(State(store), Path(404), Json(Default::default())).await;

        assert!(result.is_err());
        assert_eq!(result.err().unwrap().code, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email("freelancer@example.com"));
        assert!(!is_email("nope"));
        assert!(!is_email("two words@example.com"));
        assert!(!is_email("missing@tld"));
    }
}

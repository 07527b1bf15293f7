// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers;
use crate::store::Store;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

/// Creates and configures the application router.
///
/// The route shape mirrors a json-server instance: one collection per path
/// segment, filterable list endpoints, and no prefix. The only route with
/// behavior beyond plain CRUD is `DELETE /users/{id}`, which cascades to the
/// user's clients and projects.
pub fn create_router(store: Store) -> Router {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users", post(handlers::create_user))
        .route("/users/{id}", get(handlers::get_user))
        .route("/users/{id}", patch(handlers::update_user))
        .route("/users/{id}", delete(handlers::delete_user))
        .route("/clients", get(handlers::list_clients))
        .route("/clients", post(handlers::create_client))
        .route("/clients/{id}", get(handlers::get_client))
        .route("/clients/{id}", patch(handlers::update_client))
        .route("/clients/{id}", delete(handlers::delete_client))
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/{id}", patch(handlers::update_project))
        .route("/projects/{id}", delete(handlers::delete_project))
        // Adds the record store to the application state
        .with_state(store)
}

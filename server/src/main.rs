// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use server::{cors, routes, store::Store};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

// Both overridable by env.
const DEFAULT_DB_PATH: &str = "database/db.json";
const DEFAULT_PORT: u16 = 4000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting up the server...");

    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let store = match Store::open(&db_path) {
        Ok(store) => {
            tracing::info!("Record store opened at {}.", db_path);
            store
        }
        Err(e) => {
            tracing::error!("Failed to open the record store: {:?}", e);
            std::process::exit(1);
        }
    };

    let app = routes::create_router(store)
        .layer(cors::cors_layer())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("The server listens on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

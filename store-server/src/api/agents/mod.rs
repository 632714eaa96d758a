//! Delivery Agent API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/agents", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/suspend", post(handler::suspend))
        .route("/{id}/reactivate", post(handler::reactivate))
        .route("/{id}/orders", get(handler::orders))
        .route("/{id}/earnings", get(handler::earnings))
}

//! Order API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Lifecycle operations before the catch-all {id} route
        .route("/assign-agent", post(handler::assign_agent))
        .route("/bulk-assign", put(handler::bulk_assign))
        .route("/unassign-agent", post(handler::unassign_agent))
        .route("/bulk-unassign", put(handler::bulk_unassign))
        .route("/record-delivery", post(handler::record_delivery))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status))
}

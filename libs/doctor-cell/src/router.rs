use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::DoctorState;

pub fn doctor_routes(state: Arc<DoctorState>) -> Router {
    // Browsable without an account
    let public_routes = Router::new()
        .route("/public/all", get(handlers::get_all_doctors));

    let protected_routes = Router::new()
        .route("/", get(handlers::get_all_doctors))
        .route("/verified", get(handlers::get_verified_doctors))
        .route("/specialization/{specialization}", get(handlers::get_doctors_by_specialization))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/user/{user_id}", get(handlers::get_doctor_by_user))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

pub fn admin_routes(state: Arc<DoctorState>) -> Router {
    let protected_routes = Router::new()
        .route("/doctors/{doctor_id}/verify", put(handlers::verify_doctor))
        .route("/doctors/pending", get(handlers::get_pending_doctors))
        .route("/stats", get(handlers::get_doctor_stats))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}

// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AppointmentState;

pub fn appointment_routes(state: Arc<AppointmentState>) -> Router {
    // All appointment operations require authentication
    let protected_routes = Router::new()
        .route("/book", post(handlers::book_appointment))

        // Role-scoped listings
        .route("/patient/{user_id}", get(handlers::get_patient_appointments))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_appointments))
        .route("/doctor/user/{user_id}", get(handlers::get_doctor_appointments_by_user))
        .route("/all", get(handlers::get_all_appointments)) // Admin only
        .route("/stats", get(handlers::get_appointment_stats)) // Admin only

        // Lifecycle
        .route("/{appointment_id}/confirm", put(handlers::confirm_appointment))
        .route("/{appointment_id}/cancel", put(handlers::cancel_appointment))
        .route("/{appointment_id}/complete", put(handlers::complete_appointment))

        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}

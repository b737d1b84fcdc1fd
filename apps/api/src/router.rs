use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::AppointmentState;
use doctor_cell::router::{admin_routes, doctor_routes};
use doctor_cell::DoctorState;

pub fn create_router(appointments: Arc<AppointmentState>, doctors: Arc<DoctorState>) -> Router {
    Router::new()
        .route("/", get(|| async { "MediBook API is running!" }))
        .nest("/appointments", appointment_routes(appointments))
        .nest("/doctors", doctor_routes(doctors.clone()))
        .nest("/admin", admin_routes(doctors))
}

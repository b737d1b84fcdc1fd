use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::{
    AppointmentLedger, AppointmentState, InMemoryAppointmentLedger, SupabaseAppointmentLedger,
};
use doctor_cell::{DoctorRegistry, DoctorState, InMemoryDoctorRegistry, SupabaseDoctorRegistry};
use notification_cell::{notifier_from_config, NotificationDispatcher};
use patient_cell::{InMemoryPatientRegistry, PatientRegistry, SupabasePatientRegistry};
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MediBook API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Record stores
    let (ledger, patients, doctors): (
        Arc<dyn AppointmentLedger>,
        Arc<dyn PatientRegistry>,
        Arc<dyn DoctorRegistry>,
    ) = if config.is_storage_configured() {
        info!("Using Supabase record stores at {}", config.supabase_url);
        (
            Arc::new(SupabaseAppointmentLedger::new(&config)),
            Arc::new(SupabasePatientRegistry::new(&config)),
            Arc::new(SupabaseDoctorRegistry::new(&config)),
        )
    } else {
        warn!("Supabase not configured, records are kept in memory only");
        (
            Arc::new(InMemoryAppointmentLedger::new()),
            Arc::new(InMemoryPatientRegistry::new()),
            Arc::new(InMemoryDoctorRegistry::new()),
        )
    };

    // Detached notification worker
    let (notifications, _worker) = NotificationDispatcher::spawn(
        notifier_from_config(&config),
        Duration::from_secs(config.notify_timeout_secs),
    );

    let appointment_state = Arc::new(AppointmentState::new(
        config.clone(),
        ledger,
        patients,
        doctors.clone(),
        notifications,
    ));
    let doctor_state = Arc::new(DoctorState::new(config.clone(), doctors));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(appointment_state, doctor_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

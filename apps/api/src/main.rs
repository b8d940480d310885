use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::handlers::SchedulingState;
use appointment_cell::{AppointmentBookingService, ClinicTimingTable, InMemoryAppointmentRepository};
use patient_cell::PatientRegistry;
use shared_config::AppConfig;
use therapist_cell::handlers::TherapistState;
use therapist_cell::ClinicRegistry;

/// Days of therapist calendar generated for the built-in demo roster.
const DEMO_CALENDAR_DAYS: u32 = 60;

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

    info!("Starting Therapy Clinic API server");

    // Load configuration
    let config = AppConfig::from_env();
    let timing = Arc::new(ClinicTimingTable::from_config(&config).context("Invalid clinic timing configuration")?);

    // Rosters: seed file when configured, demo data otherwise
    let (registry, patients) = match config.roster_path.as_deref() {
        Some(path) => (
            ClinicRegistry::from_file(path).with_context(|| format!("Failed to load roster {}", path))?,
            PatientRegistry::from_file(path)?,
        ),
        None => {
            info!("CLINIC_ROSTER_PATH not set, using demo roster");
            let today = Local::now().date_naive();
            (
                ClinicRegistry::demo(today, DEMO_CALENDAR_DAYS, timing.all_slots()),
                PatientRegistry::demo(),
            )
        }
    };
    let registry = Arc::new(registry);
    let patients = Arc::new(patients);

    info!(
        "Roster loaded: {} rooms, {} therapists, {} patients (gender match enforced: {})",
        registry.rooms().len(),
        registry.therapists().len(),
        patients.patients().len(),
        config.enforce_gender_match
    );

    // Create shared state
    let booking = AppointmentBookingService::new(
        Arc::new(InMemoryAppointmentRepository::new()),
        Arc::clone(&registry),
        Arc::clone(&patients),
        Arc::clone(&timing),
    );
    let scheduling = Arc::new(SchedulingState { booking });
    let roster = Arc::new(TherapistState {
        config: config.clone(),
        registry,
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(scheduling, roster, patients)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid CLINIC_BIND_ADDR '{}'", config.bind_addr))?;
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.context("Failed to bind listener")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

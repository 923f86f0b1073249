use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::{web, App, HttpServer};
use messgate::config::engine::EngineConfig;
use messgate::middleware::cors::cors_middleware;
use messgate::middleware::rate_limit::{
    api_rate_limit_config, login_rate_limit_config, scan_rate_limit_config,
};
use messgate::middleware::request_trace::RequestTrace;
use messgate::middleware::structured_logger::StructuredLogger;
use messgate::middleware::trace_span::TraceSpan;
use messgate::routes;
use messgate::state::app_state::AppState;
use messgate::state::security_config::SecurityConfig;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("MESSGATE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("MESSGATE_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ MESSGATE_PORT must be a valid port number");
            std::process::exit(1);
        });

    println!("🚀 Starting Messgate on http://{}:{}", host, port);

    let master = match std::env::var("MESSGATE_MASTER_SECRET") {
        Ok(master) => master,
        Err(_) => {
            eprintln!("❌ MESSGATE_MASTER_SECRET must be set");
            std::process::exit(1);
        }
    };
    let device_password = match std::env::var("MESSGATE_DEVICE_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            eprintln!("❌ MESSGATE_DEVICE_PASSWORD must be set");
            std::process::exit(1);
        }
    };
    let admin_password = match std::env::var("MESSGATE_ADMIN_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            eprintln!("❌ MESSGATE_ADMIN_PASSWORD must be set");
            std::process::exit(1);
        }
    };
    let security_config = SecurityConfig::new(master.as_bytes(), device_password, admin_password);

    let engine_config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::in_memory(security_config, engine_config);
    println!(
        "✅ Stores ready, signing key v{} active",
        app_state.keyring.current_version()
    );

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    // Shared limiter backends so all workers count against the same caps
    let login_backend = InMemoryBackend::builder().build();
    let scan_backend = InMemoryBackend::builder().build();
    let api_backend = InMemoryBackend::builder().build();

    HttpServer::new(move || {
        let login_limiter =
            RateLimiter::builder(login_backend.clone(), login_rate_limit_config().build())
                .add_headers()
                .build();
        let scan_limiter =
            RateLimiter::builder(scan_backend.clone(), scan_rate_limit_config().build())
                .add_headers()
                .build();
        let api_limiter =
            RateLimiter::builder(api_backend.clone(), api_rate_limit_config().build())
                .add_headers()
                .build();

        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::health::configure_routes)
            .service(
                web::scope("/api/session")
                    .wrap(login_limiter)
                    .configure(routes::session::configure_routes),
            )
            .service(
                web::scope("/api/scan")
                    .wrap(scan_limiter)
                    .configure(routes::scan::configure_routes),
            )
            .service(
                web::scope("/api")
                    .wrap(api_limiter)
                    .configure(routes::api_routes),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

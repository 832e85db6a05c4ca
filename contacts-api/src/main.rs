use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

use contacts_api::config::ApiConfig;
use contacts_api::database::Database;
use contacts_api::handlers;
use contacts_api::helpers;
use contacts_api::integrations::GooglePeopleClient;

#[get("/health")]
async fn health(db: web::Data<Arc<Database>>) -> impl Responder {
    // Test database connection
    match db.async_connection.lock().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,

    /// Path to api.toml (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(log_file_path: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("contacts-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file_path.as_deref());

    let (config, config_path) =
        ApiConfig::load(args.config.as_deref()).map_err(std::io::Error::other)?;
    tracing::info!("Loaded config from {:?}", config_path);

    let (db, db_path) = helpers::database::initialize_database(&config)
        .map_err(|e| std::io::Error::other(format!("Failed to initialize database: {e}")))?;
    tracing::info!("Database initialized at {:?}", db_path);

    let import_config = config.import;
    let google = Arc::new(GooglePeopleClient::new());
    let (host, port) = config.listen_address();

    tracing::info!("Server will listen on {}:{}", host, port);

    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = match &config.cors {
            Some(cors_config) => cors_config
                .allowed_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin)),
            None => Cors::default().allow_any_origin(),
        };
        let cors = cors
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "Authorization",
                "Accept",
                "Content-Type",
                helpers::owner::OWNER_HEADER,
                handlers::imports::GOOGLE_TOKEN_HEADER,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(import_config))
            .app_data(web::Data::new(google.clone()))
            .service(health)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
    });

    server.await
}

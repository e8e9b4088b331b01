use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use compliance_rules_engine::{
    config::Config,
    database,
    fraud::build_fraud_scorer,
    handlers,
    metrics::{register_metrics, REGISTRY},
    service::{ComplianceService, PipelineConfig},
    store::PgStore,
};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("compliance_rules_engine=info,actix_web=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    info!("Starting Compliance Rules Engine...");

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!(
        sanctions_mode = config.sanctions.mode.as_str(),
        review_threshold = config.scoring.review_threshold,
        reject_threshold = config.scoring.reject_threshold,
        "Scoring configured"
    );

    let pool = database::create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;
    database::health_check(&pool).await?;
    info!("Database health check passed");

    if config.database.apply_schema {
        database::ensure_schema(&pool)
            .await
            .context("Failed to apply database schema")?;
        info!("Database schema ensured");
    }

    register_metrics(&REGISTRY)
        .map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let store = Arc::new(PgStore::new(pool.clone()));
    let fraud_scorer = build_fraud_scorer(&config.fraud)?;
    let service = Arc::new(ComplianceService::new(
        store.clone(),
        store,
        fraud_scorer,
        PipelineConfig::from(&config),
    ));

    info!("Compliance service initialized");

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(service.clone()))
            .configure(handlers::configure_routes)
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

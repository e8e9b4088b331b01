use crate::errors::{ComplianceError, ComplianceResult};
use crate::metrics::{render, REGISTRY};
use crate::models::*;
use crate::service::ComplianceService;
use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ComplianceError::Validation(err.to_string()).into()
    }))
    .route("/health", web::get().to(health_check))
    .route("/metrics", web::get().to(metrics))
    .service(
        web::scope("/api/v1")
            .route("/validateTransaction", web::post().to(validate_transaction))
            .route("/customers/{customer_id}/risk", web::get().to(get_risk_score))
            .route("/rules", web::post().to(create_rule))
            .route("/rules", web::get().to(list_rules))
            .route("/rules/{id}", web::get().to(get_rule))
            .route("/rules/{id}", web::put().to(update_rule))
            .route("/rules/{id}", web::delete().to(delete_rule))
            .route("/sanctions", web::post().to(add_sanction))
            .route("/sanctions/{account_id}", web::delete().to(remove_sanction)),
    );
}

// ===== Health & Metrics =====
pub async fn health_check(
    service: web::Data<Arc<ComplianceService>>,
    pool: Option<web::Data<PgPool>>,
) -> HttpResponse {
    let database = match pool {
        Some(pool) => match crate::database::health_check(pool.get_ref()).await {
            Ok(()) => "connected",
            Err(_) => "disconnected",
        },
        None => "not_configured",
    };

    let health = HealthResponse {
        status: if database == "disconnected" { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        uptime_seconds: service.uptime().as_secs(),
    };

    HttpResponse::Ok().json(health)
}

pub async fn metrics() -> Result<HttpResponse, ComplianceError> {
    let body = render(&REGISTRY)
        .map_err(|e| ComplianceError::Internal(format!("Failed to render metrics: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

// ===== Transaction Validation =====
pub async fn validate_transaction(
    req: web::Json<Transaction>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    let tx = req.into_inner();
    validate_request(&tx)?;

    let decision = service.validate_transaction(&tx).await?;
    Ok(HttpResponse::Ok().json(decision))
}

fn validate_request(tx: &Transaction) -> ComplianceResult<()> {
    let required = [
        ("transactionId", &tx.transaction_id),
        ("customerId", &tx.customer_id),
        ("fromAccount", &tx.from_account),
        ("toAccount", &tx.to_account),
        ("currency", &tx.currency),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ComplianceError::Validation(format!("{} must not be empty", field)));
        }
    }

    if tx.amount <= Decimal::ZERO {
        return Err(ComplianceError::Validation("amount must be positive".to_string()));
    }

    Ok(())
}

pub async fn get_risk_score(
    customer_id: web::Path<String>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    let customer_id = customer_id.into_inner();
    if customer_id.trim().is_empty() {
        return Err(ComplianceError::Validation("customer id must not be empty".to_string()));
    }

    let risk_score = service.get_risk_score(&customer_id).await?;
    Ok(HttpResponse::Ok().json(RiskScoreResponse {
        customer_id,
        risk_score,
    }))
}

// ===== Rules =====
#[derive(Debug, Deserialize)]
pub struct ListRulesQuery {
    pub limit: Option<i64>,
}

pub async fn create_rule(
    req: web::Json<NewRule>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    let rule = service.create_rule(&req).await?;
    Ok(HttpResponse::Created().json(rule))
}

pub async fn list_rules(
    query: web::Query<ListRulesQuery>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    let rules = service.list_rules(query.limit).await?;
    Ok(HttpResponse::Ok().json(rules))
}

pub async fn get_rule(
    id: web::Path<Uuid>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    let rule = service.get_rule(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rule))
}

pub async fn update_rule(
    id: web::Path<Uuid>,
    req: web::Json<NewRule>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    let rule = service.update_rule(id.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(rule))
}

pub async fn delete_rule(
    id: web::Path<Uuid>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    service.delete_rule(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ===== Sanctions =====
pub async fn add_sanction(
    req: web::Json<NewSanction>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    let entry = service.add_sanction(&req).await?;
    Ok(HttpResponse::Created().json(entry))
}

pub async fn remove_sanction(
    account_id: web::Path<String>,
    service: web::Data<Arc<ComplianceService>>,
) -> Result<HttpResponse, ComplianceError> {
    service.remove_sanction(&account_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

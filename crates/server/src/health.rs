use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use cartwise_agent::index::ProductIndex;
use cartwise_db::{ping, DbPool};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    index: Arc<dyn ProductIndex>,
}

impl HealthState {
    pub fn new(db_pool: DbPool, index: Arc<dyn ProductIndex>) -> Self {
        Self { db_pool, index }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub index: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let index = index_check(state.index.as_ref()).await;
    let ready = database.status == "ready" && index.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "cartwise-server runtime initialized".to_string(),
        },
        database,
        index,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match ping(pool).await {
        Ok(()) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

async fn index_check(index: &dyn ProductIndex) -> HealthCheck {
    match index.count().await {
        Ok(count) => HealthCheck {
            status: "ready",
            detail: format!("collection `{}` holds {count} products", index.collection()),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("index query failed: {error}") }
        }
    }
}

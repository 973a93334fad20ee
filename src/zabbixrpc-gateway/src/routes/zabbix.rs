use crate::error::GatewayError;
use crate::models::{ConfigureRequest, ItemStatusQuery};
use crate::state::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use zabbixrpc_core::ItemStatus;

pub fn zabbix_routes() -> Router<AppState> {
    Router::new()
        .route("/api/configure", post(configure))
        .route("/api/version", get(get_version))
        .route("/api/templates", get(get_templates))
        .route("/api/items/{id}", get(get_template_items))
        .route("/api/items/{id}/status", post(update_item_status))
        .route("/api/problems", get(get_problems))
        .route("/api/alerts", get(get_alerts))
        .route("/api/inventory", get(get_inventory))
}

async fn configure(
    State(state): State<AppState>,
    Json(req): Json<ConfigureRequest>,
) -> Result<Json<Value>, GatewayError> {
    let config = req.to_config()?;
    state.configure(&config).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Connected to Zabbix API"
    })))
}

async fn get_version(State(state): State<AppState>) -> Result<Json<Value>, GatewayError> {
    let mut session = state.session().await?;
    Ok(Json(session.api_version().await?))
}

async fn get_templates(State(state): State<AppState>) -> Result<Json<Value>, GatewayError> {
    let mut session = state.session().await?;
    Ok(Json(session.get_templates().await?))
}

async fn get_template_items(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let mut session = state.session().await?;
    Ok(Json(session.get_items(&template_id).await?))
}

async fn update_item_status(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    query: Result<Query<ItemStatusQuery>, QueryRejection>,
) -> Result<Json<Value>, GatewayError> {
    let Query(query) = query.map_err(|e| GatewayError::BadRequest(e.body_text()))?;
    let status = ItemStatus::try_from(query.status).map_err(GatewayError::BadRequest)?;
    let mut session = state.session().await?;
    Ok(Json(session.update_item_status(&item_id, status).await?))
}

async fn get_problems(State(state): State<AppState>) -> Result<Json<Value>, GatewayError> {
    let mut session = state.session().await?;
    Ok(Json(session.get_problems().await?))
}

async fn get_alerts(State(state): State<AppState>) -> Result<Json<Value>, GatewayError> {
    let mut session = state.session().await?;
    Ok(Json(session.get_alerts().await?))
}

async fn get_inventory(State(state): State<AppState>) -> Result<Json<Value>, GatewayError> {
    let mut session = state.session().await?;
    Ok(Json(session.get_host_inventory().await?))
}

use crate::error::GatewayError;
use crate::models::HostRequest;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, info};
use zabbixrpc_core::{ItemStatus, RpcSession, Transport};

pub fn host_routes() -> Router<AppState> {
    Router::new().route("/api/hosts", post(create_host))
}

async fn create_host(
    State(state): State<AppState>,
    Json(req): Json<HostRequest>,
) -> Result<Json<Value>, GatewayError> {
    let mut session = state.session().await?;
    let result = provision_host(&mut *session, &req).await?;
    Ok(Json(result))
}

/// Create the host, then switch template items on or off by key.
///
/// Returns the `host.create` result.
pub async fn provision_host<T>(
    session: &mut RpcSession<T>,
    req: &HostRequest,
) -> Result<Value, GatewayError>
where
    T: Transport,
{
    let result = session.create_host(req.to_host_payload()).await?;
    info!(host = %req.hostname, "host created");

    if !req.touches_items() {
        return Ok(result);
    }

    let templates = session.get_templates().await?;
    let mut items = Vec::new();
    for name in &req.template_names {
        let template_id = find_template_id(&templates, name)
            .ok_or_else(|| GatewayError::NotFound(format!("template '{name}' not found")))?;
        if let Value::Array(found) = session.get_items(&template_id).await? {
            items.extend(found);
        }
    }

    let enabled = req.enabled_metrics.as_deref().unwrap_or_default();
    for item in &items {
        let (Some(item_id), Some(key)) = (
            item.get("itemid").and_then(Value::as_str),
            item.get("key_").and_then(Value::as_str),
        ) else {
            continue;
        };

        let status = if req.disabled_metrics.iter().any(|k| k == key) {
            ItemStatus::Disabled
        } else if enabled.iter().any(|k| k == key) {
            ItemStatus::Enabled
        } else {
            continue;
        };
        debug!(item_id, key, ?status, "updating template item");
        session.update_item_status(item_id, status).await?;
    }

    Ok(result)
}

fn find_template_id(templates: &Value, name: &str) -> Option<String> {
    templates
        .as_array()?
        .iter()
        .find(|t| t.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|t| t.get("templateid"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

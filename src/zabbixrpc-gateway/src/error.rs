use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use zabbixrpc_core::RpcError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Zabbix API not configured")]
    NotConfigured,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::NotConfigured | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Rpc(err) => match err {
                RpcError::Configuration(_) => StatusCode::BAD_REQUEST,
                RpcError::Authentication(_) => StatusCode::UNAUTHORIZED,
                RpcError::Transport(_) => StatusCode::BAD_GATEWAY,
                RpcError::Remote { .. } if err.is_session_expired() => StatusCode::UNAUTHORIZED,
                RpcError::Remote { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        } else {
            warn!("request rejected: {self}");
        }
        (status, Json(json!({"detail": self.to_string()}))).into_response()
    }
}

use crate::message::ErrorBody;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection parameters are missing or invalid, or no session exists yet.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network failure, timeout, bad HTTP status or a body that is not a
    /// JSON-RPC response.
    #[error("transport error: {0:#}")]
    Transport(#[source] anyhow::Error),

    #[error("remote error calling {method} [code={code}]: {message}")]
    Remote {
        method: String,
        code: i64,
        message: String,
        data: Option<Value>,
    },
}

// Fragments Zabbix uses when the auth token is no longer accepted.
const SESSION_EXPIRED_MARKERS: &[&str] = &[
    "session terminated",
    "re-login",
    "not authorised",
    "not authorized",
];

impl RpcError {
    pub(crate) fn remote(method: &str, body: ErrorBody) -> Self {
        Self::Remote {
            method: method.to_string(),
            code: body.code,
            message: body.message,
            data: body.data,
        }
    }

    /// True for a server error saying the token is no longer valid.
    ///
    /// The session never reacts to this on its own; callers that want a fresh
    /// login call [`crate::RpcSession::clear_token`] and try again.
    pub fn is_session_expired(&self) -> bool {
        let RpcError::Remote { message, data, .. } = self else {
            return false;
        };
        let mut text = message.to_lowercase();
        if let Some(Value::String(data)) = data {
            text.push(' ');
            text.push_str(&data.to_lowercase());
        }
        SESSION_EXPIRED_MARKERS
            .iter()
            .any(|marker| text.contains(marker))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RpcError::Remote { .. })
    }
}

pub type Result<T, E = RpcError> = std::result::Result<T, E>;

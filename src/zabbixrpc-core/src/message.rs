use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const JSONRPC_VERSION: &str = "2.0";

/// Request envelope as it goes on the wire.
///
/// `auth` is only serialized once the session holds a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Value, auth: Option<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id,
            auth,
        }
    }
}

// Untagged variants are tried in order; `Error` goes first so a body that
// carries both members is still an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcResponse {
    Error(RequestError),
    Ok(RequestResult),
}

impl RpcResponse {
    pub fn id(&self) -> Option<u64> {
        match self {
            RpcResponse::Ok(result) => result.id,
            RpcResponse::Error(error) => error.id,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, RpcResponse::Ok(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RpcResponse::Error(_))
    }
}

// Servers and mocks are not consistent about echoing `id`, so it is optional
// on the way back in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub result: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub error: ErrorBody,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorBody {
    /// The most specific human readable text the server sent.
    ///
    /// Zabbix puts the useful part ("Incorrect user name or password...") in
    /// `data` and a generic "Invalid params." in `message`.
    pub fn detail(&self) -> String {
        match &self.data {
            Some(Value::String(data)) if !data.is_empty() => data.clone(),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[code={}] {}", self.code, self.message)?;
        if let Some(Value::String(data)) = &self.data {
            write!(f, ": {}", data)?;
        }
        Ok(())
    }
}

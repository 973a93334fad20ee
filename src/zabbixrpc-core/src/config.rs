use crate::error::{Result, RpcError};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to open a session against one Zabbix endpoint.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub url: Url,
    pub credentials: Credentials,
    pub http_proxy: Option<Url>,
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(url: &str, username: &str, password: &str) -> Result<Self> {
        let url = parse_url("url", url)?;
        if username.trim().is_empty() {
            return Err(RpcError::Configuration("username is required".to_string()));
        }
        if password.is_empty() {
            return Err(RpcError::Configuration("password is required".to_string()));
        }

        Ok(Self {
            url,
            credentials: Credentials::new(username, password),
            http_proxy: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_proxy(mut self, proxy: &str) -> Result<Self> {
        self.http_proxy = Some(parse_url("http_proxy", proxy)?);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(RpcError::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        self.timeout = timeout;
        Ok(self)
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RpcError::Configuration(format!("{field} is required")));
    }
    let url = Url::parse(value)
        .map_err(|e| RpcError::Configuration(format!("invalid {field} '{value}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RpcError::Configuration(format!(
            "unsupported {field} scheme '{other}'"
        ))),
    }
}

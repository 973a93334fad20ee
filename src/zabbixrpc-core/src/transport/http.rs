use crate::config::ConnectionConfig;
use crate::error::{Result, RpcError};
use crate::transport::Transport;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::trace;
use url::Url;

pub const CONTENT_TYPE_JSON_RPC: &str = "application/json-rpc";

/// POSTs each request body to the Zabbix endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
}

impl HttpTransport {
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.timeout);
        if let Some(proxy) = &config.http_proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| RpcError::Configuration(format!("invalid http_proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| RpcError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, body: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON_RPC))
            .body(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.url))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .context("failed to read response body")?;
        trace!(%status, len = bytes.len(), "received response");

        if !status.is_success() {
            return Err(anyhow!(
                "unexpected HTTP status {status}: {}",
                String::from_utf8_lossy(&bytes)
            ));
        }
        Ok(bytes.to_vec())
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::Duration;
use zabbixrpc_core::{ConnectionConfig, RpcError};

pub const AGENT_PORT: &str = "10050";

/// Body of `POST /api/configure`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigureRequest {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub http_proxy: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl ConfigureRequest {
    pub fn to_config(&self) -> Result<ConnectionConfig, RpcError> {
        let mut config = ConnectionConfig::new(&self.url, &self.username, &self.password)?;
        if let Some(proxy) = self.http_proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            config = config.with_proxy(proxy)?;
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs))?;
        }
        Ok(config)
    }
}

/// Body of `POST /api/hosts`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HostRequest {
    pub hostname: String,
    pub ip_address: String,
    pub template_names: Vec<String>,
    pub group_name: String,
    #[serde(default)]
    pub proxy_name: Option<String>,
    /// Item keys to disable on the linked templates.
    #[serde(default)]
    pub disabled_metrics: Vec<String>,
    /// Item keys to enable on the linked templates.
    #[serde(default)]
    pub enabled_metrics: Option<Vec<String>>,
    #[serde(default)]
    pub macros: Option<BTreeMap<String, String>>,
}

impl HostRequest {
    /// `host.create` parameters: one agent interface, group and templates
    /// referenced by name.
    pub fn to_host_payload(&self) -> Value {
        let mut host = json!({
            "host": self.hostname,
            "interfaces": [{
                "type": 1,
                "main": 1,
                "useip": 1,
                "ip": self.ip_address,
                "dns": "",
                "port": AGENT_PORT,
            }],
            "groups": [{"name": self.group_name}],
            "templates": self
                .template_names
                .iter()
                .map(|name| json!({"name": name}))
                .collect::<Vec<_>>(),
        });

        if let Some(proxy) = &self.proxy_name {
            host["proxy_hostid"] = json!(proxy);
        }
        if let Some(macros) = &self.macros {
            host["macros"] = macros
                .iter()
                .map(|(macro_name, value)| json!({"macro": macro_name, "value": value}))
                .collect();
        }
        host
    }

    pub fn touches_items(&self) -> bool {
        !self.disabled_metrics.is_empty()
            || self.enabled_metrics.as_ref().is_some_and(|m| !m.is_empty())
    }
}

/// Query of `POST /api/items/{item_id}/status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct ItemStatusQuery {
    /// 0 enables the item, 1 disables it.
    pub status: u8,
}

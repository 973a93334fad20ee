//! Named Zabbix API operations.
//!
//! Each one is a plain [`RpcSession::call`] with a fixed method name and a
//! shaped parameter document. Results are handed back as the server sent them.

use crate::error::{Result, RpcError};
use crate::session::RpcSession;
use crate::transport::Transport;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ItemStatus {
    Enabled,
    Disabled,
}

impl From<ItemStatus> for u8 {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Enabled => 0,
            ItemStatus::Disabled => 1,
        }
    }
}

impl TryFrom<u8> for ItemStatus {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ItemStatus::Enabled),
            1 => Ok(ItemStatus::Disabled),
            other => Err(format!("item status must be 0 or 1, got {other}")),
        }
    }
}

/// One value for `history.push`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryValue {
    pub itemid: String,
    pub value: String,
    pub clock: i64,
    pub ns: i64,
}

/// Pull the first id out of a `*.create` result such as
/// `{"hostids": ["10084"]}`.
pub fn first_created_id(result: &Value, key: &str) -> Result<String> {
    result
        .get(key)
        .and_then(Value::as_array)
        .and_then(|ids| ids.first())
        .and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| RpcError::Transport(anyhow!("create result has no '{key}': {result}")))
}

impl<T> RpcSession<T>
where
    T: Transport,
{
    pub async fn api_version(&mut self) -> Result<Value> {
        self.call_unauthenticated("apiinfo.version", json!({})).await
    }

    pub async fn get_templates(&mut self) -> Result<Value> {
        self.call(
            "template.get",
            json!({
                "output": ["templateid", "name", "description"],
                "selectItems": ["itemid", "name", "key_", "status"],
            }),
        )
        .await
    }

    pub async fn get_items(&mut self, template_id: &str) -> Result<Value> {
        self.call(
            "item.get",
            json!({
                "output": ["itemid", "name", "key_", "status"],
                "templateids": [template_id],
            }),
        )
        .await
    }

    pub async fn update_item_status(&mut self, item_id: &str, status: ItemStatus) -> Result<Value> {
        self.call(
            "item.update",
            json!({
                "itemid": item_id,
                "status": status,
            }),
        )
        .await
    }

    pub async fn create_host(&mut self, host: Value) -> Result<Value> {
        self.call("host.create", host).await
    }

    pub async fn get_problems(&mut self) -> Result<Value> {
        self.call(
            "problem.get",
            json!({
                "output": "extend",
                "selectAcknowledges": "extend",
                "recent": true,
                "sortfield": ["eventid"],
                "sortorder": "DESC",
            }),
        )
        .await
    }

    /// Triggers currently in the problem state, newest first.
    pub async fn get_alerts(&mut self) -> Result<Value> {
        self.call(
            "trigger.get",
            json!({
                "output": ["triggerid", "description", "priority", "value", "lastchange"],
                "selectHosts": ["hostid", "name"],
                "selectItems": ["itemid", "name"],
                "filter": {"value": 1},
                "sortfield": "lastchange",
                "sortorder": "DESC",
                "limit": 100,
            }),
        )
        .await
    }

    pub async fn get_host_inventory(&mut self) -> Result<Value> {
        self.call(
            "host.get",
            json!({
                "output": ["hostid", "name", "status"],
                "selectInventory": true,
                "selectInterfaces": true,
            }),
        )
        .await
    }

    pub async fn get_host_groups(&mut self) -> Result<Value> {
        self.call("hostgroup.get", json!({"output": ["groupid", "name"]}))
            .await
    }

    pub async fn create_host_group(&mut self, name: &str) -> Result<Value> {
        self.call("hostgroup.create", json!({"name": name})).await
    }

    pub async fn get_hosts(&mut self) -> Result<Value> {
        self.call("host.get", json!({"output": ["hostid", "host", "name"]}))
            .await
    }

    pub async fn create_item(&mut self, item: Value) -> Result<Value> {
        self.call("item.create", item).await
    }

    pub async fn create_trigger(&mut self, trigger: Value) -> Result<Value> {
        self.call("trigger.create", trigger).await
    }

    /// Items whose key starts with `prefix`, with their owning hosts.
    pub async fn search_items_by_key(&mut self, prefix: &str) -> Result<Value> {
        self.call(
            "item.get",
            json!({
                "output": ["itemid", "name", "key_", "hostid"],
                "search": {"key_": prefix},
                "startSearch": true,
                "searchWildcardsEnabled": true,
                "selectHosts": ["hostid", "host", "name"],
            }),
        )
        .await
    }

    pub async fn push_history(&mut self, values: &[HistoryValue]) -> Result<Value> {
        self.call_as("history.push", values).await
    }

    pub async fn set_item_last_value(
        &mut self,
        item_id: &str,
        value: &str,
        previous: &str,
    ) -> Result<Value> {
        self.call(
            "item.update",
            json!({
                "itemid": item_id,
                "lastvalue": value,
                "prevvalue": previous,
            }),
        )
        .await
    }
}

use super::AlarmError;
use super::catalog::ALERT_KEY_PREFIX;
use super::inject::unix_now;
use rand::seq::IndexedRandom;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};
use zabbixrpc_core::{HistoryValue, RpcSession, Transport};

#[derive(Debug, Clone)]
pub struct ActivateOptions {
    /// Upper bound on the number of alarms fired.
    pub count: usize,
    pub pause: Duration,
}

impl Default for ActivateOptions {
    fn default() -> Self {
        Self {
            count: 10,
            pause: Duration::from_secs(1),
        }
    }
}

/// Item ids by the way they were fired.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActivateSummary {
    pub candidates: usize,
    pub pushed: Vec<String>,
    pub updated: Vec<String>,
    pub failed: Vec<String>,
}

/// Fire a random subset of the alert items created by
/// [`inject_alarms`](super::inject_alarms).
///
/// Each chosen item gets the value 1 through `history.push`; when that is
/// refused the item's last value is overwritten with `item.update` instead.
/// Per-item failures are logged and recorded in the summary.
pub async fn activate_alarms<T>(
    session: &mut RpcSession<T>,
    options: &ActivateOptions,
) -> Result<ActivateSummary, AlarmError>
where
    T: Transport,
{
    if !session.is_authenticated() {
        session.login().await?;
    }

    let items = match session.search_items_by_key(ALERT_KEY_PREFIX).await? {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    info!(count = items.len(), "found alert items");
    if items.is_empty() {
        return Err(AlarmError::NoAlertItems);
    }

    let selected: Vec<Value> = {
        let mut rng = rand::rng();
        items
            .choose_multiple(&mut rng, options.count)
            .cloned()
            .collect()
    };

    let mut summary = ActivateSummary {
        candidates: items.len(),
        ..Default::default()
    };
    for (i, item) in selected.iter().enumerate() {
        if i > 0 && !options.pause.is_zero() {
            tokio::time::sleep(options.pause).await;
        }

        let Some(item_id) = item.get("itemid").and_then(Value::as_str) else {
            warn!("alert item without itemid: {item}");
            continue;
        };
        let host = item
            .pointer("/hosts/0/host")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>");
        let name = item.get("name").and_then(Value::as_str).unwrap_or(item_id);
        info!(item = name, host, "activating alert");

        let value = HistoryValue {
            itemid: item_id.to_string(),
            value: "1".to_string(),
            clock: unix_now(),
            ns: 0,
        };
        match session.push_history(&[value]).await {
            Ok(_) => summary.pushed.push(item_id.to_string()),
            Err(err) => {
                warn!(item_id, "history push failed, falling back to item.update: {err}");
                match session.set_item_last_value(item_id, "1", "0").await {
                    Ok(_) => summary.updated.push(item_id.to_string()),
                    Err(err) => {
                        error!(item_id, "could not activate alert: {err}");
                        summary.failed.push(item_id.to_string());
                    }
                }
            }
        }
    }

    info!(
        pushed = summary.pushed.len(),
        updated = summary.updated.len(),
        failed = summary.failed.len(),
        "alarm activation finished"
    );
    Ok(summary)
}

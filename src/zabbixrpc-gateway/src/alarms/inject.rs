use super::AlarmError;
use super::catalog::{ALERT_KEY_PREFIX, MockAlert};
use crate::models::AGENT_PORT;
use rand::Rng;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use zabbixrpc_core::{RpcError, RpcSession, Transport, first_created_id};

const ITEM_TYPE_TRAPPER: u8 = 2;
const VALUE_TYPE_UNSIGNED: u8 = 3;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InjectSummary {
    pub groups_created: Vec<String>,
    pub hosts_created: Vec<String>,
    pub hosts_reused: Vec<String>,
    pub items_created: usize,
    pub triggers_created: usize,
    pub alerts_skipped: usize,
}

/// Materialize `alerts` in Zabbix.
///
/// Alerts are grouped by service, component and host in catalog order. Each
/// service gets a `"<service> Service"` host group, each host is created once,
/// and each alert becomes a trapper item plus a trigger firing on value 1.
/// Existing groups and hosts are reused. A failure while creating one
/// alert's item or trigger is logged and the alert skipped; any other failure
/// aborts the run.
pub async fn inject_alarms<T>(
    session: &mut RpcSession<T>,
    alerts: &[MockAlert],
) -> Result<InjectSummary, AlarmError>
where
    T: Transport,
{
    if !session.is_authenticated() {
        session.login().await?;
    }

    let mut groups = index_by_name(&session.get_host_groups().await?, "name", "groupid");
    let mut hosts = index_by_name(&session.get_hosts().await?, "host", "hostid");
    let mut summary = InjectSummary::default();

    for (service, service_alerts) in group_by(alerts, MockAlert::service) {
        let group_name = format!("{service} Service");
        let group_id = match groups.get(&group_name) {
            Some(id) => id.clone(),
            None => {
                info!(group = %group_name, "creating host group");
                let result = session.create_host_group(&group_name).await?;
                let id = first_created_id(&result, "groupids")?;
                groups.insert(group_name.clone(), id.clone());
                summary.groups_created.push(group_name);
                id
            }
        };

        for (component, component_alerts) in group_by(service_alerts, MockAlert::component) {
            for (host_name, host_alerts) in group_by(component_alerts, |a| a.host_name) {
                let host_id = match hosts.get(host_name) {
                    Some(id) => {
                        info!(host = host_name, id = %id, "reusing existing host");
                        summary.hosts_reused.push(host_name.to_string());
                        id.clone()
                    }
                    None => {
                        info!(host = host_name, "creating host");
                        let payload = host_payload(host_name, component, &group_id, host_alerts[0]);
                        let result = session.create_host(payload).await?;
                        let id = first_created_id(&result, "hostids")?;
                        hosts.insert(host_name.to_string(), id.clone());
                        summary.hosts_created.push(host_name.to_string());
                        id
                    }
                };

                for alert in host_alerts {
                    if let Err(err) =
                        create_alert(session, host_name, &host_id, alert, &mut summary).await
                    {
                        warn!(alert = alert.description, "skipping alert: {err}");
                        summary.alerts_skipped += 1;
                    }
                }
            }
        }
    }

    info!(
        groups = summary.groups_created.len(),
        hosts = summary.hosts_created.len(),
        items = summary.items_created,
        triggers = summary.triggers_created,
        skipped = summary.alerts_skipped,
        "alarm injection finished"
    );
    Ok(summary)
}

async fn create_alert<T>(
    session: &mut RpcSession<T>,
    host_name: &str,
    host_id: &str,
    alert: &MockAlert,
    summary: &mut InjectSummary,
) -> Result<(), RpcError>
where
    T: Transport,
{
    let key = alert_item_key();
    let item = session
        .create_item(json!({
            "name": format!("Alert: {}", alert.description),
            "key_": key,
            "hostid": host_id,
            "type": ITEM_TYPE_TRAPPER,
            "value_type": VALUE_TYPE_UNSIGNED,
            "delay": 0,
        }))
        .await?;
    let item_id = first_created_id(&item, "itemids")?;
    summary.items_created += 1;
    info!(item_id = %item_id, key = %key, "item created");

    let trigger = session
        .create_trigger(json!({
            "description": alert.description,
            "expression": format!("last(/{host_name}/{key})=1"),
            "priority": alert.priority,
            "tags": alert.zabbix_tags(),
        }))
        .await?;
    let trigger_id = first_created_id(&trigger, "triggerids")?;
    summary.triggers_created += 1;
    info!(trigger_id = %trigger_id, "trigger created");
    Ok(())
}

fn host_payload(host_name: &str, component: &str, group_id: &str, first: &MockAlert) -> Value {
    json!({
        "host": host_name,
        "name": format!("{host_name} ({component})"),
        "interfaces": [{
            "type": 1,
            "main": 1,
            "useip": 1,
            "ip": first.host_ip,
            "dns": "",
            "port": AGENT_PORT,
        }],
        "groups": [{"groupid": group_id}],
        "tags": first.zabbix_tags(),
    })
}

fn alert_item_key() -> String {
    let suffix: u16 = rand::rng().random_range(0..1000);
    format!("{ALERT_KEY_PREFIX}{}.{suffix}", unix_now())
}

pub(super) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// `name_field -> id_field` over a `*.get` result list.
fn index_by_name(list: &Value, name_field: &str, id_field: &str) -> HashMap<String, String> {
    list.as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let name = entry.get(name_field)?.as_str()?;
            let id = entry.get(id_field)?.as_str()?;
            Some((name.to_string(), id.to_string()))
        })
        .collect()
}

/// Group by `key`, keeping first-seen order of both groups and members.
fn group_by<'a, I, F>(alerts: I, key: F) -> Vec<(&'static str, Vec<&'a MockAlert>)>
where
    I: IntoIterator<Item = &'a MockAlert>,
    F: Fn(&MockAlert) -> &'static str,
{
    let mut groups: Vec<(&'static str, Vec<&'a MockAlert>)> = Vec::new();
    for alert in alerts {
        let k = key(alert);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(alert),
            None => groups.push((k, vec![alert])),
        }
    }
    groups
}

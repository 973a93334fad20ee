//! Demo data: mock alarms injected into Zabbix and fired on demand.

mod activate;
mod catalog;
mod inject;

pub use activate::{ActivateOptions, ActivateSummary, activate_alarms};
pub use catalog::{ALERT_KEY_PREFIX, MOCK_ALERTS, MockAlert};
pub use inject::{InjectSummary, inject_alarms};

use thiserror::Error;
use zabbixrpc_core::RpcError;

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("no alert items found, run inject-alarms first")]
    NoAlertItems,

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

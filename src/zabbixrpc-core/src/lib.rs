mod config;
mod error;
mod message;
mod session;
pub mod transport;
pub mod zabbix;

pub use config::{ConnectionConfig, Credentials, DEFAULT_TIMEOUT};
pub use error::{Result, RpcError};
pub use message::*;
pub use session::{LOGIN_METHOD, RpcSession};
pub use transport::Transport;
pub use transport::http::{CONTENT_TYPE_JSON_RPC, HttpTransport};
pub use transport::memory::MemoryTransport;
pub use zabbix::{HistoryValue, ItemStatus, first_created_id};

pub mod alarms;
pub mod cli;
pub mod routes;
pub mod server;
pub mod state;

mod error;
mod models;

pub use error::GatewayError;
pub use models::{AGENT_PORT, ConfigureRequest, HostRequest, ItemStatusQuery};
pub use server::{router, serve};
pub use state::{AppState, ZabbixSession};

use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use zabbixrpc_core::{ConnectionConfig, RpcError};

#[derive(Debug, Parser)]
#[command(name = "zabbixrpc", version, about = "REST gateway and demo tooling for the Zabbix API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the REST gateway.
    Serve(ServeArgs),
    /// Create mock host groups, hosts, items and triggers.
    InjectAlarms(ConnectionArgs),
    /// Push values that fire a random subset of the injected alarms.
    ActivateAlarms(ActivateArgs),
}

/// Zabbix connection, usually supplied through the environment.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// JSON-RPC endpoint, e.g. http://zabbix/api_jsonrpc.php
    #[arg(long = "zabbix-url", env = "ZABBIX_API_URL")]
    pub url: Option<String>,

    #[arg(long, env = "ZABBIX_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "ZABBIX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "ZABBIX_HTTP_PROXY")]
    pub http_proxy: Option<String>,

    /// Per-call timeout in seconds.
    #[arg(long, env = "ZABBIX_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,
}

impl ConnectionArgs {
    /// True when any connection parameter was given.
    pub fn is_set(&self) -> bool {
        self.url.is_some() || self.username.is_some() || self.password.is_some()
    }

    pub fn to_config(&self) -> Result<ConnectionConfig, RpcError> {
        let url = require(&self.url, "ZABBIX_API_URL")?;
        let username = require(&self.username, "ZABBIX_USERNAME")?;
        let password = require(&self.password, "ZABBIX_PASSWORD")?;

        let mut config = ConnectionConfig::new(url, username, password)?;
        if let Some(proxy) = &self.http_proxy {
            config = config.with_proxy(proxy)?;
        }
        config.with_timeout(Duration::from_secs(self.timeout))
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, RpcError> {
    value
        .as_deref()
        .ok_or_else(|| RpcError::Configuration(format!("{name} is not set")))
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ActivateArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// How many alarms to fire at most.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Pause between two activations, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub pause_ms: u64,
}

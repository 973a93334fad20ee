use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};
use zabbixrpc_core::RpcSession;
use zabbixrpc_gateway::alarms::{ActivateOptions, MOCK_ALERTS, activate_alarms, inject_alarms};
use zabbixrpc_gateway::cli::{Cli, Command};
use zabbixrpc_gateway::{AppState, serve};

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            let state = AppState::new();
            if args.connection.is_set() {
                let config = args.connection.to_config()?;
                // the gateway can still be configured later through /api/configure
                if let Err(err) = state.configure(&config).await {
                    warn!("initial Zabbix login failed: {err}");
                }
            }
            serve(args.addr(), state).await?;
        }
        Command::InjectAlarms(connection) => {
            let mut session = RpcSession::connect(&connection.to_config()?)?;
            let summary = inject_alarms(&mut session, MOCK_ALERTS).await?;
            info!(?summary, "alarms injected");
        }
        Command::ActivateAlarms(args) => {
            let mut session = RpcSession::connect(&args.connection.to_config()?)?;
            let options = ActivateOptions {
                count: args.count,
                pause: Duration::from_millis(args.pause_ms),
            };
            let summary = activate_alarms(&mut session, &options).await?;
            info!(?summary, "alarms activated");
        }
    }

    Ok(())
}

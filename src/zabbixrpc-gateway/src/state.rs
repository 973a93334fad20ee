use crate::error::GatewayError;
use std::sync::Arc;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::info;
use zabbixrpc_core::{ConnectionConfig, HttpTransport, RpcError, RpcSession};

pub type ZabbixSession = RpcSession<HttpTransport>;

/// Shared gateway state: at most one configured session.
///
/// The mutex is held for a whole remote call, so the session's id counter and
/// token are never touched by two requests at once.
#[derive(Clone, Default)]
pub struct AppState {
    session: Arc<Mutex<Option<ZabbixSession>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: ZabbixSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(Some(session))),
        }
    }

    /// Open a session, log in, and make it the active one.
    ///
    /// The previous session stays in place when this fails.
    pub async fn configure(&self, config: &ConnectionConfig) -> Result<(), RpcError> {
        let mut session = RpcSession::connect(config)?;
        session.login().await?;

        info!(url = %config.url, "Zabbix session configured");
        self.session.lock().await.replace(session);
        Ok(())
    }

    pub async fn is_configured(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Exclusive access to the active session.
    pub async fn session(&self) -> Result<MappedMutexGuard<'_, ZabbixSession>, GatewayError> {
        let guard = self.session.lock().await;
        MutexGuard::try_map(guard, Option::as_mut).map_err(|_| GatewayError::NotConfigured)
    }
}

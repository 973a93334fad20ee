use crate::routes::{health_routes, host_routes, schema_routes, zabbix_routes};
use crate::state::AppState;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(zabbix_routes())
        .merge(host_routes())
        .with_state(state)
        .merge(health_routes())
        .merge(schema_routes())
        .layer(CorsLayer::permissive())
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting Zabbix gateway on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

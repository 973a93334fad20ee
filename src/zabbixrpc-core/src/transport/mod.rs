use async_trait::async_trait;

pub mod http;
pub mod memory;

/// One encoded request in, one encoded response out.
///
/// Implementations report every failure through `anyhow`; the session maps
/// them onto its own error kinds.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn exchange(&self, body: Vec<u8>) -> anyhow::Result<Vec<u8>>;
}

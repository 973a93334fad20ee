use crate::message::RpcRequest;
use crate::transport::Transport;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

type Responder = dyn Fn(&RpcRequest) -> anyhow::Result<Value> + Send + Sync;

/// In-process backend: decodes each request, hands it to a responder closure
/// and encodes whatever response document the closure returns.
///
/// Every decoded request is kept so tests can inspect what went on the wire.
/// Clones share the same log.
#[derive(Clone)]
pub struct MemoryTransport {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<RpcRequest>>>,
}

impl MemoryTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&RpcRequest) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn requests_for(&self, method: &str) -> Vec<RpcRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|req| req.method == method)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn exchange(&self, body: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        let request: RpcRequest =
            serde_json::from_slice(&body).context("memory transport got a malformed request")?;
        self.requests.lock().await.push(request.clone());

        let response = (self.responder)(&request)?;
        Ok(serde_json::to_vec(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_transport_records_requests() -> anyhow::Result<()> {
        let transport = MemoryTransport::new(|req| Ok(json!({"result": req.method})));
        let body = serde_json::to_vec(&RpcRequest::new(1, "host.get", json!({}), None))?;

        let reply = transport.exchange(body).await?;
        let reply: Value = serde_json::from_slice(&reply)?;

        assert_eq!(reply, json!({"result": "host.get"}));
        assert_eq!(transport.requests().await.len(), 1);
        assert_eq!(transport.requests_for("host.get").await[0].id, 1);
        assert!(transport.requests_for("item.get").await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_transport_rejects_garbage() {
        let transport = MemoryTransport::new(|_| Ok(Value::Null));
        assert!(transport.exchange(b"nope".to_vec()).await.is_err());
        assert!(transport.requests().await.is_empty());
    }
}

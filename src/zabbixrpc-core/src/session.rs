use crate::config::{ConnectionConfig, Credentials};
use crate::error::{Result, RpcError};
use crate::message::{ErrorBody, RpcRequest, RpcResponse};
use crate::transport::Transport;
use crate::transport::http::HttpTransport;
use anyhow::anyhow;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, trace};

pub const LOGIN_METHOD: &str = "user.login";

/// A JSON-RPC conversation with one Zabbix endpoint.
///
/// Logs in lazily on the first authenticated call and reuses the token for
/// every call after that. Each request put on the wire, login included, takes
/// the next id from a counter that starts at 1 and is never rewound, so ids
/// stay unique even when calls fail.
///
/// All calls take `&mut self`; share a session behind a mutex or give each
/// caller its own.
pub struct RpcSession<T>
where
    T: Transport,
{
    transport: T,
    credentials: Credentials,
    timeout: Duration,
    token: Option<String>,
    next_id: u64,
}

impl RpcSession<HttpTransport> {
    /// Session over HTTP. Nothing is sent until the first call.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(transport, config.credentials.clone(), config.timeout))
    }
}

impl<T> RpcSession<T>
where
    T: Transport,
{
    pub fn new(transport: T, credentials: Credentials, timeout: Duration) -> Self {
        Self {
            transport,
            credentials,
            timeout,
            token: None,
            next_id: 1,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Forget the token so the next authenticated call logs in again.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Id the next request will carry.
    pub fn next_request_id(&self) -> u64 {
        self.next_id
    }

    /// Authenticate with the configured credentials and keep the token.
    ///
    /// Any failure, including transport errors, is reported as
    /// [`RpcError::Authentication`]. Nothing is retried.
    pub async fn login(&mut self) -> Result<String> {
        info!(username = %self.credentials.username, "logging in");
        let params = json!({
            "user": self.credentials.username,
            "password": self.credentials.password,
        });

        let token = match self.send(LOGIN_METHOD, params, None).await {
            Ok(Ok(Value::String(token))) => token,
            Ok(Ok(other)) => {
                return Err(RpcError::Authentication(format!(
                    "expected a session token, got {other}"
                )));
            }
            Ok(Err(body)) => return Err(RpcError::Authentication(body.detail())),
            Err(err) => return Err(RpcError::Authentication(err.to_string())),
        };

        debug!("login succeeded");
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Call `method` with `params`, logging in first when no token is held.
    ///
    /// Returns the `result` member untouched, or [`RpcError::Remote`] when the
    /// server answered with an error object.
    pub async fn call(&mut self, method: &str, params: Value) -> Result<Value> {
        if self.token.is_none() {
            self.login().await?;
        }
        let auth = self.token.clone();
        self.send(method, params, auth)
            .await?
            .map_err(|body| RpcError::remote(method, body))
    }

    /// Call without a token and without triggering a login.
    ///
    /// Zabbix refuses `auth` on a few methods such as `apiinfo.version`.
    pub async fn call_unauthenticated(&mut self, method: &str, params: Value) -> Result<Value> {
        self.send(method, params, None)
            .await?
            .map_err(|body| RpcError::remote(method, body))
    }

    /// [`call`](Self::call) with serde on both ends.
    pub async fn call_as<P, R>(&mut self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params).map_err(|e| {
            let context = format!("failed to encode {method} params");
            RpcError::Transport(anyhow::Error::new(e).context(context))
        })?;
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(|e| {
            let context = format!("unexpected {method} result");
            RpcError::Transport(anyhow::Error::new(e).context(context))
        })
    }

    // Outer error: the exchange itself failed. Inner error: the server sent
    // an error object.
    async fn send(
        &mut self,
        method: &str,
        params: Value,
        auth: Option<String>,
    ) -> Result<std::result::Result<Value, ErrorBody>> {
        let id = self.next_id;
        self.next_id += 1;

        let request = RpcRequest::new(id, method, params, auth);
        debug!(method, id, "sending request");
        let body = serde_json::to_vec(&request).map_err(|e| RpcError::Transport(e.into()))?;

        let reply = time::timeout(self.timeout, self.transport.exchange(body))
            .await
            .map_err(|_| {
                RpcError::Transport(anyhow!("{method} timed out after {:?}", self.timeout))
            })?
            .map_err(RpcError::Transport)?;
        trace!(method, id, body = %String::from_utf8_lossy(&reply), "raw response");

        let response: RpcResponse = serde_json::from_slice(&reply).map_err(|e| {
            RpcError::Transport(
                anyhow::Error::new(e).context(format!("malformed response to {method}")),
            )
        })?;
        if let Some(reply_id) = response.id() {
            if reply_id != id {
                return Err(RpcError::Transport(anyhow!(
                    "response id {reply_id} does not match request id {id} for {method}"
                )));
            }
        }

        match response {
            RpcResponse::Ok(ok) => Ok(Ok(ok.result)),
            RpcResponse::Error(err) => {
                debug!(method, id, code = err.error.code, "server returned an error");
                Ok(Err(err.error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;
    use async_trait::async_trait;
    use serde::Deserialize;

    fn backend() -> MemoryTransport {
        MemoryTransport::new(|req| {
            Ok(match req.method.as_str() {
                "user.login" => json!({"jsonrpc": "2.0", "result": "TOKEN123", "id": req.id}),
                "item.update" => json!({
                    "jsonrpc": "2.0",
                    "error": {"code": -32602, "message": "Invalid params"},
                    "id": req.id
                }),
                _ => json!({"jsonrpc": "2.0", "result": req.params, "id": req.id}),
            })
        })
    }

    fn session(transport: MemoryTransport) -> RpcSession<MemoryTransport> {
        RpcSession::new(
            transport,
            Credentials::new("Admin", "zabbix"),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_login_then_call_carries_token() {
        let transport = backend();
        let mut s = session(transport.clone());

        let token = s.login().await.expect("login failed");
        assert_eq!(token, "TOKEN123");
        assert_eq!(s.token(), Some("TOKEN123"));

        s.call("template.get", json!({})).await.expect("call failed");

        let sent = transport.requests().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].method, "user.login");
        assert_eq!(sent[0].auth, None);
        assert_eq!(sent[0].params, json!({"user": "Admin", "password": "zabbix"}));
        assert_eq!(sent[1].method, "template.get");
        assert_eq!(sent[1].auth.as_deref(), Some("TOKEN123"));
    }

    #[tokio::test]
    async fn test_remote_error_carries_method_and_code() {
        let mut s = session(backend());

        let err = s
            .call("item.update", json!({"itemid": "5", "status": 1}))
            .await
            .unwrap_err();

        match err {
            RpcError::Remote {
                method,
                code,
                message,
                ..
            } => {
                assert_eq!(method, "item.update");
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid params");
            }
            other => panic!("expected a remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_member_wins_over_result_member() {
        let transport = MemoryTransport::new(|req| {
            Ok(match req.method.as_str() {
                "user.login" => json!({"result": "TOKEN123", "id": req.id}),
                _ => json!({
                    "jsonrpc": "2.0",
                    "result": null,
                    "error": {"code": -32602, "message": "Invalid params"},
                    "id": req.id
                }),
            })
        });
        let mut s = session(transport);

        let res = s
            .call("item.update", json!({"itemid": "5", "status": 1}))
            .await;

        match res {
            Err(RpcError::Remote { method, code, .. }) => {
                assert_eq!(method, "item.update");
                assert_eq!(code, -32602);
            }
            other => panic!("expected a remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_consecutive_ids_differ_by_one() {
        let transport = backend();
        let mut s = session(transport.clone());

        s.call("host.get", json!({})).await.unwrap();
        s.call("host.get", json!({})).await.unwrap();

        let ids: Vec<u64> = transport
            .requests_for("host.get")
            .await
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1], ids[0] + 1);
    }

    #[tokio::test]
    async fn test_ids_strictly_increase_across_failures() {
        let transport = backend();
        let mut s = session(transport.clone());

        for i in 0..10 {
            let method = if i % 3 == 0 { "item.update" } else { "host.get" };
            let _ = s.call(method, json!({"n": i})).await;
        }

        let ids: Vec<u64> = transport.requests().await.iter().map(|r| r.id).collect();
        // one login plus ten calls
        assert_eq!(ids, (1..=11).collect::<Vec<_>>());
        assert_eq!(s.next_request_id(), 12);
    }

    #[tokio::test]
    async fn test_login_happens_once() {
        let transport = backend();
        let mut s = session(transport.clone());

        for _ in 0..5 {
            s.call("problem.get", json!({})).await.unwrap();
        }
        let _ = s.call("item.update", json!({})).await;
        s.call("problem.get", json!({})).await.unwrap();

        assert_eq!(transport.requests_for("user.login").await.len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_login_suppresses_lazy_login() {
        let transport = backend();
        let mut s = session(transport.clone());

        s.login().await.unwrap();
        s.call("host.get", json!({})).await.unwrap();

        assert_eq!(transport.requests_for("user.login").await.len(), 1);
    }

    #[tokio::test]
    async fn test_result_passes_through_unchanged() {
        let mut s = session(backend());
        let params = json!({
            "output": ["hostid", "name"],
            "filter": {"value": 1, "nested": [{"a": null}, [true, 1.5, "x"]]},
            "limit": 100
        });

        let result = s.call("trigger.get", params.clone()).await.unwrap();
        assert_eq!(result, params);

        let result = s.call("history.push", json!([1, [2, 3], {}])).await.unwrap();
        assert_eq!(result, json!([1, [2, 3], {}]));
    }

    #[tokio::test]
    async fn test_failed_login_surfaces_and_is_not_retried() {
        let transport = MemoryTransport::new(|req| {
            Ok(json!({
                "jsonrpc": "2.0",
                "error": {
                    "code": -32602,
                    "message": "Invalid params.",
                    "data": "Incorrect user name or password or account is temporarily blocked."
                },
                "id": req.id
            }))
        });
        let mut s = session(transport.clone());

        let err = s.call("host.get", json!({})).await.unwrap_err();
        match err {
            RpcError::Authentication(detail) => assert!(detail.starts_with("Incorrect user name")),
            other => panic!("expected an authentication error, got {other:?}"),
        }
        assert!(!s.is_authenticated());

        let sent = transport.requests().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "user.login");

        // no token is held, so the next call tries again exactly once
        let _ = s.call("host.get", json!({})).await;
        assert_eq!(transport.requests_for("user.login").await.len(), 2);
        assert!(transport.requests_for("host.get").await.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_non_string_result_fails() {
        let transport =
            MemoryTransport::new(|req| Ok(json!({"result": {"sessionid": 1}, "id": req.id})));
        let mut s = session(transport);

        assert!(matches!(
            s.login().await,
            Err(RpcError::Authentication(_))
        ));
        assert_eq!(s.token(), None);
    }

    #[tokio::test]
    async fn test_transport_failure_during_login_is_authentication_error() {
        let transport = MemoryTransport::new(|_| Err(anyhow!("connection refused")));
        let mut s = session(transport);

        match s.login().await {
            Err(RpcError::Authentication(detail)) => assert!(detail.contains("connection refused")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_during_call() {
        let transport = MemoryTransport::new(|req| match req.method.as_str() {
            "user.login" => Ok(json!({"result": "TOKEN123"})),
            _ => Err(anyhow!("connection reset")),
        });
        let mut s = session(transport);

        let err = s.call("host.get", json!({})).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)), "{err:?}");
        assert_eq!(s.next_request_id(), 3);
    }

    #[tokio::test]
    async fn test_malformed_response_is_transport_error() {
        let transport = MemoryTransport::new(|req| match req.method.as_str() {
            "user.login" => Ok(json!({"result": "TOKEN123"})),
            _ => Ok(json!({"jsonrpc": "2.0", "id": req.id})),
        });
        let mut s = session(transport);

        let err = s.call("host.get", json!({})).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_mismatched_response_id_is_transport_error() {
        let transport = MemoryTransport::new(|req| Ok(json!({"result": "x", "id": req.id + 100})));
        let mut s = session(transport);

        let err = s.call_unauthenticated("apiinfo.version", json!({})).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_unauthenticated_call_skips_login() {
        let transport = MemoryTransport::new(|req| Ok(json!({"result": "7.0.0", "id": req.id})));
        let mut s = session(transport.clone());

        let version = s.call_unauthenticated("apiinfo.version", json!({})).await.unwrap();
        assert_eq!(version, json!("7.0.0"));

        let sent = transport.requests().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].auth, None);
        assert!(!s.is_authenticated());
    }

    #[tokio::test]
    async fn test_clear_token_forces_new_login() {
        let transport = backend();
        let mut s = session(transport.clone());

        s.call("host.get", json!({})).await.unwrap();
        s.clear_token();
        s.call("host.get", json!({})).await.unwrap();

        assert_eq!(transport.requests_for("user.login").await.len(), 2);
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct HostGroup {
        groupid: String,
        name: String,
    }

    #[tokio::test]
    async fn test_call_as_typed() {
        let mut s = session(backend());

        let groups: Vec<HostGroup> = s
            .call_as(
                "hostgroup.get",
                &[HostGroup {
                    groupid: "4".to_string(),
                    name: "Linux servers".to_string(),
                }],
            )
            .await
            .unwrap();
        assert_eq!(groups[0].name, "Linux servers");

        let err = s
            .call_as::<_, Vec<HostGroup>>("hostgroup.get", &json!({"not": "a list"}))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
    }

    struct StalledTransport;

    #[async_trait]
    impl Transport for StalledTransport {
        async fn exchange(&self, _body: Vec<u8>) -> anyhow::Result<Vec<u8>> {
            time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let mut s = RpcSession::new(
            StalledTransport,
            Credentials::new("Admin", "zabbix"),
            Duration::from_millis(50),
        );

        let err = s
            .call_unauthenticated("apiinfo.version", json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
        assert_eq!(s.next_request_id(), 2);
    }
}

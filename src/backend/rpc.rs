// ABOUTME: JSON-RPC 2.0 client for a deployment gateway over HTTP/1.1.
// ABOUTME: The gateway fronts the network node and the proxy upgrade plugin.

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::Uri;
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpStream;

use super::call_arg::CallArg;
use super::error::{BackendError, ConnectError};
use super::ops::{CallOps, DeployedProxy, ProxyOps};
use super::sealed::Sealed;
use crate::plan::ProxyKind;
use crate::types::{Address, ImplementationId, TxHash};

/// Gateway client. Each request uses its own connection.
#[derive(Debug)]
pub struct RpcBackend {
    host: String,
    port: u16,
    path: String,
    next_id: AtomicU64,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DeployResult {
    address: Address,
    implementation: ImplementationId,
}

impl RpcBackend {
    /// Validate the gateway URL. No connection is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError` for unparsable URLs and non-http schemes.
    pub fn connect(url: &str) -> Result<Self, ConnectError> {
        let uri = url
            .parse::<Uri>()
            .map_err(|e| ConnectError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => {
                return Err(ConnectError::UnsupportedScheme {
                    scheme: other.to_string(),
                });
            }
            None => {
                return Err(ConnectError::InvalidUrl {
                    url: url.to_string(),
                    reason: "missing scheme".to_string(),
                });
            }
        }

        let host = uri
            .host()
            .ok_or_else(|| ConnectError::InvalidUrl {
                url: url.to_string(),
                reason: "missing host".to_string(),
            })?
            .to_string();

        let path = uri
            .path_and_query()
            .map(|p| p.as_str().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "/".to_string());

        Ok(Self {
            host,
            port: uri.port_u16().unwrap_or(80),
            path,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, BackendError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::to_vec(&RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        })
        .map_err(|e| BackendError::Transport(format!("failed to encode request: {e}")))?;

        tracing::debug!(method, id, endpoint = %self.endpoint(), "gateway request");

        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| BackendError::Transport(format!("failed to connect to gateway: {e}")))?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| BackendError::Transport(format!("HTTP handshake failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::warn!("gateway connection error: {}", e);
            }
        });

        let req = hyper::Request::builder()
            .method("POST")
            .uri(&self.path)
            .header("Host", format!("{}:{}", self.host, self.port))
            .header("Content-Type", "application/json")
            .body(Full::new(bytes::Bytes::from(body)))
            .map_err(|e| BackendError::Transport(format!("failed to build request: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| BackendError::Transport(format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| BackendError::Transport(format!("failed to read response: {e}")))?
            .to_bytes();

        if !status.is_success() {
            return Err(BackendError::Transport(format!(
                "gateway returned HTTP {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let response: RpcResponse = serde_json::from_slice(&body)
            .map_err(|e| BackendError::Transport(format!("malformed gateway response: {e}")))?;

        if let Some(err) = response.error {
            let detail = err.data.map(|d| format!(" ({d})")).unwrap_or_default();
            return Err(BackendError::Rejected(format!(
                "{} [{}]{}",
                err.message, err.code, detail
            )));
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, BackendError> {
        let value = self.request(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| BackendError::Transport(format!("unexpected {method} result: {e}")))
    }
}

impl Sealed for RpcBackend {}

#[async_trait]
impl ProxyOps for RpcBackend {
    async fn deploy_proxy(
        &self,
        contract: &str,
        kind: ProxyKind,
        init_args: &[CallArg],
    ) -> Result<DeployedProxy, BackendError> {
        let result: DeployResult = self
            .request_as(
                "proxy_deploy",
                json!({ "contract": contract, "kind": kind, "args": init_args }),
            )
            .await?;
        Ok(DeployedProxy {
            address: result.address,
            implementation: result.implementation,
        })
    }

    async fn prepare_upgrade(
        &self,
        proxy: Address,
        contract: &str,
    ) -> Result<ImplementationId, BackendError> {
        self.request_as(
            "proxy_prepareUpgrade",
            json!({ "proxy": proxy, "contract": contract }),
        )
        .await
    }

    async fn upgrade_proxy(
        &self,
        proxy: Address,
        implementation: &ImplementationId,
    ) -> Result<(), BackendError> {
        self.request(
            "proxy_upgrade",
            json!({ "proxy": proxy, "implementation": implementation }),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CallOps for RpcBackend {
    async fn send(
        &self,
        target: Address,
        method: &str,
        args: &[CallArg],
    ) -> Result<TxHash, BackendError> {
        self.request_as(
            "contract_send",
            json!({ "target": target, "method": method, "args": args }),
        )
        .await
    }

    async fn call(
        &self,
        target: Address,
        method: &str,
        args: &[CallArg],
    ) -> Result<Value, BackendError> {
        self.request(
            "contract_call",
            json!({ "target": target, "method": method, "args": args }),
        )
        .await
    }
}

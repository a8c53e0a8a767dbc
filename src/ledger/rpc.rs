//! JSON-RPC client for an attestation ledger gateway.
//!
//! Each call is a JSON-RPC 2.0 `POST` to the configured endpoint. Transport
//! failures, timeouts and ledger-side rejections are kept apart in
//! [`LedgerError`] so callers can decide what is worth retrying.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{LedgerClient, LedgerError, LedgerReceipt, OnChainAttestation};
use crate::config::LedgerConfig;
use crate::core::LeafEncoding;
use crate::error::{AttestError, Result};

/// Connection settings for [`RpcLedgerClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcLedgerSettings {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Attestation contract the gateway should invoke.
    pub contract_id: String,
    /// Network the contract lives on.
    pub network_passphrase: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Leaf encoding version recorded with each root.
    pub schema_version: u32,
}

impl RpcLedgerSettings {
    /// Derives settings from the `[ledger]` configuration section.
    pub fn from_config(config: &LedgerConfig, encoding: LeafEncoding) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            contract_id: config.contract_id.clone(),
            network_passphrase: config.network_passphrase.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            user_agent: format!("revenue-attest/{}", env!("CARGO_PKG_VERSION")),
            schema_version: encoding.version_number(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SubmitParams<'a> {
    contract_id: &'a str,
    network_passphrase: &'a str,
    business: &'a str,
    period: &'a str,
    merkle_root: &'a str,
    timestamp: i64,
    version: u32,
}

#[derive(Debug, Serialize)]
struct LookupParams<'a> {
    contract_id: &'a str,
    network_passphrase: &'a str,
    business: &'a str,
    period: &'a str,
}

/// Ledger client speaking JSON-RPC over HTTP.
#[derive(Debug)]
pub struct RpcLedgerClient {
    client: reqwest::Client,
    settings: RpcLedgerSettings,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    /// Creates a client with the given settings.
    ///
    /// # Errors
    ///
    /// Returns `AttestError::LedgerSetup` if the HTTP client cannot be built.
    pub fn new(settings: RpcLedgerSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(&settings.user_agent)
            .build()
            .map_err(|e| AttestError::LedgerSetup(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            settings,
            next_id: AtomicU64::new(1),
        })
    }

    /// Settings this client was built with.
    pub fn settings(&self) -> &RpcLedgerSettings {
        &self.settings
    }

    /// Performs one call and returns its `result`, `None` if it was null.
    async fn call<P, T>(&self, method: &str, params: P) -> std::result::Result<Option<T>, LedgerError>
    where
        P: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            method,
            params,
        };

        let response = match self.client.post(&self.settings.rpc_url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Ledger RPC {} failed: {}", method, e);
                if e.is_timeout() {
                    return Err(LedgerError::Timeout(self.settings.timeout.as_secs()));
                }
                if e.is_connect() {
                    return Err(LedgerError::Network(format!("connection failed: {e}")));
                }
                return Err(LedgerError::Network(e.to_string()));
            }
        };

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                LedgerError::Timeout(self.settings.timeout.as_secs())
            } else {
                LedgerError::Network(format!("failed to read response body: {e}"))
            }
        })?;
        log::debug!("Ledger RPC {} answered with status {}", method, status.as_u16());

        let parsed: Option<RpcResponse<T>> = serde_json::from_slice(&body).ok();
        match parsed {
            Some(RpcResponse { error: Some(err), .. }) => {
                Err(LedgerError::Rejected(format!("{} (code {})", err.message, err.code)))
            }
            Some(RpcResponse { result, error: None }) if status.is_success() => Ok(result),
            _ if status.is_server_error() => Err(LedgerError::Network(format!(
                "ledger gateway returned status {}",
                status.as_u16()
            ))),
            _ if status.is_client_error() => Err(LedgerError::Rejected(format!(
                "ledger gateway returned status {}",
                status.as_u16()
            ))),
            _ => Err(LedgerError::InvalidResponse(format!(
                "unparseable {} response: {}",
                method,
                String::from_utf8_lossy(&body[..body.len().min(256)])
            ))),
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn submit_root(
        &self,
        root: &str,
        business_id: &str,
        period: &str,
    ) -> std::result::Result<LedgerReceipt, LedgerError> {
        let params = SubmitParams {
            contract_id: &self.settings.contract_id,
            network_passphrase: &self.settings.network_passphrase,
            business: business_id,
            period,
            merkle_root: root,
            timestamp: Utc::now().timestamp(),
            version: self.settings.schema_version,
        };
        let receipt: Option<LedgerReceipt> = self.call("submit_attestation", params).await?;
        let receipt = receipt
            .ok_or_else(|| LedgerError::InvalidResponse("submit_attestation returned no result".to_string()))?;
        log::info!("Ledger accepted root for {}/{} in {}", business_id, period, receipt.tx_hash);
        Ok(receipt)
    }

    async fn get_attestation(
        &self,
        business_id: &str,
        period: &str,
    ) -> std::result::Result<Option<OnChainAttestation>, LedgerError> {
        let params = LookupParams {
            contract_id: &self.settings.contract_id,
            network_passphrase: &self.settings.network_passphrase,
            business: business_id,
            period,
        };
        self.call("get_attestation", params).await
    }
}

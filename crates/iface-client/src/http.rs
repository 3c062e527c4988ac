//! reqwest-backed implementation of [`NodeNetworkClient`]
//!
//! Talks to the node's `/api2/json` surface with API token authentication.
//! Responses arrive wrapped in a `{"data": ...}` envelope which is unwrapped
//! here before deserialization.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use pve_iface_core::{TransportError, TransportErrorKind, WireRecord};

use crate::{NodeNetworkClient, TaskStatus};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one Proxmox VE API endpoint
pub struct PveClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl PveClient {
    /// Client against `base_url` (e.g. `https://pve1.example.com:8006`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> PveClientBuilder {
        PveClientBuilder {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    fn network_url(&self, node: &str) -> String {
        format!(
            "{}/api2/json/nodes/{}/network",
            self.base_url,
            urlencoding::encode(node)
        )
    }

    fn interface_url(&self, node: &str, name: &str) -> String {
        format!("{}/{}", self.network_url(node), urlencoding::encode(name))
    }

    fn task_url(&self, node: &str, upid: &str) -> String {
        format!(
            "{}/api2/json/nodes/{}/tasks/{}/status",
            self.base_url,
            urlencoding::encode(node),
            urlencoding::encode(upid)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("PVEAPIToken={}", token)),
            None => request,
        }
    }

    /// Send a request and unwrap the `data` envelope
    async fn execute(
        &self,
        operation: &'static str,
        node: &str,
        request: RequestBuilder,
    ) -> Result<Value, TransportError> {
        debug!("{} on node {}", operation, node);
        let response = self.authorize(request).send().await.map_err(|e| {
            TransportError::new(operation, node, TransportErrorKind::Connection(e.to_string()))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            TransportError::new(operation, node, TransportErrorKind::Connection(e.to_string()))
        })?;
        if !status.is_success() {
            return Err(TransportError::new(
                operation,
                node,
                TransportErrorKind::Status {
                    status: status.as_u16(),
                    message: body,
                },
            ));
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }
        let envelope: Value = serde_json::from_str(&body).map_err(|e| {
            TransportError::new(operation, node, TransportErrorKind::Decode(e.to_string()))
        })?;
        Ok(envelope.get("data").cloned().unwrap_or(Value::Null))
    }
}

/// Builder for [`PveClient`]
pub struct PveClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl PveClientBuilder {
    /// API token in `user@realm!tokenid=secret` form
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept self-signed certificates, the default on freshly installed
    /// nodes
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> PveClient {
        let client = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .expect("Failed to create HTTP client");

        PveClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            token: self.token,
        }
    }
}

#[async_trait]
impl NodeNetworkClient for PveClient {
    async fn list_interfaces(&self, node: &str) -> Result<Vec<WireRecord>, TransportError> {
        let data = self
            .execute(
                "list_interfaces",
                node,
                self.client.get(self.network_url(node)),
            )
            .await?;
        serde_json::from_value(data).map_err(|e| {
            TransportError::new(
                "list_interfaces",
                node,
                TransportErrorKind::Decode(e.to_string()),
            )
        })
    }

    async fn get_interface(&self, node: &str, name: &str) -> Result<WireRecord, TransportError> {
        let data = self
            .execute(
                "get_interface",
                node,
                self.client.get(self.interface_url(node, name)),
            )
            .await?;
        serde_json::from_value(data).map_err(|e| {
            TransportError::new(
                "get_interface",
                node,
                TransportErrorKind::Decode(e.to_string()),
            )
        })
    }

    async fn create_interface(
        &self,
        node: &str,
        record: &WireRecord,
    ) -> Result<(), TransportError> {
        self.execute(
            "create_interface",
            node,
            self.client.post(self.network_url(node)).json(record),
        )
        .await?;
        Ok(())
    }

    async fn update_interface(
        &self,
        node: &str,
        name: &str,
        record: &WireRecord,
    ) -> Result<(), TransportError> {
        self.execute(
            "update_interface",
            node,
            self.client.put(self.interface_url(node, name)).json(record),
        )
        .await?;
        Ok(())
    }

    async fn delete_interface(&self, node: &str, name: &str) -> Result<(), TransportError> {
        self.execute(
            "delete_interface",
            node,
            self.client.delete(self.interface_url(node, name)),
        )
        .await?;
        Ok(())
    }

    async fn reload_interfaces(&self, node: &str) -> Result<String, TransportError> {
        let data = self
            .execute(
                "reload_interfaces",
                node,
                self.client.put(self.network_url(node)),
            )
            .await?;
        data.as_str().map(str::to_string).ok_or_else(|| {
            TransportError::new(
                "reload_interfaces",
                node,
                TransportErrorKind::Decode(format!("expected UPID string, got {}", data)),
            )
        })
    }

    async fn rollback_interfaces(&self, node: &str) -> Result<(), TransportError> {
        self.execute(
            "rollback_interfaces",
            node,
            self.client.delete(self.network_url(node)),
        )
        .await?;
        Ok(())
    }

    async fn task_status(&self, node: &str, upid: &str) -> Result<TaskStatus, TransportError> {
        let data = self
            .execute("task_status", node, self.client.get(self.task_url(node, upid)))
            .await?;
        serde_json::from_value(data).map_err(|e| {
            TransportError::new("task_status", node, TransportErrorKind::Decode(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_rooted_at_api2_json() {
        let client = PveClient::new("https://pve1.example.com:8006/");
        assert_eq!(
            client.network_url("node01"),
            "https://pve1.example.com:8006/api2/json/nodes/node01/network"
        );
        assert_eq!(
            client.interface_url("node01", "vmbr0"),
            "https://pve1.example.com:8006/api2/json/nodes/node01/network/vmbr0"
        );
    }

    #[test]
    fn path_segments_are_encoded() {
        let client = PveClient::new("https://pve1.example.com:8006");
        let url = client.task_url(
            "node01",
            "UPID:node01:0000C530:15C5E6D4:68B1A001:srvreload:networking:root@pam:",
        );
        assert!(url.ends_with("/status"));
        assert!(url.contains("root%40pam"));
        assert!(!url.contains("root@pam"));
    }
}

//! Proxmox VE Interface Client
//!
//! Async client surface for the node network REST API plus a reqwest-backed
//! implementation

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pve_iface_core::{TransportError, WireRecord};

pub use http::PveClient;

/// Status record of an asynchronous node task, as returned by
/// `GET /nodes/{node}/tasks/{upid}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub upid: String,
    pub status: String,
    #[serde(default)]
    pub exitstatus: Option<String>,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(rename = "type", default)]
    pub task_type: Option<String>,
}

impl TaskStatus {
    /// Task has left the running state
    pub fn is_finished(&self) -> bool {
        self.status == "stopped"
    }

    /// Finished with the node's OK marker
    pub fn is_successful(&self) -> bool {
        self.is_finished() && self.exitstatus.as_deref() == Some("OK")
    }
}

/// Node network API operations used by the reconciliation caller
///
/// One REST call per operation, no retry: any failure surfaces as a
/// [`TransportError`] carrying the operation and node.
#[async_trait]
pub trait NodeNetworkClient: Send + Sync {
    /// All interface records on the node
    async fn list_interfaces(&self, node: &str) -> Result<Vec<WireRecord>, TransportError>;

    /// Single interface record by name
    async fn get_interface(&self, node: &str, name: &str) -> Result<WireRecord, TransportError>;

    /// Create an interface from a full wire record
    async fn create_interface(
        &self,
        node: &str,
        record: &WireRecord,
    ) -> Result<(), TransportError>;

    /// Update an interface with the given wire fields, preserving the rest
    async fn update_interface(
        &self,
        node: &str,
        name: &str,
        record: &WireRecord,
    ) -> Result<(), TransportError>;

    /// Delete an interface by name
    async fn delete_interface(&self, node: &str, name: &str) -> Result<(), TransportError>;

    /// Commit staged interface changes; returns the UPID of the reload task
    async fn reload_interfaces(&self, node: &str) -> Result<String, TransportError>;

    /// Discard staged interface changes on the node
    async fn rollback_interfaces(&self, node: &str) -> Result<(), TransportError>;

    /// Status of an asynchronous node task
    async fn task_status(&self, node: &str, upid: &str) -> Result<TaskStatus, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_deserializes_node_response() {
        let status: TaskStatus = serde_json::from_str(
            r#"{
                "upid": "UPID:node01:0000C530:15C5E6D4:68B1A001:srvreload:networking:root@pam:",
                "status": "stopped",
                "exitstatus": "OK",
                "node": "node01",
                "type": "srvreload",
                "pid": 50480
            }"#,
        )
        .unwrap();
        assert!(status.is_finished());
        assert!(status.is_successful());
    }

    #[test]
    fn running_task_is_not_successful() {
        let status: TaskStatus = serde_json::from_str(
            r#"{"upid": "UPID:node01:x", "status": "running"}"#,
        )
        .unwrap();
        assert!(!status.is_finished());
        assert!(!status.is_successful());
    }
}

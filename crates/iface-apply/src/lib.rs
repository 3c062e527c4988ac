//! Proxmox VE Interface Apply
//!
//! Drives one reconciliation run: fetch live state, compute the change set,
//! apply it change by change and optionally commit with a network reload.

use log::{debug, info};
use serde::Serialize;

use pve_iface_client::NodeNetworkClient;
use pve_iface_core::{InterfaceDeclaration, Result};
use pve_iface_reconcile::{check_duplicates, compute_diff, ChangeSet, InterfaceDiff};

/// Knobs for one apply run
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Compute and report the change set without touching the node
    pub check_mode: bool,
    /// Commit applied changes with a network reload task
    pub reload: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            check_mode: false,
            reload: true,
        }
    }
}

/// Result of one apply run
#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutcome {
    pub changed: bool,
    /// Pending (check mode) or applied change set; `None` when nothing was
    /// out of sync
    pub diff: Option<ChangeSet>,
    /// UPID of the reload task, when one was started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reload_task: Option<String>,
}

impl ApplyOutcome {
    fn unchanged() -> Self {
        Self {
            changed: false,
            diff: None,
            reload_task: None,
        }
    }
}

/// Applies declaration batches to a node through a [`NodeNetworkClient`]
pub struct InterfaceApplier<C> {
    client: C,
}

impl<C: NodeNetworkClient> InterfaceApplier<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Reconcile `declarations` against the node's live interfaces
    ///
    /// Declarations are validated before the first network call; afterwards
    /// one minimal API call is issued per changed interface, in declaration
    /// order. The first failure aborts the run. Changes already applied stay
    /// applied, there is no automatic compensation; [`Self::rollback`]
    /// discards whatever the node has staged but not committed.
    pub async fn apply(
        &self,
        node: &str,
        declarations: &[InterfaceDeclaration],
        options: &ApplyOptions,
    ) -> Result<ApplyOutcome> {
        check_duplicates(declarations)?;

        let current = self.client.list_interfaces(node).await?;
        debug!("node {} reports {} interface(s)", node, current.len());

        let Some(changes) = compute_diff(&current, declarations)? else {
            info!("node {}: all interfaces in sync", node);
            return Ok(ApplyOutcome::unchanged());
        };

        if options.check_mode {
            info!(
                "node {}: {} pending change(s), check mode, not applying",
                node,
                changes.len()
            );
            return Ok(ApplyOutcome {
                changed: true,
                diff: Some(changes),
                reload_task: None,
            });
        }

        for (name, change) in &changes {
            match change {
                InterfaceDiff::Create { after } => {
                    info!("node {}: creating interface {}", node, name);
                    self.client.create_interface(node, after).await?;
                }
                InterfaceDiff::Remove { .. } => {
                    info!("node {}: deleting interface {}", node, name);
                    self.client.delete_interface(node, name).await?;
                }
                InterfaceDiff::Update { .. } => {
                    if let Some(payload) = change.update_payload() {
                        info!(
                            "node {}: updating interface {} ({} field(s))",
                            node,
                            name,
                            payload.len()
                        );
                        self.client.update_interface(node, name, &payload).await?;
                    }
                }
            }
        }

        let reload_task = if options.reload {
            let upid = self.client.reload_interfaces(node).await?;
            info!("node {}: reload task {}", node, upid);
            Some(upid)
        } else {
            None
        };

        Ok(ApplyOutcome {
            changed: true,
            diff: Some(changes),
            reload_task,
        })
    }

    /// Drop all uncommitted interface changes on the node
    pub async fn rollback(&self, node: &str) -> Result<()> {
        info!("node {}: rolling back staged interface changes", node);
        self.client.rollback_interfaces(node).await?;
        Ok(())
    }
}

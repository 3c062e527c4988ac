//! Proxmox VE Interface Reconcile
//!
//! Maps user interface declarations to the node wire format and computes the
//! create/update/delete change set against live node state

pub mod batch;
pub mod diff;
pub mod mapper;

pub use batch::check_duplicates;
pub use diff::{compute_diff, ChangeSet, FieldDiff, InterfaceDiff};
pub use mapper::{map_declaration, normalize_live};

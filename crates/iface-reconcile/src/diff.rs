//! Change-set computation between declared and live interface state
//!
//! The three-way split (remove/create/update) lets the apply phase issue one
//! minimal API call per changed interface instead of re-submitting full
//! records, preserving unrelated fields on update.

use indexmap::IndexMap;
use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use pve_iface_core::codec::codec_for;
use pve_iface_core::{InterfaceDeclaration, InterfaceState, ValidationError, WireRecord};

use crate::mapper::{map_declaration, normalize_live};

/// Pending changes, keyed by interface name
pub type ChangeSet = IndexMap<String, InterfaceDiff>;

/// Pending change for one interface
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceDiff {
    /// Interface does not exist on the node yet; `after` is the full mapped
    /// record to submit
    Create { after: WireRecord },
    /// Interface exists and is declared absent; `before` is the normalized
    /// live record
    Remove { before: WireRecord },
    /// Interface exists with differing fields, in the normalized boolean
    /// convention on both sides
    Update { fields: IndexMap<String, FieldDiff> },
}

/// Before/after pair for a single changed field
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldDiff {
    pub before: Value,
    pub after: Value,
}

impl InterfaceDiff {
    /// Minimal wire record for an update call: only the changed fields, with
    /// booleans re-encoded to the per-field wire convention
    pub fn update_payload(&self) -> Option<WireRecord> {
        match self {
            InterfaceDiff::Update { fields } => {
                let mut payload = WireRecord::new();
                for (key, diff) in fields {
                    let value = match (codec_for(key), &diff.after) {
                        (Some(codec), Value::Bool(b)) => (codec.encode)(*b),
                        _ => diff.after.clone(),
                    };
                    payload.insert(key.clone(), value);
                }
                Some(payload)
            }
            _ => None,
        }
    }
}

// Serialized shape matches the node diff convention: creation reports an
// empty `before`, deletion reports the literal string "absent", updates
// report a per-field before/after map.
impl Serialize for InterfaceDiff {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            InterfaceDiff::Create { after } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("before", "")?;
                map.serialize_entry("after", after)?;
                map.end()
            }
            InterfaceDiff::Remove { before } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("before", before)?;
                map.serialize_entry("after", "absent")?;
                map.end()
            }
            InterfaceDiff::Update { fields } => fields.serialize(serializer),
        }
    }
}

/// Compute the pending change set for a declaration batch
///
/// Live records are normalized through the codec table and indexed by their
/// `iface` key, then every declaration is classified:
///
/// - declared absent and present on the node: removal with the live record
///   as `before`; absent on the node too: no entry, deletion is a no-op
/// - unknown to the node: creation with the full mapped record
/// - known to the node: field-level update, only emitted when at least one
///   field differs
///
/// Returns `Ok(None)` when no interface has a pending change.
pub fn compute_diff(
    current: &[WireRecord],
    desired: &[InterfaceDeclaration],
) -> Result<Option<ChangeSet>, ValidationError> {
    let mut live: IndexMap<String, WireRecord> = IndexMap::new();
    for record in current {
        if let Some(name) = record.get("iface").and_then(Value::as_str) {
            live.insert(name.to_string(), normalize_live(record));
        }
    }

    let mut changes = ChangeSet::new();
    for decl in desired {
        if decl.state == InterfaceState::Absent {
            if let Some(before) = live.get(&decl.name) {
                changes.insert(
                    decl.name.clone(),
                    InterfaceDiff::Remove {
                        before: before.clone(),
                    },
                );
            }
            continue;
        }

        let mut mapped = map_declaration(decl)?;
        normalize_comments(&mut mapped);
        match live.get(&decl.name) {
            None => {
                changes.insert(decl.name.clone(), InterfaceDiff::Create { after: mapped });
            }
            Some(old) => {
                if let Some(fields) = diff_fields(&normalize_live(&mapped), old) {
                    changes.insert(decl.name.clone(), InterfaceDiff::Update { fields });
                }
            }
        }
    }

    debug!("computed {} pending interface change(s)", changes.len());
    if changes.is_empty() {
        Ok(None)
    } else {
        Ok(Some(changes))
    }
}

/// The node stores comments with exactly one trailing newline; align the
/// declared value before it is compared or submitted.
fn normalize_comments(record: &mut WireRecord) {
    if let Some(Value::String(comments)) = record.get_mut("comments") {
        let trimmed = comments.trim_end_matches('\n');
        *comments = format!("{}\n", trimmed);
    }
}

/// Field-level diff between a normalized mapped declaration and a normalized
/// live record. Fields missing from the live record are not reported; only
/// the creation path emits them.
fn diff_fields(new: &WireRecord, old: &WireRecord) -> Option<IndexMap<String, FieldDiff>> {
    let mut fields = IndexMap::new();
    for (key, new_value) in new {
        if let Some(old_value) = old.get(key) {
            if old_value != new_value {
                fields.insert(
                    key.clone(),
                    FieldDiff {
                        before: old_value.clone(),
                        after: new_value.clone(),
                    },
                );
            }
        }
    }
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

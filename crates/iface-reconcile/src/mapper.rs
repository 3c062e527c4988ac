//! Declaration to wire-format mapping and back
//!
//! `map_declaration` turns an [`InterfaceDeclaration`] into the key/value
//! shape the node network API expects; `normalize_live` folds the API's
//! 0/1-style booleans back into real booleans so live state can be compared
//! against mapped declarations.

use serde_json::Value;

use pve_iface_core::codec::{codec_for, BOOL_FIELDS};
use pve_iface_core::{InterfaceDeclaration, ValidationError, WireRecord};

const MTU_MIN: i64 = 1280;
const MTU_MAX: i64 = 65520;
const VLAN_TAG_MIN: i64 = 1;
const VLAN_TAG_MAX: i64 = 4094;

/// Map a declaration to the node wire format
///
/// Only explicitly set attributes are emitted; unset attributes are omitted
/// entirely, never sent as null. Renamed keys: `name` becomes `iface`,
/// `bond_primary` becomes `bond-primary`, `vlan_id` becomes `vlan-id` and
/// `vlan_raw_device` becomes `vlan-raw-device`. The desired `state` is
/// reconciliation input, not interface configuration, and is never emitted.
///
/// Pure function: range violations fail before any network call can happen.
pub fn map_declaration(decl: &InterfaceDeclaration) -> Result<WireRecord, ValidationError> {
    let mut wire = WireRecord::new();
    wire.insert("iface".to_string(), Value::String(decl.name.clone()));
    if let Some(iface_type) = decl.iface_type {
        wire.insert("type".to_string(), Value::String(iface_type.to_string()));
    }
    if let Some(autostart) = decl.autostart {
        insert_bool(&mut wire, "autostart", autostart);
    }
    if let Some(ref bond_primary) = decl.bond_primary {
        wire.insert(
            "bond-primary".to_string(),
            Value::String(bond_primary.clone()),
        );
    }
    if let Some(bond_mode) = decl.bond_mode {
        wire.insert("bond_mode".to_string(), Value::String(bond_mode.to_string()));
    }
    if let Some(policy) = decl.bond_xmit_hash_policy {
        wire.insert(
            "bond_xmit_hash_policy".to_string(),
            Value::String(policy.to_string()),
        );
    }
    if let Some(ref bridge_ports) = decl.bridge_ports {
        wire.insert(
            "bridge_ports".to_string(),
            Value::String(bridge_ports.clone()),
        );
    }
    if let Some(bridge_vlan_ports) = decl.bridge_vlan_ports {
        insert_bool(&mut wire, "bridge_vlan_ports", bridge_vlan_ports);
    }
    if let Some(ref cidr) = decl.cidr {
        wire.insert("cidr".to_string(), Value::String(cidr.clone()));
    }
    if let Some(ref cidr6) = decl.cidr6 {
        wire.insert("cidr6".to_string(), Value::String(cidr6.clone()));
    }
    if let Some(ref gateway) = decl.gateway {
        wire.insert("gateway".to_string(), Value::String(gateway.clone()));
    }
    if let Some(ref gateway6) = decl.gateway6 {
        wire.insert("gateway6".to_string(), Value::String(gateway6.clone()));
    }
    if let Some(ref comments) = decl.comments {
        wire.insert("comments".to_string(), Value::String(comments.clone()));
    }
    if let Some(mtu) = decl.mtu {
        check_range("mtu", i64::from(mtu), MTU_MIN, MTU_MAX)?;
        wire.insert("mtu".to_string(), Value::from(mtu));
    }
    if let Some(ref ovs_bonds) = decl.ovs_bonds {
        wire.insert("ovs_bonds".to_string(), Value::String(ovs_bonds.clone()));
    }
    if let Some(ref ovs_options) = decl.ovs_options {
        wire.insert(
            "ovs_options".to_string(),
            Value::String(ovs_options.clone()),
        );
    }
    if let Some(ref ovs_bridge) = decl.ovs_bridge {
        wire.insert("ovs_bridge".to_string(), Value::String(ovs_bridge.clone()));
    }
    if let Some(ref ovs_ports) = decl.ovs_ports {
        wire.insert("ovs_ports".to_string(), Value::String(ovs_ports.clone()));
    }
    if let Some(ovs_tag) = decl.ovs_tag {
        check_range("ovs_tag", i64::from(ovs_tag), VLAN_TAG_MIN, VLAN_TAG_MAX)?;
        wire.insert("ovs_tag".to_string(), Value::from(ovs_tag));
    }
    if let Some(ref slaves) = decl.slaves {
        wire.insert("slaves".to_string(), Value::String(slaves.clone()));
    }
    if let Some(vlan_id) = decl.vlan_id {
        check_range("vlan_id", i64::from(vlan_id), VLAN_TAG_MIN, VLAN_TAG_MAX)?;
        wire.insert("vlan-id".to_string(), Value::from(vlan_id));
    }
    if let Some(ref vlan_raw_device) = decl.vlan_raw_device {
        wire.insert(
            "vlan-raw-device".to_string(),
            Value::String(vlan_raw_device.clone()),
        );
    }
    Ok(wire)
}

/// Normalize a live wire record for comparison
///
/// Boolean-encoded fields are decoded to real booleans through the codec
/// table; every other key passes through unchanged. Idempotent: a record that
/// already carries real booleans comes back identical.
pub fn normalize_live(record: &WireRecord) -> WireRecord {
    let mut out = record.clone();
    for codec in BOOL_FIELDS {
        if let Some(value) = out.get_mut(codec.field) {
            if let Some(b) = (codec.decode)(value) {
                *value = Value::Bool(b);
            }
        }
    }
    out
}

fn insert_bool(wire: &mut WireRecord, field: &'static str, value: bool) {
    // Every field reaching here is in the codec table
    if let Some(codec) = codec_for(field) {
        wire.insert(field.to_string(), (codec.encode)(value));
    }
}

fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pve_iface_core::{InterfaceDeclaration, InterfaceType};
    use serde_json::json;

    #[test]
    fn map_emits_only_set_fields() {
        let mut decl = InterfaceDeclaration::new("vmbr0");
        decl.mtu = Some(20000);
        decl.vlan_id = Some(4000);
        let wire = map_declaration(&decl).unwrap();

        let expected: Vec<(&str, Value)> = vec![
            ("iface", json!("vmbr0")),
            ("type", json!("bridge")),
            ("autostart", json!("1")),
            ("mtu", json!(20000)),
            ("vlan-id", json!(4000)),
        ];
        assert_eq!(wire.len(), expected.len());
        for (key, value) in expected {
            assert_eq!(wire.get(key), Some(&value), "key {}", key);
        }
    }

    #[test]
    fn map_renames_dashed_keys() {
        let mut decl = InterfaceDeclaration::new("eno1.100");
        decl.iface_type = Some(InterfaceType::Vlan);
        decl.bond_primary = Some("eno1".to_string());
        decl.vlan_raw_device = Some("eno1".to_string());
        let wire = map_declaration(&decl).unwrap();
        assert_eq!(wire.get("bond-primary"), Some(&json!("eno1")));
        assert_eq!(wire.get("vlan-raw-device"), Some(&json!("eno1")));
        assert!(!wire.contains_key("bond_primary"));
        assert!(!wire.contains_key("name"));
    }

    #[test]
    fn map_never_emits_state() {
        let decl = InterfaceDeclaration::new("vmbr0");
        let wire = map_declaration(&decl).unwrap();
        assert!(!wire.contains_key("state"));
    }

    #[test]
    fn mtu_out_of_range_fails() {
        for mtu in [1279, 65521, 0] {
            let mut decl = InterfaceDeclaration::new("vmbr0");
            decl.mtu = Some(mtu);
            let err = map_declaration(&decl).unwrap_err();
            assert_eq!(
                err,
                ValidationError::OutOfRange {
                    field: "mtu",
                    value: i64::from(mtu),
                    min: 1280,
                    max: 65520,
                }
            );
        }
        let mut decl = InterfaceDeclaration::new("vmbr0");
        decl.mtu = Some(1280);
        assert_eq!(
            map_declaration(&decl).unwrap().get("mtu"),
            Some(&json!(1280))
        );
    }

    #[test]
    fn vlan_id_and_ovs_tag_ranges() {
        let mut decl = InterfaceDeclaration::new("vlan40");
        decl.vlan_id = Some(4095);
        assert!(map_declaration(&decl).is_err());

        let mut decl = InterfaceDeclaration::new("ovsintport0");
        decl.ovs_tag = Some(0);
        assert!(map_declaration(&decl).is_err());

        let mut decl = InterfaceDeclaration::new("ovsintport0");
        decl.ovs_tag = Some(4094);
        let wire = map_declaration(&decl).unwrap();
        assert_eq!(wire.get("ovs_tag"), Some(&json!(4094)));
    }

    #[test]
    fn normalize_live_decodes_booleans() {
        let mut record = WireRecord::new();
        record.insert("iface".to_string(), json!("vmbr0"));
        record.insert("autostart".to_string(), json!(1));
        record.insert("bridge_vlan_ports".to_string(), json!("0"));
        record.insert("cidr".to_string(), json!("10.0.0.2/24"));

        let normalized = normalize_live(&record);
        assert_eq!(normalized.get("autostart"), Some(&json!(true)));
        assert_eq!(normalized.get("bridge_vlan_ports"), Some(&json!(false)));
        assert_eq!(normalized.get("cidr"), Some(&json!("10.0.0.2/24")));
    }

    #[test]
    fn normalize_live_is_idempotent() {
        let mut record = WireRecord::new();
        record.insert("iface".to_string(), json!("bond0"));
        record.insert("autostart".to_string(), json!("1"));
        record.insert("active".to_string(), json!(1));

        let once = normalize_live(&record);
        let twice = normalize_live(&once);
        assert_eq!(once, twice);
        // non-codec fields keep their 0/1 encoding
        assert_eq!(once.get("active"), Some(&json!(1)));
    }
}

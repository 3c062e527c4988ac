//! Declaration and wire-format types for node network interfaces

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Proxmox-side representation of one interface: wire key names mapped to
/// primitive JSON values. Insertion order is preserved for stable diffs.
pub type WireRecord = IndexMap<String, Value>;

/// User intent for one interface on a node
///
/// `None` means "leave unspecified" and is distinct from an explicit empty
/// value; only set attributes are ever sent to the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDeclaration {
    pub name: String,
    #[serde(rename = "type", default = "default_iface_type")]
    pub iface_type: Option<InterfaceType>,
    #[serde(default)]
    pub state: InterfaceState,
    #[serde(default = "default_autostart")]
    pub autostart: Option<bool>,
    #[serde(default)]
    pub bond_primary: Option<String>,
    #[serde(default)]
    pub bond_mode: Option<BondMode>,
    #[serde(default)]
    pub bond_xmit_hash_policy: Option<XmitHashPolicy>,
    #[serde(default)]
    pub bridge_ports: Option<String>,
    #[serde(default)]
    pub bridge_vlan_ports: Option<bool>,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub cidr6: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub gateway6: Option<String>,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub ovs_bonds: Option<String>,
    #[serde(default)]
    pub ovs_bridge: Option<String>,
    #[serde(default)]
    pub ovs_options: Option<String>,
    #[serde(default)]
    pub ovs_ports: Option<String>,
    #[serde(default)]
    pub ovs_tag: Option<u16>,
    #[serde(default)]
    pub slaves: Option<String>,
    #[serde(default)]
    pub vlan_id: Option<u16>,
    #[serde(default)]
    pub vlan_raw_device: Option<String>,
}

fn default_iface_type() -> Option<InterfaceType> {
    Some(InterfaceType::Bridge)
}

fn default_autostart() -> Option<bool> {
    Some(true)
}

impl InterfaceDeclaration {
    /// New declaration with the batch defaults: bridge type, autostarted,
    /// state `present`, everything else unspecified
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iface_type: default_iface_type(),
            state: InterfaceState::Present,
            autostart: default_autostart(),
            bond_primary: None,
            bond_mode: None,
            bond_xmit_hash_policy: None,
            bridge_ports: None,
            bridge_vlan_ports: None,
            cidr: None,
            cidr6: None,
            comments: None,
            gateway: None,
            gateway6: None,
            mtu: None,
            ovs_bonds: None,
            ovs_bridge: None,
            ovs_options: None,
            ovs_ports: None,
            ovs_tag: None,
            slaves: None,
            vlan_id: None,
            vlan_raw_device: None,
        }
    }
}

/// Desired lifecycle state of a declared interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceState {
    #[default]
    Present,
    Absent,
}

/// Interface type as understood by the node network API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceType {
    #[serde(rename = "bridge")]
    Bridge,
    #[serde(rename = "bond")]
    Bond,
    #[serde(rename = "eth")]
    Eth,
    #[serde(rename = "alias")]
    Alias,
    #[serde(rename = "vlan")]
    Vlan,
    OVSBridge,
    OVSBond,
    OVSPort,
    OVSIntPort,
    #[serde(rename = "unknown")]
    Unknown,
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InterfaceType::Bridge => "bridge",
            InterfaceType::Bond => "bond",
            InterfaceType::Eth => "eth",
            InterfaceType::Alias => "alias",
            InterfaceType::Vlan => "vlan",
            InterfaceType::OVSBridge => "OVSBridge",
            InterfaceType::OVSBond => "OVSBond",
            InterfaceType::OVSPort => "OVSPort",
            InterfaceType::OVSIntPort => "OVSIntPort",
            InterfaceType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for InterfaceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bridge" => Ok(InterfaceType::Bridge),
            "bond" => Ok(InterfaceType::Bond),
            "eth" => Ok(InterfaceType::Eth),
            "alias" => Ok(InterfaceType::Alias),
            "vlan" => Ok(InterfaceType::Vlan),
            "OVSBridge" => Ok(InterfaceType::OVSBridge),
            "OVSBond" => Ok(InterfaceType::OVSBond),
            "OVSPort" => Ok(InterfaceType::OVSPort),
            "OVSIntPort" => Ok(InterfaceType::OVSIntPort),
            "unknown" => Ok(InterfaceType::Unknown),
            other => Err(ValidationError::UnsupportedValue {
                field: "type",
                value: other.to_string(),
            }),
        }
    }
}

/// Bonding mode, including the OVS-specific LACP variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondMode {
    #[serde(rename = "balance-rr")]
    RoundRobin,
    #[serde(rename = "active-backup")]
    ActiveBackup,
    #[serde(rename = "balance-xor")]
    Xor,
    #[serde(rename = "broadcast")]
    Broadcast,
    #[serde(rename = "802.3ad")]
    Ieee8023ad,
    #[serde(rename = "balance-tlb")]
    BalanceTlb,
    #[serde(rename = "balance-alb")]
    BalanceAlb,
    #[serde(rename = "balance-slb")]
    BalanceSlb,
    #[serde(rename = "lacp-balance-slb")]
    LacpBalanceSlb,
    #[serde(rename = "lacp-balance-tcp")]
    LacpBalanceTcp,
}

impl fmt::Display for BondMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BondMode::RoundRobin => "balance-rr",
            BondMode::ActiveBackup => "active-backup",
            BondMode::Xor => "balance-xor",
            BondMode::Broadcast => "broadcast",
            BondMode::Ieee8023ad => "802.3ad",
            BondMode::BalanceTlb => "balance-tlb",
            BondMode::BalanceAlb => "balance-alb",
            BondMode::BalanceSlb => "balance-slb",
            BondMode::LacpBalanceSlb => "lacp-balance-slb",
            BondMode::LacpBalanceTcp => "lacp-balance-tcp",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BondMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "balance-rr" => Ok(BondMode::RoundRobin),
            "active-backup" => Ok(BondMode::ActiveBackup),
            "balance-xor" => Ok(BondMode::Xor),
            "broadcast" => Ok(BondMode::Broadcast),
            "802.3ad" => Ok(BondMode::Ieee8023ad),
            "balance-tlb" => Ok(BondMode::BalanceTlb),
            "balance-alb" => Ok(BondMode::BalanceAlb),
            "balance-slb" => Ok(BondMode::BalanceSlb),
            "lacp-balance-slb" => Ok(BondMode::LacpBalanceSlb),
            "lacp-balance-tcp" => Ok(BondMode::LacpBalanceTcp),
            other => Err(ValidationError::UnsupportedValue {
                field: "bond_mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Transmit hash policy for balance-xor and 802.3ad bonds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmitHashPolicy {
    #[serde(rename = "layer2")]
    Layer2,
    #[serde(rename = "layer2+3")]
    Layer2Plus3,
    #[serde(rename = "layer3+4")]
    Layer3Plus4,
}

impl fmt::Display for XmitHashPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            XmitHashPolicy::Layer2 => "layer2",
            XmitHashPolicy::Layer2Plus3 => "layer2+3",
            XmitHashPolicy::Layer3Plus4 => "layer3+4",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for XmitHashPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "layer2" => Ok(XmitHashPolicy::Layer2),
            "layer2+3" => Ok(XmitHashPolicy::Layer2Plus3),
            "layer3+4" => Ok(XmitHashPolicy::Layer3Plus4),
            other => Err(ValidationError::UnsupportedValue {
                field: "bond_xmit_hash_policy",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bond_mode() {
        let mode: BondMode = "802.3ad".parse().unwrap();
        assert_eq!(mode, BondMode::Ieee8023ad);
        assert_eq!(mode.to_string(), "802.3ad");
        assert!("round-robin".parse::<BondMode>().is_err());
    }

    #[test]
    fn declaration_defaults_from_json() {
        let decl: InterfaceDeclaration = serde_json::from_str(r#"{"name": "vmbr0"}"#).unwrap();
        assert_eq!(decl.iface_type, Some(InterfaceType::Bridge));
        assert_eq!(decl.autostart, Some(true));
        assert_eq!(decl.state, InterfaceState::Present);
        assert!(decl.cidr.is_none());
    }

    #[test]
    fn ovs_type_round_trip() {
        let t: InterfaceType = "OVSIntPort".parse().unwrap();
        assert_eq!(t.to_string(), "OVSIntPort");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"OVSIntPort\"");
    }
}

//! Declaration batch validation

use std::collections::HashSet;

use pve_iface_core::{InterfaceDeclaration, ValidationError};

/// Reject batches that declare the same interface name twice
///
/// Names are the join key between declarations and live node state, so a
/// batch may name each interface at most once. The first duplicate in input
/// order is reported.
pub fn check_duplicates(declarations: &[InterfaceDeclaration]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for decl in declarations {
        if !seen.insert(decl.name.as_str()) {
            return Err(ValidationError::DuplicateInterface {
                name: decl.name.clone(),
            });
        }
    }
    Ok(())
}

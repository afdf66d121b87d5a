//! bridge identifiers
//!
//! a bridge id fully describes one external bridge interaction shape:
//! which contract, which input asset, and which output asset slots.

use serde::{Deserialize, Serialize};

use crate::types::{Address, AssetId};

/// identifies an external defi bridge and its asset wiring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BridgeId {
    /// address of the bridge contract
    pub bridge_address: Address,
    /// registry index of the bridge contract
    pub bridge_address_id: u32,
    /// asset consumed by the bridge
    pub input_asset_id: AssetId,
    /// first output asset slot
    pub output_asset_id_a: AssetId,
    /// second output asset slot (0 when unused)
    pub output_asset_id_b: AssetId,
}

impl BridgeId {
    pub const ZERO: Self = Self {
        bridge_address: Address::ZERO,
        bridge_address_id: 0,
        input_asset_id: 0,
        output_asset_id_a: 0,
        output_asset_id_b: 0,
    };

    pub fn new(
        bridge_address: Address,
        bridge_address_id: u32,
        input_asset_id: AssetId,
        output_asset_id_a: AssetId,
        output_asset_id_b: AssetId,
    ) -> Self {
        Self {
            bridge_address,
            bridge_address_id,
            input_asset_id,
            output_asset_id_a,
            output_asset_id_b,
        }
    }

    /// canonical encoding used in note packing and signing payloads
    pub fn to_bytes(&self) -> [u8; 36] {
        let mut bytes = [0u8; 36];
        bytes[..20].copy_from_slice(&self.bridge_address.0);
        bytes[20..24].copy_from_slice(&self.bridge_address_id.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.input_asset_id.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.output_asset_id_a.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.output_asset_id_b.to_le_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_id_encoding() {
        let id = BridgeId::new(Address([1u8; 20]), 1, 2, 3, 0);
        let id2 = BridgeId::new(Address([1u8; 20]), 1, 2, 3, 0);
        assert_eq!(id.to_bytes(), id2.to_bytes());

        // any field change alters the encoding
        let id3 = BridgeId::new(Address([1u8; 20]), 1, 2, 4, 0);
        assert_ne!(id.to_bytes(), id3.to_bytes());
    }

    #[test]
    fn test_zero_bridge_id() {
        assert_eq!(BridgeId::ZERO.to_bytes(), [0u8; 36]);
    }
}

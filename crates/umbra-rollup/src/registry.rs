//! Asset registry - ordered list of supported asset descriptors
//!
//! Append-only and owner-gated. Asset id 0 is the chain's native asset
//! and is pre-registered at construction; ids are assigned sequentially.

use serde::{Deserialize, Serialize};
use umbra_primitives::{Address, AssetId, MAX_ASSETS};

use crate::error::{Result, RollupError};

/// one supported asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub id: AssetId,
    /// token contract address (zero for the native asset)
    pub address: Address,
    /// whether the token supports the permit approval flow
    pub permit_support: bool,
}

/// ordered registry of supported assets
#[derive(Clone, Debug)]
pub struct AssetRegistry {
    entries: Vec<AssetEntry>,
}

impl AssetRegistry {
    /// new registry with the native asset pre-registered as id 0
    pub fn new() -> Self {
        Self {
            entries: vec![AssetEntry {
                id: 0,
                address: Address::ZERO,
                permit_support: false,
            }],
        }
    }

    /// append a new asset at the next free id
    pub fn register(&mut self, address: Address, permit_support: bool) -> Result<AssetId> {
        if self.entries.len() >= MAX_ASSETS {
            return Err(RollupError::RegistryFull);
        }
        let id = self.entries.len() as AssetId;
        self.entries.push(AssetEntry { id, address, permit_support });
        Ok(id)
    }

    pub fn get(&self, id: AssetId) -> Result<&AssetEntry> {
        self.entries.get(id as usize).ok_or(RollupError::UnknownAsset(id))
    }

    pub fn permit_support(&self, id: AssetId) -> Result<bool> {
        self.get(id).map(|entry| entry.permit_support)
    }

    /// all entries in insertion order
    pub fn list(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

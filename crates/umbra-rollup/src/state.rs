//! Rollup ledger state
//!
//! The single mutable resource of the settlement core. All mutation
//! funnels through the processor's commit step; everything public here
//! is a snapshot read of the last committed state.

use std::collections::BTreeMap;
use umbra_primitives::{
    initial_interaction_hash, Address, Amount, AssetId, Hash, RollupId, Roots,
};

/// per-asset accumulated value movement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetTotals {
    pub deposited: Amount,
    pub withdrawn: Amount,
    pub fees: Amount,
    pub pending_deposit: Amount,
}

/// the settled ledger state
#[derive(Clone, Debug)]
pub struct RollupState {
    pub(crate) roots: Roots,
    pub(crate) next_rollup_id: RollupId,
    pub(crate) data_size: u64,
    pub(crate) defi_interaction_hash: Hash,
    pub(crate) totals: BTreeMap<AssetId, AssetTotals>,
    /// pending deposits broken down by depositor, consumed by deposit proofs
    pub(crate) user_pending: BTreeMap<(AssetId, Address), Amount>,
}

fn empty_root(label: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"umbra.tree.empty.v1");
    hasher.update(label);
    *hasher.finalize().as_bytes()
}

impl RollupState {
    /// state before any block has settled
    pub fn genesis() -> Self {
        Self {
            roots: Roots {
                data_root: empty_root(b"data"),
                null_root: empty_root(b"null"),
                root_root: empty_root(b"root"),
                defi_root: empty_root(b"defi"),
            },
            next_rollup_id: 0,
            data_size: 0,
            defi_interaction_hash: initial_interaction_hash(),
            totals: BTreeMap::new(),
            user_pending: BTreeMap::new(),
        }
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn data_root(&self) -> Hash {
        self.roots.data_root
    }

    pub fn null_root(&self) -> Hash {
        self.roots.null_root
    }

    pub fn root_root(&self) -> Hash {
        self.roots.root_root
    }

    pub fn defi_root(&self) -> Hash {
        self.roots.defi_root
    }

    pub fn next_rollup_id(&self) -> RollupId {
        self.next_rollup_id
    }

    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    pub fn defi_interaction_hash(&self) -> Hash {
        self.defi_interaction_hash
    }

    pub fn totals(&self, asset_id: AssetId) -> AssetTotals {
        self.totals.get(&asset_id).copied().unwrap_or_default()
    }

    pub fn total_deposited(&self, asset_id: AssetId) -> Amount {
        self.totals(asset_id).deposited
    }

    pub fn total_withdrawn(&self, asset_id: AssetId) -> Amount {
        self.totals(asset_id).withdrawn
    }

    pub fn total_fees(&self, asset_id: AssetId) -> Amount {
        self.totals(asset_id).fees
    }

    pub fn total_pending_deposit(&self, asset_id: AssetId) -> Amount {
        self.totals(asset_id).pending_deposit
    }

    /// pending deposit attributable to one depositor
    pub fn user_pending_deposit(&self, asset_id: AssetId, owner: Address) -> Amount {
        self.user_pending.get(&(asset_id, owner)).copied().unwrap_or(0)
    }

    pub(crate) fn totals_mut(&mut self, asset_id: AssetId) -> &mut AssetTotals {
        self.totals.entry(asset_id).or_default()
    }

    pub(crate) fn user_pending_mut(&mut self, asset_id: AssetId, owner: Address) -> &mut Amount {
        self.user_pending.entry((asset_id, owner)).or_insert(0)
    }
}

//! defi interaction notes
//!
//! one note records the outcome of one bridge call. the notes produced
//! while settling a block are packed into a single hash, and that hash
//! is the causal link the next claim-consuming block must re-assert.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bridge_id::BridgeId;
use crate::types::{Amount, Hash};
use crate::{NOTE_DOMAIN, NUM_BRIDGE_CALLS_PER_BLOCK};

/// result of one bridge call, settled synchronously with its block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefiInteractionNote {
    /// bridge the call was routed to
    pub bridge_id: BridgeId,
    /// globally unique: `rollup_id * NUM_BRIDGE_CALLS_PER_BLOCK + slot`
    pub nonce: u64,
    /// value the block deposited into the bridge
    pub total_input_value: Amount,
    /// value returned on the first output asset
    pub output_value_a: Amount,
    /// value returned on the second output asset
    pub output_value_b: Amount,
    /// false when the bridge call reverted; outputs are zero in that case
    pub success: bool,
}

impl DefiInteractionNote {
    /// sentinel filling unused bridge-call slots in the packed batch
    pub fn padding() -> Self {
        Self {
            bridge_id: BridgeId::ZERO,
            nonce: 0,
            total_input_value: 0,
            output_value_a: 0,
            output_value_b: 0,
            success: false,
        }
    }

    pub fn is_padding(&self) -> bool {
        *self == Self::padding()
    }

    /// canonical encoding used by `pack_interaction_notes`
    pub fn to_bytes(&self) -> [u8; 93] {
        let mut bytes = [0u8; 93];
        bytes[..36].copy_from_slice(&self.bridge_id.to_bytes());
        bytes[36..44].copy_from_slice(&self.nonce.to_le_bytes());
        bytes[44..60].copy_from_slice(&self.total_input_value.to_le_bytes());
        bytes[60..76].copy_from_slice(&self.output_value_a.to_le_bytes());
        bytes[76..92].copy_from_slice(&self.output_value_b.to_le_bytes());
        bytes[92] = self.success as u8;
        bytes
    }
}

/// pack a block's interaction notes into the chained commitment hash
///
/// the batch is always padded to `NUM_BRIDGE_CALLS_PER_BLOCK` slots, so a
/// block with no bridge calls still produces a well-defined hash.
///
/// # Panics
///
/// panics if more than `NUM_BRIDGE_CALLS_PER_BLOCK` notes are supplied;
/// the ledger rejects oversized batches before packing.
pub fn pack_interaction_notes(notes: &[DefiInteractionNote]) -> Hash {
    assert!(notes.len() <= NUM_BRIDGE_CALLS_PER_BLOCK);

    let padding = DefiInteractionNote::padding();
    let mut hasher = Sha256::new();
    hasher.update(NOTE_DOMAIN);
    for slot in 0..NUM_BRIDGE_CALLS_PER_BLOCK {
        let note = notes.get(slot).unwrap_or(&padding);
        hasher.update(note.to_bytes());
    }
    hasher.finalize().into()
}

/// interaction hash held by the genesis state: the packing of an empty batch
pub fn initial_interaction_hash() -> Hash {
    pack_interaction_notes(&[])
}

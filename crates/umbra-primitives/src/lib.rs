//! umbra protocol primitives
//!
//! value-level types shared between the settlement core and clients:
//! hashes, addresses, bridge identifiers, defi interaction notes and
//! their deterministic packing, and rollup proof data.
//!
//! nothing in this crate mutates ledger state - the settlement rules
//! live in `umbra-rollup`.

pub mod bridge_id;
pub mod note;
pub mod proof_data;
pub mod types;
pub mod viewing_key;

pub use bridge_id::BridgeId;
pub use note::{initial_interaction_hash, pack_interaction_notes, DefiInteractionNote};
pub use proof_data::{DefiCall, InnerProofData, ProofType, RollupProofData, Roots};
pub use types::{
    verify_origin, Address, Amount, AssetId, Hash, Height, PublicKey, RollupId, Signature,
    ZERO_HASH,
};
pub use viewing_key::{concat_viewing_keys, ViewingKey};

/// maximum number of concurrently registered assets
pub const MAX_ASSETS: usize = 16;

/// bridge-call slots per rollup block
pub const NUM_BRIDGE_CALLS_PER_BLOCK: usize = 4;

/// commitment-tree leaves contributed by one inner proof
pub const LEAVES_PER_INNER_PROOF: usize = 2;

/// largest inner-proof capacity a block may declare
pub const MAX_ROLLUP_SIZE: usize = 1024;

/// domain separator for inner proof hashes
pub const PROOF_DOMAIN: &[u8] = b"umbra.inner-proof.v1";
/// domain separator for defi interaction notes
pub const NOTE_DOMAIN: &[u8] = b"umbra.defi-interaction-note.v1";
/// domain separator for address derivation
pub const ADDRESS_DOMAIN: &[u8] = b"umbra.address.v1";

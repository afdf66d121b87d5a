//! Collaborator boundaries
//!
//! The settlement core consumes four external capabilities: the proof
//! validity oracle, the commitment-tree builder, the bridge-call
//! executor, and the token transfer port. Each is a trait so tests and
//! deployments can supply their own implementations.

use thiserror::Error;
use umbra_primitives::{
    Address, Amount, BridgeId, DefiInteractionNote, Hash, RollupProofData, Roots,
};

use crate::registry::AssetEntry;

/// opaque proof validity oracle
///
/// the state-tuple equality checks (rollup id, data start, old roots)
/// are the processor's job; this only answers "is the proof itself valid".
pub trait ProofVerifier {
    fn verify(&self, proof_data: &RollupProofData) -> bool;
}

/// external commitment-tree collaborator
///
/// derives the four new roots from the previous roots, the padded leaf
/// set of the block, and the block's interaction notes.
pub trait CommitmentTrees {
    fn advance(&self, prev: &Roots, leaves: &[Hash], notes: &[DefiInteractionNote]) -> Roots;
}

/// one bridge call scheduled for execution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BridgeCall {
    pub bridge_id: BridgeId,
    /// globally unique interaction nonce for this slot
    pub nonce: u64,
    pub total_input_value: Amount,
}

/// what a successful bridge call returned
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeOutcome {
    pub output_value_a: Amount,
    pub output_value_b: Amount,
}

/// why a bridge call failed
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    #[error("bridge call reverted: {0}")]
    Reverted(String),

    #[error("bridge ran out of gas")]
    OutOfGas,

    #[error("no bridge deployed at {0}")]
    UnknownBridge(Address),
}

/// synchronous external bridge boundary
///
/// failures here are downgraded to `success=false` notes by the
/// interaction ledger; they never abort settlement.
pub trait BridgeCallExecutor {
    fn execute(&mut self, call: &BridgeCall) -> Result<BridgeOutcome, ExecutorError>;
}

/// why a token transfer failed
#[derive(Debug, Clone, Error)]
#[error("token transfer failed: {0}")]
pub struct TransferError(pub String);

/// one pool payout owed to a public recipient
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    pub asset: AssetEntry,
    pub to: Address,
    pub amount: Amount,
}

/// external asset collaborator with transfer-from/transfer semantics
pub trait TokenTransfers {
    /// pull `amount` of `asset` from `from` into the pool
    fn transfer_from(
        &mut self,
        asset: &AssetEntry,
        from: Address,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// pay the listed amounts out of the pool to their recipients
    ///
    /// all-or-nothing: an implementation that cannot complete every
    /// payout in the batch must leave none of them applied.
    fn transfer(&mut self, payouts: &[Payout]) -> Result<(), TransferError>;
}

//! error types for the settlement core

use thiserror::Error;
use umbra_primitives::{Hash, RollupId};

/// every way a submission or side-call can be rejected
///
/// validation failures abort with no state change; the caller decides
/// from the variant whether to resubmit (stale state), wait (window
/// closed), or fix authorization (approval/signature issues).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollupError {
    #[error("caller is not the owner")]
    NotOwner,

    #[error("asset registry is full")]
    RegistryFull,

    #[error("unknown asset id {0}")]
    UnknownAsset(u32),

    #[error("unknown rollup provider {0}")]
    UnknownProvider(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("escape hatch closed, opens in {blocks_remaining} blocks")]
    EscapeBlockRangeIncorrect { blocks_remaining: u64 },

    #[error("inner proof not approved by its owner")]
    ProofNotApproved,

    #[error("submission built against stale state: expected rollup id {expected}, got {got}")]
    StateMismatch { expected: RollupId, got: RollupId },

    #[error("stale defi interaction hash: expected {}, got {}", hex::encode(expected), hex::encode(got))]
    StaleInteractionHash { expected: Hash, got: Hash },

    #[error("insufficient pending deposit: have {have}, need {need}")]
    InsufficientDeposit { have: u128, need: u128 },

    #[error("rollup proof rejected by verifier")]
    InvalidProof,

    #[error("block reserves {0} bridge calls, limit is {1}")]
    TooManyBridgeCalls(usize, usize),

    #[error("block carries {proofs} inner proofs but declares capacity {capacity}")]
    RollupSizeMismatch { proofs: usize, capacity: usize },

    #[error("declared rollup size {got} exceeds the maximum {max}")]
    RollupSizeTooLarge { got: usize, max: usize },

    #[error("token transfer failed: {0}")]
    TransferFailed(String),

    #[error("client connected to the wrong network: expected chain {expected}, got {got}")]
    NetworkMismatch { expected: u64, got: u64 },
}

pub type Result<T> = std::result::Result<T, RollupError>;

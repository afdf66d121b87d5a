//! Umbra rollup settlement core
//!
//! Settles batches of privacy-preserving transaction proofs onto a
//! persistent ledger state. One submission at a time enters the
//! [`RollupProcessor`], which authenticates the submission path
//! (operator-signed or permissionless escape hatch), checks proof
//! approvals, executes bridge calls, advances the four commitment
//! roots, and appends an immutable block record.
//!
//! # Architecture
//!
//! ```text
//! submission ──▶ Validating ──▶ Assembling ──▶ Committed
//!                   │               │
//!                   │               ├─ BridgeCallExecutor (external)
//!                   │               └─ CommitmentTrees    (external)
//!                   └─ ProofVerifier (external oracle)
//! ```
//!
//! Proof generation and verification internals, wallet sync, and token
//! transfer mechanics are external collaborators behind the traits in
//! [`traits`]. The core never interprets note contents or viewing keys.

pub mod approvals;
pub mod defi;
pub mod error;
pub mod escape;
pub mod processor;
pub mod registry;
pub mod state;
pub mod traits;

pub use approvals::ProofApprovalStore;
pub use defi::DefiInteractionLedger;
pub use error::{Result, RollupError};
pub use escape::{escape_hatch_status, EscapeHatchStatus, ESCAPE_BLOCK_UPPER_BOUND, ESCAPE_WINDOW};
pub use processor::{RollupBlock, RollupProcessor, Submission, SubmissionPath, TxSignature};
pub use registry::{AssetEntry, AssetRegistry};
pub use state::{AssetTotals, RollupState};
pub use traits::{
    BridgeCall, BridgeCallExecutor, BridgeOutcome, CommitmentTrees, ExecutorError, Payout,
    ProofVerifier, TokenTransfers, TransferError,
};

pub use umbra_primitives::{
    LEAVES_PER_INNER_PROOF, MAX_ASSETS, MAX_ROLLUP_SIZE, NUM_BRIDGE_CALLS_PER_BLOCK,
};

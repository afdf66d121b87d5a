//! rollup proof data
//!
//! the decoded public inputs of a rollup proof: the state tuple the proof
//! was built against, the inner proofs it settles, and the bridge calls it
//! reserves. proof validity itself is an external oracle - this module
//! only defines the data and its canonical encodings.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bridge_id::BridgeId;
use crate::types::{Address, Amount, AssetId, Hash, RollupId, ZERO_HASH};
use crate::{LEAVES_PER_INNER_PROOF, PROOF_DOMAIN};

/// kind of statement an inner proof makes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofType {
    /// fold a pending public deposit into a shielded note
    Deposit,
    /// fully shielded value transfer
    Transfer,
    /// unshield value to a public address
    Withdraw,
    /// account key registration/migration, no value movement
    Account,
    /// deposit shielded value into a defi bridge
    DefiDeposit,
    /// redeem the output of an earlier bridge interaction
    DefiClaim,
    /// placeholder filling unused block capacity
    Padding,
}

/// one user-submitted statement bundled into a rollup block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerProofData {
    pub proof_type: ProofType,
    /// public value entering (deposit) or leaving (withdraw) the pool
    pub public_value: Amount,
    /// asset the public value is denominated in
    pub asset_id: AssetId,
    /// public party funding a deposit
    pub input_owner: Address,
    /// public party receiving a withdrawal
    pub output_owner: Address,
    /// new note commitments appended to the data tree
    pub note_commitments: [Hash; LEAVES_PER_INNER_PROOF],
    /// nullifiers of the notes this proof spends
    pub nullifiers: [Hash; LEAVES_PER_INNER_PROOF],
    /// fee paid to the block submitter
    pub fee: Amount,
}

impl InnerProofData {
    /// placeholder proof padding a block to capacity
    pub fn padding() -> Self {
        Self {
            proof_type: ProofType::Padding,
            public_value: 0,
            asset_id: 0,
            input_owner: Address::ZERO,
            output_owner: Address::ZERO,
            note_commitments: [ZERO_HASH; LEAVES_PER_INNER_PROOF],
            nullifiers: [ZERO_HASH; LEAVES_PER_INNER_PROOF],
            fee: 0,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.proof_type == ProofType::Padding
    }

    /// true when the proof draws on or releases public funds and therefore
    /// needs authorization from its public owner
    pub fn moves_public_value(&self) -> bool {
        matches!(self.proof_type, ProofType::Deposit) && self.public_value > 0
    }

    fn type_tag(&self) -> u8 {
        match self.proof_type {
            ProofType::Deposit => 0,
            ProofType::Transfer => 1,
            ProofType::Withdraw => 2,
            ProofType::Account => 3,
            ProofType::DefiDeposit => 4,
            ProofType::DefiClaim => 5,
            ProofType::Padding => 6,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 16 + 4 + 20 * 2 + 32 * 4 + 16);
        bytes.push(self.type_tag());
        bytes.extend_from_slice(&self.public_value.to_le_bytes());
        bytes.extend_from_slice(&self.asset_id.to_le_bytes());
        bytes.extend_from_slice(&self.input_owner.0);
        bytes.extend_from_slice(&self.output_owner.0);
        for commitment in &self.note_commitments {
            bytes.extend_from_slice(commitment);
        }
        for nullifier in &self.nullifiers {
            bytes.extend_from_slice(nullifier);
        }
        bytes.extend_from_slice(&self.fee.to_le_bytes());
        bytes
    }

    /// proof hash keyed by approvals and per-proof signatures
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(PROOF_DOMAIN);
        hasher.update(self.to_bytes());
        hasher.finalize().into()
    }
}

/// one bridge-call slot reservation inside a block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefiCall {
    pub bridge_id: BridgeId,
    /// summed defi-deposit value routed into the bridge
    pub deposit_sum: Amount,
}

/// the four commitment roots as one unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roots {
    pub data_root: Hash,
    pub null_root: Hash,
    pub root_root: Hash,
    pub defi_root: Hash,
}

/// decoded public inputs of a rollup proof
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupProofData {
    /// must equal the ledger's `next_rollup_id`
    pub rollup_id: RollupId,
    /// inner-proof capacity of this block
    pub rollup_size: usize,
    /// must equal the ledger's `data_size`
    pub data_start_index: u64,
    /// roots the proof was built against; must equal the current state
    pub old_roots: Roots,
    /// bridge-call reservations, at most `NUM_BRIDGE_CALLS_PER_BLOCK`
    pub defi_calls: Vec<DefiCall>,
    /// interaction hash a claim-consuming block asserts against the ledger
    pub previous_defi_interaction_hash: Option<Hash>,
    /// the real inner proofs; padded to `rollup_size` during assembly
    pub inner_proofs: Vec<InnerProofData>,
}

impl RollupProofData {
    /// inner proofs padded to block capacity with placeholders
    pub fn padded_inner_proofs(&self) -> Vec<InnerProofData> {
        let mut proofs = self.inner_proofs.clone();
        proofs.resize(self.rollup_size, InnerProofData::padding());
        proofs
    }

    /// tree leaves of the padded proof set, in slot order
    pub fn padded_leaves(&self) -> Vec<Hash> {
        self.padded_inner_proofs()
            .iter()
            .flat_map(|proof| proof.note_commitments)
            .collect()
    }

    /// canonical payload an operator signs to authorize submission
    pub fn signing_payload(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(b"umbra.rollup-proof.signing.v1");
        hasher.update(self.rollup_id.to_le_bytes());
        hasher.update((self.rollup_size as u64).to_le_bytes());
        hasher.update(self.data_start_index.to_le_bytes());
        hasher.update(self.old_roots.data_root);
        hasher.update(self.old_roots.null_root);
        hasher.update(self.old_roots.root_root);
        hasher.update(self.old_roots.defi_root);
        for call in &self.defi_calls {
            hasher.update(call.bridge_id.to_bytes());
            hasher.update(call.deposit_sum.to_le_bytes());
        }
        match &self.previous_defi_interaction_hash {
            Some(hash) => hasher.update(hash),
            None => hasher.update(ZERO_HASH),
        }
        for proof in &self.inner_proofs {
            hasher.update(proof.hash());
        }
        hasher.finalize().into()
    }
}

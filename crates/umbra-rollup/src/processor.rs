//! Rollup processor - the settlement state machine
//!
//! One submission moves through validating, assembling, and committing.
//! Validation touches no state; assembly executes the external bridge
//! and tree collaborators; commit swaps the new state in atomically and
//! appends the block record. A rejected submission has no observable
//! effect.

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::collections::HashSet;
use tracing::{debug, info};
use umbra_primitives::{
    concat_viewing_keys, pack_interaction_notes, verify_origin, Address, Amount, AssetId,
    DefiInteractionNote, Hash, Height, InnerProofData, ProofType, PublicKey, RollupId,
    RollupProofData, Signature, ViewingKey, LEAVES_PER_INNER_PROOF, MAX_ROLLUP_SIZE,
    NUM_BRIDGE_CALLS_PER_BLOCK,
};

use crate::approvals::ProofApprovalStore;
use crate::defi::DefiInteractionLedger;
use crate::error::{Result, RollupError};
use crate::escape::{escape_hatch_status, EscapeHatchStatus};
use crate::registry::{AssetEntry, AssetRegistry};
use crate::state::RollupState;
use crate::traits::{BridgeCallExecutor, CommitmentTrees, Payout, ProofVerifier, TokenTransfers};

/// per-inner-proof authorization signature
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TxSignature {
    pub pubkey: PublicKey,
    #[serde(with = "BigArray")]
    pub signature: Signature,
}

/// one batch offered for settlement
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    pub proof_data: RollupProofData,
    /// authorization signatures, positionally matching the inner proofs
    pub signatures: Vec<Option<TxSignature>>,
    /// opaque encrypted payloads, stored with the block
    pub viewing_keys: Vec<ViewingKey>,
}

/// how a submission authenticates itself
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SubmissionPath {
    /// designated operator vouches for the whole batch
    Operator {
        provider: Address,
        pubkey: PublicKey,
        #[serde(with = "BigArray")]
        signature: Signature,
        fee_receiver: Address,
    },
    /// permissionless path, only usable while the escape window is open
    Escape,
}

/// an accepted block, immutable once written; read by indexers by range
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RollupBlock {
    pub rollup_id: RollupId,
    pub rollup_size: usize,
    /// `data_size` immediately before this block was applied
    pub data_start_index: u64,
    /// inner proofs padded to block capacity
    pub inner_proofs: Vec<InnerProofData>,
    /// concatenated viewing-key blob, never interpreted
    pub viewing_keys: Vec<u8>,
    /// bridge-call results settled with this block
    pub interaction_result: Vec<DefiInteractionNote>,
}

/// the settlement core
///
/// exclusively owns `RollupState` and the block history; every mutation
/// funnels through one of the gated entrypoints below.
pub struct RollupProcessor {
    owner: Address,
    state: RollupState,
    blocks: Vec<RollupBlock>,
    registry: AssetRegistry,
    approvals: ProofApprovalStore,
    defi_ledger: DefiInteractionLedger,
    providers: HashSet<Address>,
    verifier: Box<dyn ProofVerifier>,
    trees: Box<dyn CommitmentTrees>,
    executor: Box<dyn BridgeCallExecutor>,
    tokens: Box<dyn TokenTransfers>,
}

impl RollupProcessor {
    pub fn new(
        owner: Address,
        verifier: Box<dyn ProofVerifier>,
        trees: Box<dyn CommitmentTrees>,
        executor: Box<dyn BridgeCallExecutor>,
        tokens: Box<dyn TokenTransfers>,
    ) -> Self {
        Self {
            owner,
            state: RollupState::genesis(),
            blocks: Vec::new(),
            registry: AssetRegistry::new(),
            approvals: ProofApprovalStore::new(),
            defi_ledger: DefiInteractionLedger::new(),
            providers: HashSet::new(),
            verifier,
            trees,
            executor,
            tokens,
        }
    }

    fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(RollupError::NotOwner);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Owner-gated side calls (outside the per-block flow)
    // ------------------------------------------------------------------

    pub fn register_asset(
        &mut self,
        caller: Address,
        address: Address,
        permit_support: bool,
    ) -> Result<AssetId> {
        self.ensure_owner(caller)?;
        self.registry.register(address, permit_support)
    }

    pub fn set_verifier(&mut self, caller: Address, verifier: Box<dyn ProofVerifier>) -> Result<()> {
        self.ensure_owner(caller)?;
        self.verifier = verifier;
        Ok(())
    }

    pub fn set_rollup_provider(
        &mut self,
        caller: Address,
        provider: Address,
        enabled: bool,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        if enabled {
            self.providers.insert(provider);
        } else {
            self.providers.remove(&provider);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Caller-scoped mutations
    // ------------------------------------------------------------------

    /// grant approval for a proof hash on behalf of the caller
    pub fn approve_proof(&mut self, caller: Address, proof_hash: Hash) {
        self.approvals.approve(caller, proof_hash);
    }

    /// fund a future deposit proof; pulls tokens into the pool
    pub fn deposit_pending_funds(
        &mut self,
        caller: Address,
        asset_id: AssetId,
        amount: Amount,
    ) -> Result<()> {
        let entry = *self.registry.get(asset_id)?;
        self.tokens
            .transfer_from(&entry, caller, amount)
            .map_err(|err| RollupError::TransferFailed(err.0))?;
        self.state.totals_mut(asset_id).pending_deposit += amount;
        *self.state.user_pending_mut(asset_id, caller) += amount;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Submission entrypoints
    // ------------------------------------------------------------------

    pub fn submit_operator_block(
        &mut self,
        sender: Address,
        height: Height,
        submission: Submission,
        provider: Address,
        pubkey: PublicKey,
        operator_signature: Signature,
        fee_receiver: Address,
    ) -> Result<RollupId> {
        self.process(
            sender,
            height,
            submission,
            SubmissionPath::Operator { provider, pubkey, signature: operator_signature, fee_receiver },
        )
    }

    pub fn submit_escape_block(
        &mut self,
        sender: Address,
        height: Height,
        submission: Submission,
    ) -> Result<RollupId> {
        self.process(sender, height, submission, SubmissionPath::Escape)
    }

    fn process(
        &mut self,
        sender: Address,
        height: Height,
        submission: Submission,
        path: SubmissionPath,
    ) -> Result<RollupId> {
        // Validating: no state is touched until every check passes.
        self.validate(sender, height, &submission, &path)?;
        debug!(rollup_id = submission.proof_data.rollup_id, "submission validated");

        // Assembling.
        let proof_data = &submission.proof_data;
        let padded_proofs = proof_data.padded_inner_proofs();

        // Withdrawals pay out before the bridge boundary is crossed, as
        // one all-or-nothing batch. A failing batch aborts the submission
        // with no partial payouts and no bridge side effects.
        let mut payouts = Vec::new();
        for proof in &padded_proofs {
            if proof.proof_type == ProofType::Withdraw && proof.public_value > 0 {
                let asset = *self.registry.get(proof.asset_id)?;
                payouts.push(Payout { asset, to: proof.output_owner, amount: proof.public_value });
            }
        }
        if !payouts.is_empty() {
            self.tokens
                .transfer(&payouts)
                .map_err(|err| RollupError::TransferFailed(err.0))?;
        }

        let reservations = self
            .defi_ledger
            .record_calls(proof_data.rollup_id, &proof_data.defi_calls)?;
        let notes = self.defi_ledger.execute(&reservations, self.executor.as_mut());

        let leaves: Vec<Hash> = padded_proofs
            .iter()
            .flat_map(|proof| proof.note_commitments)
            .collect();
        let new_roots = self.trees.advance(self.state.roots(), &leaves, &notes);

        // Committing: atomic swap of the singleton state plus one appended
        // block record.
        let rollup_id = proof_data.rollup_id;
        for proof in &padded_proofs {
            self.apply_accounting(proof);
        }
        self.state.roots = new_roots;
        self.state.defi_interaction_hash = pack_interaction_notes(&notes);
        self.state.next_rollup_id += 1;
        self.state.data_size += (proof_data.rollup_size * LEAVES_PER_INNER_PROOF) as u64;

        self.blocks.push(RollupBlock {
            rollup_id,
            rollup_size: proof_data.rollup_size,
            data_start_index: proof_data.data_start_index,
            inner_proofs: padded_proofs,
            viewing_keys: concat_viewing_keys(&submission.viewing_keys),
            interaction_result: notes,
        });

        info!(
            rollup_id,
            data_size = self.state.data_size,
            bridge_calls = proof_data.defi_calls.len(),
            "rollup block settled"
        );
        Ok(rollup_id)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn validate(
        &self,
        sender: Address,
        height: Height,
        submission: &Submission,
        path: &SubmissionPath,
    ) -> Result<()> {
        let proof_data = &submission.proof_data;

        // Shape checks. The declared capacity is caller-supplied, so it
        // is bounded before anything allocates proportionally to it.
        if proof_data.rollup_size > MAX_ROLLUP_SIZE {
            return Err(RollupError::RollupSizeTooLarge {
                got: proof_data.rollup_size,
                max: MAX_ROLLUP_SIZE,
            });
        }
        if proof_data.inner_proofs.len() > proof_data.rollup_size {
            return Err(RollupError::RollupSizeMismatch {
                proofs: proof_data.inner_proofs.len(),
                capacity: proof_data.rollup_size,
            });
        }
        if proof_data.defi_calls.len() > NUM_BRIDGE_CALLS_PER_BLOCK {
            return Err(RollupError::TooManyBridgeCalls(
                proof_data.defi_calls.len(),
                NUM_BRIDGE_CALLS_PER_BLOCK,
            ));
        }

        // Path authentication.
        match path {
            SubmissionPath::Operator { provider, pubkey, signature, .. } => {
                if !self.providers.contains(provider) {
                    return Err(RollupError::UnknownProvider(provider.to_string()));
                }
                let payload = proof_data.signing_payload();
                if !verify_origin(&payload, signature, pubkey, provider) {
                    return Err(RollupError::InvalidSignature);
                }
            }
            SubmissionPath::Escape => {
                let status = escape_hatch_status(height);
                if !status.escape_open {
                    return Err(RollupError::EscapeBlockRangeIncorrect {
                        blocks_remaining: status.blocks_remaining,
                    });
                }
            }
        }

        // State-tuple check: stale or out-of-order submissions stop here,
        // before any per-proof check. A losing racer must see the stale
        // tuple, not whatever its already-consumed deposits look like
        // against the new state.
        if proof_data.rollup_id != self.state.next_rollup_id
            || proof_data.data_start_index != self.state.data_size
            || proof_data.old_roots != *self.state.roots()
        {
            return Err(RollupError::StateMismatch {
                expected: self.state.next_rollup_id,
                got: proof_data.rollup_id,
            });
        }

        // Interaction-hash chaining constraint.
        if let Some(claimed) = proof_data.previous_defi_interaction_hash {
            if claimed != self.state.defi_interaction_hash {
                return Err(RollupError::StaleInteractionHash {
                    expected: self.state.defi_interaction_hash,
                    got: claimed,
                });
            }
        }

        // Per-proof authorization and asset checks.
        for (index, proof) in proof_data.inner_proofs.iter().enumerate() {
            if !proof.is_padding() && proof.public_value > 0 {
                self.registry.get(proof.asset_id)?;
            }
            if proof.moves_public_value() {
                self.authorize_inner_proof(sender, proof, submission.signatures.get(index), path)?;
            }
        }

        // Pending-deposit sufficiency per depositor.
        let mut required: std::collections::BTreeMap<(AssetId, Address), Amount> =
            std::collections::BTreeMap::new();
        for proof in &proof_data.inner_proofs {
            if proof.moves_public_value() {
                *required.entry((proof.asset_id, proof.input_owner)).or_insert(0) +=
                    proof.public_value;
            }
        }
        for ((asset_id, owner), need) in required {
            let have = self.state.user_pending_deposit(asset_id, owner);
            if have < need {
                return Err(RollupError::InsufficientDeposit { have, need });
            }
        }

        // Opaque proof validity oracle.
        if !self.verifier.verify(proof_data) {
            return Err(RollupError::InvalidProof);
        }

        Ok(())
    }

    /// a deposit proof draws public funds from its input owner, so it needs
    /// a per-proof signature or a prior approval; on the operator path the
    /// sender implicitly authorizes their own deposits
    fn authorize_inner_proof(
        &self,
        sender: Address,
        proof: &InnerProofData,
        signature: Option<&Option<TxSignature>>,
        path: &SubmissionPath,
    ) -> Result<()> {
        if let Some(Some(sig)) = signature {
            let proof_hash = proof.hash();
            if verify_origin(&proof_hash, &sig.signature, &sig.pubkey, &proof.input_owner) {
                return Ok(());
            }
            return Err(RollupError::InvalidSignature);
        }
        if matches!(path, SubmissionPath::Operator { .. }) && proof.input_owner == sender {
            return Ok(());
        }
        if self.approvals.is_approved(proof.input_owner, proof.hash()) {
            return Ok(());
        }
        Err(RollupError::ProofNotApproved)
    }

    fn apply_accounting(&mut self, proof: &InnerProofData) {
        match proof.proof_type {
            ProofType::Deposit if proof.public_value > 0 => {
                let pending = self.state.user_pending_mut(proof.asset_id, proof.input_owner);
                *pending = pending.saturating_sub(proof.public_value);
                let totals = self.state.totals_mut(proof.asset_id);
                totals.pending_deposit = totals.pending_deposit.saturating_sub(proof.public_value);
                totals.deposited += proof.public_value;
            }
            ProofType::Withdraw if proof.public_value > 0 => {
                self.state.totals_mut(proof.asset_id).withdrawn += proof.public_value;
            }
            _ => {}
        }
        if proof.fee > 0 {
            self.state.totals_mut(proof.asset_id).fees += proof.fee;
        }
    }

    // ------------------------------------------------------------------
    // Query surface (snapshot reads of the last committed state)
    // ------------------------------------------------------------------

    pub fn state(&self) -> &RollupState {
        &self.state
    }

    pub fn next_rollup_id(&self) -> RollupId {
        self.state.next_rollup_id()
    }

    pub fn data_size(&self) -> u64 {
        self.state.data_size()
    }

    pub fn number_of_assets(&self) -> usize {
        self.registry.len()
    }

    pub const fn number_of_bridge_calls(&self) -> usize {
        NUM_BRIDGE_CALLS_PER_BLOCK
    }

    pub fn get_supported_assets(&self) -> Vec<Address> {
        self.registry.list().map(|entry| entry.address).collect()
    }

    pub fn get_supported_asset(&self, asset_id: AssetId) -> Result<AssetEntry> {
        self.registry.get(asset_id).copied()
    }

    pub fn asset_permit_support(&self, asset_id: AssetId) -> Result<bool> {
        self.registry.permit_support(asset_id)
    }

    pub fn escape_hatch_status(&self, height: Height) -> EscapeHatchStatus {
        escape_hatch_status(height)
    }

    pub fn proof_approval_status(&self, owner: Address, proof_hash: Hash) -> bool {
        self.approvals.is_approved(owner, proof_hash)
    }

    pub fn is_rollup_provider(&self, provider: Address) -> bool {
        self.providers.contains(&provider)
    }

    pub fn defi_ledger(&self) -> &DefiInteractionLedger {
        &self.defi_ledger
    }

    /// historical blocks starting at `from`, at most `count` of them
    pub fn get_blocks(&self, from: RollupId, count: usize) -> &[RollupBlock] {
        let start = (from as usize).min(self.blocks.len());
        let end = start.saturating_add(count).min(self.blocks.len());
        &self.blocks[start..end]
    }
}

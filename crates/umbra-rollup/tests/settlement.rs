//! End-to-end settlement scenarios against mock collaborators.

use std::collections::HashMap;

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use umbra_primitives::{
    initial_interaction_hash, pack_interaction_notes, Address, Amount, AssetId, BridgeId,
    DefiCall, DefiInteractionNote, Hash, InnerProofData, ProofType, RollupProofData, Roots,
    ViewingKey,
};
use umbra_rollup::{
    AssetEntry, BridgeCall, BridgeCallExecutor, BridgeOutcome, CommitmentTrees, ExecutorError,
    Payout, ProofVerifier, RollupError, RollupProcessor, Submission, TokenTransfers,
    TransferError, TxSignature,
};

struct AcceptAll;
impl ProofVerifier for AcceptAll {
    fn verify(&self, _proof_data: &RollupProofData) -> bool {
        true
    }
}

struct ChainedTrees;
impl CommitmentTrees for ChainedTrees {
    fn advance(&self, prev: &Roots, leaves: &[Hash], notes: &[DefiInteractionNote]) -> Roots {
        let step = |label: &[u8], prev_root: &Hash| -> Hash {
            let mut hasher = Sha256::new();
            hasher.update(label);
            hasher.update(prev_root);
            for leaf in leaves {
                hasher.update(leaf);
            }
            for note in notes {
                hasher.update(note.to_bytes());
            }
            hasher.finalize().into()
        };
        Roots {
            data_root: step(b"data", &prev.data_root),
            null_root: step(b"null", &prev.null_root),
            root_root: step(b"root", &prev.root_root),
            defi_root: step(b"defi", &prev.defi_root),
        }
    }
}

/// bridge that converts any input into a fixed output, like the original
/// mock defi bridge fixtures
struct FixedOutputBridge {
    output_value_a: Amount,
}

impl BridgeCallExecutor for FixedOutputBridge {
    fn execute(&mut self, _call: &BridgeCall) -> Result<BridgeOutcome, ExecutorError> {
        Ok(BridgeOutcome { output_value_a: self.output_value_a, output_value_b: 0 })
    }
}

/// in-memory token ledger with transfer-from/transfer semantics
#[derive(Default)]
struct MockTokens {
    balances: HashMap<(AssetId, Address), Amount>,
    pool: HashMap<AssetId, Amount>,
}

impl MockTokens {
    fn mint(&mut self, asset_id: AssetId, to: Address, amount: Amount) {
        *self.balances.entry((asset_id, to)).or_insert(0) += amount;
    }
}

impl TokenTransfers for MockTokens {
    fn transfer_from(
        &mut self,
        asset: &AssetEntry,
        from: Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let balance = self.balances.entry((asset.id, from)).or_insert(0);
        if *balance < amount {
            return Err(TransferError("insufficient balance".into()));
        }
        *balance -= amount;
        *self.pool.entry(asset.id).or_insert(0) += amount;
        Ok(())
    }

    fn transfer(&mut self, payouts: &[Payout]) -> Result<(), TransferError> {
        // check every payout against the pool before applying any
        let mut need: HashMap<AssetId, Amount> = HashMap::new();
        for payout in payouts {
            *need.entry(payout.asset.id).or_insert(0) += payout.amount;
        }
        for (asset_id, total) in &need {
            if self.pool.get(asset_id).copied().unwrap_or(0) < *total {
                return Err(TransferError("pool underfunded".into()));
            }
        }
        for payout in payouts {
            *self.pool.get_mut(&payout.asset.id).unwrap() -= payout.amount;
            *self.balances.entry((payout.asset.id, payout.to)).or_insert(0) += payout.amount;
        }
        Ok(())
    }
}

const OWNER: Address = Address([0xEE; 20]);
const DAI: AssetId = 1;
const OPEN_HEIGHT: u64 = 85;

fn new_processor() -> RollupProcessor {
    let mut tokens = MockTokens::default();
    tokens.mint(DAI, user_address(), 100);
    let mut processor = RollupProcessor::new(
        OWNER,
        Box::new(AcceptAll),
        Box::new(ChainedTrees),
        Box::new(FixedOutputBridge { output_value_a: 2 }),
        Box::new(tokens),
    );
    processor.register_asset(OWNER, Address([0xDA; 20]), true).unwrap();
    processor
}

fn user_key() -> SigningKey {
    // fixed key so the user address is stable across helpers
    SigningKey::from_bytes(&[0x42; 32])
}

fn user_address() -> Address {
    Address::from_public_key(&user_key().verifying_key().to_bytes())
}

fn proof(proof_type: ProofType, public_value: Amount, seed: u8) -> InnerProofData {
    InnerProofData {
        proof_type,
        public_value,
        asset_id: DAI,
        input_owner: Address::ZERO,
        output_owner: Address::ZERO,
        note_commitments: [[seed; 32], [seed.wrapping_add(1); 32]],
        nullifiers: [[seed.wrapping_add(2); 32], [seed.wrapping_add(3); 32]],
        fee: 0,
    }
}

fn submission_for(processor: &RollupProcessor, proofs: Vec<InnerProofData>) -> Submission {
    Submission {
        proof_data: RollupProofData {
            rollup_id: processor.next_rollup_id(),
            rollup_size: 2,
            data_start_index: processor.data_size(),
            old_roots: *processor.state().roots(),
            defi_calls: vec![],
            previous_defi_interaction_hash: None,
            inner_proofs: proofs,
        },
        signatures: vec![],
        viewing_keys: vec![],
    }
}

fn sign_proof(key: &SigningKey, proof: &InnerProofData) -> TxSignature {
    TxSignature {
        pubkey: key.verifying_key().to_bytes(),
        signature: key.sign(&proof.hash()).to_bytes(),
    }
}

#[test]
fn genesis_status() {
    let processor = new_processor();

    assert_eq!(processor.number_of_assets(), 2);
    assert_eq!(processor.number_of_bridge_calls(), 4);
    assert_eq!(processor.next_rollup_id(), 0);
    assert_eq!(processor.data_size(), 0);
    assert_eq!(processor.state().defi_interaction_hash(), initial_interaction_hash());
    assert_eq!(processor.state().total_deposited(DAI), 0);
    assert_eq!(processor.state().total_withdrawn(DAI), 0);
    assert_eq!(processor.state().total_fees(DAI), 0);
    assert_eq!(processor.state().total_pending_deposit(DAI), 0);
    assert_eq!(
        processor.get_supported_assets(),
        vec![Address::ZERO, Address([0xDA; 20])]
    );
    assert!(processor.escape_hatch_status(80).escape_open);
}

#[test]
fn processes_all_proof_types_across_five_blocks() {
    let mut processor = new_processor();
    let user = user_key();
    let user_addr = user_address();
    let bridge_id = BridgeId::new(Address([0xB1; 20]), 1, DAI, 0, 0);

    processor.deposit_pending_funds(user_addr, DAI, 30).unwrap();
    assert_eq!(processor.state().total_pending_deposit(DAI), 30);

    // block 0: deposit claim, authorized by the depositor's signature
    let mut deposit = proof(ProofType::Deposit, 30, 10);
    deposit.input_owner = user_addr;
    let mut submission = submission_for(&processor, vec![deposit]);
    submission.signatures = vec![Some(sign_proof(&user, &deposit))];
    submission.viewing_keys = vec![ViewingKey::new(vec![1, 2, 3])];
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();

    // block 1: account update plus a shielded send
    let submission = submission_for(
        &processor,
        vec![proof(ProofType::Account, 0, 20), proof(ProofType::Transfer, 0, 24)],
    );
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();

    // block 2: two defi deposits routed through the bridge
    let mut submission = submission_for(
        &processor,
        vec![proof(ProofType::DefiDeposit, 0, 30), proof(ProofType::DefiDeposit, 0, 34)],
    );
    submission.proof_data.defi_calls = vec![
        DefiCall { bridge_id, deposit_sum: 12 },
        DefiCall { bridge_id, deposit_sum: 8 },
    ];
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();

    let expected_notes = vec![
        DefiInteractionNote {
            bridge_id,
            nonce: 8,
            total_input_value: 12,
            output_value_a: 2,
            output_value_b: 0,
            success: true,
        },
        DefiInteractionNote {
            bridge_id,
            nonce: 9,
            total_input_value: 8,
            output_value_a: 2,
            output_value_b: 0,
            success: true,
        },
    ];
    let interaction_hash = pack_interaction_notes(&expected_notes);
    assert_eq!(processor.state().defi_interaction_hash(), interaction_hash);

    // block 3: withdraw, re-asserting the interaction hash chain
    let mut withdraw = proof(ProofType::Withdraw, 10, 40);
    withdraw.output_owner = user_addr;
    let mut submission = submission_for(&processor, vec![withdraw]);
    submission.proof_data.previous_defi_interaction_hash = Some(interaction_hash);
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();

    // block 4: defi claim redeeming the bridge output
    let submission = submission_for(&processor, vec![proof(ProofType::DefiClaim, 0, 50)]);
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();

    // ledger progression
    assert_eq!(processor.next_rollup_id(), 5);
    assert_eq!(processor.data_size(), 20);

    let blocks = processor.get_blocks(0, 10);
    assert_eq!(blocks.len(), 5);
    let starts: Vec<u64> = blocks.iter().map(|block| block.data_start_index).collect();
    assert_eq!(starts, vec![0, 4, 8, 12, 16]);
    for (id, block) in blocks.iter().enumerate() {
        assert_eq!(block.rollup_id, id as u64);
        assert_eq!(block.rollup_size, 2);
        assert_eq!(block.inner_proofs.len(), 2);
    }

    // only block 2 carries interaction results
    assert!(blocks[0].interaction_result.is_empty());
    assert!(blocks[1].interaction_result.is_empty());
    assert_eq!(blocks[2].interaction_result, expected_notes);
    assert!(blocks[3].interaction_result.is_empty());
    assert!(blocks[4].interaction_result.is_empty());

    // packing round-trip against the hash stored while block 2 was current
    assert_eq!(pack_interaction_notes(&blocks[2].interaction_result), interaction_hash);

    // viewing keys stored verbatim
    assert_eq!(blocks[0].viewing_keys, vec![1, 2, 3]);

    // padding fills unused capacity
    assert!(blocks[0].inner_proofs[1].is_padding());
    assert!(!blocks[1].inner_proofs[1].is_padding());

    // accounting
    assert_eq!(processor.state().total_deposited(DAI), 30);
    assert_eq!(processor.state().total_pending_deposit(DAI), 0);
    assert_eq!(processor.state().total_withdrawn(DAI), 10);

    // resolved interactions stay addressable by nonce
    assert_eq!(processor.defi_ledger().resolved(9).unwrap().total_input_value, 8);
}

#[test]
fn withdraw_pays_out_of_pool() {
    let mut processor = new_processor();
    let user = user_key();
    let user_addr = user_address();

    processor.deposit_pending_funds(user_addr, DAI, 30).unwrap();

    let mut deposit = proof(ProofType::Deposit, 30, 10);
    deposit.input_owner = user_addr;
    let mut submission = submission_for(&processor, vec![deposit]);
    submission.signatures = vec![Some(sign_proof(&user, &deposit))];
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();

    let mut withdraw = proof(ProofType::Withdraw, 10, 20);
    withdraw.output_owner = user_addr;
    let submission = submission_for(&processor, vec![withdraw]);
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();

    assert_eq!(processor.state().total_withdrawn(DAI), 10);
}

#[test]
fn block_chaining_rejects_foreign_interaction_hash() {
    let mut processor = new_processor();
    let user_addr = user_address();
    let bridge_id = BridgeId::new(Address([0xB1; 20]), 1, DAI, 0, 0);

    // settle one block with a bridge call so the stored hash moves off its
    // initial value
    let mut submission = submission_for(&processor, vec![proof(ProofType::DefiDeposit, 0, 10)]);
    submission.proof_data.defi_calls = vec![DefiCall { bridge_id, deposit_sum: 5 }];
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();

    let current = processor.state().defi_interaction_hash();
    assert_ne!(current, initial_interaction_hash());

    // a block asserting the superseded initial hash is stale
    let mut submission = submission_for(&processor, vec![proof(ProofType::DefiClaim, 0, 20)]);
    submission.proof_data.previous_defi_interaction_hash = Some(initial_interaction_hash());
    let err = processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap_err();
    assert_eq!(
        err,
        RollupError::StaleInteractionHash { expected: current, got: initial_interaction_hash() }
    );

    // asserting the live hash settles
    let mut submission = submission_for(&processor, vec![proof(ProofType::DefiClaim, 0, 20)]);
    submission.proof_data.previous_defi_interaction_hash = Some(current);
    processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();
}

#[test]
fn ids_are_gapless_and_racers_lose() {
    let mut processor = new_processor();
    let user_addr = user_address();

    for expected_id in 0..3u64 {
        let submission = submission_for(&processor, vec![proof(ProofType::Transfer, 0, expected_id as u8)]);
        // a copy of this submission raced and lost below
        let racer = submission.clone();
        let id = processor.submit_escape_block(user_addr, OPEN_HEIGHT, submission).unwrap();
        assert_eq!(id, expected_id);

        let err = processor.submit_escape_block(user_addr, OPEN_HEIGHT, racer).unwrap_err();
        assert_eq!(err, RollupError::StateMismatch { expected: expected_id + 1, got: expected_id });
    }
    assert_eq!(processor.next_rollup_id(), 3);
}

#[test]
fn operator_path_settles_outside_window() {
    let mut processor = new_processor();
    let operator = SigningKey::generate(&mut OsRng);
    let pubkey = operator.verifying_key().to_bytes();
    let provider = Address::from_public_key(&pubkey);
    processor.set_rollup_provider(OWNER, provider, true).unwrap();

    let submission = submission_for(&processor, vec![proof(ProofType::Transfer, 0, 10)]);
    let signature = operator.sign(&submission.proof_data.signing_payload()).to_bytes();

    // height 10 is well outside the escape window
    assert!(!processor.escape_hatch_status(10).escape_open);
    let err = processor
        .submit_escape_block(user_address(), 10, submission.clone())
        .unwrap_err();
    assert!(matches!(err, RollupError::EscapeBlockRangeIncorrect { .. }));

    processor
        .submit_operator_block(provider, 10, submission, provider, pubkey, signature, Address::ZERO)
        .unwrap();
    assert_eq!(processor.next_rollup_id(), 1);
}

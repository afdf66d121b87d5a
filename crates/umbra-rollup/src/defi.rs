//! Defi interaction ledger
//!
//! Reserves bridge-call slots during block assembly, executes them
//! through the external bridge boundary, and keeps the resolved notes
//! addressable by nonce for later claim proofs. A reverting bridge is a
//! data outcome (`success=false`), never a settlement failure.

use std::collections::BTreeMap;
use tracing::warn;
use umbra_primitives::{
    pack_interaction_notes, DefiCall, DefiInteractionNote, Hash, RollupId,
    NUM_BRIDGE_CALLS_PER_BLOCK,
};

use crate::error::{Result, RollupError};
use crate::traits::{BridgeCall, BridgeCallExecutor};

/// tracks resolved bridge interactions across the ledger's lifetime
#[derive(Clone, Debug, Default)]
pub struct DefiInteractionLedger {
    resolved: BTreeMap<u64, DefiInteractionNote>,
}

impl DefiInteractionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// reserve bridge-call slots for the block being assembled
    ///
    /// nonces are `rollup_id * NUM_BRIDGE_CALLS_PER_BLOCK + slot`, unique
    /// and monotonically increasing across the ledger's lifetime.
    pub fn record_calls(&self, rollup_id: RollupId, calls: &[DefiCall]) -> Result<Vec<BridgeCall>> {
        if calls.len() > NUM_BRIDGE_CALLS_PER_BLOCK {
            return Err(RollupError::TooManyBridgeCalls(
                calls.len(),
                NUM_BRIDGE_CALLS_PER_BLOCK,
            ));
        }
        Ok(calls
            .iter()
            .enumerate()
            .map(|(slot, call)| BridgeCall {
                bridge_id: call.bridge_id,
                nonce: rollup_id * NUM_BRIDGE_CALLS_PER_BLOCK as u64 + slot as u64,
                total_input_value: call.deposit_sum,
            })
            .collect())
    }

    /// execute the reserved calls and record their notes
    pub fn execute(
        &mut self,
        calls: &[BridgeCall],
        executor: &mut dyn BridgeCallExecutor,
    ) -> Vec<DefiInteractionNote> {
        let mut notes = Vec::with_capacity(calls.len());
        for call in calls {
            let note = match executor.execute(call) {
                Ok(outcome) => DefiInteractionNote {
                    bridge_id: call.bridge_id,
                    nonce: call.nonce,
                    total_input_value: call.total_input_value,
                    output_value_a: outcome.output_value_a,
                    output_value_b: outcome.output_value_b,
                    success: true,
                },
                Err(err) => {
                    warn!(nonce = call.nonce, %err, "bridge call failed, recording failure note");
                    DefiInteractionNote {
                        bridge_id: call.bridge_id,
                        nonce: call.nonce,
                        total_input_value: call.total_input_value,
                        output_value_a: 0,
                        output_value_b: 0,
                        success: false,
                    }
                }
            };
            self.resolved.insert(note.nonce, note);
            notes.push(note);
        }
        notes
    }

    /// chained commitment over a block's note batch
    pub fn pack(notes: &[DefiInteractionNote]) -> Hash {
        pack_interaction_notes(notes)
    }

    /// look up a resolved interaction by nonce
    pub fn resolved(&self, nonce: u64) -> Option<&DefiInteractionNote> {
        self.resolved.get(&nonce)
    }

    /// total interactions resolved so far
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }
}

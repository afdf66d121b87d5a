//! Proof approval store
//!
//! Per-(owner, proof-hash) authorization ledger. Grants are idempotent
//! and monotonic - there is no revoke path.

use std::collections::HashSet;
use umbra_primitives::{Address, Hash};

/// tracks which proof hashes each address has authorized
#[derive(Clone, Debug, Default)]
pub struct ProofApprovalStore {
    approved: HashSet<(Address, Hash)>,
}

impl ProofApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// grant approval; repeated grants are no-ops
    pub fn approve(&mut self, approver: Address, proof_hash: Hash) {
        self.approved.insert((approver, proof_hash));
    }

    pub fn is_approved(&self, approver: Address, proof_hash: Hash) -> bool {
        self.approved.contains(&(approver, proof_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_flips_exactly_one_pair() {
        let mut store = ProofApprovalStore::new();
        let alice = Address([1u8; 20]);
        let bob = Address([2u8; 20]);
        let hash = [7u8; 32];

        assert!(!store.is_approved(alice, hash));
        assert!(!store.is_approved(bob, hash));

        store.approve(bob, hash);

        assert!(!store.is_approved(alice, hash));
        assert!(store.is_approved(bob, hash));
        assert!(!store.is_approved(bob, [8u8; 32]));
    }

    #[test]
    fn test_approve_idempotent() {
        let mut store = ProofApprovalStore::new();
        let addr = Address([3u8; 20]);
        store.approve(addr, [1u8; 32]);
        store.approve(addr, [1u8; 32]);
        assert!(store.is_approved(addr, [1u8; 32]));
    }
}

//! base types for the umbra protocol
//!
//! addresses are 20-byte truncated blake3 digests of ed25519 verifying
//! keys, so signature origin checks reduce to "key derives address and
//! signature verifies under key".

use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::ADDRESS_DOMAIN;

/// 32-byte hash
pub type Hash = [u8; 32];

/// 64-byte ed25519 signature
pub type Signature = [u8; 64];

/// 32-byte ed25519 verifying key
pub type PublicKey = [u8; 32];

/// asset identifier (index into the asset registry)
pub type AssetId = u32;

/// value amount (u128, saturating accumulation in per-asset totals)
pub type Amount = u128;

/// chain block height
pub type Height = u64;

/// rollup block identifier
pub type RollupId = u64;

/// zero hash constant
pub const ZERO_HASH: Hash = [0u8; 32];

/// a 20-byte account address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    /// derive the address of an ed25519 verifying key
    pub fn from_public_key(pubkey: &PublicKey) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(pubkey);
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[12..32]);
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 20] {
        self.0
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// check that `signature` over `message` verifies under `pubkey` and that
/// `pubkey` derives `expected`
///
/// returns false for malformed keys or signatures rather than erroring -
/// a garbage signature is just an invalid one
pub fn verify_origin(
    message: &[u8],
    signature: &Signature,
    pubkey: &PublicKey,
    expected: &Address,
) -> bool {
    if Address::from_public_key(pubkey) != *expected {
        return false;
    }
    let Ok(key) = VerifyingKey::from_bytes(pubkey) else {
        return false;
    };
    let sig = DalekSignature::from_bytes(signature);
    key.verify(message, &sig).is_ok()
}

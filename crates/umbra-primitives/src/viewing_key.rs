//! viewing keys
//!
//! encrypted note payloads delivered to their intended readers. the
//! settlement core stores them verbatim and never interprets the bytes.

use serde::{Deserialize, Serialize};

/// an opaque encrypted payload attached to a settled note
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewingKey(pub Vec<u8>);

impl ViewingKey {
    pub const EMPTY: Self = Self(Vec::new());

    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// flatten a block's viewing keys into the stored blob
pub fn concat_viewing_keys(keys: &[ViewingKey]) -> Vec<u8> {
    keys.iter().flat_map(|key| key.0.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_preserves_order() {
        let keys = vec![ViewingKey::new(vec![1, 2]), ViewingKey::EMPTY, ViewingKey::new(vec![3])];
        assert_eq!(concat_viewing_keys(&keys), vec![1, 2, 3]);
    }
}

//! Escape hatch window
//!
//! Permissionless submission is allowed only during a fixed window at
//! the end of every 100-block epoch. The status is a pure function of
//! chain height and is recomputed per call, never cached.

use umbra_primitives::Height;

/// epoch length in blocks
pub const ESCAPE_BLOCK_UPPER_BOUND: u64 = 100;
/// window width in blocks; the window is open for `height mod 100 >= 80`
pub const ESCAPE_WINDOW: u64 = 20;

const ESCAPE_BLOCK_LOWER_BOUND: u64 = ESCAPE_BLOCK_UPPER_BOUND - ESCAPE_WINDOW;

/// escape hatch status at a given chain height
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscapeHatchStatus {
    pub escape_open: bool,
    /// blocks until the window closes (when open) or opens (when closed)
    pub blocks_remaining: u64,
}

/// compute escape hatch status for `height`
pub fn escape_hatch_status(height: Height) -> EscapeHatchStatus {
    let offset = height % ESCAPE_BLOCK_UPPER_BOUND;
    if offset >= ESCAPE_BLOCK_LOWER_BOUND {
        EscapeHatchStatus {
            escape_open: true,
            blocks_remaining: ESCAPE_BLOCK_UPPER_BOUND - offset,
        }
    } else {
        EscapeHatchStatus {
            escape_open: false,
            blocks_remaining: ESCAPE_BLOCK_LOWER_BOUND - offset,
        }
    }
}

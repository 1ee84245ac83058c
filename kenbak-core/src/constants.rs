//! Flat memory addresses the state machine treats specially. See PRM, page 3.

pub const ADDR_A: u8 = 0;
pub const ADDR_B: u8 = 1;
pub const ADDR_X: u8 = 2;
pub const ADDR_P: u8 = 3;

pub const ADDR_OUTPUT: u8 = 128;

pub const ADDR_OC_A: u8 = 129;
pub const ADDR_OC_B: u8 = 130;
pub const ADDR_OC_X: u8 = 131;

pub const ADDR_INPUT: u8 = 255;

/// Address of the overflow/carry byte for one of the three registers
/// (0=A, 1=B, 2=X). Mirrors `reg` directly onto `ADDR_OC_A..ADDR_OC_X`.
pub fn addr_oc_for(reg: u8) -> u8 {
    debug_assert!(reg <= 2);
    ADDR_OC_A + reg
}

/// `sig_inc` sentinel meaning "not yet set by the state that is about to run".
pub const INC_UNSET: u8 = 255;

pub const DELAY_LINE_SIZE: usize = 128;

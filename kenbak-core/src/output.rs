//! Derives the front-panel lamps from the K register and the X-mode signal.
//! See §4.5.

use crate::constants::{ADDR_INPUT, ADDR_OUTPUT};
use crate::memory::Memory;
use crate::signals::{Output, XMode};
use crate::state::State;

/// Refreshes the K (display latch) register. Called once per step, after the
/// state machine has advanced.
pub fn refresh_k(k: &mut u8, mem: &Memory, x: XMode) {
    match x {
        XMode::None | XMode::AddressDisplay | XMode::MemoryDisplay => {
            // QE already wrote K directly for DA/DD; nothing to do here.
        }
        XMode::Run => *k = mem.read(ADDR_OUTPUT),
        XMode::Input => *k = mem.read(ADDR_INPUT),
    }
}

/// Projects the eight data lamps and four mode lamps.
pub fn project(x: XMode, state: State, k: u8) -> Output {
    let mut out = Output::new();
    for i in 0..8 {
        out.led_bits[i] = (k >> i) & 1 != 0;
    }
    out.led_address_set = x == XMode::AddressDisplay;
    out.led_memory_store = x == XMode::MemoryDisplay;
    out.led_input_clear = x == XMode::Input;
    out.led_run_stop = state != State::Qc;
    out
}

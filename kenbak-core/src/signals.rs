//! Front-panel input/output and the derived control signals. See PRM, page 2
//! (front panel) and the state machine's entry-state signal refresh (§4.3).

use crate::constants::ADDR_INPUT;
use crate::memory::Memory;
use crate::state::State;

/// Raw front-panel state, set by the driver between steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Input {
    pub buttons_data: [bool; 8],
    pub but_input_clear: bool,
    pub but_address_display: bool,
    pub but_address_set: bool,
    pub switch_memory_lock: bool,
    pub but_memory_read: bool,
    pub but_memory_store: bool,
    pub but_run_start: bool,
    pub but_run_stop: bool,
    pub switch_power_on: bool,
}

impl Input {
    pub fn new() -> Input {
        Input::default()
    }

    /// Zeroes every field, optionally preserving the power toggle.
    pub fn init(&mut self, keep_power_switch: bool) {
        let power = self.switch_power_on;
        *self = Input::default();
        if keep_power_switch {
            self.switch_power_on = power;
        }
    }

    fn data_byte(&self) -> u8 {
        let mut byte = 0u8;
        for (i, pressed) in self.buttons_data.iter().enumerate() {
            if *pressed {
                byte |= 1 << i;
            }
        }
        byte
    }
}

/// Lamp state, derived by [`crate::output::project`] after every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub led_bits: [bool; 8],
    pub led_input_clear: bool,
    pub led_address_set: bool,
    pub led_memory_store: bool,
    pub led_run_stop: bool,
}

impl Output {
    pub fn new() -> Output {
        Output::default()
    }
}

/// The X-mode signal: which front-panel/run mode lamps should reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XMode {
    None,
    AddressDisplay,
    MemoryDisplay,
    Run,
    Input,
}

impl Default for XMode {
    fn default() -> XMode {
        XMode::None
    }
}

/// The eight control signals, refreshed only at SA/QB/QC/QF entry (§4.3).
#[derive(Debug, Clone, Copy, Default)]
pub struct Signals {
    pub bu: bool,
    pub cl: bool,
    pub da: bool,
    pub dd: bool,
    pub ea: bool,
    pub ed: bool,
    pub en: bool,
    pub go: bool,
    pub x: XMode,
}

impl Signals {
    pub fn new() -> Signals {
        Signals::default()
    }

    /// Refreshes the control signals, the input latch (address 255), and the
    /// X-mode. Called only on entry to SA, QB, QC, QF.
    pub fn refresh(&mut self, input: &Input, mem: &mut Memory, state: State) {
        self.bu = input.buttons_data.iter().any(|b| *b);
        self.cl = input.but_input_clear;
        self.da = input.but_address_display;
        self.dd = input.but_memory_read;
        self.ea = input.but_address_set;
        self.en = input.but_memory_store;
        self.go = input.but_run_start;
        // ED is a latch: it is set here on a stop request but is only ever
        // cleared by SB, once the halted instruction's P advance lands.
        if input.but_run_stop {
            self.ed = true;
        }

        debug_assert!(
            !(self.da && self.dd),
            "address-display and memory-read must not both be asserted"
        );

        let existing = mem.read(ADDR_INPUT);
        let next = if self.cl {
            0
        } else {
            existing | input.data_byte()
        };
        mem.write(ADDR_INPUT, next);

        self.x = if self.da {
            XMode::AddressDisplay
        } else if self.dd {
            XMode::MemoryDisplay
        } else if state == State::Sa {
            XMode::Run
        } else if self.bu || self.cl {
            XMode::Input
        } else {
            self.x
        };
    }
}

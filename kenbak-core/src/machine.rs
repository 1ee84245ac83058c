//! The aggregate machine: memory, registers, signals, and the state the
//! 26-state sequencer is currently in. See §3 and §6 (core API).

use crate::memory::Memory;
use crate::output;
use crate::signals::{Input, Output, Signals};
use crate::state::State;
use crate::state_machine;

pub struct Machine {
    pub mem: Memory,
    pub state: State,

    pub reg_i: u8,
    pub reg_k: u8,
    pub reg_w: u8,

    pub sig_r: u8,
    pub sig_inc: u8,
    pub signals: Signals,

    pub input: Input,
    pub output: Output,

    randomize_memory: bool,
}

impl Machine {
    /// Allocates and initializes a machine in the power-off state. Infallible:
    /// unlike the C original there is no malloc to fail against in safe Rust.
    pub fn create(randomize_memory: bool) -> Machine {
        Machine {
            mem: Self::fresh_memory(randomize_memory),
            state: State::PowerOff,
            reg_i: 0,
            reg_k: 0,
            reg_w: 0,
            sig_r: 0,
            sig_inc: 0,
            signals: Signals::new(),
            input: Input::new(),
            output: Output::new(),
            randomize_memory,
        }
    }

    fn fresh_memory(randomize_memory: bool) -> Memory {
        if randomize_memory {
            Memory::new_randomized()
        } else {
            Memory::new_zeroed()
        }
    }

    /// Zeroes every input/output field, optionally preserving the power
    /// switch so a driver can call this without immediately powering off.
    pub fn init_input(&mut self, keep_power_switch: bool) {
        self.input.init(keep_power_switch);
    }

    fn power_off_reset(&mut self) {
        self.mem = Self::fresh_memory(self.randomize_memory);
        self.reg_i = 0;
        self.reg_k = 0;
        self.reg_w = 0;
        self.sig_r = 0;
        self.sig_inc = 0;
        self.signals = Signals::new();
        self.output = Output::new();
    }

    /// Advances the machine by one state transition. Returns the byte-time
    /// cost (always 1) or a negative code on a fatal invariant violation.
    pub fn step(&mut self) -> i32 {
        if !self.input.switch_power_on {
            if self.state != State::PowerOff {
                self.power_off_reset();
            }
            self.state = State::PowerOff;
            return 1;
        }

        if self.state == State::PowerOff {
            self.state = State::Unknown;
        }
        if self.state == State::Unknown {
            self.state = State::Qc;
        }

        if matches!(
            self.state,
            State::Sa | State::Qb | State::Qc | State::Qf
        ) {
            let state = self.state;
            self.signals.refresh(&self.input, &mut self.mem, state);
        }

        let result = state_machine::step_in_defined_state(self);

        output::refresh_k(&mut self.reg_k, &self.mem, self.signals.x);
        self.output = output::project(self.signals.x, self.state, self.reg_k);

        result
    }
}

//! The 26-state sequencer. `step_in_defined_state` is the single dispatch
//! point; each state's body lives in [`automatic`] or [`manual`] and selects
//! exactly one successor state. See §4.4.

pub mod automatic;
pub mod manual;

use crate::machine::Machine;
use crate::state::State;

pub fn step_in_defined_state(m: &mut Machine) -> i32 {
    match m.state {
        State::PowerOff | State::Unknown => {
            debug_assert!(false, "Machine::step resolves these before dispatch");
            1
        }

        State::Sa => automatic::step_in_sa(m),
        State::Sb => automatic::step_in_sb(m),
        State::Sc => automatic::step_in_sc(m),
        State::Sd => automatic::step_in_sd(m),
        State::Se => automatic::step_in_se(m),
        State::Sf => automatic::step_in_sf(m),
        State::Sg => automatic::step_in_sg(m),
        State::Sh => automatic::step_in_sh(m),
        State::Sj => automatic::step_in_sj(m),
        State::Sk => automatic::step_in_sk(m),
        State::Sl => automatic::step_in_sl(m),
        State::Sm => automatic::step_in_sm(m),
        State::Sn => automatic::step_in_sn(m),
        State::Sp => automatic::step_in_sp(m),
        State::Sq => automatic::step_in_sq(m),
        State::Sr => automatic::step_in_sr(m),
        State::Ss => automatic::step_in_ss(m),
        State::St => automatic::step_in_st(m),
        State::Su => automatic::step_in_su(m),
        State::Sv => automatic::step_in_sv(m),
        State::Sw => automatic::step_in_sw(m),
        State::Sx => automatic::step_in_sx(m),
        State::Sy => automatic::step_in_sy(m),
        State::Sz => automatic::step_in_sz(m),

        State::Qb => manual::step_in_qb(m),
        State::Qc => manual::step_in_qc(m),
        State::Qd => manual::step_in_qd(m),
        State::Qe => manual::step_in_qe(m),
        State::Qf => manual::step_in_qf(m),
    }
}

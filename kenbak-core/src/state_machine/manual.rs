//! The manual cycle: front-panel operations while the machine is idle. See
//! §4.4 and PRM pages 36-37.

use crate::constants::ADDR_INPUT;
use crate::machine::Machine;
use crate::state::State;

pub fn step_in_qb(m: &mut Machine) -> i32 {
    if m.signals.go {
        return 1;
    }
    m.state = State::Sa;
    1
}

pub fn step_in_qc(m: &mut Machine) -> i32 {
    m.sig_inc = 0;
    m.reg_i = m.mem.read(ADDR_INPUT);

    if m.signals.en || m.signals.da || m.signals.dd {
        m.state = State::Qd;
        return 1;
    }
    if m.signals.go {
        m.state = State::Qb;
        return 1;
    }
    if m.signals.ea {
        m.reg_w = m.reg_i;
    }
    1
}

pub fn step_in_qd(m: &mut Machine) -> i32 {
    m.sig_r = m.reg_w;
    m.state = State::Qe;
    1
}

pub fn step_in_qe(m: &mut Machine) -> i32 {
    m.state = State::Qf;

    if m.signals.en {
        debug_assert!(!m.signals.da && !m.signals.dd);
        m.mem.write(m.sig_r, m.reg_i);
        m.reg_w = m.reg_w.wrapping_add(1);
        return 1;
    }
    if m.signals.da {
        debug_assert!(!m.signals.en && !m.signals.dd);
        m.reg_k = m.sig_r;
        return 1;
    }

    debug_assert!(m.signals.dd, "QC guarantees one of EN/DA/DD is set");
    m.reg_k = m.mem.read(m.sig_r);
    m.reg_w = m.reg_w.wrapping_add(1);
    1
}

pub fn step_in_qf(m: &mut Machine) -> i32 {
    if !m.signals.en && !m.signals.da && !m.signals.dd {
        m.state = State::Qc;
    }
    1
}

#[cfg(test)]
mod test {
    use super::*;

    fn idle_machine() -> Machine {
        let mut m = Machine::create(false);
        m.input.switch_power_on = true;
        m.state = State::Qc;
        m
    }

    #[test]
    fn test_qc_sets_inc_zero_and_stays_idle() {
        let mut m = idle_machine();
        step_in_qc(&mut m);
        assert_eq!(m.sig_inc, 0);
        assert_eq!(m.state, State::Qc);
    }

    #[test]
    fn test_qc_routes_to_qd_on_address_set() {
        let mut m = idle_machine();
        m.signals.ea = true;
        m.reg_i = 0x40;
        step_in_qc(&mut m);
        assert_eq!(m.reg_w, 0x40);
        assert_eq!(m.state, State::Qc);
    }

    #[test]
    fn test_qc_routes_to_qb_on_go() {
        let mut m = idle_machine();
        m.signals.go = true;
        step_in_qc(&mut m);
        assert_eq!(m.state, State::Qb);
    }

    #[test]
    fn test_qb_waits_for_go_release() {
        let mut m = idle_machine();
        m.state = State::Qb;
        m.signals.go = true;
        step_in_qb(&mut m);
        assert_eq!(m.state, State::Qb);
        m.signals.go = false;
        step_in_qb(&mut m);
        assert_eq!(m.state, State::Sa);
    }

    #[test]
    fn test_memory_read_cycle_displays_k_and_advances_w() {
        let mut m = idle_machine();
        m.reg_w = 0x40;
        m.mem.write(0x40, 0xAB);
        m.signals.dd = true;

        step_in_qd(&mut m);
        assert_eq!(m.sig_r, 0x40);

        step_in_qe(&mut m);
        assert_eq!(m.reg_k, 0xAB);
        assert_eq!(m.reg_w, 0x41);
        assert_eq!(m.state, State::Qf);

        step_in_qf(&mut m);
        assert_eq!(m.state, State::Qf);
        m.signals.dd = false;
        step_in_qf(&mut m);
        assert_eq!(m.state, State::Qc);
    }

    #[test]
    fn test_address_display_shows_address_not_content() {
        let mut m = idle_machine();
        m.reg_w = 0x40;
        m.mem.write(0x40, 0xAB);
        m.signals.da = true;
        step_in_qd(&mut m);
        step_in_qe(&mut m);
        assert_eq!(m.reg_k, 0x40);
        assert_eq!(m.reg_w, 0x40);
    }

    #[test]
    fn test_memory_store_writes_instruction_register() {
        let mut m = idle_machine();
        m.reg_w = 0x40;
        m.reg_i = 0x77;
        m.signals.en = true;
        step_in_qd(&mut m);
        step_in_qe(&mut m);
        assert_eq!(m.mem.read(0x40), 0x77);
        assert_eq!(m.reg_w, 0x41);
    }
}

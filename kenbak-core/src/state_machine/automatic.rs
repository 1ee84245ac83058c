//! The automatic cycle: fetches, decodes, and executes one instruction per
//! pass through SA..SZ. See §4.4 and PRM pages 28-35.

use crate::constants::{self, ADDR_P, INC_UNSET};
use crate::decoder::{self, AddrMode, InstrType};
use crate::machine::Machine;
use crate::state::State;

pub fn step_in_sa(m: &mut Machine) -> i32 {
    m.sig_r = ADDR_P;
    m.state = State::Sb;
    1
}

pub fn step_in_sb(m: &mut Machine) -> i32 {
    let val = m.mem.read(m.sig_r).wrapping_add(m.sig_inc);
    m.sig_inc = INC_UNSET;
    m.mem.write(m.sig_r, val);
    m.reg_w = val;

    if m.signals.ed {
        m.state = State::Qc;
        m.signals.ed = false;
        return 1;
    }

    m.state = State::Sc;
    1
}

pub fn step_in_sc(m: &mut Machine) -> i32 {
    m.sig_r = m.reg_w;
    m.state = State::Sd;
    1
}

pub fn step_in_sd(m: &mut Machine) -> i32 {
    m.reg_i = m.mem.read(m.sig_r);

    if decoder::is_two_byte(m.reg_i) {
        m.state = State::Se;
        return 1;
    }

    debug_assert_eq!(m.sig_inc, INC_UNSET);
    m.sig_inc = 1;
    m.state = State::Su;
    1
}

pub fn step_in_se(m: &mut Machine) -> i32 {
    let i = m.reg_i;
    let am = decoder::addr_mode(i);
    let ty = decoder::instr_type(i);

    if am == AddrMode::Constant && ty == InstrType::Store {
        // Store-constant writes its second byte in place; W gets that
        // byte's address, not its value.
        m.reg_w = m.sig_r.wrapping_add(1);
    } else {
        m.reg_w = m.mem.read(m.sig_r.wrapping_add(1));
    }

    m.state = match am {
        AddrMode::Indirect | AddrMode::IndirectIndexed => State::Sf,
        AddrMode::Indexed => State::Sh,
        AddrMode::Constant => State::Sm,
        AddrMode::Memory => {
            if ty == InstrType::Store {
                State::Sm
            } else {
                State::Sk
            }
        }
        AddrMode::None => {
            debug_assert!(false, "SE reached with a one-byte instruction");
            State::Sm
        }
    };
    1
}

pub fn step_in_sf(m: &mut Machine) -> i32 {
    m.sig_r = m.reg_w;
    m.state = State::Sg;
    1
}

pub fn step_in_sg(m: &mut Machine) -> i32 {
    m.reg_w = m.mem.read(m.sig_r);

    m.state = match decoder::addr_mode(m.reg_i) {
        AddrMode::IndirectIndexed => State::Sh,
        AddrMode::Indirect => {
            let ty = decoder::instr_type(m.reg_i);
            if ty == InstrType::Jump || ty == InstrType::Store {
                State::Sm
            } else {
                State::Sk
            }
        }
        _ => {
            debug_assert!(false, "SG reached with an unexpected addressing mode");
            State::Sk
        }
    };
    1
}

pub fn step_in_sh(m: &mut Machine) -> i32 {
    m.sig_r = constants::ADDR_X;
    m.state = State::Sj;
    1
}

pub fn step_in_sj(m: &mut Machine) -> i32 {
    m.reg_w = m.reg_w.wrapping_add(m.mem.read(m.sig_r));
    m.state = if decoder::instr_type(m.reg_i) == InstrType::Store {
        State::Sm
    } else {
        State::Sk
    };
    1
}

pub fn step_in_sk(m: &mut Machine) -> i32 {
    m.sig_r = m.reg_w;
    m.state = State::Sl;
    1
}

pub fn step_in_sl(m: &mut Machine) -> i32 {
    m.reg_w = m.mem.read(m.sig_r);

    if decoder::is_bit(m.reg_i) {
        let bit_pos = (m.reg_i >> 3) & 7;
        let mask = 1u8 << bit_pos;
        let is_skip = m.reg_i & 0x80 != 0;
        let want_set = m.reg_i & 0x40 != 0;

        if is_skip {
            let bit_is_set = m.reg_w & mask != 0;
            let skip_condition = want_set == bit_is_set;
            m.sig_inc = if skip_condition { 4 } else { 2 };
        } else {
            if want_set {
                m.reg_w |= mask;
            } else {
                m.reg_w &= !mask;
            }
            m.mem.write(m.sig_r, m.reg_w);
            m.sig_inc = 2;
        }
        m.state = State::Sa;
    } else {
        m.state = State::Sm;
    }
    1
}

pub fn step_in_sm(m: &mut Machine) -> i32 {
    let i = m.reg_i;
    m.sig_r = decoder::two_byte_selector(i);

    m.state = match decoder::instr_type(i) {
        InstrType::Jump => State::Sz,
        InstrType::Store => State::Sp,
        InstrType::Add | InstrType::Sub | InstrType::Load | InstrType::And | InstrType::Or | InstrType::Lneg => {
            State::Sn
        }
        _ => {
            debug_assert!(false, "SM reached with a non-two-byte-selector instruction");
            State::Sa
        }
    };
    1
}

fn apply_add(m: &mut Machine, reg: u8, addend: u8, reg_content: u8) -> u8 {
    let buf = addend as u16 + reg_content as u16;
    let result = (buf & 0xFF) as u8;
    let carry = buf > 255;
    let overflow = signed_add_overflow(addend, reg_content, result);
    let flags = (overflow as u8) | ((carry as u8) << 1);
    m.mem.write(constants::addr_oc_for(reg), flags);
    result
}

/// Standard two-operand signed overflow rule: the operands share a sign and
/// the result's sign differs from theirs.
fn signed_add_overflow(a: u8, b: u8, result: u8) -> bool {
    let same_sign_operands = (a ^ b) & 0x80 == 0;
    let result_sign_differs = (a ^ result) & 0x80 != 0;
    same_sign_operands && result_sign_differs
}

pub fn step_in_sn(m: &mut Machine) -> i32 {
    let reg = m.sig_r;
    let ty = decoder::instr_type(m.reg_i);

    if ty == InstrType::Jump {
        debug_assert_eq!(m.sig_inc, 0);
        let dest = m.reg_w;
        m.mem.write(reg, dest);
        m.state = State::Sa;
        return 1;
    }

    let w = m.reg_w;
    let reg_content = m.mem.read(reg);

    let result = match ty {
        InstrType::Add => apply_add(m, reg, w, reg_content),
        InstrType::Sub => apply_add(m, reg, 0u8.wrapping_sub(w), reg_content),
        InstrType::Load => w,
        InstrType::And => w & reg_content,
        InstrType::Or => w | reg_content,
        InstrType::Lneg => 0u8.wrapping_sub(w),
        _ => {
            debug_assert!(false, "SN reached with a non-arithmetic instruction");
            w
        }
    };

    m.mem.write(reg, result);
    m.sig_inc = 2;
    m.state = State::Sa;
    1
}

pub fn step_in_sp(m: &mut Machine) -> i32 {
    m.reg_i = m.mem.read(m.sig_r);
    m.state = State::Sr;
    1
}

pub fn step_in_sr(m: &mut Machine) -> i32 {
    m.sig_r = m.reg_w;
    m.state = State::Ss;
    1
}

pub fn step_in_ss(m: &mut Machine) -> i32 {
    m.mem.write(m.sig_r, m.reg_i);
    m.sig_inc = 2;
    m.state = State::Sa;
    1
}

pub fn step_in_st(m: &mut Machine) -> i32 {
    m.sig_r = ADDR_P;
    let mark = m.reg_i & 0x10 != 0;
    m.state = if mark { State::Sq } else { State::Sn };
    1
}

/// Jump-and-mark. Not implemented in the original source (see DESIGN.md);
/// marks the return address and falls through to SN's jump branch.
pub fn step_in_sq(m: &mut Machine) -> i32 {
    let p = m.mem.read(ADDR_P);
    m.mem.write(m.reg_w, p.wrapping_add(2));
    step_in_sn(m)
}

pub fn step_in_su(m: &mut Machine) -> i32 {
    m.sig_r = decoder::one_byte_selector(m.reg_i);
    m.state = State::Sv;
    1
}

pub fn step_in_sv(m: &mut Machine) -> i32 {
    m.reg_w = m.mem.read(m.sig_r);

    match decoder::instr_type(m.reg_i) {
        InstrType::Misc => {
            if decoder::is_halt(m.reg_i) {
                m.signals.ed = true;
            }
            m.state = State::Sa;
        }
        InstrType::ShiftRot => {
            m.state = State::Sw;
        }
        _ => debug_assert!(false, "SV reached with a two-byte instruction"),
    }
    1
}

fn rotate_left(val: u8, places: u32) -> u8 {
    val.rotate_left(places)
}

fn rotate_right(val: u8, places: u32) -> u8 {
    val.rotate_right(places)
}

pub fn step_in_sw(m: &mut Machine) -> i32 {
    let kind = m.reg_i >> 6;
    let mut places = ((m.reg_i >> 3) & 0b11) as u32;
    if places == 0 {
        places = 4;
    }

    m.reg_w = match kind {
        0 => m.reg_w >> places, // Logical right shift.
        1 => rotate_right(m.reg_w, places),
        2 => m.reg_w << places, // Logical left shift.
        3 => rotate_left(m.reg_w, places),
        _ => unreachable!("kind is two bits"),
    };

    m.state = State::Sx;
    1
}

pub fn step_in_sx(m: &mut Machine) -> i32 {
    m.sig_r = decoder::one_byte_selector(m.reg_i);
    m.state = State::Sy;
    1
}

pub fn step_in_sy(m: &mut Machine) -> i32 {
    m.mem.write(m.sig_r, m.reg_w);
    m.state = State::Sa;
    1
}

pub fn step_in_sz(m: &mut Machine) -> i32 {
    let i = m.reg_i;
    let sel = (i >> 6) & 0b11;

    if sel == 3 {
        m.sig_inc = 0;
        m.state = State::St;
        return 1;
    }

    let reg_val = m.mem.read(sel);
    let cond = i & 0b111;

    let taken = match cond {
        3 => reg_val != 0,
        4 => reg_val == 0,
        5 => reg_val & 0x80 != 0,
        6 => reg_val & 0x80 == 0,
        7 => reg_val & 0x80 == 0 && reg_val & 0x7F != 0,
        _ => {
            debug_assert!(false, "invalid jump condition bits");
            false
        }
    };

    if taken {
        m.sig_inc = 0;
        m.state = State::St;
    } else {
        m.sig_inc = 2;
        m.state = State::Sa;
    }
    1
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::{ADDR_A, ADDR_B, ADDR_OC_A};

    fn fresh_running_machine() -> Machine {
        let mut m = Machine::create(false);
        m.input.switch_power_on = true;
        m.state = State::Sa;
        m
    }

    #[test]
    fn test_sa_sets_search_to_p() {
        let mut m = fresh_running_machine();
        step_in_sa(&mut m);
        assert_eq!(m.sig_r, ADDR_P);
        assert_eq!(m.state, State::Sb);
    }

    #[test]
    fn test_sb_increments_p_and_clears_inc() {
        let mut m = fresh_running_machine();
        m.mem.write(ADDR_P, 4);
        m.sig_r = ADDR_P;
        m.sig_inc = 2;
        step_in_sb(&mut m);
        assert_eq!(m.mem.read(ADDR_P), 6);
        assert_eq!(m.reg_w, 6);
        assert_eq!(m.state, State::Sc);
    }

    #[test]
    fn test_sb_routes_to_qc_on_ed() {
        let mut m = fresh_running_machine();
        m.sig_r = ADDR_P;
        m.sig_inc = 0;
        m.signals.ed = true;
        step_in_sb(&mut m);
        assert_eq!(m.state, State::Qc);
        assert!(!m.signals.ed);
    }

    #[test]
    fn test_add_sets_overflow_not_carry() {
        let mut m = fresh_running_machine();
        m.sig_r = ADDR_A;
        m.reg_i = 0o003; // ADD-A constant
        m.reg_w = 1;
        m.mem.write(ADDR_A, 0x7F);
        step_in_sn(&mut m);
        assert_eq!(m.mem.read(ADDR_A), 0x80);
        assert_eq!(m.mem.read(ADDR_OC_A), 0b01); // overflow set, carry clear
    }

    #[test]
    fn test_add_sets_carry_not_overflow() {
        let mut m = fresh_running_machine();
        m.sig_r = ADDR_A;
        m.reg_i = 0o003;
        m.reg_w = 1;
        m.mem.write(ADDR_A, 0xFF);
        step_in_sn(&mut m);
        assert_eq!(m.mem.read(ADDR_A), 0);
        assert_eq!(m.mem.read(ADDR_OC_A), 0b10); // carry set, overflow clear
    }

    #[test]
    fn test_sub_restores_original_value() {
        let mut m = fresh_running_machine();
        m.sig_r = ADDR_A;
        m.reg_i = 0o003; // add
        m.reg_w = 5;
        m.mem.write(ADDR_A, 10);
        step_in_sn(&mut m);
        assert_eq!(m.mem.read(ADDR_A), 15);

        m.reg_i = 0o013; // sub
        m.reg_w = 5;
        step_in_sn(&mut m);
        assert_eq!(m.mem.read(ADDR_A), 10);
        assert_eq!(m.mem.read(ADDR_OC_A), 0);
    }

    #[test]
    fn test_lneg_ignores_register_content() {
        let mut m = fresh_running_machine();
        m.sig_r = ADDR_A;
        m.reg_i = 0o333; // LNEG
        m.reg_w = 5;
        m.mem.write(ADDR_A, 200);
        step_in_sn(&mut m);
        assert_eq!(m.mem.read(ADDR_A), (-5i8) as u8);
    }

    #[test]
    fn test_lneg_of_min_value_is_itself() {
        let mut m = fresh_running_machine();
        m.sig_r = ADDR_A;
        m.reg_i = 0o333;
        m.reg_w = 0x80;
        step_in_sn(&mut m);
        assert_eq!(m.mem.read(ADDR_A), 0x80);
    }

    #[test]
    fn test_rotate_left_by_4_twice_is_identity() {
        let v = 0x3Cu8;
        let once = rotate_left(v, 4);
        let twice = rotate_left(once, 4);
        assert_eq!(twice, v);
    }

    #[test]
    fn test_bit_skip_when_condition_matches() {
        let mut m = fresh_running_machine();
        // SKP-1 on bit 1: bit7=1 (skip), bit6=1 (test for set), bit pos = mid octal.
        m.reg_i = 0b1_1_001_010; // skip, want-set, bit pos 1, low octal 2 (bit family)
        m.sig_r = 0x40;
        m.mem.write(0x40, 0b10); // bit 1 set
        step_in_sl(&mut m);
        assert_eq!(m.sig_inc, 4);
        assert_eq!(m.state, State::Sa);
    }

    #[test]
    fn test_bit_set_writes_memory() {
        let mut m = fresh_running_machine();
        m.reg_i = 0b0_1_001_010; // set family, want-set, bit pos 1
        m.sig_r = 0x40;
        m.mem.write(0x40, 0);
        step_in_sl(&mut m);
        assert_eq!(m.mem.read(0x40), 0b10);
        assert_eq!(m.sig_inc, 2);
    }

    #[test]
    fn test_sz_unconditional_sets_inc_zero() {
        let mut m = fresh_running_machine();
        m.reg_i = 0b11_110_011; // sel=3 -> unconditional
        step_in_sz(&mut m);
        assert_eq!(m.sig_inc, 0);
        assert_eq!(m.state, State::St);
    }

    #[test]
    fn test_sz_conditional_not_taken() {
        let mut m = fresh_running_machine();
        m.mem.write(ADDR_A, 0);
        m.reg_i = 0b00_100_011; // reg A, condition != 0
        step_in_sz(&mut m);
        assert_eq!(m.sig_inc, 2);
        assert_eq!(m.state, State::Sa);
    }

    #[test]
    fn test_st_no_mark_goes_to_sn() {
        let mut m = fresh_running_machine();
        m.reg_i = 0b00_100_011; // bit4 = 0 -> JPD, no mark
        step_in_st(&mut m);
        assert_eq!(m.state, State::Sn);
    }

    #[test]
    fn test_st_mark_goes_to_sq() {
        let mut m = fresh_running_machine();
        m.reg_i = 0b00_110_011; // bit4 = 1 -> JMD, mark
        step_in_st(&mut m);
        assert_eq!(m.state, State::Sq);
    }

    #[test]
    fn test_sq_marks_return_address_and_falls_through() {
        let mut m = fresh_running_machine();
        m.mem.write(ADDR_P, 10);
        m.reg_w = 0x50; // jump destination / mark address
        m.reg_i = 0b11_110_011; // unconditional jump-and-mark
        m.sig_r = ADDR_P;
        m.sig_inc = 0;
        step_in_sq(&mut m);
        assert_eq!(m.mem.read(0x50), 12);
        assert_eq!(m.mem.read(ADDR_P), 0x50);
        assert_eq!(m.state, State::Sa);
    }

    #[test]
    fn test_shift_left_by_4() {
        let mut m = fresh_running_machine();
        m.reg_i = 0b10_100_000; // kind=2 (left shift), places bits=100->4
        m.reg_w = 0b0000_1111;
        step_in_sw(&mut m);
        assert_eq!(m.reg_w, 0b1111_0000);
    }

    #[test]
    fn test_one_byte_selector_picks_b() {
        let m_reg_i = 0b001_00000u8;
        assert_eq!(decoder::one_byte_selector(m_reg_i), 1);
        let _ = ADDR_B;
    }
}

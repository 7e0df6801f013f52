//! Inline memory-fill code, used by the runtime for zeroing and
//! filling word buffers.

use basalt_asm::{
    Cond, DataInstr, DataOp, Instr, MtranMode, MtranOp, Op2, Reg, RegList, StranInstr,
    StranOp,
};

use crate::arm32::ArmSection;
use crate::Error;

/// Emit a word fill.
///
/// On entry r0 holds the buffer start, r1 the size in bytes and r2
/// the fill value. The bulk runs as 8-register `STM` bursts with a
/// single-word tail loop; r3..r11 are corrupted. Returns through lr.
pub fn memset_words(s: &mut ArmSection) -> Result<(), Error> {
    let base_reg = Reg(0);
    let size = Reg(1);
    let val = Reg(2);
    let stm_end_reg = Reg(10);
    let end_reg = Reg(11);

    let end_label = s.fresh_label();
    let start_label = s.fresh_label();
    let start_small_label = s.fresh_label();

    s.add_instr(Instr::Data(DataInstr {
        op: DataOp::Add,
        cond: Cond::Al,
        status: false,
        dest: end_reg,
        op1: base_reg,
        op2: Op2::Reg(size),
    }));
    s.add_sub_imm(Cond::Al, false, stm_end_reg, end_reg, 8)?;
    s.add_cmp(DataOp::Cmp, Cond::Al, base_reg, stm_end_reg);
    s.add_br(Cond::Gt, start_small_label);

    // Spread the value over the burst registers.
    for i in 3..=9 {
        s.add_mov_reg(Cond::Al, false, Reg(i), val);
    }

    s.add_label(start_label);
    s.add_mtran(
        MtranOp::Stm,
        Cond::Al,
        base_reg,
        RegList::from_bits_truncate(255 << 2),
        MtranMode::Ia,
        true,
    );
    s.add_cmp(DataOp::Cmp, Cond::Al, base_reg, stm_end_reg);
    s.add_br(Cond::Lt, start_label);

    s.add_label(start_small_label);
    s.add_cmp(DataOp::Cmp, Cond::Al, base_reg, end_reg);
    s.add_br(Cond::Ge, end_label);
    s.add_instr(Instr::Stran(StranInstr {
        op: StranOp::Str,
        cond: Cond::Al,
        byte: false,
        pre_indexed: false,
        write_back: true,
        subtract: false,
        dest: val,
        base: base_reg,
        offset: Op2::Imm(4),
    }));
    s.add_br(Cond::Al, start_small_label);

    s.add_label(end_label);
    s.add_mov_reg(Cond::Al, false, Reg::PC, Reg::LR);
    Ok(())
}

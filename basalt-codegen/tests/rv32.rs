//! Peephole and register-use behaviour on the RV32 op arena.

use basalt_codegen::rv32::{
    peephole, regs_used_before, IType, RType, RvInstr, RvOp, RvOpcode, RvSection,
    SbType, UjType, NIL,
};

fn nop() -> RvInstr {
    RvInstr::I {
        opcode: RvOpcode::Addi,
        operands: IType {
            rd: 0,
            rs1: 0,
            imm: 0,
        },
    }
}

fn addi(rd: u32, rs1: u32, imm: i32) -> RvInstr {
    RvInstr::I {
        opcode: RvOpcode::Addi,
        operands: IType { rd, rs1, imm },
    }
}

fn add(rd: u32, rs1: u32, rs2: u32) -> RvInstr {
    RvInstr::R {
        opcode: RvOpcode::Add,
        operands: RType { rd, rs1, rs2 },
    }
}

fn beq(rs1: u32, rs2: u32, target: i32) -> RvInstr {
    RvInstr::Sb {
        opcode: RvOpcode::Beq,
        operands: SbType { rs1, rs2, target },
    }
}

fn stream(section: &RvSection) -> Vec<RvOp> {
    let mut ops = Vec::new();
    let mut ptr = section.first_op();
    while ptr != NIL {
        let node = section.node(ptr);
        ops.push(node.op.clone());
        ptr = node.next;
    }
    ops
}

#[test]
fn peephole_removes_free_standing_nops() {
    let mut s = RvSection::new();
    s.add_instr(nop());
    s.add_instr(add(33, 34, 35));
    s.add_instr(nop());
    s.add_instr(add(36, 33, 33));
    s.add_instr(nop());

    peephole(&mut s);

    assert_eq!(
        stream(&s),
        vec![
            RvOp::Instr(add(33, 34, 35)),
            RvOp::Instr(add(36, 33, 33)),
        ]
    );
}

#[test]
fn peephole_keeps_the_nop_after_a_conditional_branch() {
    let mut s = RvSection::new();
    s.add_instr(beq(1, 2, 0));
    s.add_instr(nop());
    s.add_instr(add(33, 34, 35));

    peephole(&mut s);

    assert_eq!(
        stream(&s),
        vec![
            RvOp::Instr(beq(1, 2, 0)),
            RvOp::Instr(nop()),
            RvOp::Instr(add(33, 34, 35)),
        ]
    );
}

#[test]
fn peephole_removes_register_preserving_addi() {
    let mut s = RvSection::new();
    s.add_instr(addi(40, 40, 0));
    s.add_instr(addi(40, 40, 1));
    s.add_instr(addi(40, 41, 0));

    peephole(&mut s);

    // Only `addi x, x, 0` is dead; the other two change state.
    assert_eq!(
        stream(&s),
        vec![
            RvOp::Instr(addi(40, 40, 1)),
            RvOp::Instr(addi(40, 41, 0)),
        ]
    );
}

#[test]
fn peephole_empties_an_all_nop_section() {
    let mut s = RvSection::new();
    s.add_instr(nop());
    peephole(&mut s);
    assert!(s.is_empty());
    assert_eq!(s.last_op(), NIL);
}

#[test]
fn use_probe_reports_written_argument_registers() {
    let mut s = RvSection::new();
    let from = s.add_instr(add(33, 1, 2)); // writes virtual reg 33
    s.add_instr(beq(33, 0, 0));
    s.add_instr(addi(35, 35, 4)); // writes virtual reg 35
    let call = s.add_instr(RvInstr::Uj {
        opcode: RvOpcode::Jal,
        operands: UjType { rd: 1, imm: 0 },
    });

    let used = regs_used_before(&s, from, call, 36);

    assert!(used.contains(33));
    assert!(!used.contains(34)); // never written
    assert!(used.contains(35));
    assert_eq!(used.iter().collect::<Vec<_>>(), vec![33, 35]);
}

#[test]
fn use_probe_ignores_writes_outside_the_range() {
    let mut s = RvSection::new();
    s.add_instr(add(33, 1, 2));
    let from = s.add_instr(addi(5, 5, 1));
    let to = s.add_instr(add(6, 7, 8));
    s.add_instr(add(34, 1, 2));

    let used = regs_used_before(&s, from, to, 35);
    assert!(!used.contains(33));
    assert!(!used.contains(34));
}

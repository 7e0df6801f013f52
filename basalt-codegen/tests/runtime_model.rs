//! Execute the inline runtime generators on a small ARM model and
//! check the memory images they produce.

mod common;

use basalt_asm::{Cond, Reg};
use basalt_codegen::arm32::{
    encode_to_vec, heap_alloc, heap_free, heap_init, heap_min_size, memset_words,
    ArmProg, ArmSection, EncodeOptions, FloatArch, HEAP_MAX_SLOT,
};
use common::{Machine, STOP};
use itertools::Itertools;

const CODE_BASE: u32 = 0x8000;
const HEAP_BASE: u32 = 0x20000;
const HEAP_SIZE: u32 = 0x10000;
/// The block area starts after the 13 slot heads.
const BLOCKS: u32 = HEAP_BASE + 52;

fn encode_section(section: ArmSection) -> Vec<u8> {
    let mut prog = ArmProg::new(FloatArch::Fpa {
        reverse_consts: true,
    });
    prog.add_section(section);
    encode_to_vec(&prog, &EncodeOptions::default()).expect("encode")
}

fn run(code: &[u8], setup: impl FnOnce(&mut Machine)) -> Machine {
    let mut machine = Machine::new(0x40000);
    machine.load(code, CODE_BASE);
    machine.regs[14] = STOP;
    setup(&mut machine);
    machine.run(CODE_BASE, 1_000_000);
    machine
}

fn slot_head(machine: &Machine, slot: u32) -> u32 {
    machine.word(HEAP_BASE + slot * 4)
}

#[test]
fn generators_are_deterministic() {
    let mut a = ArmSection::new();
    let mut b = ArmSection::new();
    heap_init(&mut a).unwrap();
    heap_init(&mut b).unwrap();
    assert_eq!(a.ops(), b.ops());
    assert_eq!(encode_section(a), encode_section(b));
}

#[test]
fn heap_min_size_covers_one_oversized_block() {
    assert_eq!(heap_min_size(), (1 << 17) + 52);
}

#[test]
fn init_leaves_one_block_in_the_final_slot() {
    let mut s = ArmSection::new();
    heap_init(&mut s).unwrap();
    let code = encode_section(s);

    let machine = run(&code, |m| {
        m.regs[1] = HEAP_BASE;
        m.regs[3] = HEAP_SIZE;
    });

    for slot in 0..HEAP_MAX_SLOT {
        assert_eq!(slot_head(&machine, slot), 0, "slot {slot}");
    }
    assert_eq!(slot_head(&machine, HEAP_MAX_SLOT), BLOCKS);
    // Size is the heap minus the heads, rounded down to the 32-byte
    // quantum; the next pointer is null.
    assert_eq!(machine.word(BLOCKS), (HEAP_SIZE - 52) & !31);
    assert_eq!(machine.word(BLOCKS + 4), 0);
}

/// Build one section holding init, an allocation of `payload` bytes
/// and the good/bad epilogue: r7 tells which path ran.
fn alloc_section(payload: u32) -> ArmSection {
    let mut s = ArmSection::new();
    heap_init(&mut s).unwrap();
    s.add_mov_imm(Cond::Al, false, Reg(1), payload).unwrap();

    let good = s.fresh_label();
    let bad = s.fresh_label();
    let out = s.fresh_label();
    heap_alloc(&mut s, good, bad).unwrap();
    s.add_label(good);
    s.add_mov_imm(Cond::Al, false, Reg(7), 1).unwrap();
    s.add_br(Cond::Al, out);
    s.add_label(bad);
    s.add_mov_imm(Cond::Al, false, Reg(7), 2).unwrap();
    s.add_label(out);
    s.add_mov_reg(Cond::Al, false, Reg::PC, Reg::LR);
    s
}

#[test]
fn small_allocation_carves_the_oversized_block() {
    let code = encode_section(alloc_section(100));
    let machine = run(&code, |m| {
        m.regs[0] = HEAP_BASE;
        m.regs[1] = HEAP_BASE;
        m.regs[3] = HEAP_SIZE;
    });

    assert_eq!(machine.regs[7], 1, "allocation failed");
    // 100 + 8 rounds to 128: the returned payload follows the first
    // block's header.
    assert_eq!(machine.regs[0], BLOCKS + 8);
    assert_eq!(machine.word(BLOCKS), 128);

    // The oversized block is consumed; the split filed power-of-two
    // pieces on the way down.
    assert_eq!(slot_head(&machine, 12), 0);
    assert_eq!(slot_head(&machine, 10), BLOCKS + 128);
    assert_eq!(machine.word(BLOCKS + 128), 32768);
    // The tail remainder is a 64-byte block in slot 1.
    let tail = BLOCKS + ((HEAP_SIZE - 52) & !31) - 64;
    assert_eq!(slot_head(&machine, 1), tail);
    assert_eq!(machine.word(tail), 64);
    assert_eq!(slot_head(&machine, 2), 0);
}

#[test]
fn exhaustion_branches_to_the_bad_label() {
    // Larger than the whole heap: the oversized list has nothing
    // big enough and no other slot is populated.
    let code = encode_section(alloc_section(0x20000));
    let machine = run(&code, |m| {
        m.regs[0] = HEAP_BASE;
        m.regs[1] = HEAP_BASE;
        m.regs[3] = HEAP_SIZE;
    });
    assert_eq!(machine.regs[7], 2);
}

#[test]
fn free_pushes_the_block_onto_its_size_class() {
    // Allocate 100 bytes, then hand the block straight back.
    let mut s = ArmSection::new();
    heap_init(&mut s).unwrap();
    s.add_mov_imm(Cond::Al, false, Reg(1), 100).unwrap();
    let good = s.fresh_label();
    let bad = s.fresh_label();
    heap_alloc(&mut s, good, bad).unwrap();
    s.add_label(good);
    s.add_mov_reg(Cond::Al, false, Reg(6), Reg(0));
    s.add_mov_imm(Cond::Al, false, Reg(0), HEAP_BASE).unwrap();
    heap_free(&mut s, Reg(0), Reg(6)).unwrap();
    s.add_mov_imm(Cond::Al, false, Reg(7), 1).unwrap();
    s.add_mov_reg(Cond::Al, false, Reg::PC, Reg::LR);
    s.add_label(bad);
    s.add_mov_imm(Cond::Al, false, Reg(7), 2).unwrap();
    s.add_mov_reg(Cond::Al, false, Reg::PC, Reg::LR);
    let code = encode_section(s);

    let machine = run(&code, |m| {
        m.regs[0] = HEAP_BASE;
        m.regs[1] = HEAP_BASE;
        m.regs[3] = HEAP_SIZE;
    });

    assert_eq!(machine.regs[7], 1);
    // The freed 128-byte block heads slot 2 again with a null next.
    assert_eq!(slot_head(&machine, 2), BLOCKS);
    assert_eq!(machine.word(BLOCKS), 128);
    assert_eq!(machine.word(BLOCKS + 4), 0);
}

#[test]
fn memset_fills_words_with_stm_bursts() {
    let mut s = ArmSection::new();
    memset_words(&mut s).unwrap();
    let code = encode_section(s);

    const DST: u32 = 0x20000;
    const LEN: u32 = 260; // exercises both the burst and the tail loop
    let machine = run(&code, |m| {
        m.regs[0] = DST;
        m.regs[1] = LEN;
        m.regs[2] = 0xCAFE_F00D;
    });

    let filled = (0..LEN / 4)
        .map(|i| machine.word(DST + i * 4))
        .counts();
    assert_eq!(filled.len(), 1, "mixed fill values: {filled:?}");
    assert_eq!(filled[&0xCAFE_F00D], (LEN / 4) as usize);
    // The fill stops at the requested end.
    assert_eq!(machine.word(DST + LEN), 0);
}

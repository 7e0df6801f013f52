//! The runtime heap, synthesised as instruction records.
//!
//! The allocator is a segregated free list of 13 slots. Slot `i`
//! holds blocks of exactly `2^(5+i)` bytes except the last, which
//! holds anything bigger and is the only slot that fragments. The
//! heap image starts with the 13 head pointers followed by the block
//! area; every block carries an 8-byte `[size][next]` header the
//! callers never see.
//!
//! All of this code lands in the program preamble before register
//! allocation runs, so register choices are fixed here.

use basalt_asm::{
    Cond, DataInstr, DataOp, Instr, Label, Op2, Reg, Shift, ShiftCount, ShiftKind,
    StranInstr, StranOp,
};

use crate::arm32::ArmSection;
use crate::Error;

/// log2 of the smallest block size.
pub const HEAP_MIN_SLOT_SHIFT: u32 = 5;
/// The smallest block size in bytes.
pub const HEAP_MIN_SLOT_SIZE: u32 = 1 << HEAP_MIN_SLOT_SHIFT;
/// Index of the oversized slot.
pub const HEAP_MAX_SLOT: u32 = 12;
/// Number of free-list heads at the start of the heap.
pub const HEAP_SLOT_COUNT: u32 = HEAP_MAX_SLOT + 1;

/// The smallest heap that still puts one block in the oversized slot.
pub const fn heap_min_size() -> u32 {
    (1 << (HEAP_MIN_SLOT_SHIFT + HEAP_MAX_SLOT)) + HEAP_SLOT_COUNT * 4
}

/// `op dest, op1, op2`.
fn data_reg(op: DataOp, cond: Cond, dest: Reg, op1: Reg, op2: Reg) -> Instr {
    Instr::Data(DataInstr {
        op,
        cond,
        status: false,
        dest,
        op1,
        op2: Op2::Reg(op2),
    })
}

/// `MOV dest, src, <kind> #count`.
fn mov_shift_imm(cond: Cond, dest: Reg, src: Reg, kind: ShiftKind, count: u8) -> Instr {
    Instr::Data(DataInstr {
        op: DataOp::Mov,
        cond,
        status: false,
        dest,
        op1: Reg(0),
        op2: Op2::Shifted(Shift {
            reg: src,
            kind,
            count: ShiftCount::Imm(count),
        }),
    })
}

/// `MOV dest, src, LSL count`.
fn mov_lsl_reg(cond: Cond, dest: Reg, src: Reg, count: Reg) -> Instr {
    Instr::Data(DataInstr {
        op: DataOp::Mov,
        cond,
        status: false,
        dest,
        op1: Reg(0),
        op2: Op2::Shifted(Shift {
            reg: src,
            kind: ShiftKind::Lsl,
            count: ShiftCount::Reg(count),
        }),
    })
}

/// A load or store of a free-list head: `[base, slot, LSL #2]`.
fn slot_stran(op: StranOp, cond: Cond, dest: Reg, base: Reg, slot: Reg) -> Instr {
    Instr::Stran(StranInstr {
        op,
        cond,
        byte: false,
        pre_indexed: true,
        write_back: false,
        subtract: false,
        dest,
        base,
        offset: Op2::Shifted(Shift {
            reg: slot,
            kind: ShiftKind::Lsl,
            count: ShiftCount::Imm(2),
        }),
    })
}

/// Emit the heap initialisation code.
///
/// On entry r1 holds the heap start and r3 the heap size, a multiple
/// of [`HEAP_MIN_SLOT_SIZE`]. The first twelve heads are zeroed and
/// the whole block area becomes one entry in the oversized slot.
/// r1 is left pointing at the block area.
pub fn heap_init(s: &mut ArmSection) -> Result<(), Error> {
    let heap_start = Reg(1);
    let slots_counter = Reg(2);
    let heap_size = Reg(3);
    let zero = Reg(4);

    let loop_label = s.fresh_label();

    s.add_mov_imm(Cond::Al, false, slots_counter, HEAP_MAX_SLOT)?;
    s.add_mov_imm(Cond::Al, false, zero, 0)?;

    // On a fresh heap only the final slot holds a block; zero out the
    // other heads.
    s.add_label(loop_label);
    s.add_sub_imm(Cond::Al, false, slots_counter, slots_counter, 1)?;
    s.add_instr(slot_stran(StranOp::Str, Cond::Al, zero, heap_start, slots_counter));
    s.add_cmp_imm(DataOp::Cmp, Cond::Al, slots_counter, 0)?;
    s.add_br(Cond::Gt, loop_label);

    s.add_add_imm(Cond::Al, false, heap_start, heap_start, HEAP_SLOT_COUNT * 4)?;
    s.add_sub_imm(Cond::Al, false, heap_size, heap_size, HEAP_SLOT_COUNT * 4)?;

    // The block area must be divisible by the smallest slot size.
    s.add_data_imm(
        DataOp::Bic,
        Cond::Al,
        false,
        heap_size,
        heap_size,
        HEAP_MIN_SLOT_SIZE - 1,
    )?;

    // Hook the one and only block into the final slot.
    s.add_stran_imm(StranOp::Str, Cond::Al, heap_start, heap_start, -4, false)?;
    s.add_stran_imm(StranOp::Str, Cond::Al, heap_size, heap_start, 0, false)?;
    s.add_stran_imm(StranOp::Str, Cond::Al, zero, heap_start, 4, false)?;
    Ok(())
}

/// Emit the slot-of-size computation: `ret` receives the slot index
/// for an allocation of `value` bytes. `value` and `scratch` are
/// corrupted. Branch free; five unrolled bit-scan steps.
fn emit_get_slot(
    s: &mut ArmSection,
    value: Reg,
    ret: Reg,
    scratch: Reg,
) -> Result<(), Error> {
    let masks = [0u32, 0x2, 0xc, 0xf0, 0xff00];

    s.add_mov_imm(Cond::Al, false, ret, 0)?;
    s.add_sub_imm(Cond::Al, false, value, value, 1)?;
    s.add_mov_imm(Cond::Al, false, scratch, 0xff00_0000)?;
    s.add_data_imm(DataOp::Orr, Cond::Al, false, scratch, scratch, 0xff_0000)?;
    s.add_cmp(DataOp::Tst, Cond::Al, value, scratch);

    for i in (0..=4u32).rev() {
        s.add_instr(mov_shift_imm(
            Cond::Ne,
            value,
            value,
            ShiftKind::Lsr,
            (1 << i) as u8,
        ));
        s.add_data_imm(DataOp::Orr, Cond::Ne, false, ret, ret, 1 << i)?;
        if i == 0 {
            break;
        }
        s.add_cmp_imm(DataOp::Tst, Cond::Al, value, masks[i as usize])?;
    }

    s.add_sub_imm(Cond::Al, false, ret, ret, HEAP_MIN_SLOT_SHIFT - 1)?;
    Ok(())
}

/// Carve a block of `r5` bytes out of the head of the oversized list
/// (`r3`), leaving any remainder for the split paths.
fn emit_slot12_alloc(
    s: &mut ArmSection,
    good_label: Label,
    exact_slot_size_label: Label,
) -> Result<(), Error> {
    let ret_val = Reg(0);
    let heap_start = Reg(0);
    let segment = Reg(1);
    let first_entry = Reg(3);
    let next_ptr = Reg(4);
    let block_size = Reg(5);
    let scratch2 = Reg(6);
    let split_block_size = Reg(7);
    let split_slot = Reg(8);
    let scratch3 = Reg(9);
    let scratch = Reg(10);
    let max_size_of_block = Reg(10);

    s.add_stran_imm(StranOp::Ldr, Cond::Al, next_ptr, first_entry, 4, false)?;
    s.add_stran_imm(StranOp::Ldr, Cond::Al, scratch2, first_entry, 0, false)?;
    s.add_instr(data_reg(DataOp::Sub, Cond::Al, split_block_size, scratch2, block_size));
    s.add_stran_imm(
        StranOp::Str,
        Cond::Al,
        next_ptr,
        heap_start,
        (HEAP_MAX_SLOT * 4) as i32,
        false,
    )?;
    s.add_cmp_imm(DataOp::Cmp, Cond::Al, split_block_size, 0)?;
    s.add_add_imm(Cond::Eq, false, ret_val, first_entry, 8)?;
    s.add_br(Cond::Eq, good_label);

    s.add_mov_reg(Cond::Al, false, scratch, split_block_size);
    s.add_instr(data_reg(DataOp::Add, Cond::Al, segment, first_entry, block_size));

    emit_get_slot(s, scratch, split_slot, scratch3)?;

    s.add_cmp_imm(DataOp::Cmp, Cond::Al, split_slot, HEAP_MAX_SLOT)?;
    s.add_mov_imm(Cond::Gt, false, split_slot, HEAP_MAX_SLOT)?;
    s.add_br(Cond::Ge, exact_slot_size_label);

    s.add_mov_imm(Cond::Al, false, scratch3, HEAP_MIN_SLOT_SIZE)?;
    s.add_instr(mov_lsl_reg(Cond::Al, scratch, scratch3, split_slot));
    s.add_cmp(DataOp::Cmp, Cond::Al, scratch, split_block_size);
    s.add_br(Cond::Eq, exact_slot_size_label);

    s.add_sub_imm(Cond::Al, false, split_slot, split_slot, 1)?;
    s.add_instr(mov_shift_imm(
        Cond::Al,
        max_size_of_block,
        max_size_of_block,
        ShiftKind::Lsr,
        1,
    ));
    Ok(())
}

/// Peel power-of-two blocks off the remainder until one lands in a
/// slot exactly.
fn emit_split_slot12_block(
    s: &mut ArmSection,
    split_slot12_block_label: Label,
    exact_slot_size_label: Label,
) -> Result<(), Error> {
    let heap_start = Reg(0);
    let segment = Reg(1);
    let ptr = Reg(4);
    let split_block_size = Reg(7);
    let split_slot = Reg(8);
    let max_size_of_block = Reg(10);

    let find_next_slot_label = s.fresh_label();

    s.add_instr(slot_stran(StranOp::Ldr, Cond::Al, ptr, heap_start, split_slot));
    s.add_stran_imm(StranOp::Str, Cond::Al, max_size_of_block, segment, 0, false)?;
    s.add_stran_imm(StranOp::Str, Cond::Al, ptr, segment, 4, false)?;
    s.add_instr(slot_stran(StranOp::Str, Cond::Al, segment, heap_start, split_slot));
    s.add_instr(data_reg(DataOp::Add, Cond::Al, segment, segment, max_size_of_block));
    s.add_instr(data_reg(
        DataOp::Sub,
        Cond::Al,
        split_block_size,
        split_block_size,
        max_size_of_block,
    ));

    s.add_label(find_next_slot_label);
    s.add_sub_imm(Cond::Al, false, split_slot, split_slot, 1)?;
    s.add_instr(mov_shift_imm(
        Cond::Al,
        max_size_of_block,
        max_size_of_block,
        ShiftKind::Lsr,
        1,
    ));
    s.add_cmp(DataOp::Cmp, Cond::Al, split_block_size, max_size_of_block);
    s.add_br(Cond::Eq, exact_slot_size_label);
    s.add_br(Cond::Lt, find_next_slot_label);
    s.add_br(Cond::Al, split_slot12_block_label);
    Ok(())
}

/// The remainder fits its slot exactly; file it and return the
/// carved block.
fn emit_exact_slot_size(s: &mut ArmSection, good_label: Label) -> Result<(), Error> {
    let ret_val = Reg(0);
    let heap_start = Reg(0);
    let split_block_start = Reg(1);
    let first_entry = Reg(3);
    let slot_start = Reg(4);
    let block_size = Reg(5);
    let split_block_size = Reg(7);
    let split_slot = Reg(8);

    s.add_stran_imm(StranOp::Str, Cond::Al, block_size, first_entry, 0, false)?;
    s.add_stran_imm(StranOp::Str, Cond::Al, split_block_size, split_block_start, 0, false)?;
    s.add_instr(slot_stran(StranOp::Ldr, Cond::Al, slot_start, heap_start, split_slot));
    s.add_stran_imm(StranOp::Str, Cond::Al, slot_start, split_block_start, 4, false)?;
    s.add_instr(slot_stran(
        StranOp::Str,
        Cond::Al,
        split_block_start,
        heap_start,
        split_slot,
    ));
    s.add_add_imm(Cond::Al, false, ret_val, first_entry, 8)?;
    s.add_br(Cond::Al, good_label);
    Ok(())
}

/// Oversized allocation: use the head if it is big enough, otherwise
/// walk the list for the first block that is.
fn emit_big_alloc(
    s: &mut ArmSection,
    bad_label: Label,
    slot12_alloc_label: Label,
    move_block_to_start_label: Label,
) -> Result<(), Error> {
    let requested_size = Reg(1);
    let heap_start = Reg(0);
    let last_slot = Reg(2);
    let first_entry = Reg(3);
    let size_of_block = Reg(4);
    let block_size = Reg(5);

    let big_alloc_loop_label = s.fresh_label();

    s.add_mov_imm(Cond::Al, false, last_slot, HEAP_MAX_SLOT)?;
    s.add_instr(slot_stran(StranOp::Ldr, Cond::Al, first_entry, heap_start, last_slot));
    s.add_cmp_imm(DataOp::Cmp, Cond::Al, first_entry, 0)?;
    s.add_br(Cond::Eq, bad_label);

    s.add_stran_imm(StranOp::Ldr, Cond::Al, size_of_block, first_entry, 0, false)?;
    s.add_cmp(DataOp::Cmp, Cond::Al, size_of_block, requested_size);
    s.add_mov_reg(Cond::Ge, false, block_size, requested_size);
    s.add_br(Cond::Ge, slot12_alloc_label);

    s.add_label(big_alloc_loop_label);
    s.add_stran_imm(StranOp::Ldr, Cond::Al, block_size, first_entry, 4, false)?;
    s.add_cmp_imm(DataOp::Cmp, Cond::Al, block_size, 0)?;
    s.add_br(Cond::Eq, bad_label);
    s.add_stran_imm(StranOp::Ldr, Cond::Al, size_of_block, block_size, 0, false)?;
    s.add_cmp(DataOp::Cmp, Cond::Al, size_of_block, requested_size);
    s.add_br(Cond::Ge, move_block_to_start_label);
    s.add_mov_reg(Cond::Al, false, first_entry, block_size);
    s.add_br(Cond::Al, big_alloc_loop_label);
    Ok(())
}

/// Swap a sufficient block found mid-list to the head of the
/// oversized slot, then retry the carve.
fn emit_move_block_to_start(
    s: &mut ArmSection,
    slot12_alloc_label: Label,
) -> Result<(), Error> {
    let requested_size = Reg(1);
    let heap_start = Reg(0);
    let last_slot = Reg(2);
    let previous_block = Reg(3);
    let block_to_move = Reg(5);
    let next_ptr = Reg(6);
    let first_block = Reg(7);

    s.add_stran_imm(StranOp::Ldr, Cond::Al, next_ptr, block_to_move, 4, false)?;
    s.add_instr(slot_stran(StranOp::Ldr, Cond::Al, first_block, heap_start, last_slot));
    s.add_stran_imm(StranOp::Str, Cond::Al, next_ptr, previous_block, 4, false)?;
    s.add_stran_imm(StranOp::Str, Cond::Al, first_block, block_to_move, 4, false)?;
    s.add_instr(slot_stran(
        StranOp::Str,
        Cond::Al,
        block_to_move,
        heap_start,
        last_slot,
    ));
    s.add_mov_reg(Cond::Al, false, previous_block, block_to_move);
    s.add_mov_reg(Cond::Al, false, block_to_move, requested_size);
    s.add_br(Cond::Al, slot12_alloc_label);
    Ok(())
}

/// Find the smallest populated slot above the one we wanted and pop
/// its head for splitting.
fn emit_search_slots(s: &mut ArmSection, bad_label: Label) -> Result<(), Error> {
    let heap_start = Reg(0);
    let next_ptr = Reg(1);
    let desired_slot = Reg(2);
    let non_empty_slot = Reg(3);
    let next_slot = Reg(4);

    let search_slots_loop_label = s.fresh_label();

    s.add_mov_reg(Cond::Al, false, next_slot, desired_slot);
    s.add_label(search_slots_loop_label);
    s.add_add_imm(Cond::Al, false, next_slot, next_slot, 1)?;
    s.add_cmp_imm(DataOp::Cmp, Cond::Al, next_slot, HEAP_MAX_SLOT)?;
    s.add_br(Cond::Eq, bad_label);
    s.add_instr(slot_stran(StranOp::Ldr, Cond::Al, non_empty_slot, heap_start, next_slot));
    s.add_cmp_imm(DataOp::Cmp, Cond::Al, non_empty_slot, 0)?;
    s.add_br(Cond::Eq, search_slots_loop_label);

    s.add_stran_imm(StranOp::Ldr, Cond::Al, next_ptr, non_empty_slot, 4, false)?;
    s.add_instr(slot_stran(StranOp::Str, Cond::Al, next_ptr, heap_start, next_slot));
    Ok(())
}

/// Halve the popped block repeatedly, filing each half, until a
/// piece of the wanted size remains. Falls through to the caller's
/// good label.
fn emit_split_small_block(s: &mut ArmSection) -> Result<(), Error> {
    let heap_start = Reg(0);
    let ret_val = Reg(0);
    let slot_number = Reg(2);
    let slot_ptr = Reg(3);
    let next_slot = Reg(4);
    let block_size = Reg(5);
    let min_slot_size = Reg(8);
    let zero = Reg(9);

    let split_up_block_label = s.fresh_label();

    s.add_mov_imm(Cond::Al, false, min_slot_size, HEAP_MIN_SLOT_SIZE)?;
    s.add_mov_imm(Cond::Al, false, zero, 0)?;

    s.add_label(split_up_block_label);
    s.add_sub_imm(Cond::Al, false, next_slot, next_slot, 1)?;
    s.add_instr(mov_lsl_reg(Cond::Al, block_size, min_slot_size, next_slot));
    s.add_stran_imm(StranOp::Str, Cond::Al, block_size, slot_ptr, 0, false)?;
    s.add_instr(slot_stran(StranOp::Str, Cond::Al, slot_ptr, heap_start, next_slot));
    s.add_stran_imm(StranOp::Str, Cond::Al, zero, slot_ptr, 4, false)?;
    s.add_instr(data_reg(DataOp::Add, Cond::Al, slot_ptr, slot_ptr, block_size));
    s.add_cmp(DataOp::Cmp, Cond::Al, next_slot, slot_number);
    s.add_br(Cond::Gt, split_up_block_label);

    s.add_stran_imm(StranOp::Str, Cond::Al, block_size, slot_ptr, 0, false)?;
    s.add_add_imm(Cond::Al, false, ret_val, slot_ptr, 8)?;
    Ok(())
}

/// Emit the allocation code.
///
/// On entry r0 holds the heap start and r1 the payload size. On
/// success the code branches to `good_label` with the payload
/// address in r0; on exhaustion it branches to `bad_label`. The
/// final split path falls through, so the caller must define
/// `good_label` immediately after this code.
pub fn heap_alloc(
    s: &mut ArmSection,
    good_label: Label,
    bad_label: Label,
) -> Result<(), Error> {
    let heap_start = Reg(0);
    let ret_val = Reg(0);
    let requested_size = Reg(1);
    let slot_number = Reg(2);
    let scratch1 = Reg(3);
    let first_entry = Reg(3);
    let next_ptr = Reg(4);
    let block_size = Reg(5);
    let scratch2 = Reg(6);
    let scratch = Reg(10);

    let big_alloc_label = s.fresh_label();
    let search_slots_label = s.fresh_label();
    let slot12_alloc_label = s.fresh_label();
    let exact_slot_size_label = s.fresh_label();
    let split_slot12_block_label = s.fresh_label();
    let move_block_to_start_label = s.fresh_label();

    // Header plus rounding up to the allocation quantum.
    s.add_add_imm(Cond::Al, false, requested_size, requested_size, 8)?;
    s.add_cmp_imm(DataOp::Tst, Cond::Al, requested_size, HEAP_MIN_SLOT_SIZE - 1)?;
    s.add_data_imm(
        DataOp::Bic,
        Cond::Ne,
        false,
        requested_size,
        requested_size,
        HEAP_MIN_SLOT_SIZE - 1,
    )?;
    s.add_add_imm(Cond::Ne, false, requested_size, requested_size, HEAP_MIN_SLOT_SIZE)?;

    s.add_mov_reg(Cond::Al, false, scratch, requested_size);
    emit_get_slot(s, scratch, slot_number, scratch1)?;

    s.add_cmp_imm(DataOp::Cmp, Cond::Al, slot_number, HEAP_MAX_SLOT)?;
    s.add_br(Cond::Ge, big_alloc_label);

    // Fast path: pop the head of the right slot.
    s.add_instr(slot_stran(StranOp::Ldr, Cond::Al, first_entry, heap_start, slot_number));
    s.add_cmp_imm(DataOp::Cmp, Cond::Al, first_entry, 0)?;
    s.add_stran_imm(StranOp::Ldr, Cond::Ne, next_ptr, first_entry, 4, false)?;
    s.add_instr(slot_stran(StranOp::Str, Cond::Ne, next_ptr, heap_start, slot_number));
    s.add_add_imm(Cond::Ne, false, ret_val, first_entry, 8)?;
    s.add_br(Cond::Ne, good_label);

    // Empty; carve from the oversized block if there is one.
    s.add_stran_imm(
        StranOp::Ldr,
        Cond::Al,
        first_entry,
        heap_start,
        (HEAP_MAX_SLOT * 4) as i32,
        false,
    )?;
    s.add_cmp_imm(DataOp::Cmp, Cond::Al, first_entry, 0)?;
    s.add_br(Cond::Eq, search_slots_label);
    s.add_add_imm(Cond::Al, false, block_size, slot_number, HEAP_MIN_SLOT_SHIFT)?;
    s.add_mov_imm(Cond::Al, false, scratch2, 1)?;
    s.add_instr(mov_lsl_reg(Cond::Al, block_size, scratch2, block_size));

    s.add_label(slot12_alloc_label);
    emit_slot12_alloc(s, good_label, exact_slot_size_label)?;

    s.add_label(split_slot12_block_label);
    emit_split_slot12_block(s, split_slot12_block_label, exact_slot_size_label)?;

    s.add_label(exact_slot_size_label);
    emit_exact_slot_size(s, good_label)?;

    s.add_label(big_alloc_label);
    emit_big_alloc(
        s,
        bad_label,
        slot12_alloc_label,
        move_block_to_start_label,
    )?;

    s.add_label(move_block_to_start_label);
    emit_move_block_to_start(s, slot12_alloc_label)?;

    s.add_label(search_slots_label);
    emit_search_slots(s, bad_label)?;
    emit_split_small_block(s)?;
    Ok(())
}

/// Emit the free code: push `block` back onto the list matching its
/// stored size. `block` and r3, r4, r8, r9 are corrupted.
pub fn heap_free(
    s: &mut ArmSection,
    heap_start: Reg,
    block: Reg,
) -> Result<(), Error> {
    let block_size = Reg(3);
    let ptr = Reg(4);
    let slot_number = Reg(8);
    let scratch = Reg(9);

    s.add_sub_imm(Cond::Al, false, block, block, 8)?;
    s.add_stran_imm(StranOp::Ldr, Cond::Al, block_size, block, 0, false)?;

    emit_get_slot(s, block_size, slot_number, scratch)?;

    s.add_cmp_imm(DataOp::Cmp, Cond::Al, slot_number, HEAP_MAX_SLOT)?;
    s.add_mov_imm(Cond::Gt, false, slot_number, HEAP_MAX_SLOT)?;

    s.add_instr(slot_stran(StranOp::Ldr, Cond::Al, ptr, heap_start, slot_number));
    s.add_instr(slot_stran(StranOp::Str, Cond::Al, block, heap_start, slot_number));
    s.add_stran_imm(StranOp::Str, Cond::Al, ptr, block, 4, false)?;
    Ok(())
}

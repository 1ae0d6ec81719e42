use super::{imm16, imm8, Access, Effect, ExecContext};
use crate::cpu::decode::{Reg8, RegPair};

/// MOV dst,src (0x40–0x7F except 0x76).
pub(in crate::cpu) fn exec_mov(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let opcode = bytes[0];
    debug_assert!((0x40..=0x7F).contains(&opcode) && opcode != 0x76);

    let dst = Reg8::dst(opcode);
    let src = Reg8::src(opcode);
    let value = ctx.read_reg8(src);
    ctx.write_reg8(dst, value);

    if dst == Reg8::M || src == Reg8::M {
        Effect::Continue(Access::TouchedMemory)
    } else {
        Effect::Continue(Access::RegisterOnly)
    }
}

/// MVI r,d8 (and MVI M,d8).
pub(in crate::cpu) fn exec_mvi(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let reg = Reg8::dst(bytes[0]);
    ctx.write_reg8(reg, imm8(bytes));
    Effect::Continue(Access::of(reg))
}

/// LXI rp,d16
pub(in crate::cpu) fn exec_lxi(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let rp = RegPair::from_opcode(bytes[0]);
    ctx.write_pair(rp, imm16(bytes));
    Effect::Continue(Access::RegisterOnly)
}

/// STAX B / STAX D
pub(in crate::cpu) fn exec_stax(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    debug_assert!(matches!(bytes[0], 0x02 | 0x12));
    let addr = ctx.read_pair(RegPair::from_opcode(bytes[0]));
    ctx.memory.write8(addr, ctx.regs.a);
    Effect::Continue(Access::TouchedMemory)
}

/// LDAX B / LDAX D
pub(in crate::cpu) fn exec_ldax(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    debug_assert!(matches!(bytes[0], 0x0A | 0x1A));
    let addr = ctx.read_pair(RegPair::from_opcode(bytes[0]));
    ctx.regs.a = ctx.memory.read8(addr);
    Effect::Continue(Access::TouchedMemory)
}

/// STA a16
pub(in crate::cpu) fn exec_sta(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    ctx.memory.write8(imm16(bytes), ctx.regs.a);
    Effect::Continue(Access::TouchedMemory)
}

/// LDA a16
pub(in crate::cpu) fn exec_lda(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    ctx.regs.a = ctx.memory.read8(imm16(bytes));
    Effect::Continue(Access::TouchedMemory)
}

/// SHLD a16: L to (a16), H to (a16 + 1).
pub(in crate::cpu) fn exec_shld(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    ctx.memory.write16(imm16(bytes), ctx.regs.hl());
    Effect::Continue(Access::TouchedMemory)
}

/// LHLD a16
pub(in crate::cpu) fn exec_lhld(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let value = ctx.memory.read16(imm16(bytes));
    ctx.regs.set_hl(value);
    Effect::Continue(Access::TouchedMemory)
}

/// XCHG: swap HL and DE.
pub(in crate::cpu) fn exec_xchg(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    std::mem::swap(&mut ctx.regs.d, &mut ctx.regs.h);
    std::mem::swap(&mut ctx.regs.e, &mut ctx.regs.l);
    Effect::Continue(Access::RegisterOnly)
}

/// SPHL
pub(in crate::cpu) fn exec_sphl(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    ctx.regs.sp = ctx.regs.hl();
    Effect::Continue(Access::RegisterOnly)
}

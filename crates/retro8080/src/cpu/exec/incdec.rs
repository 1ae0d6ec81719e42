use super::{Access, Effect, ExecContext};
use crate::cpu::decode::{Reg8, RegPair};

pub(in crate::cpu) fn exec_inr(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let opcode = bytes[0];
    debug_assert!(
        opcode & 0xC7 == 0x04,
        "unexpected INR opcode {opcode:#04x}"
    );

    let reg = Reg8::dst(opcode);
    let value = ctx.read_reg8(reg);
    let result = ctx.alu_inr(value);
    ctx.write_reg8(reg, result);

    Effect::Continue(Access::of(reg))
}

pub(in crate::cpu) fn exec_dcr(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let opcode = bytes[0];
    debug_assert!(
        opcode & 0xC7 == 0x05,
        "unexpected DCR opcode {opcode:#04x}"
    );

    let reg = Reg8::dst(opcode);
    let value = ctx.read_reg8(reg);
    let result = ctx.alu_dcr(value);
    ctx.write_reg8(reg, result);

    Effect::Continue(Access::of(reg))
}

/// INX rp: no flags.
pub(in crate::cpu) fn exec_inx(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let rp = RegPair::from_opcode(bytes[0]);
    let value = ctx.read_pair(rp).wrapping_add(1);
    ctx.write_pair(rp, value);
    Effect::Continue(Access::RegisterOnly)
}

/// DCX rp: no flags.
pub(in crate::cpu) fn exec_dcx(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let rp = RegPair::from_opcode(bytes[0]);
    let value = ctx.read_pair(rp).wrapping_sub(1);
    ctx.write_pair(rp, value);
    Effect::Continue(Access::RegisterOnly)
}

use super::{Access, Effect, ExecContext};
use crate::cpu::decode::StackPair;
use crate::cpu::Flags;

pub(in crate::cpu) fn exec_push(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    debug_assert!(bytes[0] & 0xCF == 0xC5);

    let value = match StackPair::from_opcode(bytes[0]) {
        StackPair::BC => ctx.regs.bc(),
        StackPair::DE => ctx.regs.de(),
        StackPair::HL => ctx.regs.hl(),
        StackPair::PSW => u16::from_be_bytes([ctx.regs.a, ctx.flags.to_byte()]),
    };
    ctx.push_u16(value);

    Effect::Continue(Access::TouchedMemory)
}

pub(in crate::cpu) fn exec_pop(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    debug_assert!(bytes[0] & 0xCF == 0xC1);

    let value = ctx.pop_u16();
    match StackPair::from_opcode(bytes[0]) {
        StackPair::BC => ctx.regs.set_bc(value),
        StackPair::DE => ctx.regs.set_de(value),
        StackPair::HL => ctx.regs.set_hl(value),
        StackPair::PSW => {
            let [a, status] = value.to_be_bytes();
            ctx.regs.a = a;
            *ctx.flags = Flags::from_byte(status);
        }
    }

    Effect::Continue(Access::TouchedMemory)
}

/// XTHL: exchange L with (SP) and H with (SP + 1).
pub(in crate::cpu) fn exec_xthl(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    let sp = ctx.regs.sp;
    let top = ctx.memory.read16(sp);
    ctx.memory.write16(sp, ctx.regs.hl());
    ctx.regs.set_hl(top);
    Effect::Continue(Access::TouchedMemory)
}

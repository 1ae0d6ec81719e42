use super::{imm16, Access, Effect, ExecContext};
use crate::cpu::decode::Condition;

impl ExecContext<'_> {
    fn jump(&mut self, addr: u16) -> Effect {
        self.regs.pc = addr;
        Effect::Jump
    }

    fn call(&mut self, addr: u16) -> Effect {
        let ret = self.next_pc;
        self.push_u16(ret);
        self.jump(addr)
    }

    fn ret(&mut self) -> Effect {
        let addr = self.pop_u16();
        self.jump(addr)
    }
}

/// JMP a16
pub(in crate::cpu) fn exec_jmp(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    ctx.jump(imm16(bytes))
}

/// Jcc a16
pub(in crate::cpu) fn exec_jcc(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    debug_assert!(bytes[0] & 0xC7 == 0xC2);
    if ctx.condition(Condition::from_opcode(bytes[0])) {
        ctx.jump(imm16(bytes))
    } else {
        Effect::Continue(Access::RegisterOnly)
    }
}

/// CALL a16
pub(in crate::cpu) fn exec_call(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    ctx.call(imm16(bytes))
}

/// Ccc a16
pub(in crate::cpu) fn exec_ccc(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    debug_assert!(bytes[0] & 0xC7 == 0xC4);
    if ctx.condition(Condition::from_opcode(bytes[0])) {
        ctx.call(imm16(bytes))
    } else {
        Effect::Continue(Access::RegisterOnly)
    }
}

pub(in crate::cpu) fn exec_ret(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    ctx.ret()
}

/// Rcc
pub(in crate::cpu) fn exec_rcc(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    debug_assert!(bytes[0] & 0xC7 == 0xC0);
    if ctx.condition(Condition::from_opcode(bytes[0])) {
        ctx.ret()
    } else {
        Effect::Continue(Access::RegisterOnly)
    }
}

/// RST n: call to 8 * n.
pub(in crate::cpu) fn exec_rst(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    debug_assert!(bytes[0] & 0xC7 == 0xC7);
    ctx.call((bytes[0] & 0x38) as u16)
}

/// PCHL
pub(in crate::cpu) fn exec_pchl(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    let addr = ctx.regs.hl();
    ctx.jump(addr)
}

use super::{imm8, Access, Effect, ExecContext};

pub(in crate::cpu) fn exec_nop(_ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    Effect::Continue(Access::RegisterOnly)
}

pub(in crate::cpu) fn exec_hlt(_ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    Effect::Halt
}

pub(in crate::cpu) fn exec_ei(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    ctx.bus.set_interrupts_enabled(true);
    Effect::Continue(Access::RegisterOnly)
}

pub(in crate::cpu) fn exec_di(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    ctx.bus.set_interrupts_enabled(false);
    Effect::Continue(Access::RegisterOnly)
}

/// IN d8: A from the addressed device.
pub(in crate::cpu) fn exec_in(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let port = imm8(bytes);
    ctx.bus.input_requested(port);
    ctx.regs.a = ctx.io.read(port);
    Effect::Continue(Access::RegisterOnly)
}

/// OUT d8: A to the addressed device.
pub(in crate::cpu) fn exec_out(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let port = imm8(bytes);
    let value = ctx.regs.a;
    ctx.io.write(port, value);
    ctx.bus.output_delivered(port, value);
    Effect::Continue(Access::RegisterOnly)
}

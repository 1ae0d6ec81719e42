use super::{imm8, Access, Effect, ExecContext};
use crate::cpu::decode::{AluOp, Reg8, RegPair};

impl ExecContext<'_> {
    fn apply_alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.alu_add(value, false),
            AluOp::Adc => self.alu_add(value, self.flags.cy),
            AluOp::Sub => self.alu_sub(value, false),
            AluOp::Sbb => self.alu_sub(value, self.flags.cy),
            AluOp::Ana => self.alu_ana(value),
            AluOp::Xra => self.alu_xra(value),
            AluOp::Ora => self.alu_ora(value),
            AluOp::Cmp => self.alu_cmp(value),
        }
    }
}

/// ADD/ADC/SUB/SBB/ANA/XRA/ORA/CMP r (0x80–0xBF).
pub(in crate::cpu) fn exec_alu_reg(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let opcode = bytes[0];
    debug_assert!((0x80..=0xBF).contains(&opcode));

    let src = Reg8::src(opcode);
    let value = ctx.read_reg8(src);
    ctx.apply_alu(AluOp::from_opcode(opcode), value);

    Effect::Continue(Access::of(src))
}

/// ADI/ACI/SUI/SBI/ANI/XRI/ORI/CPI d8
pub(in crate::cpu) fn exec_alu_imm(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let opcode = bytes[0];
    debug_assert!(opcode & 0xC7 == 0xC6);

    ctx.apply_alu(AluOp::from_opcode(opcode), imm8(bytes));
    Effect::Continue(Access::RegisterOnly)
}

/// DAD rp
pub(in crate::cpu) fn exec_dad(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let value = ctx.read_pair(RegPair::from_opcode(bytes[0]));
    ctx.alu_dad(value);
    Effect::Continue(Access::RegisterOnly)
}

/// RLC / RRC / RAL / RAR. Only CY changes.
pub(in crate::cpu) fn exec_rotate(ctx: &mut ExecContext<'_>, bytes: &[u8]) -> Effect {
    let a = ctx.regs.a;
    match bytes[0] {
        0x07 => {
            // RLC: bit 7 to CY and bit 0.
            ctx.regs.a = a.rotate_left(1);
            ctx.flags.cy = (a & 0x80) != 0;
        }
        0x0F => {
            // RRC: bit 0 to CY and bit 7.
            ctx.regs.a = a.rotate_right(1);
            ctx.flags.cy = (a & 0x01) != 0;
        }
        0x17 => {
            // RAL: through carry.
            let carry_in = ctx.flags.cy as u8;
            ctx.regs.a = (a << 1) | carry_in;
            ctx.flags.cy = (a & 0x80) != 0;
        }
        0x1F => {
            // RAR: through carry.
            let carry_in = if ctx.flags.cy { 0x80 } else { 0 };
            ctx.regs.a = (a >> 1) | carry_in;
            ctx.flags.cy = (a & 0x01) != 0;
        }
        other => debug_assert!(false, "unexpected rotate opcode {other:#04x}"),
    }
    Effect::Continue(Access::RegisterOnly)
}

pub(in crate::cpu) fn exec_daa(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    ctx.alu_daa();
    Effect::Continue(Access::RegisterOnly)
}

/// CMA: complement A, flags untouched.
pub(in crate::cpu) fn exec_cma(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    ctx.regs.a = !ctx.regs.a;
    Effect::Continue(Access::RegisterOnly)
}

pub(in crate::cpu) fn exec_stc(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    ctx.flags.cy = true;
    Effect::Continue(Access::RegisterOnly)
}

pub(in crate::cpu) fn exec_cmc(ctx: &mut ExecContext<'_>, _bytes: &[u8]) -> Effect {
    ctx.flags.cy = !ctx.flags.cy;
    Effect::Continue(Access::RegisterOnly)
}

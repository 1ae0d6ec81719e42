mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

pub(super) use alu::*;
pub(super) use control::*;
pub(super) use incdec::*;
pub(super) use ld::*;
pub(super) use stack::*;
pub(super) use system::*;

use super::decode::{Condition, Reg8, RegPair};
use super::{Flags, Registers};
use crate::{Bus, IoPorts, Memory};

/// Whether an instruction reached memory through its operand.
///
/// Selects between an instruction's two cycle counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    RegisterOnly,
    TouchedMemory,
}

impl Access {
    #[inline]
    pub(super) fn of(reg: Reg8) -> Self {
        if reg == Reg8::M {
            Access::TouchedMemory
        } else {
            Access::RegisterOnly
        }
    }
}

/// Result of running one semantic function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Fall through to the next instruction.
    Continue(Access),
    /// PC was set by the instruction; the engine must not advance it.
    Jump,
    /// HLT: advance past the opcode and stop until an interrupt.
    Halt,
}

/// Mutable view of the machine handed to a semantic function.
///
/// `next_pc` is the address of the following instruction: the return
/// address for CALL/RST. For an injected interrupt opcode it equals the
/// current PC.
pub(crate) struct ExecContext<'a> {
    pub(crate) regs: &'a mut Registers,
    pub(crate) flags: &'a mut Flags,
    pub(crate) memory: &'a mut Memory,
    pub(crate) io: &'a mut IoPorts,
    pub(crate) bus: &'a mut Bus,
    pub(crate) next_pc: u16,
}

/// Signature shared by every entry in the instruction table.
///
/// `bytes` holds the opcode followed by exactly the instruction's operand
/// bytes.
pub(crate) type Semantic = fn(&mut ExecContext<'_>, &[u8]) -> Effect;

#[inline]
pub(super) fn imm8(bytes: &[u8]) -> u8 {
    bytes.get(1).copied().unwrap_or(0)
}

#[inline]
pub(super) fn imm16(bytes: &[u8]) -> u16 {
    let lo = bytes.get(1).copied().unwrap_or(0);
    let hi = bytes.get(2).copied().unwrap_or(0);
    u16::from_le_bytes([lo, hi])
}

impl ExecContext<'_> {
    /// Read an 8-bit register, or the byte at HL for `M`.
    #[inline]
    pub(super) fn read_reg8(&mut self, reg: Reg8) -> u8 {
        match reg {
            Reg8::B => self.regs.b,
            Reg8::C => self.regs.c,
            Reg8::D => self.regs.d,
            Reg8::E => self.regs.e,
            Reg8::H => self.regs.h,
            Reg8::L => self.regs.l,
            Reg8::M => self.memory.read8(self.regs.hl()),
            Reg8::A => self.regs.a,
        }
    }

    #[inline]
    pub(super) fn write_reg8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::B => self.regs.b = value,
            Reg8::C => self.regs.c = value,
            Reg8::D => self.regs.d = value,
            Reg8::E => self.regs.e = value,
            Reg8::H => self.regs.h = value,
            Reg8::L => self.regs.l = value,
            Reg8::M => self.memory.write8(self.regs.hl(), value),
            Reg8::A => self.regs.a = value,
        }
    }

    #[inline]
    pub(super) fn read_pair(&self, rp: RegPair) -> u16 {
        match rp {
            RegPair::BC => self.regs.bc(),
            RegPair::DE => self.regs.de(),
            RegPair::HL => self.regs.hl(),
            RegPair::SP => self.regs.sp,
        }
    }

    #[inline]
    pub(super) fn write_pair(&mut self, rp: RegPair, value: u16) {
        match rp {
            RegPair::BC => self.regs.set_bc(value),
            RegPair::DE => self.regs.set_de(value),
            RegPair::HL => self.regs.set_hl(value),
            RegPair::SP => self.regs.sp = value,
        }
    }

    /// SP -= 2, then low byte at SP and high byte at SP + 1.
    #[inline]
    pub(super) fn push_u16(&mut self, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        self.memory.write16(self.regs.sp, value);
    }

    #[inline]
    pub(super) fn pop_u16(&mut self) -> u16 {
        let value = self.memory.read16(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    #[inline]
    pub(super) fn condition(&self, cc: Condition) -> bool {
        match cc {
            Condition::NZ => !self.flags.z,
            Condition::Z => self.flags.z,
            Condition::NC => !self.flags.cy,
            Condition::C => self.flags.cy,
            Condition::PO => !self.flags.p,
            Condition::PE => self.flags.p,
            Condition::P => !self.flags.s,
            Condition::M => self.flags.s,
        }
    }
}

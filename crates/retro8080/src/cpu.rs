//! Intel 8080 execution engine.
//!
//! [`Cpu`] owns the register file, flags, memory, I/O latches and bus. It is
//! driven one instruction at a time; all mutation goes through `&mut self`,
//! so a step and an interrupt can never overlap.

mod alu;
mod decode;
mod disasm;
mod exec;
mod flags;
mod init;
mod regs;
mod step;
mod table;

#[cfg(test)]
mod tests;

pub use decode::{AluOp, Condition, Reg8, RegPair, StackPair};
pub use disasm::Disassembled;
pub use exec::{Access, Effect};
pub use flags::{parity, Flags, StatusBits};
pub use regs::Registers;
pub use table::{Instruction, InstructionTable};

use crate::{Bus, CpuConfig, IoPorts, Memory};

/// Whether the engine fetches instructions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Running,
    /// Entered by `HLT`; left by an interrupt or a reset.
    Halted,
}

/// Outcome of one [`Cpu::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Executed { opcode: u8, cycles: u8 },
    /// A request pending on the bus was delivered instead of fetching.
    Interrupt { opcode: u8, cycles: u8 },
    /// Nothing ran: the CPU is halted and no interrupt was delivered.
    Halted,
}

/// Copy of the programmer-visible state, taken between steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub regs: Registers,
    pub flags: Flags,
    pub status: u8,
    pub interrupts_enabled: bool,
    pub state: RunState,
    pub cycles: u64,
}

pub struct Cpu {
    regs: Registers,
    flags: Flags,
    memory: Memory,
    io: IoPorts,
    bus: Bus,
    state: RunState,
    config: CpuConfig,
    table: &'static InstructionTable,
    /// Running cycle total since power-on or reset.
    cycles: u64,
    /// Length of the last image given to `load_rom`.
    rom_len: usize,
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("regs", &self.regs)
            .field("flags", &self.flags)
            .field("state", &self.state)
            .field("interrupts_enabled", &self.bus.interrupts_enabled())
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

impl Cpu {
    #[inline]
    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    #[inline]
    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[inline]
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    #[inline]
    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    /// Packed status byte as pushed by `PUSH PSW`.
    pub fn status(&self) -> u8 {
        self.flags.to_byte()
    }

    pub fn set_status(&mut self, value: u8) {
        self.flags = Flags::from_byte(value);
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn io(&self) -> &IoPorts {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IoPorts {
        &mut self.io
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == RunState::Halted
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// The decode table selected by the configuration.
    pub fn instruction_table(&self) -> &'static InstructionTable {
        self.table
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            regs: self.regs,
            flags: self.flags,
            status: self.status(),
            interrupts_enabled: self.bus.interrupts_enabled(),
            state: self.state,
            cycles: self.cycles,
        }
    }
}

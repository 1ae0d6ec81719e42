//! Instruction-accurate Intel 8080 emulator core.
//!
//! The [`Cpu`] owns its registers, flags, memory, I/O latches and bus state.
//! Hosts drive it one instruction at a time with [`Cpu::step`] and inject
//! hardware interrupts between steps with [`Cpu::trigger_interrupt`].

pub mod bus;
pub mod config;
pub mod cpu;
mod error;
pub mod io;
pub mod memory;

pub use bus::{Bus, BusEvent};
pub use config::{CpuConfig, ShiftPorts};
pub use cpu::{
    Access, Cpu, CpuSnapshot, Disassembled, Effect, Flags, Instruction, InstructionTable,
    Registers, RunState, StatusBits, Step,
};
pub use error::Error;
pub use io::{IoPorts, ShiftRegister};
pub use memory::Memory;

/// Total addressable memory (64 KiB).
pub const MEMORY_SIZE: usize = 0x10000;
/// Largest ROM image accepted by default (8 KiB, the Space Invaders board).
pub const ROM_CAPACITY: usize = 0x2000;
/// Stack pointer value after power-on unless configured otherwise.
pub const DEFAULT_BOOT_STACK: u16 = 0xFFFE;

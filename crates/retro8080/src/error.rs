use std::fmt;

/// Recoverable failures reported by the engine.
///
/// None of these leave the machine in a partially updated state: the
/// operation that failed has not touched registers, flags or memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The byte at `pc` does not decode to an instruction.
    UnknownOpcode { opcode: u8, pc: u16 },
    /// A ROM image is larger than the configured ROM capacity.
    RomTooLarge { len: usize, capacity: usize },
    /// Only single-byte instructions can be injected as interrupts.
    UnsupportedInterruptOpcode { opcode: u8 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownOpcode { opcode, pc } => {
                write!(f, "unknown opcode 0x{opcode:02X} at PC=0x{pc:04X}")
            }
            Error::RomTooLarge { len, capacity } => {
                write!(f, "ROM image is {len} bytes, capacity is {capacity} bytes")
            }
            Error::UnsupportedInterruptOpcode { opcode } => {
                write!(
                    f,
                    "opcode 0x{opcode:02X} takes operands and cannot be injected as an interrupt"
                )
            }
        }
    }
}

impl std::error::Error for Error {}

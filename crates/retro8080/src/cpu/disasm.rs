use std::fmt;

use super::table::MNEMONIC_WIDTH;
use super::{Cpu, Instruction};

/// One entry of a linear disassembly.
#[derive(Clone, Debug)]
pub struct Disassembled {
    pub address: u16,
    /// `None` for a byte that does not decode; it is shown as `DB`.
    pub instruction: Option<&'static Instruction>,
    /// Opcode followed by its operand bytes.
    pub bytes: Vec<u8>,
    pub text: String,
}

impl Disassembled {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for Disassembled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
        write!(f, "{:04X}  {:<9} {}", self.address, hex.join(" "), self.text)
    }
}

impl Cpu {
    /// Linear sweep over the loaded ROM region.
    ///
    /// Walks from address 0, advancing by each instruction's length.
    /// Operand bytes that run past the end of the image are read from
    /// whatever memory follows it. Never used while stepping.
    pub fn enumerate_instructions(&self) -> Vec<Disassembled> {
        self.disassemble(0, self.rom_len)
    }

    /// Sweep `len` bytes of memory starting at `start`.
    pub fn disassemble(&self, start: u16, len: usize) -> Vec<Disassembled> {
        let table = self.table;
        let mut out = Vec::new();
        let mut offset = 0usize;

        while offset < len {
            let address = start.wrapping_add(offset as u16);
            let opcode = self.memory.read8(address);

            let entry = match table.get(opcode) {
                Some(instr) => {
                    let bytes: Vec<u8> = (0..instr.length() as u16)
                        .map(|i| self.memory.read8(address.wrapping_add(i)))
                        .collect();
                    Disassembled {
                        address,
                        instruction: Some(instr),
                        text: instr.debug_text(&bytes[1..]),
                        bytes,
                    }
                }
                None => Disassembled {
                    address,
                    instruction: None,
                    bytes: vec![opcode],
                    text: format!("{:<MNEMONIC_WIDTH$}{opcode:02X}", "DB"),
                },
            };

            offset += entry.len();
            out.push(entry);
        }

        out
    }
}

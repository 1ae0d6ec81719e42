//! Opcode decode table.
//!
//! Each of the 256 slots holds an [`Instruction`] built by [`decode`] from
//! the opcode's bit fields, or `None` when the byte is not mapped. Two
//! variants exist: the documented set and the documented set plus the
//! undocumented aliases.

use std::fmt;

use lazy_static::lazy_static;

use super::decode::{AluOp, Condition, Reg8, RegPair, StackPair};
use super::exec::{self, Access, Effect, Semantic};

/// Width the mnemonic name is padded to in rendered text.
pub(super) const MNEMONIC_WIDTH: usize = 6;

/// Immutable descriptor for one opcode.
#[derive(Clone)]
pub struct Instruction {
    opcode: u8,
    mnemonic: String,
    length: u8,
    cycles: u8,
    cycles_low: u8,
    undocumented: bool,
    pub(crate) exec: Semantic,
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("opcode", &format_args!("{:#04x}", self.opcode))
            .field("mnemonic", &self.mnemonic)
            .field("length", &self.length)
            .field("cycles", &(self.cycles, self.cycles_low))
            .field("undocumented", &self.undocumented)
            .finish()
    }
}

impl Instruction {
    fn new(
        opcode: u8,
        mnemonic: impl Into<String>,
        length: u8,
        cycles: u8,
        exec: Semantic,
    ) -> Self {
        Self {
            opcode,
            mnemonic: mnemonic.into(),
            length,
            cycles,
            cycles_low: cycles,
            undocumented: false,
            exec,
        }
    }

    /// Second cycle count, used when memory was not touched or a
    /// conditional transfer was not taken.
    fn or_fewer(mut self, cycles_low: u8) -> Self {
        self.cycles_low = cycles_low;
        self
    }

    fn alias(mut self) -> Self {
        self.undocumented = true;
        self.mnemonic.insert(0, '*');
        self
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Mnemonic template; operands appear as `d8`, `d16` or `a16`.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Total byte length including the opcode (1–3).
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Cycles when memory was touched or control was transferred.
    pub fn cycles(&self) -> u8 {
        self.cycles
    }

    pub fn cycles_low(&self) -> u8 {
        self.cycles_low
    }

    pub fn is_undocumented(&self) -> bool {
        self.undocumented
    }

    /// Cycle count selected by the outcome of one execution.
    pub fn cycles_for(&self, effect: Effect) -> u8 {
        match effect {
            Effect::Continue(Access::TouchedMemory) | Effect::Jump => self.cycles,
            Effect::Continue(Access::RegisterOnly) | Effect::Halt => self.cycles_low,
        }
    }

    /// Render the mnemonic with its operand bytes, e.g. `MVI   B,3E` or
    /// `JMP   18D4`. The name is always padded to `MNEMONIC_WIDTH`, so bare
    /// mnemonics like `NOP` carry trailing spaces. Missing operand bytes
    /// leave the placeholder in place.
    pub fn debug_text(&self, operands: &[u8]) -> String {
        let (name, args) = match self.mnemonic.split_once(' ') {
            Some((name, args)) => (name, args),
            None => return format!("{:<MNEMONIC_WIDTH$}", self.mnemonic),
        };

        let args = match operands {
            [lo, hi, ..] if args.contains("16") => args
                .replace("d16", &format!("{:04X}", u16::from_le_bytes([*lo, *hi])))
                .replace("a16", &format!("{:04X}", u16::from_le_bytes([*lo, *hi]))),
            [value, ..] if args.contains("d8") => args.replace("d8", &format!("{value:02X}")),
            _ => args.to_string(),
        };

        format!("{name:<MNEMONIC_WIDTH$}{args}")
    }
}

/// 256-entry opcode table.
pub struct InstructionTable {
    entries: Vec<Option<Instruction>>,
}

lazy_static! {
    static ref DOCUMENTED: InstructionTable = InstructionTable::build(false);
    static ref WITH_UNDOCUMENTED: InstructionTable = InstructionTable::build(true);
}

impl InstructionTable {
    fn build(undocumented: bool) -> Self {
        let entries = (0..=u8::MAX)
            .map(|opcode| {
                decode(opcode).or_else(|| {
                    if undocumented {
                        decode_undocumented(opcode)
                    } else {
                        None
                    }
                })
            })
            .collect();
        Self { entries }
    }

    /// The documented 8080 instruction set.
    pub fn documented() -> &'static InstructionTable {
        &DOCUMENTED
    }

    /// Documented set plus the twelve undocumented aliases.
    pub fn with_undocumented() -> &'static InstructionTable {
        &WITH_UNDOCUMENTED
    }

    pub fn select(undocumented: bool) -> &'static InstructionTable {
        if undocumented {
            Self::with_undocumented()
        } else {
            Self::documented()
        }
    }

    #[inline]
    pub fn get(&self, opcode: u8) -> Option<&Instruction> {
        self.entries[opcode as usize].as_ref()
    }

    /// Mapped entries in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.entries.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for InstructionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionTable")
            .field("mapped", &self.len())
            .finish()
    }
}

/// Build the descriptor for a documented opcode.
fn decode(opcode: u8) -> Option<Instruction> {
    use Instruction as I;

    let instr = match opcode {
        0x00 => I::new(opcode, "NOP", 1, 4, exec::exec_nop),
        0x76 => I::new(opcode, "HLT", 1, 7, exec::exec_hlt),

        // 16-bit loads and pointer arithmetic.
        op if op & 0xCF == 0x01 => {
            let rp = RegPair::from_opcode(op);
            I::new(op, format!("LXI {},d16", rp.name()), 3, 10, exec::exec_lxi)
        }
        op if op & 0xCF == 0x03 => {
            let rp = RegPair::from_opcode(op);
            I::new(op, format!("INX {}", rp.name()), 1, 5, exec::exec_inx)
        }
        op if op & 0xCF == 0x0B => {
            let rp = RegPair::from_opcode(op);
            I::new(op, format!("DCX {}", rp.name()), 1, 5, exec::exec_dcx)
        }
        op if op & 0xCF == 0x09 => {
            let rp = RegPair::from_opcode(op);
            I::new(op, format!("DAD {}", rp.name()), 1, 10, exec::exec_dad)
        }

        0x02 => I::new(opcode, "STAX B", 1, 7, exec::exec_stax),
        0x12 => I::new(opcode, "STAX D", 1, 7, exec::exec_stax),
        0x0A => I::new(opcode, "LDAX B", 1, 7, exec::exec_ldax),
        0x1A => I::new(opcode, "LDAX D", 1, 7, exec::exec_ldax),
        0x22 => I::new(opcode, "SHLD a16", 3, 16, exec::exec_shld),
        0x2A => I::new(opcode, "LHLD a16", 3, 16, exec::exec_lhld),
        0x32 => I::new(opcode, "STA a16", 3, 13, exec::exec_sta),
        0x3A => I::new(opcode, "LDA a16", 3, 13, exec::exec_lda),

        // 8-bit increment/decrement and immediate loads.
        op if op & 0xC7 == 0x04 => {
            let r = Reg8::dst(op);
            I::new(op, format!("INR {}", r.name()), 1, 10, exec::exec_inr).or_fewer(5)
        }
        op if op & 0xC7 == 0x05 => {
            let r = Reg8::dst(op);
            I::new(op, format!("DCR {}", r.name()), 1, 10, exec::exec_dcr).or_fewer(5)
        }
        op if op & 0xC7 == 0x06 => {
            let r = Reg8::dst(op);
            I::new(op, format!("MVI {},d8", r.name()), 2, 10, exec::exec_mvi).or_fewer(7)
        }

        0x07 => I::new(opcode, "RLC", 1, 4, exec::exec_rotate),
        0x0F => I::new(opcode, "RRC", 1, 4, exec::exec_rotate),
        0x17 => I::new(opcode, "RAL", 1, 4, exec::exec_rotate),
        0x1F => I::new(opcode, "RAR", 1, 4, exec::exec_rotate),
        0x27 => I::new(opcode, "DAA", 1, 4, exec::exec_daa),
        0x2F => I::new(opcode, "CMA", 1, 4, exec::exec_cma),
        0x37 => I::new(opcode, "STC", 1, 4, exec::exec_stc),
        0x3F => I::new(opcode, "CMC", 1, 4, exec::exec_cmc),

        // MOV dst,src (0x76 handled above).
        op @ 0x40..=0x7F => {
            let (dst, src) = (Reg8::dst(op), Reg8::src(op));
            let name = format!("MOV {},{}", dst.name(), src.name());
            I::new(op, name, 1, 7, exec::exec_mov).or_fewer(5)
        }

        // ALU on register or M.
        op @ 0x80..=0xBF => {
            let (alu, src) = (AluOp::from_opcode(op), Reg8::src(op));
            let name = format!("{} {}", alu.name(), src.name());
            I::new(op, name, 1, 7, exec::exec_alu_reg).or_fewer(4)
        }

        // Conditional returns, jumps and calls.
        op if op & 0xC7 == 0xC0 => {
            let cc = Condition::from_opcode(op);
            I::new(op, format!("R{}", cc.name()), 1, 11, exec::exec_rcc).or_fewer(5)
        }
        op if op & 0xC7 == 0xC2 => {
            let cc = Condition::from_opcode(op);
            I::new(op, format!("J{} a16", cc.name()), 3, 10, exec::exec_jcc)
        }
        op if op & 0xC7 == 0xC4 => {
            let cc = Condition::from_opcode(op);
            I::new(op, format!("C{} a16", cc.name()), 3, 17, exec::exec_ccc).or_fewer(11)
        }

        op if op & 0xCF == 0xC1 => {
            let pair = StackPair::from_opcode(op);
            I::new(op, format!("POP {}", pair.name()), 1, 10, exec::exec_pop)
        }
        op if op & 0xCF == 0xC5 => {
            let pair = StackPair::from_opcode(op);
            I::new(op, format!("PUSH {}", pair.name()), 1, 11, exec::exec_push)
        }

        op if op & 0xC7 == 0xC6 => {
            let alu = AluOp::from_opcode(op);
            let name = format!("{} d8", alu.immediate_name());
            I::new(op, name, 2, 7, exec::exec_alu_imm)
        }

        op if op & 0xC7 == 0xC7 => {
            let n = (op >> 3) & 0x07;
            I::new(op, format!("RST {n}"), 1, 11, exec::exec_rst)
        }

        0xC3 => I::new(opcode, "JMP a16", 3, 10, exec::exec_jmp),
        0xC9 => I::new(opcode, "RET", 1, 10, exec::exec_ret),
        0xCD => I::new(opcode, "CALL a16", 3, 17, exec::exec_call),
        0xD3 => I::new(opcode, "OUT d8", 2, 10, exec::exec_out),
        0xDB => I::new(opcode, "IN d8", 2, 10, exec::exec_in),
        0xE3 => I::new(opcode, "XTHL", 1, 18, exec::exec_xthl),
        0xE9 => I::new(opcode, "PCHL", 1, 5, exec::exec_pchl),
        0xEB => I::new(opcode, "XCHG", 1, 5, exec::exec_xchg),
        0xF3 => I::new(opcode, "DI", 1, 4, exec::exec_di),
        0xF9 => I::new(opcode, "SPHL", 1, 5, exec::exec_sphl),
        0xFB => I::new(opcode, "EI", 1, 4, exec::exec_ei),

        _ => return None,
    };

    Some(instr)
}

/// Aliases the 8080 silicon executes for the unassigned bytes.
fn decode_undocumented(opcode: u8) -> Option<Instruction> {
    use Instruction as I;

    let instr = match opcode {
        0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => {
            I::new(opcode, "NOP", 1, 4, exec::exec_nop)
        }
        0xCB => I::new(opcode, "JMP a16", 3, 10, exec::exec_jmp),
        0xD9 => I::new(opcode, "RET", 1, 10, exec::exec_ret),
        0xDD | 0xED | 0xFD => I::new(opcode, "CALL a16", 3, 17, exec::exec_call),
        _ => return None,
    };

    Some(instr.alias())
}

//! Bit-field selectors shared by the opcode table and the semantic
//! functions.
//!
//! Most 8080 opcodes are regular: a register in bits 3–5 or 0–2, a pair in
//! bits 4–5, a condition or ALU operation in bits 3–5. Each field decodes to
//! one of the enums below.

/// 8-bit operand selector. `M` is the memory cell addressed by HL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    M,
    A,
}

impl Reg8 {
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Reg8::B,
            1 => Reg8::C,
            2 => Reg8::D,
            3 => Reg8::E,
            4 => Reg8::H,
            5 => Reg8::L,
            6 => Reg8::M,
            _ => Reg8::A,
        }
    }

    /// Destination field (bits 3–5).
    #[inline]
    pub fn dst(opcode: u8) -> Self {
        Self::from_bits(opcode >> 3)
    }

    /// Source field (bits 0–2).
    #[inline]
    pub fn src(opcode: u8) -> Self {
        Self::from_bits(opcode)
    }

    pub fn name(self) -> &'static str {
        match self {
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
            Reg8::M => "M",
            Reg8::A => "A",
        }
    }
}

/// Pair selector for pointer-sized operations (LXI, INX, DCX, DAD).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegPair {
    BC,
    DE,
    HL,
    SP,
}

impl RegPair {
    #[inline]
    pub fn from_opcode(opcode: u8) -> Self {
        match (opcode >> 4) & 0x03 {
            0 => RegPair::BC,
            1 => RegPair::DE,
            2 => RegPair::HL,
            _ => RegPair::SP,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RegPair::BC => "B",
            RegPair::DE => "D",
            RegPair::HL => "H",
            RegPair::SP => "SP",
        }
    }
}

/// Pair selector for PUSH/POP. Same bit position as [`RegPair`], but the
/// fourth encoding is the accumulator plus status byte instead of SP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackPair {
    BC,
    DE,
    HL,
    PSW,
}

impl StackPair {
    #[inline]
    pub fn from_opcode(opcode: u8) -> Self {
        match (opcode >> 4) & 0x03 {
            0 => StackPair::BC,
            1 => StackPair::DE,
            2 => StackPair::HL,
            _ => StackPair::PSW,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StackPair::BC => "B",
            StackPair::DE => "D",
            StackPair::HL => "H",
            StackPair::PSW => "PSW",
        }
    }
}

/// Branch condition in bits 3–5 of Jcc/Ccc/Rcc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    NZ,
    Z,
    NC,
    C,
    PO,
    PE,
    P,
    M,
}

impl Condition {
    #[inline]
    pub fn from_opcode(opcode: u8) -> Self {
        match (opcode >> 3) & 0x07 {
            0 => Condition::NZ,
            1 => Condition::Z,
            2 => Condition::NC,
            3 => Condition::C,
            4 => Condition::PO,
            5 => Condition::PE,
            6 => Condition::P,
            _ => Condition::M,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Condition::NZ => "NZ",
            Condition::Z => "Z",
            Condition::NC => "NC",
            Condition::C => "C",
            Condition::PO => "PO",
            Condition::PE => "PE",
            Condition::P => "P",
            Condition::M => "M",
        }
    }
}

/// Accumulator operation in bits 3–5 of the 0x80–0xBF block and of the
/// immediate forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    #[inline]
    pub fn from_opcode(opcode: u8) -> Self {
        match (opcode >> 3) & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbb,
            4 => AluOp::Ana,
            5 => AluOp::Xra,
            6 => AluOp::Ora,
            _ => AluOp::Cmp,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Adc => "ADC",
            AluOp::Sub => "SUB",
            AluOp::Sbb => "SBB",
            AluOp::Ana => "ANA",
            AluOp::Xra => "XRA",
            AluOp::Ora => "ORA",
            AluOp::Cmp => "CMP",
        }
    }

    pub fn immediate_name(self) -> &'static str {
        match self {
            AluOp::Add => "ADI",
            AluOp::Adc => "ACI",
            AluOp::Sub => "SUI",
            AluOp::Sbb => "SBI",
            AluOp::Ana => "ANI",
            AluOp::Xra => "XRI",
            AluOp::Ora => "ORI",
            AluOp::Cmp => "CPI",
        }
    }
}

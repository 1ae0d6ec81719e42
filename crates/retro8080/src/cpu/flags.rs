use bitflags::bitflags;

bitflags! {
    /// Bit layout of the packed status byte pushed by `PUSH PSW`.
    ///
    /// Bits 3 and 5 always read as 0 and bit 1 always reads as 1.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StatusBits: u8 {
        const SIGN = 0b1000_0000;
        const ZERO = 0b0100_0000;
        const AUX_CARRY = 0b0001_0000;
        const PARITY = 0b0000_0100;
        const ALWAYS_ONE = 0b0000_0010;
        const CARRY = 0b0000_0001;
    }
}

/// Condition flags of the Intel 8080.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Result was zero.
    pub z: bool,
    /// Bit 7 of the result.
    pub s: bool,
    /// Even number of set bits in the result.
    pub p: bool,
    pub cy: bool,
    /// Carry out of bit 3, consumed by `DAA`.
    pub ac: bool,
}

impl Flags {
    pub fn to_byte(self) -> u8 {
        let mut bits = StatusBits::ALWAYS_ONE;
        bits.set(StatusBits::SIGN, self.s);
        bits.set(StatusBits::ZERO, self.z);
        bits.set(StatusBits::AUX_CARRY, self.ac);
        bits.set(StatusBits::PARITY, self.p);
        bits.set(StatusBits::CARRY, self.cy);
        bits.bits()
    }

    pub fn from_byte(value: u8) -> Self {
        let bits = StatusBits::from_bits_truncate(value);
        Self {
            s: bits.contains(StatusBits::SIGN),
            z: bits.contains(StatusBits::ZERO),
            ac: bits.contains(StatusBits::AUX_CARRY),
            p: bits.contains(StatusBits::PARITY),
            cy: bits.contains(StatusBits::CARRY),
        }
    }

    /// Set Z, S and P from an 8-bit result.
    #[inline]
    pub fn set_szp(&mut self, value: u8) {
        self.z = value == 0;
        self.s = (value & 0x80) != 0;
        self.p = parity(value);
    }
}

/// True when `value` has an even number of set bits.
#[inline]
pub const fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

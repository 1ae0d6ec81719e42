use crate::{Error, MEMORY_SIZE};

/// Flat 64 KiB address space.
///
/// Every address is a `u16`, so accesses can never fall outside the store.
/// Word helpers are little-endian and wrap from 0xFFFF to 0x0000.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn read8(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    #[inline]
    pub fn write8(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    #[inline]
    pub fn read16(&self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    #[inline]
    pub fn write16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo);
        self.write8(addr.wrapping_add(1), hi);
    }

    /// Zero the whole address space.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Copy `rom` to address 0.
    ///
    /// Images larger than `capacity` are rejected before anything is written.
    /// A capacity beyond the address space is clamped to it.
    pub fn load_rom(&mut self, rom: &[u8], capacity: usize) -> Result<(), Error> {
        let capacity = capacity.min(MEMORY_SIZE);
        if rom.len() > capacity {
            return Err(Error::RomTooLarge {
                len: rom.len(),
                capacity,
            });
        }
        self.bytes[..rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Copy `data` starting at `start`, wrapping past the top of memory.
    ///
    /// Used by harnesses that place programs outside the ROM window (e.g.
    /// CP/M `.COM` images at 0x0100).
    pub fn load_at(&mut self, start: u16, data: &[u8]) {
        let mut addr = start;
        for &byte in data {
            self.write8(addr, byte);
            addr = addr.wrapping_add(1);
        }
    }

    /// Borrow `len` bytes starting at `start`, e.g. a video RAM window.
    ///
    /// The window is clamped at the top of memory.
    pub fn window(&self, start: u16, len: usize) -> &[u8] {
        let start = start as usize;
        let end = start.saturating_add(len).min(MEMORY_SIZE);
        &self.bytes[start..end]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

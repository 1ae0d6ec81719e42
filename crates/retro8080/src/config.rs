use typed_builder::TypedBuilder;

use crate::{DEFAULT_BOOT_STACK, ROM_CAPACITY};

/// Port numbers that drive the external shift register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShiftPorts {
    /// `OUT` port that sets the 3-bit shift amount.
    pub offset: u8,
    /// `OUT` port that shifts a new byte in.
    pub data: u8,
    /// `IN` port that reads the shifted result.
    pub result: u8,
}

impl Default for ShiftPorts {
    /// Space Invaders wiring: OUT 2 offset, OUT 4 data, IN 3 result.
    fn default() -> Self {
        Self {
            offset: 2,
            data: 4,
            result: 3,
        }
    }
}

/// Construction-time settings for a [`Cpu`](crate::Cpu).
///
/// ```
/// use retro8080::{Cpu, CpuConfig};
///
/// let config = CpuConfig::builder()
///     .boot_stack(0x2400)
///     .undocumented_opcodes(true)
///     .build();
/// let cpu = Cpu::new(config);
/// assert_eq!(cpu.regs().sp, 0x2400);
/// ```
#[derive(Clone, Debug, TypedBuilder)]
pub struct CpuConfig {
    /// SP after power-on and reset.
    #[builder(default = DEFAULT_BOOT_STACK)]
    pub boot_stack: u16,
    /// Largest image `load_rom` accepts.
    #[builder(default = ROM_CAPACITY)]
    pub rom_capacity: usize,
    /// Decode the twelve undocumented aliases (`*NOP`, `*JMP`, `*RET`,
    /// `*CALL`) instead of reporting them as unknown opcodes.
    #[builder(default = false)]
    pub undocumented_opcodes: bool,
    #[builder(default = Some(ShiftPorts::default()))]
    pub shift_ports: Option<ShiftPorts>,
    /// Capacity of the outbound bus event queue.
    #[builder(default = 64)]
    pub event_capacity: usize,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

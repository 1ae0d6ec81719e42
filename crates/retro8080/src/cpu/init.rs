use super::{Cpu, Flags, InstructionTable, Registers, RunState};
use crate::{Bus, CpuConfig, Error, IoPorts, Memory};

impl Default for Cpu {
    fn default() -> Self {
        Self::new(CpuConfig::default())
    }
}

impl Cpu {
    pub fn new(config: CpuConfig) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            flags: Flags::default(),
            memory: Memory::new(),
            io: IoPorts::new(config.shift_ports),
            bus: Bus::new(config.event_capacity),
            state: RunState::Running,
            table: InstructionTable::select(config.undocumented_opcodes),
            config,
            cycles: 0,
            rom_len: 0,
        };
        cpu.apply_power_on_state();
        cpu
    }

    /// Return to the power-on state. Memory is cleared as well, so a ROM
    /// has to be loaded again.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.io.reset();
        self.bus.reset();
        self.state = RunState::Running;
        self.cycles = 0;
        self.rom_len = 0;
        self.apply_power_on_state();
    }

    fn apply_power_on_state(&mut self) {
        self.regs = Registers {
            sp: self.config.boot_stack,
            ..Registers::default()
        };
        self.flags = Flags::default();
    }

    /// Copy a raw ROM image to address 0.
    ///
    /// Images larger than the configured capacity are rejected and memory is
    /// left untouched. Bytes above the image keep their contents.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Error> {
        self.memory.load_rom(rom, self.config.rom_capacity)?;
        self.rom_len = rom.len();
        log::debug!(
            "loaded {} byte ROM (capacity {})",
            rom.len(),
            self.config.rom_capacity
        );
        Ok(())
    }

    /// Length of the loaded ROM image, the region swept by
    /// [`Cpu::enumerate_instructions`].
    pub fn rom_len(&self) -> usize {
        self.rom_len
    }
}

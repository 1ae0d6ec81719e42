use super::exec::{Effect, ExecContext};
use super::{Cpu, Instruction, RunState, Step};
use crate::Error;

impl Cpu {
    /// Execute one instruction.
    ///
    /// A request left on the bus with [`Bus::request_interrupt`] is handled
    /// first: if interrupts are enabled it is delivered and the step ends
    /// there. Otherwise it is discarded once the step's opcode has decoded.
    /// A halted CPU returns [`Step::Halted`] without fetching.
    ///
    /// An unmapped opcode is reported as [`Error::UnknownOpcode`] and leaves
    /// every register, flag and memory byte as it was, along with the bus.
    ///
    /// [`Bus::request_interrupt`]: crate::Bus::request_interrupt
    pub fn step(&mut self) -> Result<Step, Error> {
        if self.bus.interrupts_enabled() {
            if let Some(opcode) = self.bus.take_pending() {
                let cycles_before = self.cycles;
                self.trigger_interrupt(opcode)?;
                let cycles = (self.cycles - cycles_before) as u8;
                return Ok(Step::Interrupt { opcode, cycles });
            }
        }

        if self.state == RunState::Halted {
            self.drop_stale_request();
            return Ok(Step::Halted);
        }

        let table = self.table;
        let pc = self.regs.pc;
        let opcode = self.memory.read8(pc);
        let instr = match table.get(opcode) {
            Some(instr) => instr,
            None => {
                log::error!(
                    "unknown opcode {opcode:#04x} at PC={pc:#06x} SP={:#06x} \
                     BC={:#06x} DE={:#06x} HL={:#06x}",
                    self.regs.sp,
                    self.regs.bc(),
                    self.regs.de(),
                    self.regs.hl()
                );
                return Err(Error::UnknownOpcode { opcode, pc });
            }
        };
        self.drop_stale_request();

        // Opcode plus exactly `length - 1` operand bytes.
        let len = instr.length() as usize;
        let mut bytes = [0u8; 3];
        for (offset, byte) in bytes.iter_mut().take(len).enumerate() {
            *byte = self.memory.read8(pc.wrapping_add(offset as u16));
        }
        let bytes = &bytes[..len];

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("{pc:04X}  {}", instr.debug_text(&bytes[1..]));
        }

        let next_pc = pc.wrapping_add(len as u16);
        let effect = self.execute(instr, bytes, next_pc);
        match effect {
            Effect::Continue(_) => self.regs.pc = next_pc,
            Effect::Halt => {
                self.regs.pc = next_pc;
                self.state = RunState::Halted;
            }
            Effect::Jump => {}
        }

        let cycles = instr.cycles_for(effect);
        self.cycles += cycles as u64;
        Ok(Step::Executed { opcode, cycles })
    }

    /// Inject `opcode` as a hardware interrupt, normally an `RST n`.
    ///
    /// Returns `Ok(false)` without touching anything when interrupts are
    /// disabled. Otherwise the opcode runs with the current PC as its
    /// return address, interrupts are disabled and a halted CPU resumes.
    pub fn trigger_interrupt(&mut self, opcode: u8) -> Result<bool, Error> {
        if !self.bus.interrupts_enabled() {
            log::trace!("interrupt {opcode:#04x} ignored, interrupts disabled");
            return Ok(false);
        }

        let table = self.table;
        let pc = self.regs.pc;
        let instr = table
            .get(opcode)
            .ok_or(Error::UnknownOpcode { opcode, pc })?;
        if instr.length() != 1 {
            return Err(Error::UnsupportedInterruptOpcode { opcode });
        }

        log::debug!(
            "interrupt {} at PC={pc:#06x}{}",
            instr.mnemonic(),
            if self.is_halted() { " (wake from HLT)" } else { "" }
        );

        self.bus.set_interrupts_enabled(false);
        self.state = RunState::Running;

        let effect = self.execute(instr, &[opcode], pc);
        if effect == Effect::Halt {
            self.state = RunState::Halted;
        }
        self.cycles += instr.cycles_for(effect) as u64;
        Ok(true)
    }

    fn drop_stale_request(&mut self) {
        if let Some(opcode) = self.bus.take_pending() {
            log::trace!("interrupt {opcode:#04x} dropped, interrupts disabled");
        }
    }

    fn execute(&mut self, instr: &Instruction, bytes: &[u8], next_pc: u16) -> Effect {
        let mut ctx = ExecContext {
            regs: &mut self.regs,
            flags: &mut self.flags,
            memory: &mut self.memory,
            io: &mut self.io,
            bus: &mut self.bus,
            next_pc,
        };
        (instr.exec)(&mut ctx, bytes)
    }
}

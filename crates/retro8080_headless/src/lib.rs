//! Frame-paced driver for the retro8080 core without any frontend.
//!
//! Follows the Space Invaders board timing: a 2 MHz CPU, 60 frames per
//! second, and two interrupts per frame (`RST 1` at mid-frame and `RST 2` at
//! the end of the frame).

use std::fmt;

use anyhow::{Context, Result};
use retro8080::{BusEvent, Cpu, CpuConfig, CpuSnapshot, Step};
use typed_builder::TypedBuilder;

pub const CPU_CLOCK_HZ: u32 = 2_000_000;
pub const FRAME_RATE_HZ: u32 = 60;
pub const CYCLES_PER_FRAME: u32 = CPU_CLOCK_HZ / FRAME_RATE_HZ;

/// Cycles a halted CPU is charged per step while it waits for an interrupt.
pub const HALT_IDLE_CYCLES: u32 = 4;

/// `RST 1`
pub const MID_FRAME_INTERRUPT: u8 = 0xCF;
/// `RST 2`
pub const END_FRAME_INTERRUPT: u8 = 0xD7;

#[derive(Clone, Debug, TypedBuilder)]
pub struct RunnerConfig {
    #[builder(default = 60)]
    pub frames: u32,
    #[builder(default = CYCLES_PER_FRAME)]
    pub cycles_per_frame: u32,
    #[builder(default = MID_FRAME_INTERRUPT)]
    pub mid_frame_interrupt: u8,
    #[builder(default = END_FRAME_INTERRUPT)]
    pub end_frame_interrupt: u8,
    /// Input latches preset before the first frame, as `(port, value)`.
    #[builder(default)]
    pub inputs: Vec<(u8, u8)>,
    #[builder(default)]
    pub cpu: CpuConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Why [`HeadlessRunner::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Every requested frame ran.
    Completed,
    /// The CPU executed `HLT` with interrupts disabled and can never resume.
    HaltedWithInterruptsDisabled,
}

/// Bus events observed while running, by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub interrupt_pending: u64,
    pub interrupts_enabled: u64,
    pub inputs: u64,
    pub outputs: u64,
}

impl EventCounts {
    fn record(&mut self, event: BusEvent) {
        match event {
            BusEvent::InterruptPending(_) => self.interrupt_pending += 1,
            BusEvent::InterruptsEnabled(_) => self.interrupts_enabled += 1,
            BusEvent::InputRequested { .. } => self.inputs += 1,
            BusEvent::OutputDelivered { .. } => self.outputs += 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub stop: StopReason,
    pub frames: u32,
    pub instructions: u64,
    pub interrupts: u64,
    pub snapshot: CpuSnapshot,
    /// Output latches holding a non-zero value, as `(port, value)`.
    pub outputs: Vec<(u8, u8)>,
    pub events: EventCounts,
    pub dropped_events: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.snapshot;
        let r = &s.regs;
        writeln!(f, "stop:         {:?}", self.stop)?;
        writeln!(f, "frames:       {}", self.frames)?;
        writeln!(f, "cycles:       {}", s.cycles)?;
        writeln!(f, "instructions: {}", self.instructions)?;
        writeln!(f, "interrupts:   {}", self.interrupts)?;
        writeln!(
            f,
            "PC={:04X} SP={:04X} A={:02X} BC={:04X} DE={:04X} HL={:04X} F={:02X} IE={} {:?}",
            r.pc,
            r.sp,
            r.a,
            r.bc(),
            r.de(),
            r.hl(),
            s.status,
            s.interrupts_enabled as u8,
            s.state
        )?;
        if !self.outputs.is_empty() {
            let outs: Vec<String> = self
                .outputs
                .iter()
                .map(|(port, value)| format!("{port}={value:02X}"))
                .collect();
            writeln!(f, "outputs:      {}", outs.join(" "))?;
        }
        write!(
            f,
            "events:       {} out, {} in, {} enable, {} pending, {} dropped",
            self.events.outputs,
            self.events.inputs,
            self.events.interrupts_enabled,
            self.events.interrupt_pending,
            self.dropped_events
        )
    }
}

pub struct HeadlessRunner {
    cpu: Cpu,
    config: RunnerConfig,
    frames: u32,
    instructions: u64,
    interrupts: u64,
    events: EventCounts,
}

impl HeadlessRunner {
    /// Build a CPU from `config.cpu`, load `rom` and preset the inputs.
    pub fn new(config: RunnerConfig, rom: &[u8]) -> Result<Self> {
        let mut cpu = Cpu::new(config.cpu.clone());
        cpu.load_rom(rom).context("failed to load ROM")?;
        for &(port, value) in &config.inputs {
            cpu.io_mut().set_input(port, value);
        }

        Ok(Self {
            cpu,
            config,
            frames: 0,
            instructions: 0,
            interrupts: 0,
            events: EventCounts::default(),
        })
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Run one frame: first half, mid-frame interrupt, second half,
    /// end-of-frame interrupt.
    ///
    /// Returns `Ok(false)` if the CPU stopped for good before the frame
    /// ended.
    pub fn run_frame(&mut self) -> Result<bool> {
        let total = self.config.cycles_per_frame;
        let mut cycles = 0u32;

        if !self.run_until(&mut cycles, total / 2)? {
            return Ok(false);
        }
        self.interrupt(self.config.mid_frame_interrupt)?;

        if !self.run_until(&mut cycles, total)? {
            return Ok(false);
        }
        self.interrupt(self.config.end_frame_interrupt)?;

        self.frames += 1;
        Ok(true)
    }

    /// Run the configured number of frames and summarize the result.
    pub fn run(&mut self) -> Result<RunSummary> {
        log::info!(
            "running {} frames at {} cycles per frame",
            self.config.frames,
            self.config.cycles_per_frame
        );

        let mut stop = StopReason::Completed;
        for _ in 0..self.config.frames {
            if !self.run_frame()? {
                log::info!(
                    "CPU halted with interrupts disabled at PC={:#06x} after {} frames",
                    self.cpu.regs().pc,
                    self.frames
                );
                stop = StopReason::HaltedWithInterruptsDisabled;
                break;
            }
        }

        let summary = self.summary(stop);
        log::info!(
            "finished: {} frames, {} cycles, {} instructions",
            summary.frames,
            summary.snapshot.cycles,
            summary.instructions
        );
        Ok(summary)
    }

    pub fn summary(&self, stop: StopReason) -> RunSummary {
        let io = self.cpu.io();
        let outputs = (0..=u8::MAX)
            .map(|port| (port, io.output(port)))
            .filter(|&(_, value)| value != 0)
            .collect();

        RunSummary {
            stop,
            frames: self.frames,
            instructions: self.instructions,
            interrupts: self.interrupts,
            snapshot: self.cpu.snapshot(),
            outputs,
            events: self.events,
            dropped_events: self.cpu.bus().dropped_events(),
        }
    }

    fn run_until(&mut self, frame_cycles: &mut u32, target: u32) -> Result<bool> {
        while *frame_cycles < target {
            if self.cpu.is_halted() && !self.cpu.bus().interrupts_enabled() {
                return Ok(false);
            }

            let pc = self.cpu.regs().pc;
            let step = self
                .cpu
                .step()
                .with_context(|| format!("frame {}: step at PC={pc:#06x} failed", self.frames))?;

            let spent = match step {
                Step::Executed { cycles, .. } => {
                    self.instructions += 1;
                    cycles as u32
                }
                Step::Interrupt { cycles, .. } => {
                    self.interrupts += 1;
                    cycles as u32
                }
                Step::Halted => HALT_IDLE_CYCLES,
            };
            *frame_cycles = frame_cycles.saturating_add(spent);
            self.drain_events();
        }
        Ok(true)
    }

    fn interrupt(&mut self, opcode: u8) -> Result<()> {
        let delivered = self
            .cpu
            .trigger_interrupt(opcode)
            .with_context(|| format!("frame {}: interrupt {opcode:#04x} failed", self.frames))?;
        if delivered {
            self.interrupts += 1;
        }
        self.drain_events();
        Ok(())
    }

    fn drain_events(&mut self) {
        for event in self.cpu.bus_mut().drain_events() {
            self.events.record(event);
        }
    }
}

use crate::config::ShiftPorts;

/// Number of addressable I/O devices (one byte of port number).
pub const PORT_COUNT: usize = 256;

/// External 16-bit shift register found on the Space Invaders board.
///
/// Writes to the data port shift a new byte into the high half; reads from
/// the result port return the 8 bits that start `offset` bits below the top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShiftRegister {
    pub value: u16,
    pub offset: u8,
}

impl ShiftRegister {
    pub fn set_offset(&mut self, value: u8) {
        self.offset = value & 0x07;
    }

    pub fn push(&mut self, value: u8) {
        self.value = ((value as u16) << 8) | (self.value >> 8);
    }

    pub fn result(&self) -> u8 {
        let shift = 8 - (self.offset & 0x07);
        (self.value >> shift) as u8
    }
}

/// Raw input/output latches indexed by device number.
///
/// The host writes input latches before a step; `IN` reads them. `OUT`
/// writes output latches which the host observes after the step. When a
/// shift-register wiring is configured, its ports are routed through
/// [`ShiftRegister`] instead of the plain latches.
#[derive(Clone, Debug)]
pub struct IoPorts {
    inputs: [u8; PORT_COUNT],
    outputs: [u8; PORT_COUNT],
    shift: ShiftRegister,
    shift_ports: Option<ShiftPorts>,
}

impl Default for IoPorts {
    fn default() -> Self {
        Self::new(Some(ShiftPorts::default()))
    }
}

impl IoPorts {
    pub fn new(shift_ports: Option<ShiftPorts>) -> Self {
        Self {
            inputs: [0; PORT_COUNT],
            outputs: [0; PORT_COUNT],
            shift: ShiftRegister::default(),
            shift_ports,
        }
    }

    /// Clear every latch and the shift register, keeping the wiring.
    pub fn reset(&mut self) {
        *self = Self::new(self.shift_ports);
    }

    /// Host side: set the value the next `IN port` will observe.
    pub fn set_input(&mut self, port: u8, value: u8) {
        self.inputs[port as usize] = value;
    }

    /// Host side: set or clear one bit of an input latch.
    pub fn set_input_bit(&mut self, port: u8, bit: u8, pressed: bool) {
        let mask = 1 << (bit & 0x07);
        let latch = &mut self.inputs[port as usize];
        if pressed {
            *latch |= mask;
        } else {
            *latch &= !mask;
        }
    }

    pub fn input(&self, port: u8) -> u8 {
        self.inputs[port as usize]
    }

    /// Host side: the last value written by `OUT port`.
    pub fn output(&self, port: u8) -> u8 {
        self.outputs[port as usize]
    }

    pub fn shift_register(&self) -> ShiftRegister {
        self.shift
    }

    pub fn shift_ports(&self) -> Option<ShiftPorts> {
        self.shift_ports
    }

    /// Engine side: value produced by `IN port`.
    pub fn read(&self, port: u8) -> u8 {
        match self.shift_ports {
            Some(wiring) if port == wiring.result => self.shift.result(),
            _ => self.inputs[port as usize],
        }
    }

    /// Engine side: effect of `OUT port`.
    pub fn write(&mut self, port: u8, value: u8) {
        self.outputs[port as usize] = value;
        if let Some(wiring) = self.shift_ports {
            if port == wiring.offset {
                self.shift.set_offset(value);
            } else if port == wiring.data {
                self.shift.push(value);
            }
        }
    }
}

use super::exec::ExecContext;

impl ExecContext<'_> {
    /// Core 8-bit ADD/ADC operation on A.
    ///
    /// `carry_in` is the incoming carry for ADC and false for ADD.
    pub(super) fn alu_add(&mut self, value: u8, carry_in: bool) {
        let a = self.regs.a;
        let carry = carry_in as u8;

        let half = (a & 0x0F) + (value & 0x0F) + carry;
        let full = (a as u16) + (value as u16) + (carry as u16);
        let result = full as u8;

        self.flags.cy = full > 0xFF;
        self.flags.ac = half > 0x0F;
        self.flags.set_szp(result);
        self.regs.a = result;
    }

    /// Flags and result of `A - value - borrow_in`, without storing A.
    ///
    /// The 8080 subtracts by adding the one's complement of the operand with
    /// an inverted carry in. CY ends up as the inverse of that addition's
    /// carry (set on borrow) while AC keeps the raw carry out of bit 3.
    pub(super) fn alu_sub_flags(&mut self, value: u8, borrow_in: bool) -> u8 {
        let a = self.regs.a;
        let operand = !value;
        let carry = (!borrow_in) as u8;

        let half = (a & 0x0F) + (operand & 0x0F) + carry;
        let full = (a as u16) + (operand as u16) + (carry as u16);
        let result = full as u8;

        self.flags.cy = full <= 0xFF;
        self.flags.ac = half > 0x0F;
        self.flags.set_szp(result);
        result
    }

    /// Core 8-bit SUB/SBB operation on A.
    pub(super) fn alu_sub(&mut self, value: u8, borrow_in: bool) {
        self.regs.a = self.alu_sub_flags(value, borrow_in);
    }

    /// Compare A with `value`; A itself is not modified.
    #[inline]
    pub(super) fn alu_cmp(&mut self, value: u8) {
        self.alu_sub_flags(value, false);
    }

    // The logical group always clears CY and AC.

    #[inline]
    pub(super) fn alu_ana(&mut self, value: u8) {
        self.set_logic_result(self.regs.a & value);
    }

    #[inline]
    pub(super) fn alu_xra(&mut self, value: u8) {
        self.set_logic_result(self.regs.a ^ value);
    }

    #[inline]
    pub(super) fn alu_ora(&mut self, value: u8) {
        self.set_logic_result(self.regs.a | value);
    }

    #[inline]
    fn set_logic_result(&mut self, result: u8) {
        self.flags.cy = false;
        self.flags.ac = false;
        self.flags.set_szp(result);
        self.regs.a = result;
    }

    /// 8-bit increment used by INR r and INR M. CY is left unchanged.
    #[inline]
    pub(super) fn alu_inr(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.flags.ac = (value & 0x0F) == 0x0F;
        self.flags.set_szp(result);
        result
    }

    /// 8-bit decrement used by DCR r and DCR M. CY is left unchanged.
    ///
    /// The hardware adds 0xFF, so AC is the carry out of bit 3 of that
    /// addition: set unless the low nibble was zero.
    #[inline]
    pub(super) fn alu_dcr(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.flags.ac = (value & 0x0F) != 0;
        self.flags.set_szp(result);
        result
    }

    /// `DAD rp`: HL += value, only CY is affected.
    #[inline]
    pub(super) fn alu_dad(&mut self, value: u16) {
        let hl = self.regs.hl() as u32;
        let result = hl + value as u32;
        self.flags.cy = result > 0xFFFF;
        self.regs.set_hl(result as u16);
    }

    /// Decimal adjust accumulator.
    ///
    /// - Low nibble > 9 or AC: add 0x06. AC becomes the carry out of bit 3.
    /// - Then high nibble of the running value > 9 or CY: add 0x60, set CY.
    ///
    /// The running value is kept in 16 bits so that a carry produced by the
    /// low correction is seen by the high check.
    pub(super) fn alu_daa(&mut self) {
        let a = self.regs.a;
        let mut value = a as u16;
        let mut ac = false;
        let mut cy = self.flags.cy;

        if (a & 0x0F) > 0x09 || self.flags.ac {
            ac = (a & 0x0F) + 0x06 > 0x0F;
            value += 0x06;
        }
        if (value >> 4) > 0x09 || cy {
            value += 0x60;
            cy = true;
        }

        let result = value as u8;
        self.flags.ac = ac;
        self.flags.cy = cy;
        self.flags.set_szp(result);
        self.regs.a = result;
    }
}

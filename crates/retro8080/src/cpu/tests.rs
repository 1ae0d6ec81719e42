use super::*;
use crate::{BusEvent, Error, ROM_CAPACITY};
use once_cell::sync::OnceCell;

fn cpu_with(program: &[u8]) -> Cpu {
    let mut cpu = Cpu::default();
    cpu.load_rom(program).unwrap();
    cpu
}

fn run(cpu: &mut Cpu, steps: usize) {
    for _ in 0..steps {
        cpu.step().unwrap();
    }
}

fn step_cycles(cpu: &mut Cpu) -> u8 {
    match cpu.step().unwrap() {
        Step::Executed { cycles, .. } | Step::Interrupt { cycles, .. } => cycles,
        Step::Halted => panic!("unexpected halted step"),
    }
}

#[test]
fn power_on_state() {
    let cpu = Cpu::default();
    let regs = cpu.regs();
    assert_eq!(regs.pc, 0x0000);
    assert_eq!(regs.sp, crate::DEFAULT_BOOT_STACK);
    assert_eq!((regs.a, regs.bc(), regs.de(), regs.hl()), (0, 0, 0, 0));
    assert_eq!(*cpu.flags(), Flags::default());
    assert_eq!(cpu.status(), 0x02);
    assert!(!cpu.bus().interrupts_enabled());
    assert_eq!(cpu.state(), RunState::Running);
    assert_eq!(cpu.cycles(), 0);
}

#[test]
fn inr_dcr_wrap_and_keep_carry() {
    // STC; MVI B,FF; INR B; DCR B
    let mut cpu = cpu_with(&[0x37, 0x06, 0xFF, 0x04, 0x05]);
    run(&mut cpu, 3);

    assert_eq!(cpu.regs().b, 0x00);
    let f = *cpu.flags();
    assert!(f.z && f.p && f.ac && f.cy);
    assert!(!f.s);

    cpu.step().unwrap();
    assert_eq!(cpu.regs().b, 0xFF);
    let f = *cpu.flags();
    assert!(f.s && f.p && f.cy);
    assert!(!f.z);
    // Low nibble was zero, so no carry out of bit 3 in the +0xFF form.
    assert!(!f.ac);
}

#[test]
fn inr_dcr_round_trip_every_value() {
    // INR B; DCR B; DCR B; INR B
    let program = [0x04, 0x05, 0x05, 0x04];
    for carry in [false, true] {
        for v in 0..=255u8 {
            let mut cpu = cpu_with(&program);
            cpu.regs_mut().b = v;
            cpu.flags_mut().cy = carry;

            let expected = [v.wrapping_add(1), v, v.wrapping_sub(1), v];
            for result in expected {
                cpu.step().unwrap();
                assert_eq!(cpu.regs().b, result, "v={v:#04x} cy={carry}");
                assert_eq!(cpu.flags().p, parity(result), "v={v:#04x} cy={carry}");
                assert_eq!(cpu.flags().z, result == 0);
                assert_eq!(cpu.flags().s, result & 0x80 != 0);
                assert_eq!(cpu.flags().cy, carry, "v={v:#04x} cy={carry}");
            }
        }
    }
}

#[test]
fn add_sets_aux_carry_sign_and_parity() {
    // MVI A,6C; MVI B,2E; ADD B
    let mut cpu = cpu_with(&[0x3E, 0x6C, 0x06, 0x2E, 0x80]);
    run(&mut cpu, 2);
    assert_eq!(step_cycles(&mut cpu), 4);

    assert_eq!(cpu.regs().a, 0x9A);
    let f = *cpu.flags();
    assert!(!f.cy);
    assert!(f.ac);
    assert!(f.s);
    assert!(!f.z);
    assert!(f.p);
}

#[test]
fn adc_uses_incoming_carry() {
    // STC; MVI A,FF; ACI 00
    let mut cpu = cpu_with(&[0x37, 0x3E, 0xFF, 0xCE, 0x00]);
    run(&mut cpu, 3);
    assert_eq!(cpu.regs().a, 0x00);
    let f = *cpu.flags();
    assert!(f.cy && f.z && f.ac);
}

#[test]
fn sub_and_compare_report_borrow() {
    // MVI A,3E; SUI 3E
    let mut cpu = cpu_with(&[0x3E, 0x3E, 0xD6, 0x3E]);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x00);
    let f = *cpu.flags();
    assert!(f.z && !f.cy && f.ac);

    // MVI A,05; CPI 06
    let mut cpu = cpu_with(&[0x3E, 0x05, 0xFE, 0x06]);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x05);
    let f = *cpu.flags();
    assert!(f.cy && f.s && !f.z);

    // STC; MVI A,10; SBI 0F
    let mut cpu = cpu_with(&[0x37, 0x3E, 0x10, 0xDE, 0x0F]);
    run(&mut cpu, 3);
    assert_eq!(cpu.regs().a, 0x00);
    let f = *cpu.flags();
    assert!(f.z && !f.cy);
}

#[test]
fn logical_ops_clear_carry_and_aux_carry() {
    // STC; MVI A,F0; ANI 0F
    let mut cpu = cpu_with(&[0x37, 0x3E, 0xF0, 0xE6, 0x0F]);
    cpu.flags_mut().ac = true;
    run(&mut cpu, 3);
    assert_eq!(cpu.regs().a, 0x00);
    let f = *cpu.flags();
    assert!(f.z && f.p);
    assert!(!f.cy && !f.ac);

    // STC; MVI A,0F; MVI C,F0; ORA C; XRA A
    let mut cpu = cpu_with(&[0x37, 0x3E, 0x0F, 0x0E, 0xF0, 0xB1, 0xAF]);
    run(&mut cpu, 4);
    assert_eq!(cpu.regs().a, 0xFF);
    assert!(cpu.flags().s && !cpu.flags().cy);
    cpu.step().unwrap();
    assert_eq!(cpu.regs().a, 0x00);
    assert!(cpu.flags().z);
}

#[test]
fn daa_corrects_both_nibbles() {
    // MVI A,9B; DAA
    let mut cpu = cpu_with(&[0x3E, 0x9B, 0x27]);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x01);
    let f = *cpu.flags();
    assert!(f.cy);
    assert!(f.ac);
}

#[test]
fn daa_after_bcd_addition() {
    // MVI A,38; ADI 45; DAA -> 83
    let mut cpu = cpu_with(&[0x3E, 0x38, 0xC6, 0x45, 0x27]);
    run(&mut cpu, 3);
    assert_eq!(cpu.regs().a, 0x83);
    assert!(!cpu.flags().cy);
}

#[test]
fn rotates_only_touch_carry() {
    // MVI A,81; RLC; RRC
    let mut cpu = cpu_with(&[0x3E, 0x81, 0x07, 0x0F]);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x03);
    assert!(cpu.flags().cy);
    cpu.step().unwrap();
    assert_eq!(cpu.regs().a, 0x81);
    assert!(cpu.flags().cy);
    assert!(!cpu.flags().z);

    // MVI A,80; RAL; RAR
    let mut cpu = cpu_with(&[0x3E, 0x80, 0x17, 0x1F]);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x00);
    assert!(cpu.flags().cy);
    // RAL leaves Z alone even though A became zero.
    assert!(!cpu.flags().z);
    cpu.step().unwrap();
    assert_eq!(cpu.regs().a, 0x80);
    assert!(!cpu.flags().cy);
}

#[test]
fn cma_stc_cmc() {
    // MVI A,55; CMA; STC; CMC
    let mut cpu = cpu_with(&[0x3E, 0x55, 0x2F, 0x37, 0x3F]);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0xAA);
    assert_eq!(*cpu.flags(), Flags::default());
    cpu.step().unwrap();
    assert!(cpu.flags().cy);
    cpu.step().unwrap();
    assert!(!cpu.flags().cy);
}

#[test]
fn dad_sets_only_carry() {
    // LXI H,FFFF; LXI B,0001; DAD B
    let mut cpu = cpu_with(&[0x21, 0xFF, 0xFF, 0x01, 0x01, 0x00, 0x09]);
    run(&mut cpu, 2);
    assert_eq!(step_cycles(&mut cpu), 10);
    assert_eq!(cpu.regs().hl(), 0x0000);
    let f = *cpu.flags();
    assert!(f.cy);
    assert!(!f.z);
}

#[test]
fn inx_dcx_wrap_without_flags() {
    // LXI D,FFFF; INX D; DCX D; INX SP
    let mut cpu = cpu_with(&[0x11, 0xFF, 0xFF, 0x13, 0x1B, 0x33]);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().de(), 0x0000);
    assert_eq!(*cpu.flags(), Flags::default());
    cpu.step().unwrap();
    assert_eq!(cpu.regs().de(), 0xFFFF);
    cpu.step().unwrap();
    assert_eq!(cpu.regs().sp, crate::DEFAULT_BOOT_STACK.wrapping_add(1));
}

#[test]
fn memory_operand_selects_high_cycle_count() {
    // LXI H,2000; MVI M,11; INR M; MOV A,M; MOV B,A
    let mut cpu = cpu_with(&[0x21, 0x00, 0x20, 0x36, 0x11, 0x34, 0x7E, 0x47]);
    assert_eq!(step_cycles(&mut cpu), 10);
    assert_eq!(step_cycles(&mut cpu), 10);
    assert_eq!(step_cycles(&mut cpu), 10);
    assert_eq!(step_cycles(&mut cpu), 7);
    assert_eq!(step_cycles(&mut cpu), 5);

    assert_eq!(cpu.memory().read8(0x2000), 0x12);
    assert_eq!(cpu.regs().a, 0x12);
    assert_eq!(cpu.regs().b, 0x12);
    assert_eq!(cpu.cycles(), 42);
}

#[test]
fn direct_and_indirect_loads() {
    let program = [
        0x3E, 0x5A, // MVI A,5A
        0x32, 0x00, 0x30, // STA 3000
        0x01, 0x01, 0x30, // LXI B,3001
        0x02, // STAX B
        0x3E, 0x00, // MVI A,00
        0x3A, 0x00, 0x30, // LDA 3000
        0x21, 0x34, 0x12, // LXI H,1234
        0x22, 0x10, 0x30, // SHLD 3010
        0x2A, 0x00, 0x30, // LHLD 3000
        0x11, 0x10, 0x30, // LXI D,3010
        0x1A, // LDAX D
    ];
    let mut cpu = cpu_with(&program);

    run(&mut cpu, 4);
    assert_eq!(cpu.memory().read8(0x3000), 0x5A);
    assert_eq!(cpu.memory().read8(0x3001), 0x5A);

    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x5A);

    run(&mut cpu, 2);
    assert_eq!(cpu.memory().read8(0x3010), 0x34);
    assert_eq!(cpu.memory().read8(0x3011), 0x12);

    cpu.step().unwrap();
    assert_eq!(cpu.regs().hl(), 0x5A5A);

    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x34);
    assert_eq!(cpu.regs().pc, program.len() as u16);
}

#[test]
fn push_pop_psw_round_trip() {
    // LXI SP,2400; MVI A,42; STC; PUSH PSW; MVI A,00; CMC; POP PSW
    let mut cpu = cpu_with(&[0x31, 0x00, 0x24, 0x3E, 0x42, 0x37, 0xF5, 0x3E, 0x00, 0x3F, 0xF1]);
    run(&mut cpu, 4);
    assert_eq!(cpu.regs().sp, 0x23FE);
    assert_eq!(cpu.memory().read8(0x23FF), 0x42);
    assert_eq!(cpu.memory().read8(0x23FE), 0x03);

    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x00);
    assert!(!cpu.flags().cy);

    cpu.step().unwrap();
    assert_eq!(cpu.regs().a, 0x42);
    assert!(cpu.flags().cy);
    assert_eq!(cpu.regs().sp, 0x2400);
}

#[test]
fn pop_psw_normalizes_status_byte() {
    // LXI SP,2000; POP PSW
    let mut cpu = cpu_with(&[0x31, 0x00, 0x20, 0xF1]);
    cpu.memory_mut().write16(0x2000, 0x12FF);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().a, 0x12);
    assert_eq!(cpu.status(), 0xD7);
}

#[test]
fn push_pop_register_pairs() {
    // LXI SP,2400; LXI B,BEEF; PUSH B; POP D; PUSH H; POP H
    let mut cpu = cpu_with(&[
        0x31, 0x00, 0x24, 0x01, 0xEF, 0xBE, 0xC5, 0xD1, 0xE5, 0xE1,
    ]);
    run(&mut cpu, 2);
    assert_eq!(step_cycles(&mut cpu), 11);
    assert_eq!(cpu.memory().read8(0x23FE), 0xEF);
    assert_eq!(cpu.memory().read8(0x23FF), 0xBE);
    assert_eq!(step_cycles(&mut cpu), 10);
    assert_eq!(cpu.regs().de(), 0xBEEF);
    run(&mut cpu, 2);
    assert_eq!(cpu.regs().hl(), 0x0000);
    assert_eq!(cpu.regs().sp, 0x2400);
}

#[test]
fn call_and_ret() {
    // LXI SP,7F00; CALL 1234 ... 1234: RET
    let mut cpu = cpu_with(&[0x31, 0x00, 0x7F, 0xCD, 0x34, 0x12]);
    cpu.memory_mut().write8(0x1234, 0xC9);

    cpu.step().unwrap();
    assert_eq!(cpu.regs().pc, 0x0003);

    assert_eq!(step_cycles(&mut cpu), 17);
    assert_eq!(cpu.regs().pc, 0x1234);
    assert_eq!(cpu.regs().sp, 0x7EFE);
    assert_eq!(cpu.memory().read8(0x7EFE), 0x06);
    assert_eq!(cpu.memory().read8(0x7EFF), 0x00);

    assert_eq!(step_cycles(&mut cpu), 10);
    assert_eq!(cpu.regs().pc, 0x0006);
    assert_eq!(cpu.regs().sp, 0x7F00);
}

#[test]
fn rst_pushes_next_address() {
    // NOP; RST 5
    let mut cpu = cpu_with(&[0x00, 0xEF]);
    cpu.regs_mut().sp = 0x2400;
    run(&mut cpu, 1);
    assert_eq!(step_cycles(&mut cpu), 11);
    assert_eq!(cpu.regs().pc, 0x0028);
    assert_eq!(cpu.memory().read16(0x23FE), 0x0002);
}

#[test]
fn xchg_swaps_hl_and_de() {
    // LXI H,1234; LXI D,ABCD; XCHG
    let mut cpu = cpu_with(&[0x21, 0x34, 0x12, 0x11, 0xCD, 0xAB, 0xEB]);
    run(&mut cpu, 2);
    {
        let regs = cpu.regs_mut();
        regs.a = 0x5A;
        regs.b = 0x01;
        regs.c = 0x02;
        regs.sp = 0x2300;
    }
    cpu.set_status(0xD7);
    cpu.bus_mut().set_interrupts_enabled(true);
    cpu.bus_mut().drain_events().for_each(drop);

    let before = cpu.snapshot();
    cpu.step().unwrap();

    let mut expected = before;
    expected.regs.set_hl(0xABCD);
    expected.regs.set_de(0x1234);
    expected.regs.pc = 0x0007;
    expected.cycles += 5;
    assert_eq!(cpu.snapshot(), expected);
    assert_eq!(cpu.bus().pending_events(), 0);
}

#[test]
fn xthl_sphl_pchl() {
    // LXI SP,2400; LXI H,1122; XTHL; SPHL; LXI H,0040; PCHL
    let mut cpu = cpu_with(&[
        0x31, 0x00, 0x24, 0x21, 0x22, 0x11, 0xE3, 0xF9, 0x21, 0x40, 0x00, 0xE9,
    ]);
    cpu.memory_mut().write16(0x2400, 0x3344);
    run(&mut cpu, 2);

    assert_eq!(step_cycles(&mut cpu), 18);
    assert_eq!(cpu.regs().hl(), 0x3344);
    assert_eq!(cpu.memory().read16(0x2400), 0x1122);
    assert_eq!(cpu.regs().sp, 0x2400);

    cpu.step().unwrap();
    assert_eq!(cpu.regs().sp, 0x3344);

    cpu.step().unwrap();
    assert_eq!(step_cycles(&mut cpu), 5);
    assert_eq!(cpu.regs().pc, 0x0040);
}

type FlagField = fn(&mut Flags) -> &mut bool;

fn zero(f: &mut Flags) -> &mut bool {
    &mut f.z
}
fn carry(f: &mut Flags) -> &mut bool {
    &mut f.cy
}
fn parity_flag(f: &mut Flags) -> &mut bool {
    &mut f.p
}
fn sign(f: &mut Flags) -> &mut bool {
    &mut f.s
}

/// Condition index (bits 3–5), flag it tests, and whether it is taken
/// when that flag is set.
const CONDITIONS: [(u8, FlagField, bool); 8] = [
    (0, zero, false),
    (1, zero, true),
    (2, carry, false),
    (3, carry, true),
    (4, parity_flag, false),
    (5, parity_flag, true),
    (6, sign, false),
    (7, sign, true),
];

#[test]
fn conditional_jumps_follow_flags() {
    for (cc, field, taken_when_set) in CONDITIONS {
        for set in [false, true] {
            let opcode = 0xC2 | (cc << 3);
            let mut cpu = cpu_with(&[opcode, 0x00, 0x01]);
            *field(cpu.flags_mut()) = set;

            let cycles = step_cycles(&mut cpu);
            let taken = set == taken_when_set;
            let expected_pc = if taken { 0x0100 } else { 0x0003 };
            assert_eq!(cpu.regs().pc, expected_pc, "opcode {opcode:#04x} set={set}");
            assert_eq!(cycles, 10);
        }
    }
}

#[test]
fn conditional_calls_follow_flags() {
    for (cc, field, taken_when_set) in CONDITIONS {
        for set in [false, true] {
            let opcode = 0xC4 | (cc << 3);
            let mut cpu = cpu_with(&[opcode, 0x00, 0x01]);
            cpu.regs_mut().sp = 0x2400;
            *field(cpu.flags_mut()) = set;

            let cycles = step_cycles(&mut cpu);
            if set == taken_when_set {
                assert_eq!(cpu.regs().pc, 0x0100, "opcode {opcode:#04x} set={set}");
                assert_eq!(cpu.regs().sp, 0x23FE);
                assert_eq!(cpu.memory().read16(0x23FE), 0x0003);
                assert_eq!(cycles, 17);
            } else {
                assert_eq!(cpu.regs().pc, 0x0003, "opcode {opcode:#04x} set={set}");
                assert_eq!(cpu.regs().sp, 0x2400);
                assert_eq!(cycles, 11);
            }
        }
    }
}

#[test]
fn conditional_returns_follow_flags() {
    for (cc, field, taken_when_set) in CONDITIONS {
        for set in [false, true] {
            let opcode = 0xC0 | (cc << 3);
            let mut cpu = cpu_with(&[opcode]);
            cpu.regs_mut().sp = 0x23FE;
            cpu.memory_mut().write16(0x23FE, 0x0200);
            *field(cpu.flags_mut()) = set;

            let cycles = step_cycles(&mut cpu);
            if set == taken_when_set {
                assert_eq!(cpu.regs().pc, 0x0200, "opcode {opcode:#04x} set={set}");
                assert_eq!(cpu.regs().sp, 0x2400);
                assert_eq!(cycles, 11);
            } else {
                assert_eq!(cpu.regs().pc, 0x0001, "opcode {opcode:#04x} set={set}");
                assert_eq!(cpu.regs().sp, 0x23FE);
                assert_eq!(cycles, 5);
            }
        }
    }
}

#[test]
fn unknown_opcode_leaves_state_untouched() {
    // MVI A,77; then an unassigned byte.
    let mut cpu = cpu_with(&[0x3E, 0x77, 0x08]);
    cpu.step().unwrap();

    let before = cpu.snapshot();
    let memory_before = cpu.memory().as_slice().to_vec();

    let err = cpu.step().unwrap_err();
    assert_eq!(
        err,
        Error::UnknownOpcode {
            opcode: 0x08,
            pc: 0x0002
        }
    );
    assert_eq!(cpu.snapshot(), before);
    assert_eq!(cpu.memory().as_slice(), &memory_before[..]);

    // Still stuck on the same byte.
    assert!(cpu.step().is_err());
    assert_eq!(cpu.regs().pc, 0x0002);
}

#[test]
fn oversized_rom_is_rejected_without_writing() {
    let mut cpu = cpu_with(&[0x11, 0x22, 0x33]);
    let rom = vec![0xAA; ROM_CAPACITY + 1];

    let err = cpu.load_rom(&rom).unwrap_err();
    assert_eq!(
        err,
        Error::RomTooLarge {
            len: ROM_CAPACITY + 1,
            capacity: ROM_CAPACITY
        }
    );
    assert_eq!(cpu.memory().window(0, 4), &[0x11, 0x22, 0x33, 0x00]);
    assert!(cpu.memory().as_slice()[3..].iter().all(|&b| b == 0));
    assert_eq!(cpu.rom_len(), 3);
}

#[test]
fn rom_capacity_is_configurable() {
    let config = CpuConfig::builder().rom_capacity(0x100).build();
    let mut cpu = Cpu::new(config);
    assert!(cpu.load_rom(&[0; 0x100]).is_ok());
    assert!(cpu.load_rom(&[0; 0x101]).is_err());
}

#[test]
fn rom_capacity_is_clamped_to_address_space() {
    let config = CpuConfig::builder().rom_capacity(0x20000).build();
    let mut cpu = Cpu::new(config);

    let err = cpu.load_rom(&vec![0xAA; crate::MEMORY_SIZE + 1]).unwrap_err();
    assert_eq!(
        err,
        Error::RomTooLarge {
            len: crate::MEMORY_SIZE + 1,
            capacity: crate::MEMORY_SIZE
        }
    );
    assert!(cpu.memory().as_slice().iter().all(|&b| b == 0));

    assert!(cpu.load_rom(&vec![0x00; crate::MEMORY_SIZE]).is_ok());
}

#[test]
fn hlt_waits_for_interrupt() {
    // EI; HLT
    let mut cpu = cpu_with(&[0xFB, 0x76]);
    cpu.regs_mut().sp = 0x2400;
    cpu.step().unwrap();
    assert!(cpu.bus().interrupts_enabled());

    assert_eq!(step_cycles(&mut cpu), 7);
    assert!(cpu.is_halted());
    assert_eq!(cpu.regs().pc, 0x0002);
    assert_eq!(cpu.step().unwrap(), Step::Halted);
    assert_eq!(cpu.regs().pc, 0x0002);

    // RST 1
    assert_eq!(cpu.trigger_interrupt(0xCF), Ok(true));
    assert!(!cpu.is_halted());
    assert_eq!(cpu.regs().pc, 0x0008);
    assert_eq!(cpu.regs().sp, 0x23FE);
    assert_eq!(cpu.memory().read16(0x23FE), 0x0002);
    assert!(!cpu.bus().interrupts_enabled());

    // Acknowledge disabled further interrupts.
    assert_eq!(cpu.trigger_interrupt(0xD7), Ok(false));
    assert_eq!(cpu.regs().pc, 0x0008);
}

#[test]
fn interrupts_ignored_while_disabled() {
    let mut cpu = cpu_with(&[0x00]);
    let before = cpu.snapshot();
    assert_eq!(cpu.trigger_interrupt(0xCF), Ok(false));
    assert_eq!(cpu.snapshot(), before);
}

#[test]
fn interrupt_opcode_must_be_single_byte() {
    // EI
    let mut cpu = cpu_with(&[0xFB]);
    cpu.step().unwrap();

    assert_eq!(
        cpu.trigger_interrupt(0xC3),
        Err(Error::UnsupportedInterruptOpcode { opcode: 0xC3 })
    );
    assert_eq!(
        cpu.trigger_interrupt(0x08),
        Err(Error::UnknownOpcode {
            opcode: 0x08,
            pc: 0x0001
        })
    );
    assert!(cpu.bus().interrupts_enabled());
    assert_eq!(cpu.regs().pc, 0x0001);
}

#[test]
fn bus_request_is_serviced_on_next_step() {
    // EI; NOP; NOP
    let mut cpu = cpu_with(&[0xFB, 0x00, 0x00]);
    cpu.regs_mut().sp = 0x2400;
    cpu.step().unwrap();

    cpu.bus_mut().request_interrupt(0xD7);
    assert_eq!(
        cpu.step().unwrap(),
        Step::Interrupt {
            opcode: 0xD7,
            cycles: 11
        }
    );
    assert_eq!(cpu.regs().pc, 0x0010);
    assert_eq!(cpu.memory().read16(0x23FE), 0x0001);
    assert_eq!(cpu.bus().interrupt_pending(), None);

    // Memory at 0x10 is zero: NOP.
    assert_eq!(
        cpu.step().unwrap(),
        Step::Executed {
            opcode: 0x00,
            cycles: 4
        }
    );
    assert_eq!(cpu.regs().pc, 0x0011);
}

#[test]
fn bus_request_dropped_while_disabled() {
    let mut cpu = cpu_with(&[0x00, 0x00]);
    cpu.bus_mut().request_interrupt(0xCF);
    assert_eq!(
        cpu.step().unwrap(),
        Step::Executed {
            opcode: 0x00,
            cycles: 4
        }
    );
    assert_eq!(cpu.regs().pc, 0x0001);
    assert_eq!(cpu.bus().interrupt_pending(), None);
}

#[test]
fn failed_step_keeps_dropped_request_pending() {
    let mut cpu = cpu_with(&[0x08]);
    cpu.bus_mut().request_interrupt(0xCF);
    cpu.bus_mut().drain_events().for_each(drop);

    assert!(cpu.step().is_err());
    assert_eq!(cpu.bus().interrupt_pending(), Some(0xCF));
    assert_eq!(cpu.bus().pending_events(), 0);
}

#[test]
fn in_out_update_latches_and_queue_events() {
    // MVI A,5A; OUT 06; IN 01; DI; EI
    let mut cpu = cpu_with(&[0x3E, 0x5A, 0xD3, 0x06, 0xDB, 0x01, 0xF3, 0xFB]);
    cpu.io_mut().set_input(0x01, 0x81);
    run(&mut cpu, 5);

    assert_eq!(cpu.io().output(0x06), 0x5A);
    assert_eq!(cpu.regs().a, 0x81);

    let events: Vec<_> = cpu.bus_mut().drain_events().collect();
    assert_eq!(
        events,
        vec![
            BusEvent::OutputDelivered {
                port: 0x06,
                value: 0x5A
            },
            BusEvent::InputRequested { port: 0x01 },
            BusEvent::InterruptsEnabled(true),
        ]
    );
}

#[test]
fn shift_register_through_ports() {
    let program = [
        0x3E, 0xAB, 0xD3, 0x04, // MVI A,AB; OUT 4
        0x3E, 0xCD, 0xD3, 0x04, // MVI A,CD; OUT 4
        0x3E, 0x03, 0xD3, 0x02, // MVI A,03; OUT 2
        0xDB, 0x03, // IN 3
    ];
    let mut cpu = cpu_with(&program);
    run(&mut cpu, 7);
    assert_eq!(cpu.io().shift_register().value, 0xCDAB);
    assert_eq!(cpu.regs().a, 0x6D);
}

#[test]
fn shift_register_can_be_unwired() {
    let config = CpuConfig::builder().shift_ports(None).build();
    let mut cpu = Cpu::new(config);
    // MVI A,AB; OUT 4; IN 3
    cpu.load_rom(&[0x3E, 0xAB, 0xD3, 0x04, 0xDB, 0x03]).unwrap();
    cpu.io_mut().set_input(0x03, 0x42);
    run(&mut cpu, 3);
    assert_eq!(cpu.regs().a, 0x42);
    assert_eq!(cpu.io().shift_register().value, 0);
}

#[test]
fn undocumented_aliases_are_opt_in() {
    let program = [0x08, 0xCB, 0x00, 0x10];

    let mut cpu = cpu_with(&program);
    assert!(matches!(
        cpu.step(),
        Err(Error::UnknownOpcode { opcode: 0x08, .. })
    ));

    let config = CpuConfig::builder().undocumented_opcodes(true).build();
    let mut cpu = Cpu::new(config);
    cpu.load_rom(&program).unwrap();
    assert_eq!(step_cycles(&mut cpu), 4);
    assert_eq!(step_cycles(&mut cpu), 10);
    assert_eq!(cpu.regs().pc, 0x1000);
}

#[test]
fn status_byte_accessors() {
    let mut cpu = Cpu::default();
    cpu.set_status(0xFF);
    assert_eq!(cpu.status(), 0xD7);
    let f = *cpu.flags();
    assert!(f.s && f.z && f.ac && f.p && f.cy);
    cpu.set_status(0x00);
    assert_eq!(cpu.status(), 0x02);
}

#[test]
fn reset_restores_power_on_state() {
    // LXI SP,2400; MVI A,01; EI; HLT
    let mut cpu = cpu_with(&[0x31, 0x00, 0x24, 0x3E, 0x01, 0xFB, 0x76]);
    run(&mut cpu, 4);
    assert!(cpu.is_halted());

    cpu.reset();
    assert_eq!(cpu.snapshot(), Cpu::default().snapshot());
    assert!(cpu.memory().as_slice().iter().all(|&b| b == 0));
    assert_eq!(cpu.bus().pending_events(), 0);
    assert_eq!(cpu.rom_len(), 0);
}

#[test]
fn snapshot_reflects_state() {
    // MVI A,80; ORA A; EI
    let mut cpu = cpu_with(&[0x3E, 0x80, 0xB7, 0xFB]);
    run(&mut cpu, 3);
    let snap = cpu.snapshot();
    assert_eq!(snap.regs.a, 0x80);
    assert_eq!(snap.regs.pc, 0x0004);
    assert!(snap.flags.s);
    assert_eq!(snap.status, 0x82);
    assert!(snap.interrupts_enabled);
    assert_eq!(snap.state, RunState::Running);
    assert_eq!(snap.cycles, 7 + 4 + 4);
}

#[test]
fn enumerate_instructions_sweeps_rom() {
    // LXI SP,2400; <unassigned>; JMP (operands past the image)
    let mut cpu = cpu_with(&[0x31, 0x00, 0x24, 0x08, 0xC3, 0x00]);
    let listing = cpu.enumerate_instructions();

    let summary: Vec<_> = listing
        .iter()
        .map(|d| (d.address, d.text.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0x0000, "LXI   SP,2400"),
            (0x0003, "DB    08"),
            (0x0004, "JMP   0000"),
        ]
    );
    assert!(listing[1].instruction.is_none());
    assert_eq!(listing[2].bytes, vec![0xC3, 0x00, 0x00]);
    assert_eq!(listing[0].to_string(), "0000  31 00 24  LXI   SP,2400");

    // Disassembly never executes anything.
    assert_eq!(cpu.regs().pc, 0x0000);
    cpu.step().unwrap();
    assert_eq!(cpu.regs().sp, 0x2400);
}

static TST8080_COM: OnceCell<Vec<u8>> = OnceCell::new();
static PRE8080_COM: OnceCell<Vec<u8>> = OnceCell::new();

fn load_cpm_program(cell: &'static OnceCell<Vec<u8>>, name: &str) -> &'static [u8] {
    cell.get_or_init(|| {
        use std::path::PathBuf;

        let candidates = [
            PathBuf::from("assets/roms/8080_tests").join(name),
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../../assets/roms/8080_tests")
                .join(name),
        ];

        for path in &candidates {
            if let Ok(data) = std::fs::read(path) {
                return data;
            }
        }

        panic!("{name} not found. Tried: {:?}", candidates)
    })
}

/// Run a CP/M `.COM` diagnostic and return its console output.
///
/// The program is placed at 0x0100. `OUT 0` at 0x0000 marks the end (the
/// program exits with `JMP 0`), and a BDOS stub at 0x0005 reports console
/// calls through `OUT 1` before returning.
fn run_cpm_program(program: &[u8]) -> String {
    let mut cpu = Cpu::default();
    {
        let mem = cpu.memory_mut();
        mem.load_at(0x0100, program);
        mem.load_at(0x0000, &[0xD3, 0x00]);
        mem.load_at(0x0005, &[0xD3, 0x01, 0xC9]);
    }
    cpu.regs_mut().pc = 0x0100;

    let mut output = String::new();
    loop {
        if let Err(err) = cpu.step() {
            panic!("{err}\nconsole so far:\n{output}");
        }

        while let Some(event) = cpu.bus_mut().pop_event() {
            match event {
                BusEvent::OutputDelivered { port: 0, .. } => return output,
                BusEvent::OutputDelivered { port: 1, .. } => {
                    let regs = *cpu.regs();
                    match regs.c {
                        2 => output.push(regs.e as char),
                        9 => {
                            let mut addr = regs.de();
                            loop {
                                let ch = cpu.memory().read8(addr);
                                if ch == b'$' {
                                    break;
                                }
                                output.push(ch as char);
                                addr = addr.wrapping_add(1);
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }
}

// These need the CP/M diagnostics under assets/roms/8080_tests. Run them
// explicitly, e.g. `cargo test -p retro8080 -- --ignored tst8080`.

#[test]
#[ignore]
fn tst8080_reports_operational() {
    let output = run_cpm_program(load_cpm_program(&TST8080_COM, "TST8080.COM"));
    assert!(output.contains("CPU IS OPERATIONAL"), "{output}");
}

#[test]
#[ignore]
fn pre8080_completes() {
    let output = run_cpm_program(load_cpm_program(&PRE8080_COM, "8080PRE.COM"));
    assert!(!output.contains("ERROR"), "{output}");
    assert!(output.contains("complete"), "{output}");
}

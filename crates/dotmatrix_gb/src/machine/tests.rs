use anyhow::Result;
use dotmatrix_common::key::Key;
use dotmatrix_common::Color;

use super::*;
use crate::config::{EmulatorConfig, RamInit};
use crate::cpu::CpuState;
use crate::error::{ExecutionError, LoadError, SnapshotError};
use crate::interrupts::Interrupt;
use crate::CYCLES_PER_FRAME;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A 32 KiB image with `program` at $0100 and a valid header.
fn rom_with_program(cartridge_type: u8, title: &[u8], program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0134..0x0134 + title.len()].copy_from_slice(title);
    rom[0x0147] = cartridge_type;
    rom[0x0148] = 0x00;
    rom[0x0149] = if cartridge_type == 0x03 { 0x02 } else { 0x00 };
    rom[0x014D] = CartridgeHeader::compute_header_checksum(&rom);
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    rom
}

fn load(program: &[u8]) -> GameBoy {
    init_logging();
    let rom = rom_with_program(0x00, b"TESTROM", program);
    GameBoy::load(&rom, EmulatorConfig::default()).expect("valid test ROM")
}

/// Fill $C000-$C00F with $A5..$B4, then DI; HALT.
const PATTERN_PROGRAM: &[u8] = &[
    0x21, 0x00, 0xC0, // LD HL,$C000
    0x3E, 0xA5, // LD A,$A5
    0x06, 0x10, // LD B,16
    0x22, // loop: LD (HL+),A
    0x3C, // INC A
    0x05, // DEC B
    0x20, 0xFB, // JR NZ,loop
    0xF3, // DI
    0x76, // HALT
];

#[test]
fn pattern_cartridge_ends_in_expected_state() -> Result<()> {
    let mut gb = load(PATTERN_PROGRAM);

    // 3 loads, 16 iterations of 4 instructions, DI, HALT.
    for _ in 0..69 {
        gb.step()?;
    }

    let regs = gb.registers();
    assert_eq!(regs.a, 0xB5);
    assert_eq!(regs.b, 0x00);
    assert_eq!(regs.hl(), 0xC010);
    assert_eq!(regs.f, 0xD0);
    assert_eq!(regs.pc, 0x010E);
    assert_eq!(gb.cpu().state, CpuState::Halted);
    assert_eq!(gb.cycles(), 480);

    for (i, addr) in (0xC000u16..0xC010).enumerate() {
        assert_eq!(gb.read_memory(addr), 0xA5 + i as u8);
    }

    // With IE clear nothing wakes the CPU.
    for _ in 0..100 {
        assert_eq!(gb.step()?, 4);
    }
    assert_eq!(gb.registers().pc, 0x010E);
    Ok(())
}

#[test]
fn unsupported_cartridge_type_is_a_load_error() {
    let rom = rom_with_program(0x20, b"BAD", PATTERN_PROGRAM);
    match GameBoy::load(&rom, EmulatorConfig::default()) {
        Err(err) => assert_eq!(err, LoadError::UnsupportedCartridgeType { code: 0x20 }),
        Ok(_) => panic!("cartridge type 0x20 should be rejected"),
    }
}

#[test]
fn post_boot_io_state() {
    let gb = load(&[0x18, 0xFE]);
    assert_eq!(gb.read_memory(0xFF0F), 0xE1);
    assert_eq!(gb.read_memory(0xFF04), 0xAB);
    assert_eq!(gb.read_memory(0xFF40), 0x91);
    assert_eq!(gb.read_memory(0xFF47), 0xFC);
    assert_eq!(gb.read_memory(0xFF44), 0x00);
    assert_eq!(gb.read_memory(0xFF26), 0xF1);
    assert_eq!(gb.read_memory(0xFF00), 0xFF);
    assert_eq!(gb.read_memory(0xFFFF), 0x00);
    assert_eq!(gb.header().title, "TESTROM");
}

#[test]
fn echo_ram_mirrors_work_ram() {
    let mut gb = load(&[0x18, 0xFE]);
    gb.write_memory(0xC123, 0x42);
    assert_eq!(gb.read_memory(0xE123), 0x42);

    gb.write_memory(0xFDFF, 0x99);
    assert_eq!(gb.read_memory(0xDDFF), 0x99);
}

#[test]
fn unusable_region_and_unmapped_io_float_high() {
    let mut gb = load(&[0x18, 0xFE]);
    gb.write_memory(0xFEA0, 0x12);
    gb.write_memory(0xFEFF, 0x34);
    assert_eq!(gb.read_memory(0xFEA0), 0xFF);
    assert_eq!(gb.read_memory(0xFEFF), 0xFF);

    gb.write_memory(0xFF4D, 0x01);
    assert_eq!(gb.read_memory(0xFF4D), 0xFF);
    assert_eq!(gb.read_memory(0xFF7F), 0xFF);
}

#[test]
fn rom_writes_do_not_modify_rom() {
    let mut gb = load(&[0x18, 0xFE]);
    gb.write_memory(0x0100, 0x00);
    assert_eq!(gb.read_memory(0x0100), 0x18);
}

#[test]
fn ram_init_modes() {
    init_logging();
    let rom = rom_with_program(0x00, b"RAM", &[0x18, 0xFE]);

    let zeroed = GameBoy::load(
        &rom,
        EmulatorConfig::builder().ram_init(RamInit::Zeroed).build(),
    )
    .unwrap();
    assert!((0xC000..=0xDFFF).all(|addr| zeroed.read_memory(addr) == 0));
    assert!((0xFF80..=0xFFFE).all(|addr| zeroed.read_memory(addr) == 0));

    let a = GameBoy::load(&rom, EmulatorConfig::default()).unwrap();
    let b = GameBoy::load(&rom, EmulatorConfig::default()).unwrap();
    assert!((0xC000..=0xDFFF).any(|addr| a.read_memory(addr) != 0));
    assert!((0xC000..=0xDFFF).all(|addr| a.read_memory(addr) == b.read_memory(addr)));

    let other = GameBoy::load(
        &rom,
        EmulatorConfig::builder()
            .ram_init(RamInit::Pseudorandom { seed: 7 })
            .build(),
    )
    .unwrap();
    assert!((0xC000..=0xDFFF).any(|addr| a.read_memory(addr) != other.read_memory(addr)));
}

#[test]
fn run_until_next_frame_returns_at_vblank() -> Result<()> {
    let mut gb = load(&[0x18, 0xFE]);

    // Power-on starts at line 0, so the first V-blank is 144 lines away.
    let first = gb.run_until_next_frame()?;
    assert!((65_664..65_664 + 12).contains(&first), "first frame took {first}");
    assert_eq!(gb.frame_count(), 1);
    assert_eq!(gb.read_memory(0xFF44), 144);

    let total = first + gb.run_until_next_frame()? + gb.run_until_next_frame()?;
    assert_eq!(gb.frame_count(), 3);
    assert!(total.abs_diff(65_664 + 2 * CYCLES_PER_FRAME) < 12);
    assert_eq!(gb.cycles(), u64::from(total));
    Ok(())
}

#[test]
fn run_until_next_frame_with_lcd_off_runs_one_frame_of_cycles() -> Result<()> {
    let mut gb = load(&[
        0xAF, // XOR A
        0xE0, 0x40, // LDH ($40),A
        0x18, 0xFE, // JR -2
    ]);
    let elapsed = gb.run_until_next_frame()?;
    assert!(elapsed >= CYCLES_PER_FRAME && elapsed < CYCLES_PER_FRAME + 12);
    assert_eq!(gb.frame_count(), 0);
    assert_eq!(gb.read_memory(0xFF44), 0);
    assert!(gb.framebuffer().pixels().iter().all(|&p| p == 0));
    Ok(())
}

#[test]
fn frame_rgb_uses_configured_palette() -> Result<()> {
    init_logging();
    let rom = rom_with_program(0x00, b"RGB", &[0x18, 0xFE]);
    let red = Color::new_rgb(0xFF, 0x00, 0x00);
    let config = EmulatorConfig::builder()
        .palette([red, Color::LIGHT_GRAY, Color::DARK_GRAY, Color::BLACK])
        .build();
    let mut gb = GameBoy::load(&rom, config)?;
    gb.run_until_next_frame()?;

    // VRAM is clear, so every pixel is colour 0 -> BGP $FC -> shade 0.
    let mut rgb = vec![0u8; crate::SCREEN_WIDTH * crate::SCREEN_HEIGHT * 3];
    gb.frame_rgb(&mut rgb);
    assert!(rgb.chunks_exact(3).all(|px| px == [0xFF, 0x00, 0x00]));
    Ok(())
}

#[test]
fn serial_transfer_records_byte_and_interrupts() -> Result<()> {
    let mut gb = load(&[
        0x3E, b'H', // LD A,'H'
        0xE0, 0x01, // LDH ($01),A
        0x3E, 0x81, // LD A,$81
        0xE0, 0x02, // LDH ($02),A
        0x18, 0xFE, // JR -2
    ]);
    while gb.cycles() < 4096 + 64 {
        gb.step()?;
    }
    assert_eq!(gb.serial_output(), b"H");
    assert_eq!(gb.read_memory(0xFF01), 0xFF);
    assert_eq!(gb.read_memory(0xFF02) & 0x80, 0);
    assert_ne!(gb.read_memory(0xFF0F) & Interrupt::Serial.bit(), 0);

    assert_eq!(gb.take_serial_output(), b"H");
    assert!(gb.serial_output().is_empty());
    Ok(())
}

#[test]
fn reset_clears_serial_capture() -> Result<()> {
    let mut gb = load(&[
        0x3E, b'R', // LD A,'R'
        0xE0, 0x01, // LDH ($01),A
        0x3E, 0x81, // LD A,$81
        0xE0, 0x02, // LDH ($02),A
        0x18, 0xFE, // JR -2
    ]);
    while gb.cycles() < 64 {
        gb.step()?;
    }
    assert_eq!(gb.serial_output(), b"R");

    gb.reset();
    assert!(gb.serial_output().is_empty());
    Ok(())
}

#[test]
fn joypad_press_wakes_halt_and_runs_handler() -> Result<()> {
    init_logging();
    let mut rom = rom_with_program(
        0x00,
        b"JOYPAD",
        &[
            0x3E, 0x10, // LD A,$10
            0xE0, 0xFF, // LDH ($FF),A   IE = joypad
            0xE0, 0x00, // LDH ($00),A   select action buttons
            0xAF, // XOR A
            0xE0, 0x0F, // LDH ($0F),A   clear IF
            0xFB, // EI
            0x76, // HALT
            0x18, 0xFE, // JR -2
        ],
    );
    rom[0x0060..0x0067].copy_from_slice(&[
        0x3E, 0x42, // LD A,$42
        0xEA, 0x00, 0xC0, // LD ($C000),A
        0x18, 0xFE, // JR -2
    ]);
    let mut gb = GameBoy::load(&rom, EmulatorConfig::default())?;

    for _ in 0..50 {
        gb.step()?;
    }
    assert!(gb.cpu().is_halted());

    // A d-pad press is not on the selected line.
    gb.press(Button::Up);
    gb.step()?;
    assert!(gb.cpu().is_halted());

    gb.handle_key(Key::Enter, true);
    for _ in 0..4 {
        gb.step()?;
    }
    assert_eq!(gb.read_memory(0xC000), 0x42);
    assert_eq!(gb.read_memory(0xFF0F) & Interrupt::Joypad.bit(), 0);
    assert_eq!(gb.read_memory(0xFF00) & 0x0F, 0x07);

    gb.handle_key(Key::Enter, false);
    gb.release(Button::Up);
    assert_eq!(gb.read_memory(0xFF00) & 0x0F, 0x0F);
    Ok(())
}

#[test]
fn stop_waits_for_joypad() -> Result<()> {
    let mut gb = load(&[
        0x3E, 0x10, // LD A,$10
        0xE0, 0x00, // LDH ($00),A   select action buttons
        0xAF, // XOR A
        0xE0, 0x0F, // LDH ($0F),A
        0x10, 0x00, // STOP
        0x3C, // INC A
        0x18, 0xFE, // JR -2
    ]);
    for _ in 0..5 {
        gb.step()?;
    }
    assert!(gb.cpu().is_stopped());
    for _ in 0..10 {
        assert_eq!(gb.step()?, 4);
    }

    gb.press(Button::A);
    gb.step()?;
    gb.step()?;
    assert!(!gb.cpu().is_stopped());
    assert_eq!(gb.registers().a, 1);
    Ok(())
}

#[test]
fn oam_dma_copies_160_bytes_one_per_m_cycle() -> Result<()> {
    let mut gb = load(&[0x18, 0xFE]);
    gb.write_memory(0xFF40, 0x00);
    for i in 0..0xA0u16 {
        gb.write_memory(0xC000 + i, i as u8 ^ 0x5A);
    }

    gb.write_memory(0xFF46, 0xC0);
    assert_eq!(gb.read_memory(0xFF46), 0xC0);
    // OAM is locked to the CPU while the transfer runs.
    assert_eq!(gb.read_memory(0xFE00), 0xFF);

    while gb.cycles() < 640 - 12 {
        gb.step()?;
    }
    assert_eq!(gb.read_memory(0xFE00), 0xFF);

    while gb.cycles() < 640 {
        gb.step()?;
    }
    for i in 0..0xA0u16 {
        assert_eq!(gb.read_memory(0xFE00 + i), i as u8 ^ 0x5A);
    }
    Ok(())
}

#[test]
fn vram_is_blocked_during_pixel_transfer() -> Result<()> {
    let mut gb = load(&[0x18, 0xFE]);
    gb.write_memory(0xFF40, 0x00);
    gb.write_memory(0x8000, 0x3C);
    gb.write_memory(0xFF40, 0x91);

    // JR costs 12; step until the PPU is in mode 3.
    while gb.read_memory(0xFF41) & 0x03 != 3 {
        gb.step()?;
    }
    assert_eq!(gb.read_memory(0x8000), 0xFF);
    gb.write_memory(0x8000, 0x00);

    while gb.read_memory(0xFF41) & 0x03 != 0 {
        gb.step()?;
    }
    assert_eq!(gb.read_memory(0x8000), 0x3C);
    Ok(())
}

#[test]
fn timer_interrupt_is_serviced_through_the_bus() -> Result<()> {
    init_logging();
    let mut rom = rom_with_program(
        0x00,
        b"TIMER",
        &[
            0x3E, 0x04, // LD A,$04
            0xE0, 0xFF, // LDH ($FF),A   IE = timer
            0x3E, 0xFF, // LD A,$FF
            0xE0, 0x05, // LDH ($05),A   TIMA = $FF
            0x3E, 0x05, // LD A,$05
            0xE0, 0x07, // LDH ($07),A   TAC = 16 T-cycles
            0xFB, // EI
            0x18, 0xFE, // JR -2
        ],
    );
    rom[0x0050..0x0055].copy_from_slice(&[
        0xEA, 0x00, 0xC0, // LD ($C000),A
        0x18, 0xFE, // JR -2
    ]);
    let mut gb = GameBoy::load(&rom, EmulatorConfig::default())?;
    gb.write_memory(0xC000, 0x00);

    for _ in 0..20 {
        gb.step()?;
    }
    assert_eq!(gb.read_memory(0xC000), 0x05);
    assert_eq!(gb.read_memory(0xFF0F) & Interrupt::Timer.bit(), 0);
    Ok(())
}

#[test]
fn illegal_opcode_faults_the_session_until_reset() {
    let mut gb = load(&[0x00, 0xD3]);
    assert_eq!(gb.step(), Ok(4));

    let err = gb.step().unwrap_err();
    match &err {
        ExecutionError::IllegalOpcode {
            opcode,
            address,
            registers,
        } => {
            assert_eq!(*opcode, 0xD3);
            assert_eq!(*address, 0x0101);
            assert_eq!(registers.pc, 0x0101);
        }
    }
    let cycles = gb.cycles();
    assert_eq!(gb.step(), Err(err.clone()));
    assert_eq!(gb.cycles(), cycles);
    assert_eq!(gb.fault(), Some(&err));

    gb.reset();
    assert_eq!(gb.fault(), None);
    assert_eq!(gb.registers().pc, 0x0100);
    assert_eq!(gb.step(), Ok(4));
}

#[test]
fn reset_keeps_cartridge_ram_and_resets_banking() -> Result<()> {
    init_logging();
    let mut rom = rom_with_program(0x03, b"BATTERY", &[0x18, 0xFE]);
    rom.resize(0x10000, 0);
    rom[0x0148] = 0x01;
    rom[0x014D] = CartridgeHeader::compute_header_checksum(&rom);
    rom[0xC000] = 0x33;
    let mut gb = GameBoy::load(&rom, EmulatorConfig::default())?;

    gb.write_memory(0x0000, 0x0A);
    gb.write_memory(0xA000, 0x77);
    gb.write_memory(0x2000, 0x03);
    assert_eq!(gb.read_memory(0x4000), 0x33);

    gb.run_until_next_frame()?;
    gb.reset();
    assert_eq!(gb.cycles(), 0);
    assert_eq!(gb.frame_count(), 0);
    assert_eq!(gb.read_memory(0x4000), 0x00);
    // RAM is disabled again after reset but keeps its contents.
    assert_eq!(gb.read_memory(0xA000), 0xFF);
    gb.write_memory(0x0000, 0x0A);
    assert_eq!(gb.read_memory(0xA000), 0x77);
    assert_eq!(gb.cartridge_ram()[0], 0x77);
    Ok(())
}

/// Turn the LCD off, give tile 0 a half-dark column pattern, turn the LCD
/// back on, then scroll the background forever so consecutive frames
/// differ.
const SCROLLER_PROGRAM: &[u8] = &[
    0xAF, // XOR A
    0xE0, 0x40, // LDH ($40),A
    0x21, 0x00, 0x80, // LD HL,$8000
    0x06, 0x08, // LD B,8
    0x3E, 0xF0, // LD A,$F0
    0x22, // loop: LD (HL+),A
    0x23, // INC HL
    0x05, // DEC B
    0x20, 0xFB, // JR NZ,loop
    0x3E, 0x91, // LD A,$91
    0xE0, 0x40, // LDH ($40),A
    0x3C, // scroll: INC A
    0xE0, 0x43, // LDH ($43),A
    0xEA, 0x00, 0xC0, // LD ($C000),A
    0x18, 0xF8, // JR scroll
];

fn run_frames(gb: &mut GameBoy, frames: usize) -> Result<Vec<(crate::cpu::Registers, Framebuffer)>> {
    let mut out = Vec::with_capacity(frames);
    for _ in 0..frames {
        gb.run_until_next_frame()?;
        out.push((gb.registers(), gb.framebuffer().clone()));
    }
    Ok(out)
}

#[test]
fn snapshot_restore_reproduces_execution() -> Result<()> {
    let mut original = load(SCROLLER_PROGRAM);
    run_frames(&mut original, 2)?;
    // Stop mid-frame so the snapshot carries in-flight PPU state.
    for _ in 0..1234 {
        original.step()?;
    }

    let snapshot = original.snapshot()?;
    let expected = run_frames(&mut original, 4)?;
    let expected_cycles = original.cycles();

    let mut restored = load(SCROLLER_PROGRAM);
    restored.restore(&snapshot)?;
    let actual = run_frames(&mut restored, 4)?;

    assert_eq!(actual, expected);
    assert_eq!(restored.cycles(), expected_cycles);
    assert_eq!(restored.frame_count(), original.frame_count());
    assert_ne!(expected[0].1, expected[1].1);
    Ok(())
}

#[test]
fn snapshot_round_trips_through_bytes() -> Result<()> {
    let mut gb = load(SCROLLER_PROGRAM);
    gb.run_until_next_frame()?;
    let snapshot = gb.snapshot()?;
    assert_eq!(&snapshot.as_bytes()[..4], b"DMGS");
    assert_eq!(&snapshot.as_bytes()[4..8], &1u32.to_le_bytes());

    let copy = Snapshot::from_bytes(snapshot.as_bytes().to_vec());
    gb.run_until_next_frame()?;
    gb.restore(&copy)?;
    assert_eq!(gb.snapshot()?, snapshot);
    Ok(())
}

#[test]
fn restore_rejects_bad_snapshots() -> Result<()> {
    let mut gb = load(SCROLLER_PROGRAM);
    let good = gb.snapshot()?.into_bytes();

    let mut bad_magic = good.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        gb.restore(&Snapshot::from_bytes(bad_magic)),
        Err(SnapshotError::BadMagic)
    ));

    let mut bad_version = good.clone();
    bad_version[4] = 9;
    assert!(matches!(
        gb.restore(&Snapshot::from_bytes(bad_version)),
        Err(SnapshotError::UnsupportedVersion {
            found: 9,
            expected: 1
        })
    ));

    let mut truncated = good.clone();
    truncated.truncate(good.len() / 2);
    assert!(matches!(
        gb.restore(&Snapshot::from_bytes(truncated)),
        Err(SnapshotError::Codec(_))
    ));

    let other_rom = rom_with_program(0x00, b"OTHER", SCROLLER_PROGRAM);
    let other = GameBoy::load(&other_rom, EmulatorConfig::default())?;
    assert!(matches!(
        gb.restore(&other.snapshot()?),
        Err(SnapshotError::CartridgeMismatch { .. })
    ));

    // Failed restores leave the session usable.
    gb.run_until_next_frame()?;
    Ok(())
}

#[test]
fn restore_clears_a_fault() -> Result<()> {
    let mut gb = load(&[0x00, 0xD3]);
    let snapshot = gb.snapshot()?;
    gb.step()?;
    assert!(gb.step().is_err());

    gb.restore(&snapshot)?;
    assert_eq!(gb.fault(), None);
    assert_eq!(gb.step()?, 4);
    Ok(())
}

use gbm::{
    bus::Bus,
    cartridge::cartridge::Cartridge,
    controller::{Key, KeyState},
    ppu::ppu::Mode,
    screen::{Frame, Screen},
    system::GameBoy,
};

const ENTRY: usize = 0x0100;
const TYPE_ADDR: usize = 0x0147;

#[derive(Default)]
struct CountingScreen {
    frames: usize,
}

impl Screen for CountingScreen {
    fn present(&mut self, _frame: &Frame) {
        self.frames += 1;
    }
}

/// 32 KiB ROM-only image with `program` at the entry point.
fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0134..0x0138].copy_from_slice(b"TEST");
    rom[ENTRY..ENTRY + program.len()].copy_from_slice(program);
    rom
}

fn boot(rom: Vec<u8>) -> GameBoy {
    GameBoy::new(Cartridge::from_bytes(rom).unwrap())
}

/// Step until an instruction reports 0 cycles; returns how many steps ran before it.
fn run_until_stopped(gb: &mut GameBoy, keys: &KeyState, screen: &mut CountingScreen) -> usize {
    for steps in 0..1_000_000 {
        if gb.step(keys, screen) == 0 {
            return steps;
        }
    }
    panic!("program never stopped");
}

#[test]
fn one_frame_of_cycles_flushes_once_and_wraps() {
    // JR -2: 12 cycles a step, which divides a 456-cycle scanline evenly.
    let mut gb = boot(rom_with_program(&[0x18, 0xFE]));
    let keys = KeyState::default();
    let mut screen = CountingScreen::default();

    for _ in 0..(154 * 456 / 12) {
        assert_eq!(gb.step(&keys, &mut screen), 12);
    }

    assert_eq!(screen.frames, 1);
    assert_eq!(gb.cpu.bus.ppu.line, 0);
    assert_eq!(gb.cpu.bus.ppu.mode, Mode::OamScan);
    assert_eq!(gb.cpu.bus.interrupt_flag & 0x01, 0x01);
    assert_eq!(gb.cpu.cycles, 154 * 456);
}

#[test]
fn run_frame_stops_at_vblank() {
    let mut gb = boot(rom_with_program(&[0x18, 0xFE]));
    let keys = KeyState::default();
    let mut screen = CountingScreen::default();

    assert!(gb.run_frame(&keys, &mut screen));
    assert!(gb.run_frame(&keys, &mut screen));
    assert_eq!(screen.frames, 2);
    assert_eq!(gb.cpu.bus.ppu.line, 144);
    assert_eq!(gb.cpu.bus.ppu.mode, Mode::VBlank);
}

#[test]
fn run_frame_reports_invalid_opcode() {
    let mut gb = boot(rom_with_program(&[0x00, 0xDD]));
    let keys = KeyState::default();
    let mut screen = CountingScreen::default();
    assert!(!gb.run_frame(&keys, &mut screen));
    assert_eq!(screen.frames, 0);
}

#[test]
fn program_stores_to_work_ram() {
    // LD HL,$C000; LD A,$42; LD (HL),A; invalid
    let mut gb = boot(rom_with_program(&[0x21, 0x00, 0xC0, 0x3E, 0x42, 0x77, 0xD3]));
    let keys = KeyState::default();
    let mut screen = CountingScreen::default();

    assert_eq!(run_until_stopped(&mut gb, &keys, &mut screen), 3);
    assert_eq!(gb.cpu.cycles, 12 + 8 + 8);
    assert_eq!(gb.cpu.bus.read8(0xC000), 0x42);
    assert_eq!(gb.cpu.bus.read8(0xE000), 0x42);
}

#[test]
fn program_reads_pressed_button() {
    // LD A,$EF; LDH ($00),A; LDH A,($00); invalid
    let mut gb = boot(rom_with_program(&[0x3E, 0xEF, 0xE0, 0x00, 0xF0, 0x00, 0xD3]));
    let mut keys = KeyState::default();
    keys.press(Key::A);
    keys.press(Key::Down);
    let mut screen = CountingScreen::default();

    run_until_stopped(&mut gb, &keys, &mut screen);
    assert_eq!(gb.cpu.regs.a, 0xEE);
}

#[test]
fn vblank_interrupt_wakes_halted_cpu() {
    // LD A,$01; LDH ($FF),A; EI; HALT. The vector at $0040 holds an invalid opcode.
    let mut rom = rom_with_program(&[0x3E, 0x01, 0xE0, 0xFF, 0xFB, 0x76]);
    rom[0x0040] = 0xD3;
    let mut gb = boot(rom);
    let keys = KeyState::default();
    let mut screen = CountingScreen::default();

    run_until_stopped(&mut gb, &keys, &mut screen);

    assert_eq!(screen.frames, 1);
    assert_eq!(gb.cpu.regs.pc, 0x0041);
    assert!(!gb.cpu.ime);
    assert!(!gb.cpu.halted);
    assert_eq!(gb.cpu.bus.interrupt_flag & 0x01, 0);
    assert_eq!(gb.cpu.bus.read16(gb.cpu.regs.sp), 0x0106);
    assert_eq!(gb.cpu.bus.ppu.line, 144);
}

#[test]
fn mbc1_bank_switch_from_program() {
    // LD A,$02; LD ($2000),A; LD A,($4000); invalid
    let mut rom = vec![0u8; 4 * 0x4000];
    let program = [0x3E, 0x02, 0xEA, 0x00, 0x20, 0xFA, 0x00, 0x40, 0xD3];
    rom[ENTRY..ENTRY + program.len()].copy_from_slice(&program);
    rom[TYPE_ADDR] = 0x01;
    for bank in 1..4 {
        rom[bank * 0x4000] = bank as u8;
    }
    let mut gb = boot(rom);
    let keys = KeyState::default();
    let mut screen = CountingScreen::default();

    run_until_stopped(&mut gb, &keys, &mut screen);
    assert_eq!(gb.cpu.regs.a, 2);
    assert_eq!(gb.cpu.bus.cart.rom_bank(), 2);
}

#[test]
fn empty_slot_runs_zeroes_as_nops() {
    let mut gb = GameBoy::new(Cartridge::unloaded());
    let keys = KeyState::default();
    let mut screen = CountingScreen::default();

    assert!(gb.run_frame(&keys, &mut screen));
    assert_eq!(screen.frames, 1);
}

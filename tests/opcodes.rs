mod common;

use chip8_vm::emu::{Chip8, Chip8Error, MAX_ROM_SIZE, Quirks, StepResult};
use chip8_vm::u4;
use common::{machine, machine_with, run};

#[test]
fn load_immediate_touches_only_its_register() {
    for x in 0..16u16 {
        let mut chip8 = machine(&[0x6000 | (x << 8) | 0xA5]);
        run(&mut chip8, 1);

        for (reg, &value) in chip8.v().iter().enumerate() {
            let expected = if reg == x as usize { 0xA5 } else { 0 };
            assert_eq!(value, expected, "V{reg:X} after 6{x:X}A5");
        }
    }
}

#[test]
fn read_delay_timer_touches_only_its_register() {
    // V0..VE = 0x11, VF = 0x22, delay = V0 = 0x33, V7 = delay
    let mut words: Vec<u16> = (0..15).map(|x| 0x6011 | (x << 8)).collect();
    words.extend([0x6F22, 0x6033, 0xF015, 0xF707]);
    let mut chip8 = machine(&words);
    run(&mut chip8, words.len());

    assert_eq!(chip8.v()[7], 0x33);
    assert_eq!(chip8.v()[0], 0x33);
    assert_eq!(chip8.v()[0xF], 0x22);
    for reg in (1..15).filter(|&reg| reg != 7) {
        assert_eq!(chip8.v()[reg], 0x11);
    }
}

#[test]
fn add_immediate_wraps_without_flag() {
    let mut chip8 = machine(&[0x6FAB, 0x70FF, 0x7001]);
    run(&mut chip8, 3);

    assert_eq!(chip8.v()[0], 0x00);
    assert_eq!(chip8.v()[0xF], 0xAB);
}

#[test]
fn add_registers_sets_carry() {
    let mut chip8 = machine(&[0x60FF, 0x6101, 0x8014]);
    run(&mut chip8, 3);
    assert_eq!(chip8.v()[0], 0x00);
    assert_eq!(chip8.v()[0xF], 1);

    let mut chip8 = machine(&[0x6001, 0x6101, 0x8014]);
    run(&mut chip8, 3);
    assert_eq!(chip8.v()[0], 0x02);
    assert_eq!(chip8.v()[0xF], 0);
}

#[test]
fn subtract_registers_sets_not_borrow() {
    let mut chip8 = machine(&[0x6001, 0x6102, 0x8015]);
    run(&mut chip8, 3);
    assert_eq!(chip8.v()[0], 0xFF);
    assert_eq!(chip8.v()[0xF], 0);

    let mut chip8 = machine(&[0x6005, 0x6102, 0x8015]);
    run(&mut chip8, 3);
    assert_eq!(chip8.v()[0], 0x03);
    assert_eq!(chip8.v()[0xF], 1);
}

#[test]
fn reverse_subtract_sets_not_borrow() {
    // V0 = V1 - V0 = 3 - 5
    let mut chip8 = machine(&[0x6005, 0x6103, 0x8017]);
    run(&mut chip8, 3);
    assert_eq!(chip8.v()[0], 0xFE);
    assert_eq!(chip8.v()[0xF], 0);

    // V1 = V0 - V1 = 5 - 3
    let mut chip8 = machine(&[0x6005, 0x6103, 0x8107]);
    run(&mut chip8, 3);
    assert_eq!(chip8.v()[1], 0x02);
    assert_eq!(chip8.v()[0xF], 1);
}

#[test]
fn conditional_skips() {
    let cases: [(&[u16], u16); 8] = [
        (&[0x6042, 0x3042], 0x206),
        (&[0x6042, 0x3043], 0x204),
        (&[0x6042, 0x4043], 0x206),
        (&[0x6042, 0x4042], 0x204),
        (&[0x6042, 0x6142, 0x5010], 0x208),
        (&[0x6042, 0x6143, 0x5010], 0x206),
        (&[0x6042, 0x6143, 0x9010], 0x208),
        (&[0x6042, 0x6142, 0x9010], 0x206),
    ];

    for (words, expected_pc) in cases {
        let mut chip8 = machine(words);
        run(&mut chip8, words.len());
        assert_eq!(chip8.pc(), expected_pc, "program {words:04X?}");
    }
}

#[test]
fn drawing_twice_erases_and_reports_collision() {
    // I = glyph 0, draw it at (5, 5) twice
    let mut chip8 = machine(&[0xA050, 0x6005, 0x6105, 0xD015, 0xD015]);

    assert_eq!(run(&mut chip8, 4), StepResult::Drew);
    assert_eq!(chip8.v()[0xF], 0);
    assert!(chip8.pixel(5, 5));

    run(&mut chip8, 1);
    assert_eq!(chip8.v()[0xF], 1);
    assert!(chip8.display().iter().flatten().all(|&on| !on));
}

#[test]
fn collision_flag_accumulates_over_whole_sprite() {
    // Light (2, 0) with one row of glyph 1, then draw two rows of glyph 0
    // on top: only the first row collides.
    let mut chip8 = machine(&[0xA055, 0xD001, 0xA050, 0xD002]);
    run(&mut chip8, 4);

    assert_eq!(chip8.v()[0xF], 1);
    assert!(!chip8.pixel(0, 2));
    assert!(chip8.pixel(1, 0));
}

#[test]
fn sprite_wraps_horizontally() {
    // I = glyph 0 (top row 0xF0), V0 = 63, V1 = 0, one row
    let mut chip8 = machine(&[0xA050, 0x603F, 0x6100, 0xD011]);
    run(&mut chip8, 4);

    assert!(chip8.pixel(0, 63));
    assert!(chip8.pixel(0, 0));
    assert!(chip8.pixel(0, 1));
    assert!(chip8.pixel(0, 2));
    assert!(!chip8.pixel(0, 3));
    assert!(!chip8.pixel(0, 62));
}

#[test]
fn sprite_position_wraps_modulo_display() {
    // V0 = 64 + 2, V1 = 32 + 1
    let mut chip8 = machine(&[0xA050, 0x6042, 0x6121, 0xD011]);
    run(&mut chip8, 4);

    assert!(chip8.pixel(1, 2));
    assert!(chip8.pixel(1, 5));
}

#[test]
fn clear_screen() {
    let mut chip8 = machine(&[0xA050, 0xD005, 0x00E0]);
    run(&mut chip8, 3);
    assert!(chip8.display().iter().flatten().all(|&on| !on));
}

#[test]
fn binary_coded_decimal() {
    let mut chip8 = machine(&[0x609C, 0xA300, 0xF033]);
    run(&mut chip8, 3);

    assert_eq!(&chip8.memory()[0x300..0x303], &[1, 5, 6]);
    assert_eq!(chip8.i(), 0x300);
}

#[test]
fn register_block_round_trip() {
    let mut chip8 = machine(&[
        0x6001, 0x6102, 0x6203, 0x6304, // V0..V3 = 1..4
        0xA400, 0xF355, // store V0..V3
        0x6000, 0x6100, 0x6200, 0x6300, // clear V0..V3
        0xA400, 0xF365, // load V0..V3
    ]);

    run(&mut chip8, 6);
    assert_eq!(&chip8.memory()[0x400..0x405], &[1, 2, 3, 4, 0]);
    assert_eq!(chip8.i(), 0x404);

    run(&mut chip8, 4);
    assert_eq!(&chip8.v()[..4], &[0, 0, 0, 0]);

    run(&mut chip8, 2);
    assert_eq!(&chip8.v()[..5], &[1, 2, 3, 4, 0]);
    assert_eq!(chip8.i(), 0x404);
}

#[test]
fn call_then_return_resumes_after_call() {
    let mut words = vec![0u16; 0x81];
    words[0] = 0x2300;
    words[0x80] = 0x00EE;
    let mut chip8 = machine(&words);

    run(&mut chip8, 1);
    assert_eq!(chip8.pc(), 0x300);
    assert_eq!(chip8.stack(), &[0x202]);

    run(&mut chip8, 1);
    assert_eq!(chip8.pc(), 0x202);
    assert!(chip8.stack().is_empty());
}

#[test]
fn seventeenth_nested_call_overflows() {
    let mut chip8 = machine(&[0x2200]);
    run(&mut chip8, 16);
    assert_eq!(chip8.stack().len(), 16);

    let err = chip8.step().unwrap_err();
    assert!(matches!(err, Chip8Error::StackOverflow { address: 0x200, .. }));
    assert_eq!(chip8.pc(), 0x200);
    assert_eq!(chip8.stack().len(), 16);
}

#[test]
fn return_with_empty_stack_underflows() {
    let mut chip8 = machine(&[0x00EE]);
    let err = chip8.step().unwrap_err();
    assert!(matches!(err, Chip8Error::StackUnderflow));
    assert_eq!(chip8.pc(), 0x200);
}

#[test]
fn wait_for_key_repeats_until_pressed() {
    let mut chip8 = machine(&[0xF50A]);

    for _ in 0..3 {
        assert_eq!(chip8.step().unwrap(), StepResult::WaitingForKey);
        assert_eq!(chip8.pc(), 0x200);
    }

    chip8.set_key(u4::new(0xB), true);
    chip8.set_key(u4::new(0x7), true);
    assert_eq!(chip8.step().unwrap(), StepResult::Continue);
    assert_eq!(chip8.pc(), 0x202);
    assert_eq!(chip8.v()[5], 0x7);
}

#[test]
fn key_skips() {
    let mut chip8 = machine(&[0x6004, 0xE09E, 0x0000, 0xE0A1]);
    chip8.set_key(u4::new(4), true);
    run(&mut chip8, 2);
    assert_eq!(chip8.pc(), 0x206);

    chip8.set_key(u4::new(4), false);
    run(&mut chip8, 1);
    assert_eq!(chip8.pc(), 0x20A);
}

#[test]
fn timers_count_down_to_zero() {
    let mut chip8 = machine(&[0x6002, 0xF015, 0xF018]);
    run(&mut chip8, 3);
    assert!(chip8.should_beep());

    for _ in 0..5 {
        chip8.tick_timers();
    }
    assert_eq!(chip8.delay_timer(), 0);
    assert_eq!(chip8.sound_timer(), 0);
    assert!(!chip8.should_beep());
}

#[test]
fn index_add_wraps_at_4k() {
    let mut chip8 = machine(&[0xAFFF, 0x6002, 0xF01E]);
    run(&mut chip8, 3);
    assert_eq!(chip8.i(), 0x001);
}

#[test]
fn unknown_words_are_skipped() {
    let mut chip8 = machine(&[0x6033, 0x5121, 0xFFFF, 0xE0FF]);
    run(&mut chip8, 1);
    let registers = *chip8.v();

    assert_eq!(chip8.step().unwrap(), StepResult::Ignored(0x5121));
    assert_eq!(chip8.step().unwrap(), StepResult::Ignored(0xFFFF));
    assert_eq!(chip8.step().unwrap(), StepResult::Ignored(0xE0FF));
    assert_eq!(chip8.pc(), 0x208);
    assert_eq!(chip8.v(), &registers);
}

#[test]
fn rom_size_limit() {
    let mut chip8 = Chip8::with_seed(Quirks::COSMAC, 1);
    assert!(matches!(
        chip8.load(&vec![0xAB; MAX_ROM_SIZE + 1]),
        Err(Chip8Error::RomTooLarge { .. })
    ));
    assert_eq!(chip8.memory()[0x200], 0);

    chip8.load(&vec![0xAB; MAX_ROM_SIZE]).unwrap();
    assert_eq!(chip8.memory()[0x200], 0xAB);
    assert_eq!(chip8.memory()[0xFFF], 0xAB);
}

#[test]
fn chip48_mode_shifts_in_place() {
    // V1 = 0x81, V2 = 0x02, V1 <<= 1
    let mut chip8 = machine_with(Quirks::CHIP48, &[0x6181, 0x6202, 0x812E]);
    run(&mut chip8, 3);

    assert_eq!(chip8.v()[1], 0x02);
    assert_eq!(chip8.v()[2], 0x02);
    assert_eq!(chip8.v()[0xF], 1);
}

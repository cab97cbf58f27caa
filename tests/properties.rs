mod common;

use chip8_vm::emu::Quirks;
use common::{machine, machine_with, run};
use proptest::prelude::*;

proptest! {
    #[test]
    fn add_carry_matches_wide_sum(a in any::<u8>(), b in any::<u8>()) {
        let mut chip8 = machine(&[0x6000 | a as u16, 0x6100 | b as u16, 0x8014]);
        run(&mut chip8, 3);

        let sum = a as u16 + b as u16;
        prop_assert_eq!(chip8.v()[0], (sum & 0xFF) as u8);
        prop_assert_eq!(chip8.v()[0xF], u8::from(sum > 0xFF));
    }

    #[test]
    fn sub_flag_is_not_borrow(a in any::<u8>(), b in any::<u8>()) {
        let mut chip8 = machine(&[0x6000 | a as u16, 0x6100 | b as u16, 0x8015]);
        run(&mut chip8, 3);

        prop_assert_eq!(chip8.v()[0], a.wrapping_sub(b));
        prop_assert_eq!(chip8.v()[0xF], u8::from(a >= b));
    }

    #[test]
    fn alu_ops_only_write_vx_and_vf(
        x in 0u16..15,
        y in 0u16..15,
        op in prop::sample::select(vec![0u16, 1, 2, 3, 4, 5, 6, 7, 0xE]),
        chip48 in any::<bool>(),
    ) {
        let quirks = if chip48 { Quirks::CHIP48 } else { Quirks::COSMAC };
        // V0..VE = 0x10 + index, then the ALU op
        let mut words: Vec<u16> = (0..15).map(|reg| 0x6010 | (reg << 8) | reg).collect();
        words.push(0x8000 | (x << 8) | (y << 4) | op);
        let mut chip8 = machine_with(quirks, &words);
        run(&mut chip8, words.len());

        for reg in (0..15).filter(|&reg| reg != x as usize) {
            prop_assert_eq!(chip8.v()[reg], 0x10 + reg as u8);
        }
    }

    #[test]
    fn bcd_digits_recombine(value in any::<u8>()) {
        let mut chip8 = machine(&[0x6000 | value as u16, 0xA300, 0xF033]);
        run(&mut chip8, 3);

        let digits = &chip8.memory()[0x300..0x303];
        prop_assert!(digits.iter().all(|&d| d < 10));
        prop_assert_eq!(
            digits[0] as u16 * 100 + digits[1] as u16 * 10 + digits[2] as u16,
            value as u16
        );
    }

    #[test]
    fn block_transfer_advances_index(x in 0u16..16, base in 0x300u16..0xF00) {
        let mut chip8 = machine(&[0xA000 | base, 0xF055 | (x << 8)]);
        run(&mut chip8, 2);

        prop_assert_eq!(chip8.i(), base + x + 1);
    }
}

use rand::Rng;

use super::chip8::ADDRESS_MASK;
use super::{
    Chip8, Chip8Error, DISPLAY_X, DISPLAY_Y, FONT_GLYPH_HEIGHT, FONT_START_ADDRESS, Opcode,
    OpcodeALU, StepResult,
};
use crate::u4;

impl Chip8 {
    pub(crate) fn execute(&mut self, opcode: Opcode) -> Result<StepResult, Chip8Error> {
        match opcode {
            Opcode::MachineCall { .. } => {}
            Opcode::ClearDisplay => {
                self.display = [[false; DISPLAY_X]; DISPLAY_Y];
            }
            Opcode::Jump { nnn } => {
                self.pc = nnn;
            }
            Opcode::JumpWithOffset { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into()) & ADDRESS_MASK;
            }
            Opcode::Call { nnn } => {
                self.stack.push(self.pc, nnn)?;
                self.pc = nnn;
            }
            Opcode::Return => {
                self.pc = self.stack.pop()?;
            }
            Opcode::SkipRegEqualImm { x, nn } => {
                self.skip_if(self.v[x] == nn);
            }
            Opcode::SkipRegNotEqualImm { x, nn } => {
                self.skip_if(self.v[x] != nn);
            }
            Opcode::SkipRegEqualReg { x, y } => {
                self.skip_if(self.v[x] == self.v[y]);
            }
            Opcode::SkipRegNotEqualReg { x, y } => {
                self.skip_if(self.v[x] != self.v[y]);
            }
            Opcode::SetRegImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddRegImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::ALU { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = self.rng.random();
                self.v[x] = rand_byte & nn;
            }
            Opcode::SetIndexImm { nnn } => {
                self.i = nnn;
            }
            Opcode::AddIndexReg { x } => {
                self.i = self.i.wrapping_add(self.v[x].into()) & ADDRESS_MASK;
            }
            Opcode::Draw { x, y, n } => {
                self.execute_draw(x, y, n);
                return Ok(StepResult::Drew);
            }
            Opcode::SkipIfPressed { x } => {
                self.skip_if(self.keypad[u4::from_low_bits(self.v[x])]);
            }
            Opcode::SkipIfNotPressed { x } => {
                self.skip_if(!self.keypad[u4::from_low_bits(self.v[x])]);
            }
            Opcode::WaitForKey { x } => {
                return Ok(self.execute_wait_for_key(x));
            }
            Opcode::ReadDelayTimer { x } => {
                self.v[x] = self.delay_timer;
            }
            Opcode::SetDelayTimer { x } => {
                self.delay_timer = self.v[x];
            }
            Opcode::SetSoundTimer { x } => {
                self.sound_timer = self.v[x];
            }
            Opcode::FontChar { x } => {
                let glyph_offset = u16::from(self.v[x]) * FONT_GLYPH_HEIGHT as u16;
                self.i = FONT_START_ADDRESS as u16 + glyph_offset;
            }
            Opcode::BCD { x } => {
                let value = self.v[x];
                *self.mem_mut(self.i) = value / 100;
                *self.mem_mut(self.i.wrapping_add(1)) = (value / 10) % 10;
                *self.mem_mut(self.i.wrapping_add(2)) = value % 10;
            }
            Opcode::StoreRegs { x } => {
                for reg_index in 0..=usize::from(x) {
                    *self.mem_mut(self.i.wrapping_add(reg_index as u16)) = self.v[reg_index];
                }
                self.advance_index(x);
            }
            Opcode::LoadRegs { x } => {
                for reg_index in 0..=usize::from(x) {
                    self.v[reg_index] = *self.mem(self.i.wrapping_add(reg_index as u16));
                }
                self.advance_index(x);
            }
            Opcode::Unknown(word) => {
                return Ok(StepResult::Ignored(word));
            }
        };

        Ok(StepResult::Continue)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2) & ADDRESS_MASK;
        }
    }

    /// I = I + X + 1 after a register block transfer.
    fn advance_index(&mut self, x: u4) {
        self.i = self.i.wrapping_add(u16::from(x.get()) + 1) & ADDRESS_MASK;
    }

    fn execute_alu(&mut self, x: u4, y: u4, op: OpcodeALU) {
        match op {
            OpcodeALU::Set => self.v[x] = self.v[y],
            OpcodeALU::Or => {
                self.v[x] |= self.v[y];
                self.reset_flag_after_logic();
            }
            OpcodeALU::And => {
                self.v[x] &= self.v[y];
                self.reset_flag_after_logic();
            }
            OpcodeALU::Xor => {
                self.v[x] ^= self.v[y];
                self.reset_flag_after_logic();
            }
            OpcodeALU::Add => {
                let (res, overflow) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = u8::from(overflow);
            }
            OpcodeALU::Sub => {
                let (res, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = u8::from(!borrow); // Notice that borrow is inverted
            }
            OpcodeALU::SubReverse => {
                let (res, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = res;
                self.v[0xF] = u8::from(!borrow);
            }
            OpcodeALU::ShiftRight => {
                let src = self.shift_source(x, y);
                self.v[x] = src >> 1;
                self.v[0xF] = src & 1;
            }
            OpcodeALU::ShiftLeft => {
                let src = self.shift_source(x, y);
                self.v[x] = src << 1;
                self.v[0xF] = (src >> 7) & 1;
            }
        }
    }

    fn reset_flag_after_logic(&mut self) {
        if self.quirks.vf_reset {
            self.v[0xF] = 0;
        }
    }

    fn shift_source(&self, x: u4, y: u4) -> u8 {
        if self.quirks.shift_uses_vy {
            self.v[y]
        } else {
            self.v[x]
        }
    }

    /// XORs an `n` row sprite from memory at I onto the display. Both axes wrap
    /// around, and VF reports whether any lit pixel was switched off.
    fn execute_draw(&mut self, x: u4, y: u4, n: u4) {
        let x_pos = usize::from(self.v[x]);
        let y_pos = usize::from(self.v[y]);

        let mut any_erased = false;
        for row in 0..usize::from(n) {
            let sprite_byte = *self.mem(self.i.wrapping_add(row as u16));
            let py = (y_pos + row) % DISPLAY_Y;

            for col in 0..8 {
                // If current sprite bit is non-zero
                if (sprite_byte & (0x80 >> col)) != 0 {
                    let pixel = &mut self.display[py][(x_pos + col) % DISPLAY_X];

                    // Flip the pixel
                    *pixel ^= true;

                    if !*pixel {
                        any_erased = true;
                    }
                }
            }
        }

        self.v[0xF] = u8::from(any_erased);
    }

    fn execute_wait_for_key(&mut self, x: u4) -> StepResult {
        match self.keypad.iter().position(|&pressed| pressed) {
            Some(key) => {
                self.v[x] = key as u8;
                StepResult::Continue
            }
            None => {
                // Repeat this instruction on the next step
                self.pc = self.pc.wrapping_sub(2) & ADDRESS_MASK;
                StepResult::WaitingForKey
            }
        }
    }
}

use super::Chip8Error;

/// Maximum number of nested subroutine calls.
pub const STACK_DEPTH: usize = 16;

/// Fixed-capacity call stack of return addresses.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: [u16; STACK_DEPTH],
    sp: usize,
}

impl CallStack {
    pub const fn new() -> Self {
        Self {
            frames: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    /// Pushes a return address. `target` is the subroutine being entered and
    /// is only used to describe an overflow.
    pub fn push(&mut self, return_address: u16, target: u16) -> Result<(), Chip8Error> {
        let slot = self
            .frames
            .get_mut(self.sp)
            .ok_or(Chip8Error::StackOverflow {
                address: target,
                depth: STACK_DEPTH,
            })?;

        *slot = return_address;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Chip8Error> {
        self.sp = self.sp.checked_sub(1).ok_or(Chip8Error::StackUnderflow)?;
        Ok(std::mem::take(&mut self.frames[self.sp]))
    }

    /// Live return addresses, oldest first.
    pub fn as_slice(&self) -> &[u16] {
        &self.frames[..self.sp]
    }

    pub fn len(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    pub fn clear(&mut self) {
        self.frames = [0; STACK_DEPTH];
        self.sp = 0;
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_order() {
        let mut stack = CallStack::new();
        stack.push(0x202, 0x300).unwrap();
        stack.push(0x302, 0x400).unwrap();

        assert_eq!(stack.as_slice(), &[0x202, 0x302]);
        assert_eq!(stack.pop().unwrap(), 0x302);
        assert_eq!(stack.pop().unwrap(), 0x202);
        assert!(stack.is_empty());
    }

    #[test]
    fn overflow_leaves_stack_intact() {
        let mut stack = CallStack::new();
        for depth in 0..STACK_DEPTH {
            stack.push(depth as u16, 0x200).unwrap();
        }

        let err = stack.push(0xABC, 0x246).unwrap_err();
        assert!(matches!(
            err,
            Chip8Error::StackOverflow {
                address: 0x246,
                depth: STACK_DEPTH
            }
        ));
        assert_eq!(stack.len(), STACK_DEPTH);
        assert_eq!(stack.pop().unwrap(), (STACK_DEPTH - 1) as u16);
    }

    #[test]
    fn underflow_is_an_error() {
        let mut stack = CallStack::new();
        assert!(matches!(stack.pop(), Err(Chip8Error::StackUnderflow)));
        assert_eq!(stack.len(), 0);
    }
}

//! Movement command encoding for the mBit line protocol.
//!
//! The robot understands a minimal ASCII protocol: one command per line,
//! a single direction code immediately followed by the decimal magnitude
//! and a CRLF terminator, e.g. `F30\r\n`. There is no checksum, escaping
//! or acknowledgment; the receiving microcontroller is a plain line reader.

use crate::config::StepFactors;
use crate::constants::FRAME_TERMINATOR;
use crate::error::{ControlError, Result};

/// Direction of a movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

impl Direction {
    /// Single-character wire code of the direction.
    pub const fn code(self) -> char {
        match self {
            Direction::Forward => 'F',
            Direction::Backward => 'B',
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stop => 'S',
        }
    }

    /// Step factor matching this direction's movement axis.
    ///
    /// Forward/Backward scale by the longitudinal factor, Left/Right by the
    /// rotational factor. Stop is never rate-scaled.
    const fn step_factor(self, factors: &StepFactors) -> u32 {
        match self {
            Direction::Forward | Direction::Backward => factors.longitudinal,
            Direction::Left | Direction::Right => factors.rotational,
            Direction::Stop => 0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Stop => "stop",
        };
        f.write_str(name)
    }
}

/// One encoded movement command, consumed immediately by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementCommand {
    pub direction: Direction,
    pub magnitude: u64,
}

impl MovementCommand {
    /// Build a command from an already-parsed step count.
    ///
    /// The magnitude is the step count scaled by the factor of the
    /// direction's axis; Stop always has magnitude 0.
    pub fn new(direction: Direction, steps: u32, factors: &StepFactors) -> Self {
        let magnitude = steps as u64 * direction.step_factor(factors) as u64;
        MovementCommand { direction, magnitude }
    }

    /// Build a command from raw user text.
    ///
    /// Anything that does not parse as a non-negative integer is rejected
    /// with [`ControlError::InvalidInput`] before any scaling happens, so an
    /// invalid entry can never reach the wire.
    pub fn from_input(direction: Direction, steps: &str, factors: &StepFactors) -> Result<Self> {
        let parsed: u32 = steps
            .trim()
            .parse()
            .map_err(|_| ControlError::InvalidInput { input: steps.to_string() })?;
        Ok(Self::new(direction, parsed, factors))
    }

    /// Encode the command as the exact byte sequence sent on the wire.
    pub fn frame(&self) -> Vec<u8> {
        format!("{}{}{}", self.direction.code(), self.magnitude, FRAME_TERMINATOR).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors() -> StepFactors {
        StepFactors { longitudinal: 10, rotational: 5 }
    }

    #[test]
    fn forward_scales_by_longitudinal_factor() {
        let cmd = MovementCommand::from_input(Direction::Forward, "3", &factors()).unwrap();
        assert_eq!(cmd.magnitude, 30);
        assert_eq!(cmd.frame(), b"F30\r\n");
    }

    #[test]
    fn turns_scale_by_rotational_factor() {
        let left = MovementCommand::new(Direction::Left, 4, &factors());
        let right = MovementCommand::new(Direction::Right, 4, &factors());
        assert_eq!(left.magnitude, 20);
        assert_eq!(right.magnitude, 20);
        assert_eq!(left.frame(), b"L20\r\n");
        assert_eq!(right.frame(), b"R20\r\n");
    }

    #[test]
    fn backward_uses_longitudinal_factor() {
        let cmd = MovementCommand::new(Direction::Backward, 7, &factors());
        assert_eq!(cmd.frame(), b"B70\r\n");
    }

    #[test]
    fn stop_magnitude_is_zero_regardless_of_steps() {
        let cmd = MovementCommand::new(Direction::Stop, 42, &factors());
        assert_eq!(cmd.magnitude, 0);
        assert_eq!(cmd.frame(), b"S0\r\n");
    }

    #[test]
    fn zero_steps_encode_as_single_zero() {
        let cmd = MovementCommand::new(Direction::Forward, 0, &factors());
        assert_eq!(cmd.frame(), b"F0\r\n");
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        for bad in ["abc", "", "3.5", "-3", "1e3", "3 steps"] {
            let err = MovementCommand::from_input(Direction::Forward, bad, &factors());
            assert!(
                matches!(err, Err(ControlError::InvalidInput { .. })),
                "input {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let cmd = MovementCommand::from_input(Direction::Right, " 2 ", &factors()).unwrap();
        assert_eq!(cmd.frame(), b"R10\r\n");
    }

    #[test]
    fn large_counts_do_not_overflow() {
        let big = StepFactors { longitudinal: u32::MAX, rotational: 1 };
        let cmd = MovementCommand::new(Direction::Forward, u32::MAX, &big);
        assert_eq!(cmd.magnitude, u32::MAX as u64 * u32::MAX as u64);
    }
}

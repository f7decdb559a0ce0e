//! Error types for the gyroscope session and the measurement pipeline.
//!
//! `E` is the error type of the underlying bus. Everything above the bus
//! (window capacity, run state, trigger and dashboard failures) shares the
//! same enum so a control loop has a single error to propagate.

use core::fmt::{Debug, Display, Formatter};

use crate::controller::RunState;

/// Error that occurs while constructing a driver.
/// Contains both the error and the bus so the caller can reuse it.
pub struct InitError<B, E> {
    pub bus: B,
    pub error: Error<E>,
}

impl<B, E: Debug> Debug for InitError<B, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.error, f)
    }
}

#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// A bus transaction failed
    Transport(E),
    /// WHO_AM_I did not match the expected device id
    WrongDevice { expected: u8, found: u8 },
    /// A sample was written past the end of the window
    CapacityExceeded { index: usize, capacity: usize },
    /// A sample was written at a tick other than the next free slot
    OutOfOrder { expected: usize, got: usize },
    /// The run controller was asked to do something its state forbids
    InvalidState { state: RunState },
    /// The start/restart input could not be read
    Trigger,
    /// The dashboard rejected an update
    Dashboard,
}

impl<E: Debug> Debug for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::Transport(e) => f.debug_tuple("Transport").field(e).finish(),
            Self::WrongDevice { expected, found } => f
                .debug_struct("WrongDevice")
                .field("expected", expected)
                .field("found", found)
                .finish(),
            Self::CapacityExceeded { index, capacity } => f
                .debug_struct("CapacityExceeded")
                .field("index", index)
                .field("capacity", capacity)
                .finish(),
            Self::OutOfOrder { expected, got } => f
                .debug_struct("OutOfOrder")
                .field("expected", expected)
                .field("got", got)
                .finish(),
            Self::InvalidState { state } => f
                .debug_struct("InvalidState")
                .field("state", state)
                .finish(),
            Self::Trigger => f.write_str("Trigger"),
            Self::Dashboard => f.write_str("Dashboard"),
        }
    }
}

impl<E: Debug> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "bus transaction failed: {:?}", e),
            Self::WrongDevice { expected, found } => write!(
                f,
                "wrong device id: expected 0x{:02X}, got 0x{:02X}",
                expected, found
            ),
            Self::CapacityExceeded { index, capacity } => write!(
                f,
                "sample index {} exceeds window capacity {}",
                index, capacity
            ),
            Self::OutOfOrder { expected, got } => {
                write!(f, "sample for tick {} recorded, expected tick {}", got, expected)
            }
            Self::InvalidState { state } => {
                write!(f, "operation not allowed in state {:?}", state)
            }
            Self::Trigger => f.write_str("failed to read trigger input"),
            Self::Dashboard => f.write_str("dashboard update failed"),
        }
    }
}

impl<E: PartialEq> PartialEq for Error<E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Transport(a), Self::Transport(b)) => a == b,
            (
                Self::WrongDevice { expected, found },
                Self::WrongDevice {
                    expected: e,
                    found: f,
                },
            ) => expected == e && found == f,
            (
                Self::CapacityExceeded { index, capacity },
                Self::CapacityExceeded {
                    index: i,
                    capacity: c,
                },
            ) => index == i && capacity == c,
            (Self::OutOfOrder { expected, got }, Self::OutOfOrder { expected: e, got: g }) => {
                expected == e && got == g
            }
            (Self::InvalidState { state }, Self::InvalidState { state: s }) => state == s,
            (Self::Trigger, Self::Trigger) => true,
            (Self::Dashboard, Self::Dashboard) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, InitError};
    use crate::controller::RunState;
    use std::format;

    #[test]
    fn init_error_debug_shows_the_inner_error() {
        let error = InitError {
            bus: (),
            error: Error::<u8>::WrongDevice {
                expected: 0xD3,
                found: 0x68,
            },
        };
        assert_eq!(
            format!("{:?}", error),
            "WrongDevice { expected: 211, found: 104 }"
        );
    }

    #[test]
    fn display_names_the_failure() {
        assert_eq!(
            format!("{}", Error::<u8>::Transport(7)),
            "bus transaction failed: 7"
        );
        let state: Error<u8> = Error::InvalidState {
            state: RunState::Idle,
        };
        assert_eq!(format!("{}", state), "operation not allowed in state Idle");
        let full: Error<u8> = Error::CapacityExceeded {
            index: 40,
            capacity: 40,
        };
        assert_eq!(
            format!("{}", full),
            "sample index 40 exceeds window capacity 40"
        );
    }
}

//! Recoverable transmit errors.
//!
//! Configuration defects (registry full, duplicate channel, bad data length) are not represented
//! here: they halt through `fatal!` instead of being returned.

use embedded_hal::can::ErrorKind;

/// Alias for Result<T, Error<E>>.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// No transmit mailbox became free before the timeout expired.
    MailboxFull,
    /// The controller refused the frame.
    Rejected(E),
}

impl<E> embedded_hal::can::Error for Error<E>
where
    E: embedded_hal::can::Error,
{
    fn kind(&self) -> ErrorKind {
        match self {
            Error::MailboxFull => ErrorKind::Other,
            Error::Rejected(e) => e.kind(),
        }
    }
}

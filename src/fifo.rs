use embedded_hal::can::StandardId;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Receive FIFO of a controller. Each controller has two, each with its own interrupt.
#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RxFifo {
    Fifo0 = 0,
    Fifo1 = 1,
}

impl RxFifo {
    pub const ALL: [RxFifo; 2] = [RxFifo::Fifo0, RxFifo::Fifo1];
}

/// How a channel's acceptance filter picks the FIFO its frames land in.
///
/// Decided once at registration and never revisited.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoPolicy {
    /// Odd receive identifiers go to FIFO0, even ones to FIFO1.
    RxIdParity,
    /// Every channel uses the same FIFO.
    Fixed(RxFifo),
}

impl FifoPolicy {
    pub fn fifo_for(self, rx_id: StandardId) -> RxFifo {
        match self {
            FifoPolicy::RxIdParity => {
                if rx_id.as_raw() & 1 == 1 {
                    RxFifo::Fifo0
                } else {
                    RxFifo::Fifo1
                }
            }
            FifoPolicy::Fixed(fifo) => fifo,
        }
    }

    /// FIFO for the accept-all element a controller falls back to once its filter slots run out.
    pub fn shared_fifo(self) -> RxFifo {
        match self {
            FifoPolicy::RxIdParity => RxFifo::Fifo0,
            FifoPolicy::Fixed(fifo) => fifo,
        }
    }
}

impl Default for FifoPolicy {
    fn default() -> Self {
        FifoPolicy::RxIdParity
    }
}

//! Hardware boundary: the capability set a vendor FDCAN driver exposes to the service.

use embedded_hal::can::StandardId;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::fifo::RxFifo;
use crate::filter::{FilterConfig, GlobalFilter};
use crate::message::{RxFrame, TxHeader};

/// Number of physical FDCAN controllers the service drives.
pub const CONTROLLER_COUNT: usize = 2;

/// One of the two physical FDCAN peripherals.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Controller {
    Can1 = 0,
    Can2 = 1,
}

impl Controller {
    pub const ALL: [Controller; CONTROLLER_COUNT] = [Controller::Can1, Controller::Can2];

    pub(crate) fn index(self) -> usize {
        u8::from(self) as usize
    }
}

/// Peripheral driver for a single FDCAN controller.
///
/// Implemented by the board support layer on top of the vendor HAL. The service never touches
/// registers itself; every hardware interaction goes through this trait.
pub trait FdCan {
    type Error: embedded_hal::can::Error;

    /// Sets the policy for frames that match no acceptance filter, and for remote frames.
    ///
    /// Called while the controller is still in configuration mode.
    fn configure_global_filter(&mut self, filter: &GlobalFilter);

    /// Leaves configuration mode and joins the bus.
    fn start(&mut self);

    /// Enables the "new message" interrupt of one receive FIFO.
    fn enable_fifo_interrupt(&mut self, fifo: RxFifo);

    /// Installs one acceptance filter element.
    fn configure_filter(&mut self, filter: &FilterConfig);

    /// Number of transmit mailboxes currently free.
    fn tx_free_level(&self) -> u8;

    /// Queues a frame into a free transmit mailbox. `data` holds exactly `header.data_length()`
    /// bytes.
    fn add_tx_message(
        &mut self,
        header: &TxHeader,
        id: StandardId,
        data: &[u8],
    ) -> Result<(), Self::Error>;

    /// Number of frames pending in a receive FIFO.
    fn rx_fill_level(&self, fifo: RxFifo) -> u8;

    /// Pops the oldest frame from a receive FIFO. `WouldBlock` if the FIFO is empty.
    fn get_rx_message(&mut self, fifo: RxFifo) -> nb::Result<RxFrame, Self::Error>;
}

//! Transmit path.

use embedded_hal::timer::CountDown;

use crate::can::FdCan;
use crate::channel::ChannelHandle;
use crate::error::{Error, Result};
use crate::message::MAX_DATA_LENGTH;
use crate::registry::Registry;

impl<P, const N: usize> Registry<P, N>
where
    P: FdCan,
{
    /// Sends the channel's transmit buffer, waiting at most `timeout` for a free mailbox.
    ///
    /// This spins. `timeout` must be shorter than the period of the calling task, or the wait
    /// will eat into the task's next slot. Failures are not retried here; the caller decides
    /// whether the frame is still worth sending.
    pub fn transmit<T>(
        &mut self,
        handle: ChannelHandle,
        timer: &mut T,
        timeout: T::Time,
    ) -> Result<(), P::Error>
    where
        T: CountDown,
    {
        timer.start(timeout);
        loop {
            match self.try_transmit(handle) {
                Ok(()) => return Ok(()),
                Err(nb::Error::Other(e)) => return Err(e),
                Err(nb::Error::WouldBlock) => {}
            }
            if timer.wait().is_ok() {
                self.busy_count = self.busy_count.wrapping_add(1);
                warn!(
                    "[fdcan] mailbox full, frame dropped. busy count: {}",
                    self.busy_count
                );
                return Err(Error::MailboxFull);
            }
        }
    }

    /// Single attempt at queuing the channel's frame. `WouldBlock` while every mailbox is taken.
    pub fn try_transmit(&mut self, handle: ChannelHandle) -> nb::Result<(), Error<P::Error>> {
        let slot = self.slot(handle);
        let channel = &self.channels[slot];
        let can = &mut self.controllers[channel.controller().index()];

        if can.tx_free_level() == 0 {
            return Err(nb::Error::WouldBlock);
        }

        match can.add_tx_message(&channel.tx_header, channel.tx_id(), channel.tx_data()) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.busy_count = self.busy_count.wrapping_add(1);
                warn!(
                    "[fdcan] controller rejected frame. busy count: {}",
                    self.busy_count
                );
                Err(nb::Error::Other(Error::Rejected(e)))
            }
        }
    }

    /// Sets how many bytes of the transmit buffer the channel sends, 1 to 8.
    ///
    /// Anything else means a caller bug or a stray write, and halts.
    pub fn set_data_length(&mut self, handle: ChannelHandle, length: u8) {
        if length == 0 || length > MAX_DATA_LENGTH {
            fatal!(
                "[fdcan] data length {} out of range, check the caller for a wild pointer",
                length
            );
        }
        let slot = self.slot(handle);
        self.channels[slot].tx_header.set_data_length(length);
    }

    /// Transmissions that failed on a full mailbox or a rejected frame, since boot.
    pub fn busy_count(&self) -> u32 {
        self.busy_count
    }
}

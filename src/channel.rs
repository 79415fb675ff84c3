use embedded_hal::can::StandardId;

use crate::can::Controller;
use crate::filter::FilterConfig;
use crate::message::{TxHeader, MAX_DATA_LENGTH};

const BUFFER_LEN: usize = MAX_DATA_LENGTH as usize;

/// Handler for frames addressed to a channel.
///
/// Runs synchronously in the FIFO interrupt, with the channel's receive buffer already filled.
/// Anything slow here delays every other channel on the bus, so implementations should copy the
/// data out and return.
///
/// The receiver is also the channel's back-reference to the module that owns it.
pub trait Receiver: Sync {
    fn on_frame(&self, channel: &Channel);
}

impl<F> Receiver for F
where
    F: Fn(&Channel) + Sync,
{
    fn on_frame(&self, channel: &Channel) {
        self(channel)
    }
}

/// What a module supplies to `Registry::register`.
#[derive(Clone, Copy)]
pub struct ChannelConfig {
    pub controller: Controller,
    pub tx_id: StandardId,
    pub rx_id: StandardId,
    pub receiver: Option<&'static dyn Receiver>,
}

/// Names a registered channel. Valid for the lifetime of the registry that issued it.
///
/// Handles are table slots. A handle from another registry halts if its slot is beyond this
/// registry's table, and names whatever channel sits in that slot otherwise.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelHandle(u8);

impl ChannelHandle {
    pub(crate) fn new(index: usize) -> Self {
        ChannelHandle(index as u8)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One module's endpoint on a controller.
pub struct Channel {
    controller: Controller,
    tx_id: StandardId,
    rx_id: StandardId,
    pub(crate) tx_header: TxHeader,
    tx_buff: [u8; BUFFER_LEN],
    rx_buff: [u8; BUFFER_LEN],
    rx_len: u8,
    pub(crate) receiver: Option<&'static dyn Receiver>,
    filter: FilterConfig,
}

impl Channel {
    pub(crate) fn new(config: ChannelConfig, filter: FilterConfig) -> Self {
        Self {
            controller: config.controller,
            tx_id: config.tx_id,
            rx_id: config.rx_id,
            tx_header: TxHeader::default(),
            tx_buff: [0; BUFFER_LEN],
            rx_buff: [0; BUFFER_LEN],
            rx_len: 0,
            receiver: config.receiver,
            filter,
        }
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    pub fn tx_id(&self) -> StandardId {
        self.tx_id
    }

    pub fn rx_id(&self) -> StandardId {
        self.rx_id
    }

    pub fn tx_header(&self) -> &TxHeader {
        &self.tx_header
    }

    /// The filter element installed for this channel at registration.
    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    /// Full transmit buffer. Only the first `tx_header().data_length()` bytes go on the bus.
    pub fn tx_buff(&self) -> &[u8; BUFFER_LEN] {
        &self.tx_buff
    }

    pub fn tx_buff_mut(&mut self) -> &mut [u8; BUFFER_LEN] {
        &mut self.tx_buff
    }

    /// Bytes that the next transmission will send.
    pub fn tx_data(&self) -> &[u8] {
        let len = (self.tx_header.data_length() as usize).min(BUFFER_LEN);
        &self.tx_buff[..len]
    }

    pub fn rx_buff(&self) -> &[u8; BUFFER_LEN] {
        &self.rx_buff
    }

    pub fn rx_len(&self) -> u8 {
        self.rx_len
    }

    /// Payload of the last frame delivered to this channel.
    pub fn rx_data(&self) -> &[u8] {
        &self.rx_buff[..self.rx_len as usize]
    }

    pub(crate) fn set_filter(&mut self, filter: FilterConfig) {
        self.filter = filter;
    }

    pub(crate) fn store_rx(&mut self, data: &[u8]) {
        let len = data.len().min(BUFFER_LEN);
        self.rx_buff[..len].copy_from_slice(&data[..len]);
        self.rx_len = len as u8;
    }
}

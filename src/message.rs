use core::convert::TryFrom;

use embedded_hal::can::{Frame, Id};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Largest payload of a classic CAN data frame.
pub const MAX_DATA_LENGTH: u8 = 8;

#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IdType {
    Standard = 0,
    Extended = 1,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrameType {
    Data = 0,
    Remote = 1,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorStateIndicator {
    Active = 0,
    Passive = 1,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BitRateSwitch {
    Off = 0,
    On = 1,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrameFormat {
    Classic = 0,
    Fd = 1,
}

/// Whether the controller records a transmit event once the frame is on the bus.
#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TxEventFifo {
    NoEvents = 0,
    StoreEvents = 1,
}

bitfield! {
    /// Transmit frame configuration of a channel, packed into one word.
    ///
    /// Field order follows the FDCAN Tx buffer element so drivers can copy the flags over
    /// without reshuffling.
    #[derive(Clone, Copy, Eq, PartialEq)]
    pub struct TxHeader(u32);
    impl Debug;
    u8;
    pub data_length, _: 3, 0;
    _, _set_data_length: 3, 0;
    _xtd, _set_xtd: 4, 4;
    _rtr, _set_rtr: 5, 5;
    _esi, _set_esi: 6, 6;
    _brs, _set_brs: 7, 7;
    _fdf, _set_fdf: 8, 8;
    _efc, _set_efc: 9, 9;
    pub marker, set_marker: 23, 16;
}

impl TxHeader {
    pub fn id_type(&self) -> IdType {
        match IdType::try_from(self._xtd()) {
            Ok(val) => val,
            Err(_) => IdType::Standard,
        }
    }

    pub fn set_id_type(&mut self, id_type: IdType) {
        self._set_xtd(id_type.into());
    }

    pub fn frame_type(&self) -> FrameType {
        match FrameType::try_from(self._rtr()) {
            Ok(val) => val,
            Err(_) => FrameType::Data,
        }
    }

    pub fn set_frame_type(&mut self, frame_type: FrameType) {
        self._set_rtr(frame_type.into());
    }

    pub fn error_state(&self) -> ErrorStateIndicator {
        match ErrorStateIndicator::try_from(self._esi()) {
            Ok(val) => val,
            Err(_) => ErrorStateIndicator::Active,
        }
    }

    pub fn set_error_state(&mut self, esi: ErrorStateIndicator) {
        self._set_esi(esi.into());
    }

    pub fn bit_rate_switch(&self) -> BitRateSwitch {
        match BitRateSwitch::try_from(self._brs()) {
            Ok(val) => val,
            Err(_) => BitRateSwitch::Off,
        }
    }

    pub fn set_bit_rate_switch(&mut self, brs: BitRateSwitch) {
        self._set_brs(brs.into());
    }

    pub fn frame_format(&self) -> FrameFormat {
        match FrameFormat::try_from(self._fdf()) {
            Ok(val) => val,
            Err(_) => FrameFormat::Classic,
        }
    }

    pub fn set_frame_format(&mut self, format: FrameFormat) {
        self._set_fdf(format.into());
    }

    pub fn tx_event_fifo(&self) -> TxEventFifo {
        match TxEventFifo::try_from(self._efc()) {
            Ok(val) => val,
            Err(_) => TxEventFifo::NoEvents,
        }
    }

    pub fn set_tx_event_fifo(&mut self, efc: TxEventFifo) {
        self._set_efc(efc.into());
    }

    /// Range checking is the caller's job; see `Registry::set_data_length`.
    pub(crate) fn set_data_length(&mut self, length: u8) {
        self._set_data_length(length);
    }
}

impl Default for TxHeader {
    /// Standard identifier, data frame, 8 bytes, error active, no bit rate switch, classic
    /// format, no transmit events, marker 0.
    fn default() -> Self {
        let mut header = TxHeader(0);
        header.set_id_type(IdType::Standard);
        header.set_frame_type(FrameType::Data);
        header.set_data_length(MAX_DATA_LENGTH);
        header.set_error_state(ErrorStateIndicator::Active);
        header.set_bit_rate_switch(BitRateSwitch::Off);
        header.set_frame_format(FrameFormat::Classic);
        header.set_tx_event_fifo(TxEventFifo::NoEvents);
        header.set_marker(0);
        header
    }
}

/// A frame popped from a receive FIFO.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RxFrame {
    id: Id,
    remote: bool,
    len: u8,
    data: [u8; MAX_DATA_LENGTH as usize],
}

impl Frame for RxFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_DATA_LENGTH as usize {
            return None;
        }
        let mut buf = [0; MAX_DATA_LENGTH as usize];
        buf[..data.len()].copy_from_slice(data);
        Some(RxFrame {
            id: id.into(),
            remote: false,
            len: data.len() as u8,
            data: buf,
        })
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_DATA_LENGTH as usize {
            return None;
        }
        Some(RxFrame {
            id: id.into(),
            remote: true,
            len: dlc as u8,
            data: [0; MAX_DATA_LENGTH as usize],
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.len as usize
    }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..self.len as usize]
        }
    }
}

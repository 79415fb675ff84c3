//! Acceptance filter allocation.
//!
//! Filter slots are scarce and never reclaimed: every registration takes the next free slot of
//! its controller's half of the pool, so the layout is fully determined by registration order.
//! Once a half is used up, its last slot is rewritten to accept every standard identifier and is
//! shared by all later channels of that controller. Dispatch drops what no channel claims, so
//! the wider filter only costs interrupt time.

use embedded_hal::can::StandardId;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::can::{Controller, CONTROLLER_COUNT};
use crate::fifo::{FifoPolicy, RxFifo};
use crate::message::IdType;
use crate::settings::Settings;

/// Mask with every standard identifier bit significant.
pub const STANDARD_ID_MASK: u16 = 0x7FF;

/// Mask with no bit significant: the element accepts any standard identifier.
pub const ACCEPT_ALL_MASK: u16 = 0;

#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FilterType {
    /// Accepts identifiers where `received & mask == id & mask`. Encoded as in the SFT field.
    Mask = 2,
}

/// What the controller does with a frame no filter element accepts.
#[derive(Debug, Clone, Copy, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NonMatching {
    AcceptInFifo0 = 0,
    AcceptInFifo1 = 1,
    Reject = 2,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalFilter {
    pub non_matching_standard: NonMatching,
    pub non_matching_extended: NonMatching,
    pub reject_remote_standard: bool,
    pub reject_remote_extended: bool,
}

impl GlobalFilter {
    /// Only frames accepted by an installed filter element reach a FIFO; remote frames never do.
    pub const REJECT_UNMATCHED: GlobalFilter = GlobalFilter {
        non_matching_standard: NonMatching::Reject,
        non_matching_extended: NonMatching::Reject,
        reject_remote_standard: true,
        reject_remote_extended: true,
    };
}

/// One acceptance filter element, as handed to `FdCan::configure_filter`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FilterConfig {
    /// Slot in the shared filter pool.
    pub index: u8,
    pub id_type: IdType,
    pub filter_type: FilterType,
    pub id: StandardId,
    pub mask: u16,
    pub fifo: RxFifo,
}

/// Outcome of one filter assignment.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Assignment {
    /// A fresh slot holding an exact-match element.
    Exact(FilterConfig),
    /// The half just ran out. Its last slot becomes the accept-all element, shared by the
    /// channel that held it and every later one.
    Widened(FilterConfig),
    /// The accept-all element is already installed.
    Shared(FilterConfig),
}

impl Assignment {
    pub(crate) fn filter(&self) -> FilterConfig {
        match *self {
            Assignment::Exact(f) | Assignment::Widened(f) | Assignment::Shared(f) => f,
        }
    }
}

pub(crate) struct FilterAllocator {
    next: [u8; CONTROLLER_COUNT],
    shared: [Option<FilterConfig>; CONTROLLER_COUNT],
    per_controller: u8,
    policy: FifoPolicy,
}

impl FilterAllocator {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            next: [0; CONTROLLER_COUNT],
            shared: [None; CONTROLLER_COUNT],
            per_controller: settings.filters_per_controller,
            policy: settings.fifo_policy,
        }
    }

    /// Takes the next slot of `controller`'s half, or falls back to that half's accept-all slot.
    pub(crate) fn assign(&mut self, controller: Controller, rx_id: StandardId) -> Assignment {
        let c = controller.index();
        let base = c as u8 * self.per_controller;

        if let Some(filter) = self.shared[c] {
            return Assignment::Shared(filter);
        }

        if self.next[c] < self.per_controller {
            let index = base + self.next[c];
            self.next[c] += 1;
            return Assignment::Exact(FilterConfig {
                index,
                id_type: IdType::Standard,
                filter_type: FilterType::Mask,
                id: rx_id,
                mask: STANDARD_ID_MASK,
                fifo: self.policy.fifo_for(rx_id),
            });
        }

        let filter = FilterConfig {
            index: base + self.per_controller - 1,
            id_type: IdType::Standard,
            filter_type: FilterType::Mask,
            id: rx_id,
            mask: ACCEPT_ALL_MASK,
            fifo: self.policy.shared_fifo(),
        };
        self.shared[c] = Some(filter);
        Assignment::Widened(filter)
    }
}

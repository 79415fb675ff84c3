//! The channel table and service bring-up.

use embedded_hal::can::StandardId;
use heapless::{FnvIndexMap, Vec};

use crate::can::{Controller, FdCan, CONTROLLER_COUNT};
use crate::channel::{Channel, ChannelConfig, ChannelHandle};
use crate::fifo::RxFifo;
use crate::filter::{Assignment, FilterAllocator, GlobalFilter};
use crate::settings::{Settings, FILTER_POOL_SIZE};

/// Default registry capacity. Bounded by bus load more than by memory.
pub const MAX_CHANNELS: usize = 16;

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub(crate) struct ChannelKey {
    controller: Controller,
    rx_id: u16,
}

impl ChannelKey {
    pub(crate) fn new(controller: Controller, rx_id: StandardId) -> Self {
        Self {
            controller,
            rx_id: rx_id.as_raw(),
        }
    }
}

/// Owns both controllers and every registered channel.
///
/// Channels are added once at boot and live as long as the registry. `N` is the channel
/// capacity; it must be a power of two.
pub struct Registry<P, const N: usize = MAX_CHANNELS> {
    pub(crate) controllers: [P; CONTROLLER_COUNT],
    pub(crate) channels: Vec<Channel, N>,
    index: FnvIndexMap<ChannelKey, u8, N>,
    filters: FilterAllocator,
    started: bool,
    pub(crate) busy_count: u32,
}

impl<P, const N: usize> Registry<P, N>
where
    P: FdCan,
{
    /// Takes both controllers, still in configuration mode. Nothing is written to the hardware
    /// until the first registration.
    pub fn new(can1: P, can2: P, settings: Settings) -> Self {
        if !settings.is_valid() {
            fatal!(
                "[fdcan] {} filters per controller does not fit a pool of {}",
                settings.filters_per_controller,
                FILTER_POOL_SIZE
            );
        }
        if N > u8::MAX as usize + 1 {
            fatal!("[fdcan] registry capacity {} too large", N);
        }

        Self {
            controllers: [can1, can2],
            channels: Vec::new(),
            index: FnvIndexMap::new(),
            filters: FilterAllocator::new(&settings),
            started: false,
            busy_count: 0,
        }
    }

    /// Registers a channel and installs its acceptance filter.
    ///
    /// The first call starts both controllers. A full registry or a receive identifier already
    /// taken on the same controller is a firmware composition error and halts. A controller out
    /// of exact filter slots falls back to a shared accept-all slot, with a warning.
    pub fn register(&mut self, config: ChannelConfig) -> ChannelHandle {
        if !self.started {
            self.bring_up();
            info!("[fdcan] service started");
        }

        if self.channels.is_full() {
            fatal!(
                "[fdcan] more than {} channels, balance the load across controllers",
                N
            );
        }

        let key = ChannelKey::new(config.controller, config.rx_id);
        if self.index.contains_key(&key) {
            fatal!(
                "[fdcan] rx id {:#x} already registered on {:?} (tx id {:#x})",
                config.rx_id.as_raw(),
                config.controller,
                config.tx_id.as_raw()
            );
        }

        let assignment = self.filters.assign(config.controller, config.rx_id);
        let filter = assignment.filter();
        match assignment {
            Assignment::Exact(_) => {
                self.controllers[config.controller.index()].configure_filter(&filter);
            }
            Assignment::Widened(_) => {
                warn!(
                    "[fdcan] {:?} out of filter slots, slot {} now accepts every standard id",
                    config.controller,
                    filter.index
                );
                self.controllers[config.controller.index()].configure_filter(&filter);
                for channel in self.channels.iter_mut() {
                    if channel.controller() == config.controller
                        && channel.filter().index == filter.index
                    {
                        channel.set_filter(filter);
                    }
                }
            }
            Assignment::Shared(_) => {}
        }

        let slot = self.channels.len();
        let stored = self.channels.push(Channel::new(config, filter)).is_ok()
            && self.index.insert(key, slot as u8).is_ok();
        if !stored {
            fatal!("[fdcan] channel table and index out of step");
        }

        ChannelHandle::new(slot)
    }

    /// Applies the global filter policy, starts both controllers and enables the "new message"
    /// interrupt of all four FIFOs.
    fn bring_up(&mut self) {
        for can in self.controllers.iter_mut() {
            can.configure_global_filter(&GlobalFilter::REJECT_UNMATCHED);
            can.start();
            for fifo in RxFifo::ALL {
                can.enable_fifo_interrupt(fifo);
            }
        }
        self.started = true;
    }

    pub(crate) fn find(&self, controller: Controller, rx_id: StandardId) -> Option<usize> {
        self.index
            .get(&ChannelKey::new(controller, rx_id))
            .map(|&slot| slot as usize)
    }

    /// Table slot of `handle`. A handle this registry never issued halts.
    pub(crate) fn slot(&self, handle: ChannelHandle) -> usize {
        let slot = handle.index();
        if slot >= self.channels.len() {
            fatal!(
                "[fdcan] handle {} not issued by this registry ({} channels)",
                slot,
                self.channels.len()
            );
        }
        slot
    }

    pub fn channel(&self, handle: ChannelHandle) -> &Channel {
        &self.channels[self.slot(handle)]
    }

    pub fn channel_mut(&mut self, handle: ChannelHandle) -> &mut Channel {
        let slot = self.slot(handle);
        &mut self.channels[slot]
    }

    /// Registered channels, in registration order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    /// Whether bring-up has run.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn controller(&self, controller: Controller) -> &P {
        &self.controllers[controller.index()]
    }

    pub fn controller_mut(&mut self, controller: Controller) -> &mut P {
        &mut self.controllers[controller.index()]
    }

    /// Releases both controllers. Every handle issued by this registry becomes meaningless.
    pub fn free(self) -> (P, P) {
        let [can1, can2] = self.controllers;
        (can1, can2)
    }
}

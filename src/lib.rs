//! Channel registry and receive dispatch for a pair of FDCAN controllers.
//!
//! Firmware modules each register a logical channel: a controller, a transmit identifier, a
//! receive identifier and a [`Receiver`]. Registration hands out acceptance filters and FIFOs
//! from the fixed hardware pool; the FIFO interrupt handlers call
//! [`Registry::on_fifo_pending`], which routes each frame to the channel that owns its
//! identifier.
//!
//! The hardware itself sits behind the [`FdCan`] trait, so the service works on top of any
//! vendor driver.
//!
//! ```ignore
//! static REGISTRY: Mutex<RefCell<Option<Registry<BoardCan>>>> = Mutex::new(RefCell::new(None));
//!
//! fn on_motor_frame(channel: &Channel) {
//!     MOTOR_FEEDBACK.store(channel.rx_data()[0], Ordering::Relaxed);
//! }
//!
//! let mut registry = Registry::new(can1, can2, Settings::default());
//! let motor = registry.register(ChannelConfig {
//!     controller: Controller::Can1,
//!     tx_id: StandardId::new(0x201).unwrap(),
//!     rx_id: StandardId::new(0x101).unwrap(),
//!     receiver: Some(&on_motor_frame),
//! });
//! critical_section::with(|cs| REGISTRY.borrow(cs).replace(Some(registry)));
//!
//! #[interrupt]
//! fn FDCAN1_IT0() {
//!     critical_section::with(|cs| {
//!         if let Some(registry) = REGISTRY.borrow(cs).borrow_mut().as_mut() {
//!             registry.on_fifo_pending(Controller::Can1, RxFifo::Fifo0);
//!         }
//!     });
//! }
//! ```
//!
//! # Feature flags
//!
//! * `defmt`: log through `defmt` and derive `defmt::Format` for public types.
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate bitfield;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod can;
pub mod channel;
pub mod error;
pub mod fifo;
pub mod filter;
pub mod message;
pub mod registry;
mod rx;
pub mod settings;
mod tx;

pub use can::{Controller, FdCan};
pub use channel::{Channel, ChannelConfig, ChannelHandle, Receiver};
pub use error::Error;
pub use fifo::{FifoPolicy, RxFifo};
pub use message::{RxFrame, TxHeader};
pub use registry::{Registry, MAX_CHANNELS};
pub use settings::Settings;

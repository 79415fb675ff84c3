use crate::fifo::FifoPolicy;

/// Acceptance filter slots in the shared pool, split evenly between the two controllers.
pub const FILTER_POOL_SIZE: u8 = 28;

/// Service-wide configuration, fixed when the registry is created.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Filter slots reserved for each controller. Controller 1 uses `0..n`, controller 2 uses
    /// `n..2n`. Valid range: 1 to `FILTER_POOL_SIZE / 2`.
    pub filters_per_controller: u8,
    pub fifo_policy: FifoPolicy,
}

impl Settings {
    pub(crate) fn is_valid(&self) -> bool {
        self.filters_per_controller > 0 && self.filters_per_controller <= FILTER_POOL_SIZE / 2
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            filters_per_controller: FILTER_POOL_SIZE / 2,
            fifo_policy: FifoPolicy::default(),
        }
    }
}

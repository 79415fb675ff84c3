#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use embedded_hal::can::{ErrorKind, Frame, StandardId};
use embedded_hal::timer::CountDown;
use fdcan_service::filter::{FilterConfig, GlobalFilter};
use fdcan_service::{Channel, FdCan, Receiver, Registry, RxFifo, RxFrame, Settings, TxHeader};

/// Fake monotonic time, in ticks. Every mailbox poll moves it forward by one tick.
#[derive(Clone, Default)]
pub struct Clock(Rc<Cell<u64>>);

impl Clock {
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    fn tick(&self) {
        self.0.set(self.0.get() + 1);
    }
}

pub struct MockTimer {
    clock: Clock,
    deadline: u64,
}

impl MockTimer {
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
            deadline: 0,
        }
    }
}

impl CountDown for MockTimer {
    type Time = u64;

    fn start<T>(&mut self, count: T)
    where
        T: Into<Self::Time>,
    {
        self.deadline = self.clock.now() + count.into();
    }

    fn wait(&mut self) -> nb::Result<(), void::Void> {
        if self.clock.now() >= self.deadline {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MockError;

impl embedded_hal::can::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    GlobalFilter(GlobalFilter),
    Start,
    EnableInterrupt(RxFifo),
    Filter(FilterConfig),
    Tx {
        header: TxHeader,
        id: u16,
        data: Vec<u8>,
    },
}

pub struct MockCan {
    pub ops: Vec<Op>,
    pub free_mailboxes: u8,
    /// Clock reading at which one more mailbox frees up, as when the bus drains a frame.
    pub frees_at: Option<u64>,
    pub reject: bool,
    pub fail_reads: bool,
    fifos: [VecDeque<RxFrame>; 2],
    clock: Clock,
}

impl MockCan {
    pub fn new(clock: &Clock) -> Self {
        Self {
            ops: Vec::new(),
            free_mailboxes: 3,
            frees_at: None,
            reject: false,
            fail_reads: false,
            fifos: [VecDeque::new(), VecDeque::new()],
            clock: clock.clone(),
        }
    }

    pub fn push_rx(&mut self, fifo: RxFifo, frame: RxFrame) {
        self.fifos[u8::from(fifo) as usize].push_back(frame);
    }

    pub fn pending(&self, fifo: RxFifo) -> usize {
        self.fifos[u8::from(fifo) as usize].len()
    }

    fn freed(&self) -> u8 {
        match self.frees_at {
            Some(at) if self.clock.now() >= at => 1,
            _ => 0,
        }
    }

    pub fn filters(&self) -> Vec<FilterConfig> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Filter(filter) => Some(*filter),
                _ => None,
            })
            .collect()
    }

    pub fn sent(&self) -> Vec<(u16, Vec<u8>)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Tx { id, data, .. } => Some((*id, data.clone())),
                _ => None,
            })
            .collect()
    }
}

impl FdCan for MockCan {
    type Error = MockError;

    fn configure_global_filter(&mut self, filter: &GlobalFilter) {
        self.ops.push(Op::GlobalFilter(*filter));
    }

    fn start(&mut self) {
        self.ops.push(Op::Start);
    }

    fn enable_fifo_interrupt(&mut self, fifo: RxFifo) {
        self.ops.push(Op::EnableInterrupt(fifo));
    }

    fn configure_filter(&mut self, filter: &FilterConfig) {
        self.ops.push(Op::Filter(*filter));
    }

    fn tx_free_level(&self) -> u8 {
        self.clock.tick();
        self.free_mailboxes + self.freed()
    }

    fn add_tx_message(
        &mut self,
        header: &TxHeader,
        id: StandardId,
        data: &[u8],
    ) -> Result<(), MockError> {
        if self.reject {
            return Err(MockError);
        }
        if self.freed() > 0 {
            self.frees_at = None;
        } else {
            self.free_mailboxes = self.free_mailboxes.saturating_sub(1);
        }
        self.ops.push(Op::Tx {
            header: *header,
            id: id.as_raw(),
            data: data.to_vec(),
        });
        Ok(())
    }

    fn rx_fill_level(&self, fifo: RxFifo) -> u8 {
        self.pending(fifo) as u8
    }

    fn get_rx_message(&mut self, fifo: RxFifo) -> nb::Result<RxFrame, MockError> {
        if self.fail_reads {
            return Err(nb::Error::Other(MockError));
        }
        self.fifos[u8::from(fifo) as usize]
            .pop_front()
            .ok_or(nb::Error::WouldBlock)
    }
}

pub fn id(raw: u16) -> StandardId {
    StandardId::new(raw).unwrap()
}

pub fn frame(raw_id: u16, data: &[u8]) -> RxFrame {
    RxFrame::new(id(raw_id), data).unwrap()
}

pub fn registry(clock: &Clock) -> Registry<MockCan> {
    registry_with(clock, Settings::default())
}

pub fn registry_with(clock: &Clock, settings: Settings) -> Registry<MockCan> {
    Registry::new(MockCan::new(clock), MockCan::new(clock), settings)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub receiver: &'static str,
    pub rx_id: u16,
    pub rx_len: u8,
    pub data: Vec<u8>,
}

pub type Log = Arc<Mutex<Vec<Delivery>>>;

struct Recorder {
    name: &'static str,
    log: Log,
}

impl Receiver for Recorder {
    fn on_frame(&self, channel: &Channel) {
        self.log.lock().unwrap().push(Delivery {
            receiver: self.name,
            rx_id: channel.rx_id().as_raw(),
            rx_len: channel.rx_len(),
            data: channel.rx_data().to_vec(),
        });
    }
}

/// A receiver that appends every delivery to `log`, leaked to get a `'static` reference.
pub fn recorder(name: &'static str, log: &Log) -> &'static dyn Receiver {
    Box::leak(Box::new(Recorder {
        name,
        log: log.clone(),
    }))
}

//! Interrupt-time receive dispatch.

use embedded_hal::can::{Frame, Id};

use crate::can::{Controller, FdCan};
use crate::fifo::RxFifo;
use crate::message::RxFrame;
use crate::registry::Registry;

impl<P, const N: usize> Registry<P, N>
where
    P: FdCan,
{
    /// Drains one receive FIFO and hands every frame to the channel that owns its identifier.
    ///
    /// Call from the "new message" interrupt of `fifo` on `controller`. Frames come out in FIFO
    /// order; the two FIFOs of a controller are independent. Frames no channel claims are
    /// dropped without a trace. Returns the number of frames popped.
    pub fn on_fifo_pending(&mut self, controller: Controller, fifo: RxFifo) -> usize {
        let mut popped = 0;
        while self.controllers[controller.index()].rx_fill_level(fifo) > 0 {
            let frame = match self.controllers[controller.index()].get_rx_message(fifo) {
                Ok(frame) => frame,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(_)) => {
                    warn!("[fdcan] {:?} {:?} read failed", controller, fifo);
                    break;
                }
            };
            popped += 1;
            self.dispatch(controller, &frame);
        }
        popped
    }

    fn dispatch(&mut self, controller: Controller, frame: &RxFrame) {
        let rx_id = match frame.id() {
            Id::Standard(id) => id,
            Id::Extended(_) => return,
        };
        let slot = match self.find(controller, rx_id) {
            Some(slot) => slot,
            None => return,
        };

        let channel = &mut self.channels[slot];
        if let Some(receiver) = channel.receiver {
            channel.store_rx(frame.data());
            receiver.on_frame(channel);
        }
    }
}

//! Fixed capacity queues bridging interrupt handlers and tasks.

mod channel;
mod ring;

pub use channel::Channel;
pub use ring::RingBuffer;

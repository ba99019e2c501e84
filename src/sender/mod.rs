//!
//! Multi-channel sender: read a source, protect it with FEC and dispatch the
//! packets over independently controlled UDP channels
//!

mod channel;
mod dispatcher;
mod observer;
mod reader;

pub use crate::fec::MaskType;
pub use channel::ChannelStats;
pub use dispatcher::ChannelDispatcher;
pub use dispatcher::Config;
pub use dispatcher::StartStatus;
pub use observer::Event;
pub use observer::PacketInfo;
pub use observer::Subscriber;
pub use reader::pacing_delay;
pub use crate::common::udpendpoint::UDPEndpoint;

//! # FECSIM - UDP Forward Error Correction sender
//!
//! Stream a file over several UDP/IP channels, protected by an XOR erasure code,
//! while simulating per-channel packet loss.
//!
//! The library is made of two layers
//!
//! - `fec`: packet mask tables, a group encoder, a group decoder and the 6-byte wire header
//! - `sender`: a dispatcher running one reader task and one worker task per channel
//!
//! # FEC encoding
//!
//! Every `k` media payloads close a group and produce `r` redundancy packets.
//! Each redundancy packet is the XOR of the media packets selected by its mask row.
//!
//!```rust
//! use fecsim::fec::{FecEncoder, MaskType};
//!
//! let mut encoder = FecEncoder::new(MaskType::Random);
//! for i in 0..4u8 {
//!     let packets = encoder.submit(&[i; 32], 4, 2).unwrap();
//!     if i < 3 {
//!         assert!(packets.is_empty());
//!     } else {
//!         // 4 media packets + 2 redundancy packets
//!         assert_eq!(packets.len(), 6);
//!     }
//! }
//!```
//!
//! # UDP/IP Multicast sender
//!
//!```rust,no_run
//! use fecsim::sender::{ChannelDispatcher, Config, UDPEndpoint};
//!
//! let config = Config::builder()
//!     .nb_channels(2)
//!     .k(10)
//!     .r(2)
//!     .destination(UDPEndpoint::new(None, "225.0.10.101".to_owned(), 5557))
//!     .build();
//!
//! let dispatcher = ChannelDispatcher::new(config).unwrap();
//! dispatcher.set_source_path("video.ts");
//! dispatcher.set_channel_enabled(0, true).unwrap();
//! dispatcher.set_channel_enabled(1, true).unwrap();
//! dispatcher.set_loss_rate(1, 0.05).unwrap();
//! dispatcher.start().unwrap();
//!
//! while !dispatcher.is_reader_finished() {
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//! dispatcher.stop();
//!```
//!
//! # Packet loss simulation
//!
//! Each channel owns a loss rate in [0, 1]. Workers discard a packet with that
//! probability before sending it. A disabled channel keeps its queue and resumes
//! in order once enabled again.
//!

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

mod common;
mod network;
mod tools;

pub mod fec;
pub mod sender;
pub use crate::tools::error;

/// Core module with low-level function
pub mod core {
    pub use crate::common::frame::MediaFrameHeader;
    pub use crate::common::frame::MediaFramer;
    pub use crate::common::udpendpoint::UDPEndpoint;
}

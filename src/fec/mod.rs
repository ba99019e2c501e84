//!
//! XOR forward error correction
//!
//! Media packets are grouped by `k`. When a group closes, `r` redundancy packets are
//! derived from a packet mask: redundancy packet `i` is the XOR of every media packet
//! whose bit is set in row `i`.
//!

mod decoder;
mod encoder;
mod masktable;
mod packet;
mod tables;

pub use decoder::FecReceiver;
pub use decoder::GroupDecoder;
pub use encoder::check_group_params;
pub use encoder::xor_payloads;
pub use encoder::EncoderStats;
pub use encoder::FecEncoder;
pub use masktable::is_protected;
pub use masktable::mask_size;
pub use masktable::MaskType;
pub use masktable::PacketMaskTable;
pub use masktable::MAX_FEC_PACKETS;
pub use masktable::MAX_MEDIA_PACKETS;
pub use masktable::MAX_TABLE_MEDIA_PACKETS;
pub use packet::Packet;
pub use packet::HEADER_SIZE;
pub use packet::MAX_DATA_SIZE;
pub use packet::MAX_PACKET_SIZE;

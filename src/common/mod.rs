pub mod frame;
pub mod udpendpoint;

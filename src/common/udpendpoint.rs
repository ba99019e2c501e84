use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// UDP Endpoint
#[derive(Debug, PartialEq, Deserialize, Serialize, Clone, Eq, Hash)]
pub struct UDPEndpoint {
    /// Local address the socket is bound to, any interface when `None`
    pub source_address: Option<String>,
    /// Network destination address (unicast or multicast ip)
    pub destination_group_address: String,
    /// port
    pub port: u16,
}

impl UDPEndpoint {
    /// Create a new UDP Endpoint
    pub fn new(src: Option<String>, dest: String, port: u16) -> Self {
        Self {
            source_address: src,
            destination_group_address: dest,
            port,
        }
    }

    /// Same endpoint with the port moved by `offset`
    pub fn with_port_offset(&self, offset: u16) -> Self {
        Self {
            port: self.port.wrapping_add(offset),
            ..self.clone()
        }
    }

    /// `address:port` of the destination
    pub fn destination(&self) -> String {
        match self.destination_group_address.contains(':') {
            // IPv6 literal
            true => format!("[{}]:{}", self.destination_group_address, self.port),
            false => format!("{}:{}", self.destination_group_address, self.port),
        }
    }

    /// `address:0` to bind the sending socket
    pub fn bind_address(&self) -> String {
        match self.source_address.as_deref() {
            Some(src) if src.contains(':') => format!("[{}]:0", src),
            Some(src) => format!("{}:0", src),
            None if self.destination_group_address.contains(':') => "[::]:0".to_owned(),
            None => "0.0.0.0:0".to_owned(),
        }
    }
}

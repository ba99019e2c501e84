use crate::tools::error::{FecSimError, Result};

/// Max number of payload bytes carried by one packet
pub const MAX_DATA_SIZE: usize = 2000;

/// Size of the FEC header placed in front of every payload
pub const HEADER_SIZE: usize = 6;

/// Max size of a serialized packet
pub const MAX_PACKET_SIZE: usize = HEADER_SIZE + MAX_DATA_SIZE;

///
/// FEC packet, the unit sent in one UDP datagram
///
/// ```text
/// bytes 0-1  packet_mask      u16 (big endian)
/// byte  2    group_number     u8
/// byte  3    sequence_number  u8
/// byte  4    k                u8
/// byte  5    r                u8
/// bytes 6..  payload          packet_size bytes
/// ```
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packet {
    /// Mask row used to build a redundancy packet, 0 on media packets
    pub packet_mask: u16,
    /// Group the packet belongs to, wraps at 256
    pub group_number: u8,
    /// 0..k-1 for media packets, k..k+r-1 for redundancy packets
    pub sequence_number: u8,
    /// Number of media packets of the group
    pub k: u8,
    /// Number of redundancy packets of the group
    pub r: u8,
    /// Payload, exactly `packet_size` bytes
    pub data: Vec<u8>,
}

impl Packet {
    /// True for redundancy packets
    pub fn is_fec(&self) -> bool {
        self.sequence_number >= self.k
    }

    /// Number of significant payload bytes
    pub fn packet_size(&self) -> usize {
        self.data.len()
    }

    /// Size of the serialized packet
    pub fn serialized_len(&self) -> usize {
        HEADER_SIZE + self.data.len()
    }

    ///
    /// Write the header and the payload to `buffer`.
    ///
    /// # Returns
    ///
    /// The number of bytes written, `HEADER_SIZE + packet_size`.
    /// Nothing is written when the buffer is too small or the payload exceeds `MAX_DATA_SIZE`.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<usize> {
        if self.data.len() > MAX_DATA_SIZE {
            return Err(FecSimError::new_kind(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Payload of {} bytes exceeds packet capacity {}",
                    self.data.len(),
                    MAX_DATA_SIZE
                ),
            ));
        }

        let total = self.serialized_len();
        if buffer.len() < total {
            return Err(FecSimError::new_kind(
                std::io::ErrorKind::WriteZero,
                format!("Buffer too small, needed {} got {}", total, buffer.len()),
            ));
        }

        buffer[0..2].copy_from_slice(&self.packet_mask.to_be_bytes());
        buffer[2] = self.group_number;
        buffer[3] = self.sequence_number;
        buffer[4] = self.k;
        buffer[5] = self.r;
        buffer[HEADER_SIZE..total].copy_from_slice(&self.data);
        Ok(total)
    }

    /// Serialize to a newly allocated buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.serialized_len()];
        self.serialize(&mut buffer)?;
        Ok(buffer)
    }

    ///
    /// Parse a datagram. The payload size is the datagram length minus the header.
    ///
    pub fn deserialize(buffer: &[u8]) -> Result<Packet> {
        if buffer.len() < HEADER_SIZE {
            return Err(FecSimError::new_kind(
                std::io::ErrorKind::InvalidData,
                format!("Datagram of {} bytes is shorter than the header", buffer.len()),
            ));
        }

        let payload = &buffer[HEADER_SIZE..];
        if payload.len() > MAX_DATA_SIZE {
            return Err(FecSimError::new_kind(
                std::io::ErrorKind::InvalidData,
                format!("Payload of {} bytes exceeds packet capacity", payload.len()),
            ));
        }

        Ok(Packet {
            packet_mask: u16::from_be_bytes([buffer[0], buffer[1]]),
            group_number: buffer[2],
            sequence_number: buffer[3],
            k: buffer[4],
            r: buffer[5],
            data: payload.to_vec(),
        })
    }
}

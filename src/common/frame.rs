//!
//! Framing placed by the producer in front of every source chunk.
//! The FEC engine treats it as opaque payload.
//!

use crate::tools::error::{FecSimError, Result};

///
/// Media frame header, 15 bytes, little endian
///
/// ```text
/// bytes 0-3    sys_word        u32  chunk counter, starts at 1
/// byte  4      id_word         u8   channel index
/// bytes 5-8    now_time        u32  milliseconds since the dispatcher started
/// byte  9      version         u8
/// byte  10     total_channels  u8
/// byte  11     which_channel   u8
/// byte  12     video_format    u8
/// bytes 13-14  payload_size    u16  bytes of chunk following the header
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MediaFrameHeader {
    /// Chunk counter
    pub sys_word: u32,
    /// Channel index
    pub id_word: u8,
    /// Milliseconds since start
    pub now_time: u32,
    /// Framing version
    pub version: u8,
    /// Number of channels of the dispatcher
    pub total_channels: u8,
    /// Channel carrying the chunk
    pub which_channel: u8,
    /// Format of the media carried
    pub video_format: u8,
    /// Length of the chunk
    pub payload_size: u16,
}

impl MediaFrameHeader {
    /// Size of the encoded header
    pub const SIZE: usize = 15;

    /// Framing version written by this crate
    pub const VERSION: u8 = 1;

    /// Append the header to `buffer`
    pub fn write(&self, buffer: &mut Vec<u8>) {
        buffer.extend(self.sys_word.to_le_bytes());
        buffer.push(self.id_word);
        buffer.extend(self.now_time.to_le_bytes());
        buffer.push(self.version);
        buffer.push(self.total_channels);
        buffer.push(self.which_channel);
        buffer.push(self.video_format);
        buffer.extend(self.payload_size.to_le_bytes());
    }

    /// Parse a header, return it with the chunk that follows
    pub fn parse(buffer: &[u8]) -> Result<(MediaFrameHeader, &[u8])> {
        if buffer.len() < Self::SIZE {
            return Err(FecSimError::new_kind(
                std::io::ErrorKind::InvalidData,
                format!("Media frame of {} bytes is too short", buffer.len()),
            ));
        }

        let header = MediaFrameHeader {
            sys_word: u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]),
            id_word: buffer[4],
            now_time: u32::from_le_bytes([buffer[5], buffer[6], buffer[7], buffer[8]]),
            version: buffer[9],
            total_channels: buffer[10],
            which_channel: buffer[11],
            video_format: buffer[12],
            payload_size: u16::from_le_bytes([buffer[13], buffer[14]]),
        };

        let end = Self::SIZE + header.payload_size as usize;
        if buffer.len() < end {
            return Err(FecSimError::new_kind(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Media frame announces {} bytes, {} available",
                    header.payload_size,
                    buffer.len() - Self::SIZE
                ),
            ));
        }

        Ok((header, &buffer[Self::SIZE..end]))
    }
}

///
/// Wrap source chunks into media frames
///
#[derive(Debug)]
pub struct MediaFramer {
    sys_word: u32,
    total_channels: u8,
    started: std::time::Instant,
    buffer: Vec<u8>,
}

impl MediaFramer {
    /// Create a framer for a dispatcher of `total_channels` channels
    pub fn new(total_channels: u8) -> Self {
        MediaFramer {
            sys_word: 1,
            total_channels,
            started: std::time::Instant::now(),
            buffer: Vec::new(),
        }
    }

    /// Frame a chunk sent on `channel`. The returned slice is valid until the next call
    pub fn frame(&mut self, channel: u8, chunk: &[u8]) -> Result<&[u8]> {
        let payload_size: u16 = chunk.len().try_into().map_err(|_| {
            FecSimError::invalid_input(format!("Chunk of {} bytes can't be framed", chunk.len()))
        })?;

        let header = MediaFrameHeader {
            sys_word: self.sys_word,
            id_word: channel,
            now_time: self.started.elapsed().as_millis() as u32,
            version: MediaFrameHeader::VERSION,
            total_channels: self.total_channels,
            which_channel: channel,
            video_format: 1,
            payload_size,
        };

        self.sys_word = self.sys_word.wrapping_add(1);
        self.buffer.clear();
        header.write(&mut self.buffer);
        self.buffer.extend_from_slice(chunk);
        Ok(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaFrameHeader, MediaFramer};

    #[test]
    pub fn test_frame_layout() {
        crate::tests::init();
        let mut framer = MediaFramer::new(3);
        let frame = framer.frame(2, &[0xaa, 0xbb]).unwrap().to_vec();
        assert_eq!(frame.len(), MediaFrameHeader::SIZE + 2);
        assert_eq!(&frame[0..5], &[1, 0, 0, 0, 2]);
        assert_eq!(&frame[9..15], &[1, 3, 2, 1, 2, 0]);

        let (header, chunk) = MediaFrameHeader::parse(&frame).unwrap();
        assert_eq!(header.sys_word, 1);
        assert_eq!(header.which_channel, 2);
        assert_eq!(chunk, &[0xaa, 0xbb]);

        let frame = framer.frame(0, &[1]).unwrap().to_vec();
        let (header, _) = MediaFrameHeader::parse(&frame).unwrap();
        assert_eq!(header.sys_word, 2);
    }

    #[test]
    pub fn test_padded_frame() {
        crate::tests::init();
        let mut framer = MediaFramer::new(1);
        let mut frame = framer.frame(0, &[7, 7, 7]).unwrap().to_vec();
        // FEC zero padding after the chunk
        frame.resize(64, 0);
        let (_, chunk) = MediaFrameHeader::parse(&frame).unwrap();
        assert_eq!(chunk, &[7, 7, 7]);
        assert!(MediaFrameHeader::parse(&frame[..10]).is_err());
    }
}

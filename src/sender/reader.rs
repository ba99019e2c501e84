use crate::tools::error::Result;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

///
/// Cut a byte stream into fixed-size chunks, the last one may be shorter
///
#[derive(Debug)]
pub struct ChunkReader<R: Read> {
    source: R,
    chunk: Vec<u8>,
    bytes_read: u64,
    exhausted: bool,
}

impl ChunkReader<std::io::BufReader<std::fs::File>> {
    /// Open a file
    pub fn open(path: &std::path::Path, chunk_size: usize) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(std::io::BufReader::new(file), chunk_size))
    }
}

impl<R: Read> ChunkReader<R> {
    /// Wrap a reader
    pub fn new(source: R, chunk_size: usize) -> Self {
        ChunkReader {
            source,
            chunk: vec![0; chunk_size],
            bytes_read: 0,
            exhausted: false,
        }
    }

    /// Total bytes returned so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// End of the source reached
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    ///
    /// Read the next chunk
    ///
    /// # Returns
    ///
    /// `None` at end of stream
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut len = 0;
        while len < self.chunk.len() {
            match self.source.read(&mut self.chunk[len..]) {
                Ok(0) => {
                    self.exhausted = true;
                    break;
                }
                Ok(n) => len += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if len == 0 {
            return Ok(None);
        }

        self.bytes_read += len as u64;
        Ok(Some(&self.chunk[..len]))
    }
}

///
/// Time needed to send `bytes` at `bitrate` bit/s
///
pub fn pacing_delay(bytes: usize, bitrate: u64) -> Duration {
    if bitrate == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros((bytes as u64 * 8 * 1_000_000) / bitrate)
}

///
/// Sleep `duration` in slices of at most `poll`, return early once `running` is false.
///
/// # Returns
///
/// The value of `running` when the sleep ends
pub fn sleep_while_running(running: &AtomicBool, duration: Duration, poll: Duration) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if !running.load(Ordering::Acquire) {
            return false;
        }

        let now = Instant::now();
        if now >= deadline {
            return true;
        }

        std::thread::sleep((deadline - now).min(poll));
    }
}

use super::channel::{ChannelContext, ChannelStats, SendPacket};
use super::observer::{Event, ObserverList, PacketInfo, Subscriber};
use super::reader::{self, ChunkReader};
use crate::common::frame::{MediaFrameHeader, MediaFramer};
use crate::common::udpendpoint::UDPEndpoint;
use crate::fec::{self, FecEncoder, MaskType, Packet, MAX_DATA_SIZE, MAX_PACKET_SIZE};
use crate::network::udpwriter::UdpWriter;
use crate::tools::error::{FecSimError, Result};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use typed_builder::TypedBuilder;

///
/// Configuration of the `ChannelDispatcher`
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct Config {
    /// Number of channels, one UDP socket and one worker each
    #[builder(default = 3)]
    pub nb_channels: usize,
    /// Media packets per FEC group
    #[builder(default = 10)]
    pub k: u8,
    /// Redundancy packets per FEC group
    #[builder(default = 2)]
    pub r: u8,
    /// Precomputed masks used for groups of at most 12 media packets
    #[builder(default)]
    pub mask_type: MaskType,
    /// Pacing bitrate of the source, in bit/s
    #[builder(default = 3_000_000)]
    pub target_bitrate: u64,
    /// Bytes read from the source for each media packet
    #[builder(default = 1009)]
    pub chunk_size: usize,
    /// Prefix every chunk with a `MediaFrameHeader`
    #[builder(default = true)]
    pub media_framing: bool,
    /// Destination of channel 0
    #[builder(default = UDPEndpoint::new(None, "225.0.10.101".to_owned(), 5557))]
    pub destination: UDPEndpoint,
    /// Channel `i` sends to `destination.port + i * port_stride`
    #[builder(default = 1)]
    pub port_stride: u16,
    /// Explicit destination of each channel, replaces `destination` and `port_stride`
    #[builder(default, setter(strip_option))]
    pub endpoints: Option<Vec<UDPEndpoint>>,
    /// Close the trailing partial group when the source is drained
    #[builder(default = true)]
    pub flush_trailing_group: bool,
    /// Upper bound of every blocking wait, the running flag is checked at least this often
    #[builder(default = Duration::from_millis(50))]
    pub poll_interval: Duration,
    /// Reader sleep while no channel is enabled
    #[builder(default = Duration::from_millis(5))]
    pub idle_sleep: Duration,
    /// Max time `stop()` waits for the tasks, late tasks are detached
    #[builder(default = Duration::from_secs(2))]
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl Config {
    /// Reject configurations the dispatcher can't run
    pub fn validate(&self) -> Result<()> {
        if self.nb_channels == 0 || self.nb_channels > u8::MAX as usize {
            return Err(FecSimError::invalid_input(format!(
                "Number of channels {} is outside 1..={}",
                self.nb_channels,
                u8::MAX
            )));
        }

        fec::check_group_params(self.k, self.r)?;

        if self.chunk_size == 0 {
            return Err(FecSimError::invalid_input("Chunk size can't be 0"));
        }

        if self.payload_size() > MAX_DATA_SIZE {
            return Err(FecSimError::invalid_input(format!(
                "Payload of {} bytes exceeds packet capacity {}",
                self.payload_size(),
                MAX_DATA_SIZE
            )));
        }

        if self.target_bitrate == 0 {
            return Err(FecSimError::invalid_input("Target bitrate can't be 0"));
        }

        if self.poll_interval.is_zero() {
            return Err(FecSimError::invalid_input("Poll interval can't be 0"));
        }

        if let Some(endpoints) = self.endpoints.as_ref() {
            if endpoints.len() != self.nb_channels {
                return Err(FecSimError::invalid_input(format!(
                    "{} endpoints for {} channels",
                    endpoints.len(),
                    self.nb_channels
                )));
            }
        }

        Ok(())
    }

    /// Size of the FEC payload built from a full chunk
    pub fn payload_size(&self) -> usize {
        match self.media_framing {
            true => self.chunk_size + MediaFrameHeader::SIZE,
            false => self.chunk_size,
        }
    }

    /// Destination of channel `index`
    pub fn endpoint(&self, index: usize) -> UDPEndpoint {
        match self.endpoints.as_ref().and_then(|e| e.get(index)) {
            Some(endpoint) => endpoint.clone(),
            None => self
                .destination
                .with_port_offset((index as u16).wrapping_mul(self.port_stride)),
        }
    }
}

/// Outcome of `ChannelDispatcher::start()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    /// Reader and workers have been spawned
    Started,
    /// A run is in progress, nothing done
    AlreadyRunning,
}

/// Number of reader and worker threads not yet returned
#[derive(Debug, Default)]
struct LiveTasks {
    count: Mutex<usize>,
    exited: Condvar,
}

impl LiveTasks {
    fn add(&self) {
        *self.count.lock() += 1;
    }

    fn remove(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        self.exited.notify_all();
    }

    /// Block until every task returned or `deadline` passed
    fn wait(&self, deadline: Instant) -> bool {
        let mut count = self.count.lock();
        while *count > 0 {
            if self.exited.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }
}

/// Held by a task for its whole life, released even on panic
struct TaskExit<'a>(&'a LiveTasks);

impl Drop for TaskExit<'_> {
    fn drop(&mut self) {
        self.0.remove();
    }
}

#[derive(Debug)]
struct Shared {
    config: Config,
    channels: Vec<ChannelContext>,
    running: AtomicBool,
    source_exhausted: AtomicBool,
    reader_finished: AtomicBool,
    live_tasks: LiveTasks,
    observers: ObserverList,
}

impl Shared {
    /// Next enabled channel from the round robin pointer, wrapping once
    fn select_channel(&self, round_robin: &mut usize) -> Option<usize> {
        let nb_channels = self.channels.len();
        for offset in 0..nb_channels {
            let index = (*round_robin + offset) % nb_channels;
            if self.channels[index].is_enabled() {
                *round_robin = (index + 1) % nb_channels;
                return Some(index);
            }
        }
        None
    }

    fn enqueue(&self, channel: usize, packets: &[Packet], next_id: &mut u64) {
        let first = match packets.first() {
            Some(first) => first,
            None => return,
        };

        let context = &self.channels[channel];
        for packet in packets {
            context.push(SendPacket {
                packet: packet.clone(),
                channel,
                id: *next_id,
                queued_at: Instant::now(),
            });
            *next_id += 1;
        }

        log::debug!(
            "Group {} ({} packets) queued on channel {}",
            first.group_number,
            packets.len(),
            channel
        );
        self.observers.dispatch(&Event::GroupEncoded {
            group_number: first.group_number,
            channel,
            nb_packets: packets.len(),
        });
    }
}

///
/// Feed a byte stream through the FEC encoder and fan the packets out to
/// independently enabled, independently lossy UDP channels.
///
/// One reader thread and one worker thread per channel run between `start()` and `stop()`.
///
#[derive(Debug)]
pub struct ChannelDispatcher {
    shared: Arc<Shared>,
    source_path: Mutex<Option<PathBuf>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ChannelDispatcher {
    ///
    /// Creation of a dispatcher. Channels start disabled and lossless.
    ///
    pub fn new(config: Config) -> Result<ChannelDispatcher> {
        config.validate()?;
        let channels = (0..config.nb_channels).map(ChannelContext::new).collect();

        Ok(ChannelDispatcher {
            shared: Arc::new(Shared {
                config,
                channels,
                running: AtomicBool::new(false),
                source_exhausted: AtomicBool::new(false),
                reader_finished: AtomicBool::new(false),
                live_tasks: LiveTasks::default(),
                observers: ObserverList::new(),
            }),
            source_path: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Number of channels
    pub fn nb_channels(&self) -> usize {
        self.shared.channels.len()
    }

    /// Add an observer
    pub fn subscribe(&self, s: Arc<dyn Subscriber>) {
        self.shared.observers.subscribe(s);
    }

    /// Remove an observer
    pub fn unsubscribe(&self, s: Arc<dyn Subscriber>) {
        self.shared.observers.unsubscribe(s);
    }

    /// Set the file read by the next `start()`
    pub fn set_source_path<P: AsRef<Path>>(&self, path: P) {
        let path = path.as_ref().to_path_buf();
        log::info!("Source set to {:?}", path);
        *self.source_path.lock() = Some(path);
    }

    /// File read by the next `start()`
    pub fn source_path(&self) -> Option<PathBuf> {
        self.source_path.lock().clone()
    }

    /// A run is in progress
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// The reader of the current run has drained the source
    pub fn is_source_exhausted(&self) -> bool {
        self.shared.source_exhausted.load(Ordering::Acquire)
    }

    ///
    /// The reader of the current run has exited, whether the source was drained,
    /// a read failed or the run was stopped.
    ///
    pub fn is_reader_finished(&self) -> bool {
        self.shared.reader_finished.load(Ordering::Acquire)
    }

    /// Packets waiting in every channel queue
    pub fn queued_packets(&self) -> usize {
        self.shared.channels.iter().map(|c| c.len()).sum()
    }

    /// Counters of every channel
    pub fn channel_stats(&self) -> Vec<ChannelStats> {
        self.shared.channels.iter().map(|c| c.stats()).collect()
    }

    /// Enabled state of a channel, `None` if out of range
    pub fn is_channel_enabled(&self, channel: usize) -> Option<bool> {
        self.shared.channels.get(channel).map(|c| c.is_enabled())
    }

    /// Loss rate of a channel, `None` if out of range
    pub fn loss_rate(&self, channel: usize) -> Option<f64> {
        self.shared.channels.get(channel).map(|c| c.loss_rate())
    }

    ///
    /// Enable or disable a channel.
    ///
    /// A disabled channel keeps its queued packets and sends them once enabled again.
    ///
    pub fn set_channel_enabled(&self, channel: usize, enabled: bool) -> Result<()> {
        let context = self.channel(channel)?;
        let previous = context.set_enabled(enabled);
        if previous != enabled {
            log::info!(
                "Channel {} {}",
                channel,
                if enabled { "enabled" } else { "disabled" }
            );
        }
        Ok(())
    }

    ///
    /// Set the probability to discard a packet of a channel.
    ///
    /// # Returns
    ///
    /// The stored rate, clamped to [0, 1]
    pub fn set_loss_rate(&self, channel: usize, rate: f64) -> Result<f64> {
        let context = self.channel(channel)?;
        let stored = context.set_loss_rate(rate);
        log::info!("Channel {} loss rate {}", channel, stored);
        Ok(stored)
    }

    fn channel(&self, channel: usize) -> Result<&ChannelContext> {
        self.shared.channels.get(channel).ok_or_else(|| {
            FecSimError::invalid_input(format!(
                "Channel {} out of range, {} channels",
                channel,
                self.shared.channels.len()
            ))
        })
    }

    ///
    /// Open the source and the sockets, then spawn the reader and the workers.
    ///
    /// On error nothing is left running and every socket already opened is closed.
    ///
    pub fn start(&self) -> Result<StartStatus> {
        let mut tasks = self.tasks.lock();
        if self.is_running() {
            log::warn!("Dispatcher already running, start ignored");
            return Ok(StartStatus::AlreadyRunning);
        }

        let path = self
            .source_path()
            .ok_or_else(|| FecSimError::invalid_input("No source path set, start ignored"))?;

        let source = ChunkReader::open(&path, self.shared.config.chunk_size)?;
        self.start_locked(source, &mut tasks, &format!("{:?}", path))
    }

    ///
    /// Same as `start()` with any byte stream in place of the source file.
    ///
    pub fn start_with_source<R: Read + Send + 'static>(&self, source: R) -> Result<StartStatus> {
        let mut tasks = self.tasks.lock();
        if self.is_running() {
            log::warn!("Dispatcher already running, start ignored");
            return Ok(StartStatus::AlreadyRunning);
        }

        let source = ChunkReader::new(source, self.shared.config.chunk_size);
        self.start_locked(source, &mut tasks, "stream")
    }

    fn start_locked<R: Read + Send + 'static>(
        &self,
        source: ChunkReader<R>,
        tasks: &mut Vec<JoinHandle<()>>,
        name: &str,
    ) -> Result<StartStatus> {
        let config = &self.shared.config;
        let writers = (0..config.nb_channels)
            .map(|index| UdpWriter::new(&config.endpoint(index)))
            .collect::<Result<Vec<_>>>()?;

        for channel in &self.shared.channels {
            let nb = channel.clear();
            if nb > 0 {
                log::debug!("Channel {} cleared {} stale packets", channel.index(), nb);
            }
        }

        self.shared.source_exhausted.store(false, Ordering::Release);
        self.shared.reader_finished.store(false, Ordering::Release);
        self.shared.running.store(true, Ordering::Release);

        if let Err(e) = self.spawn_tasks(source, writers, tasks) {
            self.stop_tasks(tasks);
            return Err(e);
        }

        log::info!(
            "Dispatcher started, source {} k={} r={} {} channels",
            name,
            config.k,
            config.r,
            config.nb_channels
        );
        self.shared.observers.dispatch(&Event::Started {
            nb_channels: config.nb_channels,
        });
        Ok(StartStatus::Started)
    }

    fn spawn_tasks<R: Read + Send + 'static>(
        &self,
        source: ChunkReader<R>,
        writers: Vec<UdpWriter>,
        tasks: &mut Vec<JoinHandle<()>>,
    ) -> Result<()> {
        let shared = self.shared.clone();
        self.spawn_task("fecsim-reader".to_owned(), tasks, move || {
            reader_task(shared, source)
        })?;

        for (index, writer) in writers.into_iter().enumerate() {
            let shared = self.shared.clone();
            self.spawn_task(format!("fecsim-channel-{}", index), tasks, move || {
                worker_task(shared, index, writer)
            })?;
        }
        Ok(())
    }

    fn spawn_task<F>(&self, name: String, tasks: &mut Vec<JoinHandle<()>>, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let shared = self.shared.clone();
        shared.live_tasks.add();
        let spawned = std::thread::Builder::new().name(name).spawn(move || {
            let _exit = TaskExit(&shared.live_tasks);
            f()
        });

        match spawned {
            Ok(handle) => {
                tasks.push(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.live_tasks.remove();
                Err(e.into())
            }
        }
    }

    ///
    /// Stop the run. Idempotent.
    ///
    /// Every task is woken and joined within `shutdown_timeout`.
    /// Sockets are closed by their worker on exit.
    ///
    pub fn stop(&self) {
        let mut tasks = self.tasks.lock();
        self.stop_tasks(&mut tasks);
    }

    fn stop_tasks(&self, tasks: &mut Vec<JoinHandle<()>>) {
        let was_running = self.shared.running.swap(false, Ordering::AcqRel);
        if !was_running && tasks.is_empty() {
            return;
        }

        for channel in &self.shared.channels {
            channel.wake();
        }

        let deadline = Instant::now() + self.shared.config.shutdown_timeout;
        let all_exited = self.shared.live_tasks.wait(deadline);
        for handle in tasks.drain(..) {
            let name = handle.thread().name().unwrap_or("fecsim-task").to_owned();
            if !all_exited && !handle.is_finished() {
                log::error!(
                    "{} still running after {:?}, detached",
                    name,
                    self.shared.config.shutdown_timeout
                );
                continue;
            }

            if handle.join().is_err() {
                log::error!("{} panicked", name);
            }
        }

        log::info!("Dispatcher stopped");
        self.shared.observers.dispatch(&Event::Stopped);
    }
}

impl Drop for ChannelDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reader_task<R: Read>(shared: Arc<Shared>, mut source: ChunkReader<R>) {
    let config = &shared.config;
    let mut encoder = FecEncoder::new(config.mask_type);
    let mut framer = MediaFramer::new(config.nb_channels as u8);
    let mut round_robin = 0;
    let mut next_id = 0u64;
    let mut last_channel = None;
    let mut failed = false;

    while shared.running.load(Ordering::Acquire) {
        let channel = match shared.select_channel(&mut round_robin) {
            Some(channel) => channel,
            None => {
                reader::sleep_while_running(
                    &shared.running,
                    config.idle_sleep,
                    config.poll_interval,
                );
                continue;
            }
        };

        let chunk = match source.next_chunk() {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                log::error!("Fail to read source {:?}", e);
                failed = true;
                break;
            }
        };
        let chunk_len = chunk.len();

        let payload = match config.media_framing {
            true => match framer.frame(channel as u8, chunk) {
                Ok(payload) => payload,
                Err(e) => {
                    log::error!("Fail to frame chunk {:?}", e);
                    failed = true;
                    break;
                }
            },
            false => chunk,
        };

        match encoder.submit(payload, config.k, config.r) {
            Ok(packets) => shared.enqueue(channel, packets, &mut next_id),
            Err(e) => {
                log::error!("Fail to encode chunk {:?}", e);
                failed = true;
                break;
            }
        }
        last_channel = Some(channel);

        let delay = reader::pacing_delay(chunk_len, config.target_bitrate);
        if !reader::sleep_while_running(&shared.running, delay, config.poll_interval) {
            break;
        }
    }

    if failed {
        if encoder.pending() > 0 {
            log::warn!("{} media packets of the open group discarded", encoder.pending());
        }
        shared.observers.dispatch(&Event::SourceFailed {
            bytes_read: source.bytes_read(),
        });
    } else if source.is_exhausted() && shared.running.load(Ordering::Acquire) {
        if config.flush_trailing_group && encoder.pending() > 0 {
            match shared
                .select_channel(&mut round_robin)
                .or(last_channel)
            {
                Some(channel) => match encoder.flush() {
                    Ok(packets) => shared.enqueue(channel, packets, &mut next_id),
                    Err(e) => log::error!("Fail to flush trailing group {:?}", e),
                },
                None => log::warn!("No channel for the trailing group"),
            }
        } else if encoder.pending() > 0 {
            log::info!("{} media packets of the trailing group discarded", encoder.pending());
        }

        log::info!("Source drained, {} bytes read", source.bytes_read());
        shared.source_exhausted.store(true, Ordering::Release);
        shared.observers.dispatch(&Event::EndOfStream {
            bytes_read: source.bytes_read(),
        });
    }

    let stats = encoder.stats();
    log::info!(
        "Reader stopped, {} groups {} media packets {} redundancy packets",
        stats.groups,
        stats.media_packets,
        stats.fec_packets
    );
    shared.reader_finished.store(true, Ordering::Release);
}

fn worker_task(shared: Arc<Shared>, index: usize, writer: UdpWriter) {
    let channel = &shared.channels[index];
    let mut buffer = vec![0u8; MAX_PACKET_SIZE];
    log::debug!("Channel {} worker sending to {}", index, writer.destination());

    while let Some(send_packet) = channel.pop(&shared.running, shared.config.poll_interval) {
        let info = PacketInfo {
            channel: send_packet.channel,
            id: send_packet.id,
            group_number: send_packet.packet.group_number,
            sequence_number: send_packet.packet.sequence_number,
        };

        if channel.should_drop() {
            log::trace!(
                "Channel {} drop group {} seq {}",
                index,
                info.group_number,
                info.sequence_number
            );
            channel.record_dropped();
            shared.observers.dispatch(&Event::PacketDropped(info));
            continue;
        }

        let sent = send_packet
            .packet
            .serialize(&mut buffer)
            .and_then(|len| writer.write(&buffer[..len]));

        match sent {
            Ok(_) => {
                log::trace!(
                    "Channel {} sent packet {} after {:?} in queue",
                    index,
                    info.id,
                    send_packet.queued_at.elapsed()
                );
                channel.record_sent();
                shared.observers.dispatch(&Event::PacketSent(info));
            }
            Err(e) => {
                log::warn!(
                    "Channel {} fail to send group {} seq {} {:?}",
                    index,
                    info.group_number,
                    info.sequence_number,
                    e
                );
                channel.record_send_error();
                shared.observers.dispatch(&Event::SendFailed(info));
            }
        }
    }

    log::debug!("Channel {} worker stopped", index);
}

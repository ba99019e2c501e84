use crate::fec::Packet;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

///
/// Packet routed to one channel. Owned by the channel queue until its worker takes it.
///
#[derive(Debug)]
pub struct SendPacket {
    /// FEC packet to serialize
    pub packet: Packet,
    /// Destination channel
    pub channel: usize,
    /// Submission order inside the run
    pub id: u64,
    /// Time the packet entered the queue
    pub queued_at: Instant,
}

/// Counters of a channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Packets pushed to the queue
    pub queued: u64,
    /// Datagrams sent
    pub sent: u64,
    /// Packets discarded by the simulated loss
    pub dropped: u64,
    /// Datagrams lost on a send error
    pub send_errors: u64,
    /// Packets waiting in the queue
    pub pending: usize,
}

#[derive(Debug, Default)]
struct Counters {
    queued: AtomicU64,
    sent: AtomicU64,
    dropped: AtomicU64,
    send_errors: AtomicU64,
}

///
/// State of one channel: FIFO queue, enabled flag and loss probability.
///
/// The queue is protected by its own lock. Enabled and loss rate are read without lock
/// and written under the state lock, which also guards the enable wakeup.
///
#[derive(Debug)]
pub struct ChannelContext {
    index: usize,
    queue: Mutex<VecDeque<SendPacket>>,
    queue_cond: Condvar,
    state: Mutex<()>,
    enable_cond: Condvar,
    enabled: AtomicBool,
    loss_rate: AtomicU64,
    counters: Counters,
}

impl ChannelContext {
    /// Create a disabled, lossless channel
    pub fn new(index: usize) -> Self {
        ChannelContext {
            index,
            queue: Mutex::new(VecDeque::new()),
            queue_cond: Condvar::new(),
            state: Mutex::new(()),
            enable_cond: Condvar::new(),
            enabled: AtomicBool::new(false),
            loss_rate: AtomicU64::new(0f64.to_bits()),
            counters: Counters::default(),
        }
    }

    /// Channel index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Channel enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    ///
    /// Enable or disable the channel, wake the worker when the channel becomes enabled.
    ///
    /// # Returns
    ///
    /// The previous state
    pub fn set_enabled(&self, enabled: bool) -> bool {
        let _state = self.state.lock();
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if !previous && enabled {
            self.enable_cond.notify_all();
        }
        previous
    }

    /// Probability to discard a packet
    pub fn loss_rate(&self) -> f64 {
        f64::from_bits(self.loss_rate.load(Ordering::Acquire))
    }

    ///
    /// Set the loss probability, clamped to [0, 1]. NaN is stored as 0.
    ///
    /// # Returns
    ///
    /// The stored value
    pub fn set_loss_rate(&self, rate: f64) -> f64 {
        let clamped = match rate {
            r if r.is_nan() => 0.0,
            r => r.clamp(0.0, 1.0),
        };

        if clamped != rate {
            log::warn!(
                "Channel {} loss rate {} clamped to {}",
                self.index,
                rate,
                clamped
            );
        }

        let _state = self.state.lock();
        self.loss_rate.store(clamped.to_bits(), Ordering::Release);
        clamped
    }

    /// Roll the simulated loss for one packet
    pub fn should_drop(&self) -> bool {
        let loss_rate = self.loss_rate();
        if loss_rate <= 0.0 {
            return false;
        }
        rand::random::<f64>() < loss_rate
    }

    /// Append a packet and wake the worker
    pub fn push(&self, packet: SendPacket) {
        let mut queue = self.queue.lock();
        queue.push_back(packet);
        self.counters.queued.fetch_add(1, Ordering::Relaxed);
        self.queue_cond.notify_one();
    }

    /// Number of packets waiting
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// No packet waiting
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Drop every queued packet, return how many were dropped
    pub fn clear(&self) -> usize {
        let mut queue = self.queue.lock();
        let nb = queue.len();
        queue.clear();
        nb
    }

    /// Wake every task blocked on this channel
    pub fn wake(&self) {
        {
            let _queue = self.queue.lock();
            self.queue_cond.notify_all();
        }
        let _state = self.state.lock();
        self.enable_cond.notify_all();
    }

    ///
    /// Block until the channel is enabled and holds a packet, then take the oldest one.
    ///
    /// Every wait is bounded by `poll` and re-checks `running`.
    ///
    /// # Returns
    ///
    /// `None` once `running` is false
    pub fn pop(&self, running: &AtomicBool, poll: Duration) -> Option<SendPacket> {
        loop {
            if !running.load(Ordering::Acquire) {
                return None;
            }

            if !self.is_enabled() {
                let mut state = self.state.lock();
                if !self.enabled.load(Ordering::Acquire) && running.load(Ordering::Acquire) {
                    self.enable_cond.wait_for(&mut state, poll);
                }
                continue;
            }

            let mut queue = self.queue.lock();
            if let Some(packet) = queue.pop_front() {
                return Some(packet);
            }

            if running.load(Ordering::Acquire) {
                self.queue_cond.wait_for(&mut queue, poll);
            }
        }
    }

    pub(crate) fn record_sent(&self) {
        self.counters.sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_send_error(&self) {
        self.counters.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            queued: self.counters.queued.load(Ordering::Relaxed),
            sent: self.counters.sent.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            send_errors: self.counters.send_errors.load(Ordering::Relaxed),
            pending: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelContext, SendPacket};
    use crate::fec::Packet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::{Duration, Instant};

    fn send_packet(id: u64) -> SendPacket {
        SendPacket {
            packet: Packet {
                sequence_number: id as u8,
                k: 10,
                r: 2,
                data: vec![id as u8; 8],
                ..Default::default()
            },
            channel: 0,
            id,
            queued_at: Instant::now(),
        }
    }

    #[test]
    pub fn test_loss_boundaries() {
        crate::tests::init();
        let channel = ChannelContext::new(0);
        assert!((0..100_000).all(|_| !channel.should_drop()));

        channel.set_loss_rate(1.0);
        assert!((0..100_000).all(|_| channel.should_drop()));

        channel.set_loss_rate(0.5);
        let dropped = (0..100_000).filter(|_| channel.should_drop()).count();
        assert!(dropped > 45_000 && dropped < 55_000);
    }

    #[test]
    pub fn test_loss_rate_clamp() {
        crate::tests::init();
        let channel = ChannelContext::new(1);
        assert_eq!(channel.set_loss_rate(1.5), 1.0);
        assert_eq!(channel.set_loss_rate(-0.2), 0.0);
        assert_eq!(channel.set_loss_rate(f64::NAN), 0.0);
        assert_eq!(channel.set_loss_rate(0.25), 0.25);
        assert_eq!(channel.loss_rate(), 0.25);
    }

    #[test]
    pub fn test_disabled_channel_queues() {
        crate::tests::init();
        let channel = Arc::new(ChannelContext::new(0));
        let running = Arc::new(AtomicBool::new(true));
        for id in 0..5 {
            channel.push(send_packet(id));
        }

        let (tx, rx) = mpsc::channel();
        let worker = {
            let channel = channel.clone();
            let running = running.clone();
            std::thread::spawn(move || {
                while let Some(pkt) = channel.pop(&running, Duration::from_millis(10)) {
                    tx.send(pkt.id).ok();
                }
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert_eq!(channel.len(), 5);

        assert!(!channel.set_enabled(true));
        let ids: Vec<u64> = (0..5)
            .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(channel.is_empty());

        running.store(false, Ordering::Release);
        channel.wake();
        worker.join().unwrap();
        assert_eq!(channel.stats().queued, 5);
    }

    #[test]
    pub fn test_stop_wakes_worker() {
        crate::tests::init();
        let channel = Arc::new(ChannelContext::new(0));
        channel.set_enabled(true);
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let channel = channel.clone();
            let running = running.clone();
            // Poll interval longer than the test timeout, only the wakeup can release it
            std::thread::spawn(move || channel.pop(&running, Duration::from_secs(30)))
        };

        std::thread::sleep(Duration::from_millis(50));
        let start = Instant::now();
        running.store(false, Ordering::Release);
        channel.wake();
        assert!(worker.join().unwrap().is_none());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    pub fn test_clear() {
        crate::tests::init();
        let channel = ChannelContext::new(2);
        channel.push(send_packet(0));
        channel.push(send_packet(1));
        assert_eq!(channel.clear(), 2);
        assert!(channel.is_empty());
    }
}

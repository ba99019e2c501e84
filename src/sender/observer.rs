use parking_lot::RwLock;
use std::sync::Arc;

/// Packet concerned by an event
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct PacketInfo {
    /// Channel owning the packet
    pub channel: usize,
    /// Submission order of the packet inside the run
    pub id: u64,
    /// FEC group number
    pub group_number: u8,
    /// FEC sequence number inside the group
    pub sequence_number: u8,
}

/// Event
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Event {
    /// Reader and workers are running
    Started {
        /// Number of channel workers
        nb_channels: usize,
    },
    /// Every task has been joined
    Stopped,
    /// A FEC group has been closed and queued on a channel
    GroupEncoded {
        /// Group number
        group_number: u8,
        /// Channel receiving the whole group
        channel: usize,
        /// Media and redundancy packets of the group
        nb_packets: usize,
    },
    /// Datagram sent
    PacketSent(PacketInfo),
    /// Datagram discarded by the simulated loss
    PacketDropped(PacketInfo),
    /// Datagram lost on a send error
    SendFailed(PacketInfo),
    /// The source is drained
    EndOfStream {
        /// Bytes read from the source
        bytes_read: u64,
    },
    /// The reader gave up on a read, framing or encoding error
    SourceFailed {
        /// Bytes read from the source before the failure
        bytes_read: u64,
    },
}

/// Subscribe to events
pub trait Subscriber: Send + Sync {
    /// Dispatcher event, called from the task that produced it
    fn on_dispatch_event(&self, evt: &Event, now: std::time::SystemTime);
}

#[derive(Clone)]
pub struct ObserverList(Arc<RwLock<Vec<Arc<dyn Subscriber>>>>);

impl ObserverList {
    pub fn new() -> Self {
        ObserverList(Arc::new(RwLock::new(Vec::new())))
    }

    pub fn subscribe(&self, s: Arc<dyn Subscriber>) {
        self.0.write().push(s);
    }

    pub fn unsubscribe(&self, s: Arc<dyn Subscriber>) {
        self.0
            .write()
            .retain(|a| !std::ptr::eq(a.as_ref() as *const _, s.as_ref() as *const _))
    }

    pub fn dispatch(&self, event: &Event) {
        let lock = self.0.read();
        if lock.is_empty() {
            return;
        }

        let now = std::time::SystemTime::now();
        for subscriber in lock.iter() {
            subscriber.on_dispatch_event(event, now);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObserverList")
    }
}

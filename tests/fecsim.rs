#[cfg(test)]
mod tests {
    use fecsim::core::MediaFrameHeader;
    use fecsim::fec::{self, FecEncoder, FecReceiver, MaskType};
    use fecsim::sender::{ChannelDispatcher, Config, Event, StartStatus, Subscriber, UDPEndpoint};
    use std::io::Write;
    use std::net::UdpSocket;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant, SystemTime};

    pub fn init() {
        // std::env::set_var("RUST_LOG", "debug");
        env_logger::builder().is_test(true).try_init().ok();
    }

    fn create_file(len: usize) -> (tempfile::NamedTempFile, Vec<u8>) {
        let buffer: Vec<u8> = (0..len).map(|i| (i * 7 + i / 251) as u8).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&buffer).unwrap();
        file.flush().unwrap();
        (file, buffer)
    }

    fn create_receivers(nb: usize) -> (Vec<UdpSocket>, Vec<UDPEndpoint>) {
        let sockets: Vec<UdpSocket> = (0..nb)
            .map(|_| {
                let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
                socket
                    .set_read_timeout(Some(Duration::from_millis(200)))
                    .unwrap();
                socket
            })
            .collect();
        let endpoints = sockets
            .iter()
            .map(|s| UDPEndpoint::new(None, "127.0.0.1".to_owned(), s.local_addr().unwrap().port()))
            .collect();
        (sockets, endpoints)
    }

    fn create_config(endpoints: Vec<UDPEndpoint>, media_framing: bool) -> Config {
        Config::builder()
            .nb_channels(endpoints.len())
            .k(4)
            .r(1)
            .chunk_size(64)
            .media_framing(media_framing)
            .target_bitrate(50_000_000)
            .endpoints(endpoints)
            .poll_interval(Duration::from_millis(10))
            .build()
    }

    fn wait_drained(dispatcher: &ChannelDispatcher) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !(dispatcher.is_source_exhausted() && dispatcher.queued_packets() == 0) {
            assert!(Instant::now() < deadline, "source not drained in time");
            std::thread::sleep(Duration::from_millis(10));
        }
        dispatcher.stop();
    }

    fn receive_all(sockets: &[UdpSocket]) -> Vec<Vec<u8>> {
        let mut datagrams = Vec::new();
        let mut buf = [0u8; fec::MAX_PACKET_SIZE];
        for socket in sockets {
            while let Ok(n) = socket.recv(&mut buf) {
                datagrams.push(buf[..n].to_vec());
            }
        }
        datagrams
    }

    fn decode(datagrams: &[Vec<u8>], skip_media: Option<u8>) -> Vec<Vec<u8>> {
        let mut receiver = FecReceiver::new(MaskType::Random);
        let mut groups = Vec::new();
        for datagram in datagrams {
            let pkt = fec::Packet::deserialize(datagram).unwrap();
            if Some(pkt.sequence_number) == skip_media {
                continue;
            }
            let group = receiver.push(datagram).unwrap();
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups.sort();
        groups
            .into_iter()
            .flat_map(|g| receiver.take_group(g).unwrap())
            .collect()
    }

    #[derive(Default)]
    struct EventLog(Mutex<Vec<Event>>);

    impl Subscriber for EventLog {
        fn on_dispatch_event(&self, evt: &Event, _now: SystemTime) {
            self.0.lock().unwrap().push(evt.clone());
        }
    }

    #[test]
    pub fn test_encode_group_k10_r2() {
        init();
        let mut encoder = FecEncoder::new(MaskType::Random);
        let payloads: Vec<Vec<u8>> = (0..10u8)
            .map(|i| (0..1009).map(|j| (j as u8).wrapping_mul(i + 1) ^ i).collect())
            .collect();

        for payload in &payloads[..9] {
            assert!(encoder.submit(payload, 10, 2).unwrap().is_empty());
        }
        let packets = encoder.submit(&payloads[9], 10, 2).unwrap().to_vec();
        assert_eq!(packets.len(), 12);
        for (seq, pkt) in packets.iter().enumerate() {
            assert_eq!(pkt.sequence_number as usize, seq);
            assert_eq!(pkt.group_number, 0);
            assert_eq!(pkt.packet_size(), 1009);
        }

        // k=10 r=2 rows of the random table: media 0,2,4,6,8 and media 0,1,3,5,7,9
        let rows: [&[usize]; 2] = [&[0, 2, 4, 6, 8], &[0, 1, 3, 5, 7, 9]];
        for (row, members) in rows.iter().enumerate() {
            let mut expected = vec![0u8; 1009];
            for index in members.iter() {
                for (byte, src) in expected.iter_mut().zip(&payloads[*index]) {
                    *byte ^= src;
                }
            }
            assert_eq!(packets[10 + row].data, expected);
        }
        assert_eq!(packets[10].packet_mask, 0xaa80);
        assert_eq!(packets[11].packet_mask, 0xd540);
        assert_eq!(&packets[10].to_bytes().unwrap()[..6], &[0xaa, 0x80, 0, 10, 10, 2]);
        assert_eq!(encoder.group_number(), 1);
    }

    #[test]
    pub fn test_dispatch_and_recover() {
        init();
        // 5 full groups of 4 chunks, plus one short chunk
        let (file, buffer) = create_file(64 * 4 * 5 + 30);
        let (sockets, endpoints) = create_receivers(2);

        let dispatcher = ChannelDispatcher::new(create_config(endpoints, false)).unwrap();
        let events = Arc::new(EventLog::default());
        dispatcher.subscribe(events.clone());
        dispatcher.set_source_path(file.path());
        dispatcher.set_channel_enabled(0, true).unwrap();
        dispatcher.set_channel_enabled(1, true).unwrap();

        assert_eq!(dispatcher.start().unwrap(), StartStatus::Started);
        wait_drained(&dispatcher);

        let stats = dispatcher.channel_stats();
        let sent: u64 = stats.iter().map(|s| s.sent).sum();
        // 5 * (4 + 1) + trailing group of 1 media and 1 redundancy packet
        assert_eq!(sent, 27);
        // Groups close on every 4th chunk, always picked on channel 1
        assert_eq!(stats[1].sent, 27);
        assert!(stats.iter().all(|s| s.dropped == 0 && s.send_errors == 0));

        let datagrams = receive_all(&sockets);
        assert_eq!(datagrams.len(), 27);

        // Drop media packet 2 of every group, redundancy rebuilds it
        let mut output: Vec<u8> = decode(&datagrams, Some(2)).concat();
        output.truncate(buffer.len());
        assert_eq!(output, buffer);

        let events = events.0.lock().unwrap();
        assert!(events.contains(&Event::Started { nb_channels: 2 }));
        assert!(events.contains(&Event::EndOfStream {
            bytes_read: buffer.len() as u64
        }));
        assert_eq!(events.last(), Some(&Event::Stopped));
        let groups = events
            .iter()
            .filter(|e| matches!(e, Event::GroupEncoded { .. }))
            .count();
        assert_eq!(groups, 6);
    }

    #[test]
    pub fn test_media_framing() {
        init();
        let (file, buffer) = create_file(64 * 8 + 10);
        let (sockets, endpoints) = create_receivers(1);

        let dispatcher = ChannelDispatcher::new(create_config(endpoints, true)).unwrap();
        dispatcher.set_source_path(file.path());
        dispatcher.set_channel_enabled(0, true).unwrap();
        dispatcher.start().unwrap();
        wait_drained(&dispatcher);

        let media = decode(&receive_all(&sockets), None);
        assert_eq!(media.len(), 9);

        let mut output = Vec::new();
        for (i, payload) in media.iter().enumerate() {
            assert_eq!(payload.len(), 64 + MediaFrameHeader::SIZE);
            let (header, chunk) = MediaFrameHeader::parse(payload).unwrap();
            assert_eq!(header.sys_word, i as u32 + 1);
            assert_eq!(header.version, MediaFrameHeader::VERSION);
            assert_eq!(header.total_channels, 1);
            assert_eq!(header.which_channel, 0);
            output.extend_from_slice(chunk);
        }
        assert_eq!(output, buffer);
    }

    #[test]
    pub fn test_full_loss() {
        init();
        let (file, _buffer) = create_file(64 * 8);
        let (sockets, endpoints) = create_receivers(2);

        let dispatcher = ChannelDispatcher::new(create_config(endpoints, false)).unwrap();
        dispatcher.set_source_path(file.path());
        for channel in 0..2 {
            dispatcher.set_channel_enabled(channel, true).unwrap();
            assert_eq!(dispatcher.set_loss_rate(channel, 1.0).unwrap(), 1.0);
        }
        dispatcher.start().unwrap();
        wait_drained(&dispatcher);

        let stats = dispatcher.channel_stats();
        assert_eq!(stats.iter().map(|s| s.queued).sum::<u64>(), 10);
        for s in &stats {
            assert_eq!(s.sent, 0);
            assert_eq!(s.dropped, s.queued);
        }
        assert!(receive_all(&sockets).is_empty());
    }

    #[test]
    pub fn test_disabled_channel_receives_nothing() {
        init();
        let (file, _buffer) = create_file(64 * 12);
        let (sockets, endpoints) = create_receivers(3);

        let dispatcher = ChannelDispatcher::new(create_config(endpoints, false)).unwrap();
        dispatcher.set_source_path(file.path());
        dispatcher.set_channel_enabled(2, true).unwrap();
        dispatcher.start().unwrap();
        wait_drained(&dispatcher);

        let stats = dispatcher.channel_stats();
        assert_eq!(stats[0].queued, 0);
        assert_eq!(stats[1].queued, 0);
        assert_eq!(stats[2].sent, 15);

        assert!(receive_all(&sockets[..2]).is_empty());
        assert_eq!(receive_all(&sockets[2..]).len(), 15);
    }

    #[test]
    pub fn test_send_to_closed_port() {
        init();
        let (file, _buffer) = create_file(64 * 40);
        let port = UdpSocket::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let endpoints = vec![UDPEndpoint::new(None, "127.0.0.1".to_owned(), port)];

        let config = Config::builder()
            .nb_channels(1)
            .k(4)
            .r(1)
            .chunk_size(64)
            .media_framing(false)
            .target_bitrate(200_000)
            .endpoints(endpoints)
            .poll_interval(Duration::from_millis(10))
            .build();
        let dispatcher = ChannelDispatcher::new(config).unwrap();
        let events = Arc::new(EventLog::default());
        dispatcher.subscribe(events.clone());
        dispatcher.set_source_path(file.path());
        dispatcher.set_channel_enabled(0, true).unwrap();
        dispatcher.start().unwrap();

        let start = Instant::now();
        wait_drained(&dispatcher);
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(!dispatcher.is_running());
        assert_eq!(dispatcher.queued_packets(), 0);

        // Refused datagrams are counted and skipped, the worker keeps going
        let stats = dispatcher.channel_stats();
        assert_eq!(stats[0].queued, 50);
        assert!(stats[0].send_errors > 0);
        assert_eq!(stats[0].sent + stats[0].send_errors, 50);

        let events = events.0.lock().unwrap();
        let failed = events
            .iter()
            .filter(|e| matches!(e, Event::SendFailed(_)))
            .count();
        assert_eq!(failed as u64, stats[0].send_errors);
        assert_eq!(events.last(), Some(&Event::Stopped));
    }

    #[test]
    pub fn test_lifecycle() {
        init();
        let (file, _buffer) = create_file(64 * 1000);
        let (_sockets, endpoints) = create_receivers(2);

        let dispatcher = ChannelDispatcher::new(create_config(endpoints, false)).unwrap();
        assert!(dispatcher.start().is_err());
        assert!(!dispatcher.is_running());

        dispatcher.set_source_path(file.path());
        dispatcher.set_channel_enabled(0, true).unwrap();
        assert_eq!(dispatcher.start().unwrap(), StartStatus::Started);
        assert_eq!(dispatcher.start().unwrap(), StartStatus::AlreadyRunning);

        let start = Instant::now();
        dispatcher.stop();
        dispatcher.stop();
        assert!(!dispatcher.is_running());
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    pub fn test_invalid_config() {
        init();
        assert!(ChannelDispatcher::new(Config::builder().k(0).build()).is_err());
        assert!(ChannelDispatcher::new(Config::builder().k(3).r(4).build()).is_err());
        assert!(ChannelDispatcher::new(Config::builder().nb_channels(0).build()).is_err());
    }

    #[test]
    pub fn test_config_json() {
        init();
        let config: Config = serde_json::from_str(r#"{"nb_channels": 5, "k": 8}"#).unwrap();
        assert_eq!(config.nb_channels, 5);
        assert_eq!(config.k, 8);
        assert_eq!(config.r, 2);
        assert_eq!(config.chunk_size, 1009);
        assert!(config.validate().is_ok());
    }
}

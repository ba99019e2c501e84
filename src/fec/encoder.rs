use super::masktable::{
    is_protected, mask_size, MaskType, PacketMaskTable, MAX_FEC_PACKETS, MAX_MEDIA_PACKETS,
};
use super::packet::{Packet, MAX_DATA_SIZE};
use crate::tools::error::{FecSimError, Result};

///
/// XOR `src` into `dst`, byte-wise over the common length
///
pub fn xor_payloads(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

/// Counters of an encoder since its creation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderStats {
    /// Media packets accepted
    pub media_packets: u64,
    /// Redundancy packets produced
    pub fec_packets: u64,
    /// Groups closed
    pub groups: u64,
    /// Payloads shorter than the packet size, zero padded
    pub short_payloads: u64,
}

///
/// Group media payloads by `k` and derive `r` XOR redundancy packets per group.
///
/// The encoder is not thread safe and must be fed by a single producer.
/// Packets are stored in a pool of slots allocated once and reused for every group.
///
#[derive(Debug)]
pub struct FecEncoder {
    mask_table: PacketMaskTable,
    packet_size: Option<usize>,
    group_number: u8,
    group_k: u8,
    group_r: u8,
    nb_pending: usize,
    slots: Vec<Packet>,
    stats: EncoderStats,
}

impl FecEncoder {
    /// Create an encoder using the given family of precomputed masks
    pub fn new(mask_type: MaskType) -> Self {
        let slots = (0..MAX_MEDIA_PACKETS + MAX_FEC_PACKETS)
            .map(|_| Packet {
                data: Vec::with_capacity(MAX_DATA_SIZE),
                ..Default::default()
            })
            .collect();

        FecEncoder {
            mask_table: PacketMaskTable::new(mask_type),
            packet_size: None,
            group_number: 0,
            group_k: 0,
            group_r: 0,
            nb_pending: 0,
            slots,
            stats: EncoderStats::default(),
        }
    }

    /// Payload size fixed by the first submission, if any
    pub fn packet_size(&self) -> Option<usize> {
        self.packet_size
    }

    /// Number of the group being accumulated
    pub fn group_number(&self) -> u8 {
        self.group_number
    }

    /// Number of media packets waiting for the group to close
    pub fn pending(&self) -> usize {
        self.nb_pending
    }

    /// Encoder counters
    pub fn stats(&self) -> EncoderStats {
        self.stats
    }

    /// Forget the packet size and the current group
    pub fn reset(&mut self) {
        self.packet_size = None;
        self.group_number = 0;
        self.group_k = 0;
        self.group_r = 0;
        self.nb_pending = 0;
    }

    ///
    /// Add a media payload to the current group.
    ///
    /// The first payload fixes the packet size. Shorter payloads are zero padded,
    /// longer ones are truncated.
    ///
    /// # Returns
    ///
    /// An empty slice while the group accumulates, the `k` media packets followed by the
    /// `r` redundancy packets when the `k`-th payload closes the group.
    /// The slice is only valid until the next call.
    ///
    pub fn submit(&mut self, payload: &[u8], k: u8, r: u8) -> Result<&[Packet]> {
        check_group_params(k, r)?;

        if self.nb_pending > 0 && (k != self.group_k || r != self.group_r) {
            return Err(FecSimError::invalid_input(format!(
                "Group {} is open with k={} r={}, got k={} r={}",
                self.group_number, self.group_k, self.group_r, k, r
            )));
        }

        if payload.len() > MAX_DATA_SIZE {
            return Err(FecSimError::invalid_input(format!(
                "Payload of {} bytes exceeds packet capacity {}",
                payload.len(),
                MAX_DATA_SIZE
            )));
        }

        let packet_size = match self.packet_size {
            Some(size) => size,
            None => {
                if payload.is_empty() {
                    return Err(FecSimError::invalid_input(
                        "First payload can't be empty, it fixes the packet size",
                    ));
                }
                log::debug!("Packet size fixed to {} bytes", payload.len());
                self.packet_size = Some(payload.len());
                payload.len()
            }
        };

        let len = if payload.len() < packet_size {
            log::debug!(
                "Short payload of {} bytes padded to {}",
                payload.len(),
                packet_size
            );
            self.stats.short_payloads += 1;
            payload.len()
        } else {
            if payload.len() > packet_size {
                log::warn!(
                    "Payload of {} bytes truncated to {}",
                    payload.len(),
                    packet_size
                );
            }
            packet_size
        };

        let index = self.nb_pending;
        let slot = &mut self.slots[index];
        slot.packet_mask = 0;
        slot.group_number = self.group_number;
        slot.sequence_number = index as u8;
        slot.k = k;
        slot.r = r;
        slot.data.clear();
        slot.data.extend_from_slice(&payload[..len]);
        slot.data.resize(packet_size, 0);

        self.group_k = k;
        self.group_r = r;
        self.nb_pending += 1;
        self.stats.media_packets += 1;

        if self.nb_pending < k as usize {
            return Ok(&[]);
        }

        self.close_group()
    }

    ///
    /// Close a trailing group holding fewer than `k` media packets.
    ///
    /// The `m` pending packets are emitted as a shorter group with `k = m` and
    /// `r = min(r, m)`. Nothing is emitted when no packet is pending.
    ///
    pub fn flush(&mut self) -> Result<&[Packet]> {
        if self.nb_pending == 0 {
            return Ok(&[]);
        }

        let k = self.nb_pending as u8;
        let r = self.group_r.min(k);
        log::info!(
            "Flush group {} with {} media packets and {} redundancy packets",
            self.group_number,
            k,
            r
        );

        for slot in &mut self.slots[..self.nb_pending] {
            slot.k = k;
            slot.r = r;
        }

        self.group_k = k;
        self.group_r = r;
        self.close_group()
    }

    fn close_group(&mut self) -> Result<&[Packet]> {
        let k = self.group_k as usize;
        let r = self.group_r as usize;
        let packet_size = self.packet_size.unwrap_or(0);

        if r > 0 {
            let mask = match self.mask_table.look_up(k, r) {
                Ok(mask) => mask,
                Err(e) => {
                    self.nb_pending = 0;
                    return Err(e);
                }
            };

            let size = mask_size(k);
            let (media, fec) = self.slots.split_at_mut(k);
            for (row, fec_packet) in fec[..r].iter_mut().enumerate() {
                fec_packet.data.clear();
                fec_packet.data.resize(packet_size, 0);
                for (index, media_packet) in media.iter().enumerate() {
                    if is_protected(mask, k, row, index) {
                        xor_payloads(&media_packet.data, &mut fec_packet.data);
                    }
                }

                let row_mask = &mask[row * size..(row + 1) * size];
                fec_packet.packet_mask =
                    u16::from_be_bytes([row_mask[0], row_mask.get(1).copied().unwrap_or(0)]);
                fec_packet.group_number = self.group_number;
                fec_packet.sequence_number = (k + row) as u8;
                fec_packet.k = k as u8;
                fec_packet.r = r as u8;
            }
        }

        log::debug!(
            "Group {} closed, {} media packets {} redundancy packets",
            self.group_number,
            k,
            r
        );

        self.stats.groups += 1;
        self.stats.fec_packets += r as u64;
        self.group_number = self.group_number.wrapping_add(1);
        self.nb_pending = 0;
        Ok(&self.slots[..k + r])
    }
}

/// Reject group parameters the mask table can't serve
pub fn check_group_params(k: u8, r: u8) -> Result<()> {
    if k == 0 || k as usize > MAX_MEDIA_PACKETS {
        return Err(FecSimError::invalid_input(format!(
            "k={} is outside 1..={}",
            k, MAX_MEDIA_PACKETS
        )));
    }

    if r > k {
        return Err(FecSimError::invalid_input(format!(
            "r={} is larger than k={}",
            r, k
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{xor_payloads, FecEncoder};
    use crate::fec::masktable::MaskType;

    fn payload(seed: u8, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
            .collect()
    }

    #[test]
    pub fn test_group_closure() {
        crate::tests::init();
        let mut encoder = FecEncoder::new(MaskType::Random);
        for i in 0..3 {
            assert!(encoder.submit(&payload(i, 64), 4, 2).unwrap().is_empty());
        }
        assert_eq!(encoder.pending(), 3);

        let packets = encoder.submit(&payload(3, 64), 4, 2).unwrap();
        assert_eq!(packets.len(), 6);
        let mut seqs: Vec<u8> = packets.iter().map(|p| p.sequence_number).collect();
        seqs.sort();
        assert_eq!(seqs, vec![0, 1, 2, 3, 4, 5]);
        assert!(packets.iter().all(|p| p.group_number == 0));
        assert!(packets.iter().all(|p| p.k == 4 && p.r == 2));
        assert!(packets[..4].iter().all(|p| p.packet_mask == 0));
        assert!(packets[4..].iter().all(|p| p.packet_mask != 0));

        for i in 0..3 {
            encoder.submit(&payload(i, 64), 4, 2).unwrap();
        }
        let packets = encoder.submit(&payload(3, 64), 4, 2).unwrap();
        assert!(packets.iter().all(|p| p.group_number == 1));
        assert_eq!(encoder.stats().groups, 2);
        assert_eq!(encoder.stats().fec_packets, 4);
    }

    #[test]
    pub fn test_group_number_wraps() {
        crate::tests::init();
        let mut encoder = FecEncoder::new(MaskType::Bursty);
        for group in 0..256u32 {
            let packets = encoder.submit(&payload(1, 8), 1, 1).unwrap();
            assert_eq!(packets.len(), 2);
            assert_eq!(packets[0].group_number as u32, group);
        }
        let packets = encoder.submit(&payload(1, 8), 1, 1).unwrap();
        assert_eq!(packets[0].group_number, 0);
    }

    #[test]
    pub fn test_short_payload_padding() {
        crate::tests::init();
        let mut encoder = FecEncoder::new(MaskType::Random);
        encoder.submit(&payload(0, 100), 2, 1).unwrap();
        let first = encoder.submit(&payload(9, 40), 2, 1).unwrap()[1].clone();

        encoder.submit(&payload(0, 100), 2, 1).unwrap();
        let second = encoder.submit(&payload(9, 40), 2, 1).unwrap()[1].clone();

        assert_eq!(first.data.len(), 100);
        assert_eq!(first.data, second.data);
        assert_eq!(&first.data[..40], &payload(9, 40)[..]);
        assert!(first.data[40..].iter().all(|b| *b == 0));
        assert_eq!(encoder.stats().short_payloads, 2);
    }

    #[test]
    pub fn test_long_payload_truncated() {
        crate::tests::init();
        let mut encoder = FecEncoder::new(MaskType::Random);
        encoder.submit(&payload(0, 10), 2, 0).unwrap();
        let packets = encoder.submit(&payload(5, 30), 2, 0).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1].data, payload(5, 10));
    }

    #[test]
    pub fn test_redundancy_larger_than_group() {
        crate::tests::init();
        let mut encoder = FecEncoder::new(MaskType::Random);
        assert!(encoder.submit(&payload(0, 10), 2, 3).is_err());
        assert_eq!(encoder.pending(), 0);
        assert_eq!(encoder.packet_size(), None);
        assert!(encoder.submit(&payload(0, 10), 0, 0).is_err());
        assert!(encoder.submit(&payload(0, 10), 49, 1).is_err());
    }

    #[test]
    pub fn test_params_change_inside_group() {
        crate::tests::init();
        let mut encoder = FecEncoder::new(MaskType::Random);
        encoder.submit(&payload(0, 10), 3, 1).unwrap();
        assert!(encoder.submit(&payload(1, 10), 4, 1).is_err());
        assert_eq!(encoder.pending(), 1);
    }

    #[test]
    pub fn test_flush_trailing_group() {
        crate::tests::init();
        let mut encoder = FecEncoder::new(MaskType::Random);
        assert!(encoder.flush().unwrap().is_empty());

        let payloads: Vec<Vec<u8>> = (0..3).map(|i| payload(i, 32)).collect();
        for p in &payloads {
            encoder.submit(p, 10, 4).unwrap();
        }

        let packets = encoder.flush().unwrap();
        assert_eq!(packets.len(), 6);
        assert!(packets.iter().all(|p| p.k == 3 && p.r == 3));
        assert_eq!(packets[3].sequence_number, 3);
        assert_eq!(encoder.group_number(), 1);
        assert_eq!(encoder.pending(), 0);
    }

    #[test]
    pub fn test_single_redundancy_is_parity() {
        crate::tests::init();
        let mut encoder = FecEncoder::new(MaskType::Random);
        let payloads: Vec<Vec<u8>> = (0..5).map(|i| payload(i * 7, 50)).collect();
        let mut packets = Vec::new();
        for p in &payloads {
            packets = encoder.submit(p, 5, 1).unwrap().to_vec();
        }

        let mut parity = vec![0u8; 50];
        for p in &payloads {
            xor_payloads(p, &mut parity);
        }
        assert_eq!(packets[5].data, parity);
        assert_eq!(packets[5].packet_mask, 0xf800);
    }
}

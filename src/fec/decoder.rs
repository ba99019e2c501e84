//!
//! Receiving side of the XOR erasure code.
//!
//! A redundancy row rebuilds one media packet when every other media packet it
//! protects has been received.
//!

use std::collections::HashMap;

use super::encoder::xor_payloads;
use super::masktable::{is_protected, MaskType, PacketMaskTable};
use super::packet::Packet;
use crate::tools::error::{FecSimError, Result};

///
/// Packets of one FEC group
///
#[derive(Debug)]
pub struct GroupDecoder {
    group_number: u8,
    k: usize,
    r: usize,
    packet_size: usize,
    mask: Vec<u8>,
    media: Vec<Option<Vec<u8>>>,
    fec: Vec<Option<Vec<u8>>>,
    nb_recovered: usize,
}

impl GroupDecoder {
    /// Create the decoder of a group announced with `k` media and `r` redundancy packets
    pub fn new(
        group_number: u8,
        k: u8,
        r: u8,
        packet_size: usize,
        mask_type: MaskType,
    ) -> Result<GroupDecoder> {
        super::encoder::check_group_params(k, r)?;

        let mask = match r {
            0 => Vec::new(),
            _ => PacketMaskTable::new(mask_type)
                .look_up(k as usize, r as usize)?
                .to_vec(),
        };

        Ok(GroupDecoder {
            group_number,
            k: k as usize,
            r: r as usize,
            packet_size,
            mask,
            media: vec![None; k as usize],
            fec: vec![None; r as usize],
            nb_recovered: 0,
        })
    }

    /// Group number
    pub fn group_number(&self) -> u8 {
        self.group_number
    }

    /// Number of media packets rebuilt so far
    pub fn nb_recovered(&self) -> usize {
        self.nb_recovered
    }

    /// Add a received packet to the group
    pub fn push(&mut self, pkt: &Packet) -> Result<()> {
        if pkt.group_number != self.group_number
            || pkt.k as usize != self.k
            || pkt.r as usize != self.r
        {
            return Err(FecSimError::new_kind(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Packet of group {} (k={} r={}) pushed to group {} (k={} r={})",
                    pkt.group_number, pkt.k, pkt.r, self.group_number, self.k, self.r
                ),
            ));
        }

        if pkt.data.len() != self.packet_size {
            return Err(FecSimError::new_kind(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Payload of {} bytes, expected {}",
                    pkt.data.len(),
                    self.packet_size
                ),
            ));
        }

        let seq = pkt.sequence_number as usize;
        let slot = match seq {
            s if s < self.k => &mut self.media[s],
            s if s < self.k + self.r => &mut self.fec[s - self.k],
            _ => {
                return Err(FecSimError::new_kind(
                    std::io::ErrorKind::InvalidData,
                    format!("Sequence number {} out of group", seq),
                ))
            }
        };

        if slot.is_none() {
            *slot = Some(pkt.data.clone());
        }
        Ok(())
    }

    /// Index of the media packets still missing
    pub fn missing(&self) -> Vec<usize> {
        self.media
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// True when every media packet is available
    pub fn is_complete(&self) -> bool {
        self.media.iter().all(|m| m.is_some())
    }

    /// Payload of media packet `index`, if received or rebuilt
    pub fn media(&self, index: usize) -> Option<&[u8]> {
        self.media.get(index).and_then(|m| m.as_deref())
    }

    ///
    /// Rebuild at most one missing media packet.
    ///
    /// # Returns
    ///
    /// The index of the rebuilt media packet, `None` if no redundancy row can rebuild one.
    pub fn recover(&mut self) -> Option<usize> {
        for row in 0..self.r {
            let fec = match &self.fec[row] {
                Some(fec) => fec,
                None => continue,
            };

            let mut missing = None;
            let mut nb_missing = 0;
            for index in 0..self.k {
                if is_protected(&self.mask, self.k, row, index) && self.media[index].is_none() {
                    missing = Some(index);
                    nb_missing += 1;
                }
            }

            let missing = match (nb_missing, missing) {
                (1, Some(index)) => index,
                _ => continue,
            };

            let mut data = fec.clone();
            for index in 0..self.k {
                if index == missing || !is_protected(&self.mask, self.k, row, index) {
                    continue;
                }
                if let Some(media) = &self.media[index] {
                    xor_payloads(media, &mut data);
                }
            }

            log::debug!(
                "Group {} media packet {} rebuilt from redundancy row {}",
                self.group_number,
                missing,
                row
            );
            self.media[missing] = Some(data);
            self.nb_recovered += 1;
            return Some(missing);
        }
        None
    }

    /// Take the media payloads, in sequence order, once the group is complete
    pub fn into_media(self) -> Option<Vec<Vec<u8>>> {
        self.media.into_iter().collect()
    }
}

///
/// Demultiplex FEC datagrams into groups
///
#[derive(Debug)]
pub struct FecReceiver {
    mask_type: MaskType,
    groups: HashMap<u8, GroupDecoder>,
}

impl FecReceiver {
    /// Create a receiver expecting masks of the given family
    pub fn new(mask_type: MaskType) -> Self {
        FecReceiver {
            mask_type,
            groups: HashMap::new(),
        }
    }

    /// Push a datagram, return its group number
    pub fn push(&mut self, datagram: &[u8]) -> Result<u8> {
        let pkt = Packet::deserialize(datagram)?;
        let group = match self.groups.entry(pkt.group_number) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => entry.insert(GroupDecoder::new(
                pkt.group_number,
                pkt.k,
                pkt.r,
                pkt.data.len(),
                self.mask_type,
            )?),
        };
        group.push(&pkt)?;
        Ok(pkt.group_number)
    }

    /// Group being received
    pub fn group(&self, group_number: u8) -> Option<&GroupDecoder> {
        self.groups.get(&group_number)
    }

    /// Number of groups holding at least one packet
    pub fn nb_groups(&self) -> usize {
        self.groups.len()
    }

    ///
    /// Run recovery on a group and take its media payloads if it is complete.
    /// An incomplete group stays in the receiver.
    ///
    pub fn take_group(&mut self, group_number: u8) -> Option<Vec<Vec<u8>>> {
        let group = self.groups.get_mut(&group_number)?;
        while group.recover().is_some() {}
        if !group.is_complete() {
            log::warn!(
                "Group {} can't be rebuilt, missing {:?}",
                group_number,
                group.missing()
            );
            return None;
        }
        self.groups.remove(&group_number)?.into_media()
    }
}

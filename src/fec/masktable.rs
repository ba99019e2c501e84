use super::tables;
use crate::tools::error::{FecSimError, Result};
use serde::{Deserialize, Serialize};

/// Max number of media packets in one FEC group
pub const MAX_MEDIA_PACKETS: usize = 48;

/// Max number of redundancy packets in one FEC group
pub const MAX_FEC_PACKETS: usize = MAX_MEDIA_PACKETS;

/// Groups up to this size are served by the precomputed tables
pub const MAX_TABLE_MEDIA_PACKETS: usize = 12;

/// Max size in bytes of one mask row
pub const MAX_MASK_SIZE: usize = (MAX_MEDIA_PACKETS + 7) / 8;

const TABLE_ROW_SIZE: usize = 2;

///
/// Family of precomputed masks used for groups of at most 12 media packets
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaskType {
    /// Each media packet is spread over several uncorrelated redundancy rows
    #[default]
    Random,
    /// Redundancy rows protect contiguous runs of media packets
    Bursty,
}

///
/// Number of bytes of one mask row for a group of `media_count` packets
///
pub fn mask_size(media_count: usize) -> usize {
    (media_count + 7) / 8
}

///
/// Return true if redundancy row `row` of `mask` protects media packet `media`
///
pub fn is_protected(mask: &[u8], media_count: usize, row: usize, media: usize) -> bool {
    let size = mask_size(media_count);
    mask.get(row * size + media / 8)
        .map(|byte| byte & (0x80 >> (media % 8)) != 0)
        .unwrap_or(false)
}

///
/// Source of the bit matrix telling which media packets each redundancy packet protects.
///
/// The slice returned by [`PacketMaskTable::look_up`] borrows an internal buffer
/// reused on every call.
///
pub struct PacketMaskTable {
    mask_type: MaskType,
    table: &'static [u8],
    scratch: [u8; MAX_FEC_PACKETS * MAX_MASK_SIZE],
}

impl std::fmt::Debug for PacketMaskTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketMaskTable")
            .field("mask_type", &self.mask_type)
            .finish()
    }
}

impl PacketMaskTable {
    /// Create a mask table of the given family
    pub fn new(mask_type: MaskType) -> Self {
        let table: &'static [u8] = match mask_type {
            MaskType::Random => &tables::PACKET_MASK_RANDOM,
            MaskType::Bursty => &tables::PACKET_MASK_BURSTY,
        };

        PacketMaskTable {
            mask_type,
            table,
            scratch: [0; MAX_FEC_PACKETS * MAX_MASK_SIZE],
        }
    }

    /// Family of the precomputed masks
    pub fn mask_type(&self) -> MaskType {
        self.mask_type
    }

    ///
    /// Return `fec_count` rows of `mask_size(media_count)` bytes.
    ///
    /// Requires `1 <= fec_count <= media_count <= 48`.
    ///
    pub fn look_up(&mut self, media_count: usize, fec_count: usize) -> Result<&[u8]> {
        if media_count == 0 || media_count > MAX_MEDIA_PACKETS {
            return Err(FecSimError::invalid_input(format!(
                "Number of media packets {} is outside 1..={}",
                media_count, MAX_MEDIA_PACKETS
            )));
        }

        if fec_count == 0 || fec_count > media_count {
            return Err(FecSimError::invalid_input(format!(
                "Number of FEC packets {} is outside 1..={}",
                fec_count, media_count
            )));
        }

        let size = mask_size(media_count);
        let len = fec_count * size;
        let out = &mut self.scratch[..len];
        out.fill(0);

        if media_count <= MAX_TABLE_MEDIA_PACKETS {
            let rows = look_up_in_fec_table(self.table, media_count - 1, fec_count - 1)?;
            for (row, src) in rows.chunks_exact(TABLE_ROW_SIZE).enumerate() {
                out[row * size..(row + 1) * size].copy_from_slice(&src[..size]);
            }
        } else {
            interleaved_mask(media_count, fec_count, out);
        }

        Ok(&self.scratch[..len])
    }
}

/// Hop over the count-prefixed entries until the (media, fec) mask is reached
fn look_up_in_fec_table(
    table: &'static [u8],
    media_index: usize,
    fec_index: usize,
) -> Result<&'static [u8]> {
    let malformed = || FecSimError::new("Malformed packet mask table");

    let nb_entries = *table.first().ok_or_else(malformed)? as usize;
    if media_index >= nb_entries {
        return Err(FecSimError::invalid_input(format!(
            "No precomputed mask for {} media packets",
            media_index + 1
        )));
    }

    // Skip the table size
    let mut offset = 1;
    for _ in 0..media_index {
        let count = *table.get(offset).ok_or_else(malformed)? as usize;
        offset += 1;
        for j in 0..count {
            offset += TABLE_ROW_SIZE * (j + 1);
        }
    }

    let count = *table.get(offset).ok_or_else(malformed)? as usize;
    if fec_index >= count {
        return Err(FecSimError::invalid_input(format!(
            "No precomputed mask for {} FEC packets",
            fec_index + 1
        )));
    }
    offset += 1;

    for i in 0..fec_index {
        offset += TABLE_ROW_SIZE * (i + 1);
    }

    let size = TABLE_ROW_SIZE * (fec_index + 1);
    table.get(offset..offset + size).ok_or_else(malformed)
}

/// Media packet `m` is protected by redundancy packet `m % fec_count` only
fn interleaved_mask(media_count: usize, fec_count: usize, out: &mut [u8]) {
    let size = mask_size(media_count);
    for row in 0..fec_count {
        for col in 0..size {
            let mut byte = 0u8;
            for bit in 0..8 {
                let media = col * 8 + bit;
                if media < media_count && media % fec_count == row {
                    byte |= 0x80 >> bit;
                }
            }
            out[row * size + col] = byte;
        }
    }
}

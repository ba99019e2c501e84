//! Precomputed packet masks for groups of 1 to 12 media packets.
//!
//! Layout of both tables:
//! * byte 0: number of media-count entries (12)
//! * for each media count `m`: a count byte (`m`), followed by `m` masks.
//!   The mask for `f` redundancy packets holds `f` rows of 2 bytes.
//!
//! Row `i`, bit `j` (MSB first) set means redundancy packet `i` protects media packet `j`.

/// Masks favouring contiguous runs of media packets.
#[rustfmt::skip]
pub(crate) static PACKET_MASK_BURSTY: [u8; 741] = [
    12,
    // 1 media packet
    1,
    0x80, 0x00,
    // 2 media packets
    2,
    0xc0, 0x00,
    0x80, 0x00, 0xc0, 0x00,
    // 3 media packets
    3,
    0xe0, 0x00,
    0xc0, 0x00, 0xa0, 0x00,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00,
    // 4 media packets
    4,
    0xf0, 0x00,
    0xa0, 0x00, 0xd0, 0x00,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00,
    // 5 media packets
    5,
    0xf8, 0x00,
    0xd0, 0x00, 0xa8, 0x00,
    0x70, 0x00, 0x90, 0x00, 0xc8, 0x00,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00,
    // 6 media packets
    6,
    0xfc, 0x00,
    0xa8, 0x00, 0xd4, 0x00,
    0x94, 0x00, 0xc8, 0x00, 0x64, 0x00,
    0x60, 0x00, 0x38, 0x00, 0x88, 0x00, 0xc4, 0x00,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00,
    // 7 media packets
    7,
    0xfe, 0x00,
    0xd4, 0x00, 0xaa, 0x00,
    0xc8, 0x00, 0x74, 0x00, 0x92, 0x00,
    0x38, 0x00, 0x8a, 0x00, 0xc4, 0x00, 0x62, 0x00,
    0x60, 0x00, 0x30, 0x00, 0x1c, 0x00, 0x84, 0x00, 0xc2, 0x00,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00,
    // 8 media packets
    8,
    0xff, 0x00,
    0xaa, 0x00, 0xd5, 0x00,
    0xe0, 0x00, 0x3c, 0x00, 0x07, 0x00,
    0xe0, 0x00, 0x38, 0x00, 0x0e, 0x00, 0x03, 0x00,
    0xc0, 0x00, 0x70, 0x00, 0x18, 0x00, 0x0e, 0x00, 0x03, 0x00,
    0xc0, 0x00, 0x60, 0x00, 0x38, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00,
    // 9 media packets
    9,
    0xff, 0x80,
    0xd5, 0x00, 0xaa, 0x80,
    0xf0, 0x00, 0x1e, 0x00, 0x03, 0x80,
    0xe0, 0x00, 0x38, 0x00, 0x0e, 0x00, 0x03, 0x80,
    0xc0, 0x00, 0x70, 0x00, 0x1c, 0x00, 0x07, 0x00, 0x01, 0x80,
    0xc0, 0x00, 0x70, 0x00, 0x18, 0x00, 0x0e, 0x00, 0x03, 0x00, 0x01, 0x80,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x1c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80,
    // 10 media packets
    10,
    0xff, 0xc0,
    0xaa, 0x80, 0xd5, 0x40,
    0xf0, 0x00, 0x1e, 0x00, 0x03, 0xc0,
    0xe0, 0x00, 0x3c, 0x00, 0x07, 0x00, 0x01, 0xc0,
    0xe0, 0x00, 0x38, 0x00, 0x0e, 0x00, 0x03, 0x80, 0x00, 0xc0,
    0xc0, 0x00, 0x70, 0x00, 0x1c, 0x00, 0x06, 0x00, 0x03, 0x80, 0x00, 0xc0,
    0xc0, 0x00, 0x60, 0x00, 0x38, 0x00, 0x0c, 0x00, 0x07, 0x00, 0x01, 0x80, 0x00, 0xc0,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x1c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0,
    // 11 media packets
    11,
    0xff, 0xe0,
    0xd5, 0x40, 0xaa, 0xa0,
    0xf0, 0x00, 0x1f, 0x00, 0x01, 0xe0,
    0xe0, 0x00, 0x3c, 0x00, 0x07, 0x80, 0x00, 0xe0,
    0xe0, 0x00, 0x38, 0x00, 0x0e, 0x00, 0x03, 0x80, 0x00, 0xe0,
    0xc0, 0x00, 0x70, 0x00, 0x1c, 0x00, 0x07, 0x00, 0x01, 0xc0, 0x00, 0x60,
    0xc0, 0x00, 0x70, 0x00, 0x18, 0x00, 0x0e, 0x00, 0x03, 0x00, 0x01, 0xc0, 0x00, 0x60,
    0xc0, 0x00, 0x60, 0x00, 0x38, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x80, 0x00, 0xc0, 0x00, 0x60,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0e, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0, 0x00, 0x60,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0, 0x00, 0x60,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0, 0x00, 0x60,
    // 12 media packets
    12,
    0xff, 0xf0,
    0xaa, 0xa0, 0xd5, 0x50,
    0xf8, 0x00, 0x0f, 0x80, 0x00, 0xf0,
    0xf0, 0x00, 0x1e, 0x00, 0x03, 0xc0, 0x00, 0x70,
    0xe0, 0x00, 0x38, 0x00, 0x0f, 0x00, 0x01, 0xc0, 0x00, 0x70,
    0xe0, 0x00, 0x38, 0x00, 0x0e, 0x00, 0x03, 0x80, 0x00, 0xe0, 0x00, 0x30,
    0xc0, 0x00, 0x70, 0x00, 0x1c, 0x00, 0x06, 0x00, 0x03, 0x80, 0x00, 0xe0, 0x00, 0x30,
    0xc0, 0x00, 0x70, 0x00, 0x18, 0x00, 0x0e, 0x00, 0x03, 0x00, 0x01, 0xc0, 0x00, 0x60, 0x00, 0x30,
    0xc0, 0x00, 0x60, 0x00, 0x38, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0e, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30,
    0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30,
    0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30, 0x00, 0x18, 0x00, 0x0c, 0x00, 0x06, 0x00, 0x03, 0x00, 0x01, 0x80, 0x00, 0xc0, 0x00, 0x60, 0x00, 0x30,
];

/// Masks spreading each media packet over several uncorrelated rows.
#[rustfmt::skip]
pub(crate) static PACKET_MASK_RANDOM: [u8; 741] = [
    12,
    // 1 media packet
    1,
    0x80, 0x00,
    // 2 media packets
    2,
    0xc0, 0x00,
    0xc0, 0x00, 0x80, 0x00,
    // 3 media packets
    3,
    0xe0, 0x00,
    0xc0, 0x00, 0xa0, 0x00,
    0xc0, 0x00, 0xa0, 0x00, 0x60, 0x00,
    // 4 media packets
    4,
    0xf0, 0x00,
    0xc0, 0x00, 0xb0, 0x00,
    0xc0, 0x00, 0xb0, 0x00, 0x60, 0x00,
    0xc0, 0x00, 0xa0, 0x00, 0x30, 0x00, 0x50, 0x00,
    // 5 media packets
    5,
    0xf8, 0x00,
    0xa8, 0x00, 0xd0, 0x00,
    0xb0, 0x00, 0xc8, 0x00, 0x50, 0x00,
    0xc8, 0x00, 0xb0, 0x00, 0x50, 0x00, 0x28, 0x00,
    0xc0, 0x00, 0x30, 0x00, 0x18, 0x00, 0xa0, 0x00, 0x48, 0x00,
    // 6 media packets
    6,
    0xfc, 0x00,
    0xa8, 0x00, 0xd4, 0x00,
    0xd0, 0x00, 0x68, 0x00, 0xa4, 0x00,
    0xa8, 0x00, 0x58, 0x00, 0x64, 0x00, 0x94, 0x00,
    0xa8, 0x00, 0x84, 0x00, 0x64, 0x00, 0x90, 0x00, 0x58, 0x00,
    0x98, 0x00, 0x64, 0x00, 0x50, 0x00, 0x14, 0x00, 0xa8, 0x00, 0xe0, 0x00,
    // 7 media packets
    7,
    0xfe, 0x00,
    0xd4, 0x00, 0xaa, 0x00,
    0xd0, 0x00, 0xaa, 0x00, 0x64, 0x00,
    0xd0, 0x00, 0xaa, 0x00, 0x64, 0x00, 0x1c, 0x00,
    0x0c, 0x00, 0xb0, 0x00, 0x1a, 0x00, 0xc4, 0x00, 0x62, 0x00,
    0x8c, 0x00, 0x4a, 0x00, 0x64, 0x00, 0xd0, 0x00, 0xa0, 0x00, 0x32, 0x00,
    0x4a, 0x00, 0x94, 0x00, 0x1a, 0x00, 0xc4, 0x00, 0x28, 0x00, 0xc2, 0x00, 0x34, 0x00,
    // 8 media packets
    8,
    0xff, 0x00,
    0xaa, 0x00, 0xd5, 0x00,
    0xc5, 0x00, 0x92, 0x00, 0x6a, 0x00,
    0x45, 0x00, 0xb4, 0x00, 0x6a, 0x00, 0x89, 0x00,
    0x8c, 0x00, 0x92, 0x00, 0x2b, 0x00, 0x51, 0x00, 0x64, 0x00,
    0xa1, 0x00, 0x52, 0x00, 0x91, 0x00, 0x2a, 0x00, 0xc4, 0x00, 0x4c, 0x00,
    0x15, 0x00, 0xc2, 0x00, 0x25, 0x00, 0x62, 0x00, 0x58, 0x00, 0x8c, 0x00, 0xa3, 0x00,
    0x25, 0x00, 0x8a, 0x00, 0x91, 0x00, 0x68, 0x00, 0x32, 0x00, 0x43, 0x00, 0xc4, 0x00, 0x1c, 0x00,
    // 9 media packets
    9,
    0xff, 0x80,
    0xaa, 0x80, 0xd5, 0x00,
    0xa5, 0x00, 0xc8, 0x00, 0x52, 0x80,
    0xa2, 0x00, 0xc9, 0x00, 0x52, 0x80, 0x24, 0x80,
    0x8c, 0x00, 0x25, 0x00, 0x92, 0x80, 0x41, 0x80, 0x58, 0x00,
    0x84, 0x80, 0x27, 0x00, 0x51, 0x80, 0x1a, 0x00, 0x68, 0x00, 0x89, 0x00,
    0x8c, 0x00, 0x47, 0x00, 0x81, 0x80, 0x12, 0x80, 0x58, 0x00, 0x28, 0x80, 0xb4, 0x00,
    0x2c, 0x00, 0x91, 0x00, 0x40, 0x80, 0x06, 0x80, 0xc8, 0x00, 0x45, 0x00, 0x30, 0x80, 0xa2, 0x00,
    0x4c, 0x00, 0x62, 0x00, 0x91, 0x00, 0x42, 0x80, 0xa4, 0x00, 0x13, 0x00, 0x30, 0x80, 0x88, 0x80, 0x09, 0x00,
    // 10 media packets
    10,
    0xff, 0xc0,
    0xaa, 0x80, 0xd5, 0x40,
    0xa4, 0x40, 0xc9, 0x00, 0x52, 0x80,
    0xca, 0x00, 0x32, 0x80, 0xa1, 0x40, 0x55, 0x00,
    0xca, 0x00, 0x32, 0x80, 0xa1, 0x40, 0x55, 0x00, 0x08, 0xc0,
    0x0e, 0x00, 0x33, 0x00, 0x10, 0xc0, 0x45, 0x40, 0x88, 0x80, 0xe0, 0x00,
    0x46, 0x00, 0x33, 0x00, 0x80, 0xc0, 0x0c, 0x40, 0x28, 0x80, 0x94, 0x00, 0xc1, 0x00,
    0x2c, 0x00, 0x81, 0x80, 0xa0, 0x40, 0x05, 0x40, 0x18, 0x80, 0xc2, 0x00, 0x22, 0x80, 0x50, 0x40,
    0x4c, 0x00, 0x23, 0x00, 0x88, 0xc0, 0x21, 0x40, 0x52, 0x80, 0x94, 0x00, 0x26, 0x00, 0x48, 0x40, 0x91, 0x80,
    0x93, 0x00, 0x7d, 0x00, 0xf0, 0x00, 0x9e, 0xc0, 0x52, 0xc0, 0xad, 0xc0, 0x9c, 0xc0, 0x27, 0x00, 0xb7, 0x80, 0xd3, 0x00,
    // 11 media packets
    11,
    0xff, 0xe0,
    0xaa, 0xc0, 0xd5, 0x60,
    0x43, 0x20, 0x7d, 0x80, 0x83, 0xc0,
    0x3f, 0x20, 0xd0, 0xa0, 0x47, 0xe0, 0x6c, 0x20,
    0x37, 0xa0, 0x8e, 0x20, 0x42, 0xc0, 0x8c, 0xe0, 0xe0, 0xa0,
    0x23, 0x60, 0x93, 0xe0, 0x48, 0xc0, 0x3f, 0x20, 0x0e, 0x20, 0xa1, 0xa0,
    0x22, 0xe0, 0xa2, 0xe0, 0x54, 0xc0, 0x9c, 0x00, 0xe9, 0x60, 0xe1, 0x80, 0xb6, 0xa0,
    0x24, 0xa0, 0x78, 0x40, 0x85, 0xc0, 0x19, 0x80, 0x98, 0x20, 0x75, 0x20, 0xea, 0x40, 0xde, 0x20,
    0x74, 0x80, 0xb1, 0x20, 0xe9, 0x60, 0x6d, 0x20, 0xf7, 0x00, 0xf1, 0xa0, 0x0f, 0x80, 0x67, 0xc0, 0x96, 0x80,
    0xed, 0x40, 0xcc, 0x40, 0xe1, 0xa0, 0x99, 0xe0, 0x0e, 0xa0, 0x25, 0x60, 0xec, 0xa0, 0xb6, 0x00, 0xfc, 0x40, 0xb0, 0xa0,
    0x0b, 0x20, 0xc1, 0x40, 0xf1, 0x40, 0x6d, 0xc0, 0x38, 0xc0, 0x8c, 0x40, 0x16, 0x40, 0xdc, 0x00, 0x66, 0x20, 0x95, 0xa0, 0x83, 0x60,
    // 12 media packets
    12,
    0xff, 0xf0,
    0xaa, 0xa0, 0xd5, 0x50,
    0x3e, 0x40, 0xc5, 0xc0, 0xa6, 0xb0,
    0x7a, 0x40, 0x49, 0xf0, 0x4b, 0x90, 0x9f, 0x40,
    0x1b, 0x40, 0xad, 0x30, 0x8c, 0x70, 0x4b, 0x80, 0xd5, 0x00,
    0x98, 0xe0, 0xa3, 0x70, 0x5e, 0x40, 0xb2, 0x80, 0x34, 0x70, 0xcc, 0x90,
    0xd4, 0xa0, 0x62, 0x50, 0x17, 0xa0, 0xc8, 0x30, 0x8b, 0xc0, 0xc0, 0x70, 0xa1, 0xb0,
    0x79, 0xa0, 0x2b, 0x70, 0xf7, 0x10, 0x54, 0xf0, 0xb3, 0xd0, 0xd1, 0x50, 0xc9, 0xe0, 0xf1, 0xc0,
    0xfc, 0xa0, 0x64, 0x60, 0x34, 0x90, 0x27, 0x60, 0x7d, 0x60, 0xb6, 0x20, 0xb9, 0xc0, 0x8c, 0x60, 0x34, 0x60,
    0x8f, 0x50, 0x6f, 0xa0, 0x72, 0xb0, 0x7c, 0xc0, 0xc3, 0xc0, 0x8a, 0x90, 0xc6, 0x10, 0x69, 0x10, 0x1a, 0x70, 0x32, 0xb0,
    0x0a, 0x70, 0xa3, 0x30, 0x96, 0x90, 0xb3, 0xc0, 0x74, 0x40, 0x5b, 0xa0, 0x66, 0xe0, 0xa7, 0xd0, 0xf5, 0x40, 0xb7, 0x80, 0x5e, 0xc0,
    0xfa, 0x40, 0xa3, 0x20, 0x84, 0xf0, 0x5e, 0xc0, 0x77, 0x50, 0x6e, 0xc0, 0x55, 0xa0, 0x53, 0x50, 0x59, 0xd0, 0xae, 0x20, 0xb4, 0x70, 0x7d, 0xa0,
];

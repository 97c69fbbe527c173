//! ATSC User Data Framing
//!
//! Validates and unpacks raw ATSC A/53 caption user-data blocks into
//! cc byte-triplets. No caption decoding happens here; the framer only
//! checks the fixed structure and queues triplets for the decoder.
//!
//! Block layout:
//! - 8-byte signature: country code 0xB5, provider code 0x0031,
//!   user identifier "GA94", user data type code 0x03
//! - 1 cc_data header byte: process flags plus the 5-bit triplet count
//! - 1 reserved em_data byte (0xFF)
//! - `count` triplets of (cc header, data byte 1, data byte 2)

use thiserror::Error;

/// ATSC/EIA country code for the United States
const USA_COUNTRY_CODE: u8 = 0xB5;
/// ATSC provider code
const ATSC_PROVIDER_CODE: u16 = 0x0031;
/// ATSC1 user identifier, "GA94"
const ATSC1_USER_IDENTIFIER: u32 = 0x4741_3934;
/// user_data_type_code for cc_data
const USER_DATA_TYPE_CC: u8 = 0x03;
/// Reserved em_data byte
const EM_DATA_RESERVED: u8 = 0xFF;

/// Framing failures. These are internal: the decoder logs and drops the
/// offending block, so framing loss never halts the pipeline and never
/// reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("user data block truncated at {got} bytes, needed {needed}")]
    Truncated { got: usize, needed: usize },
    #[error("not ATSC caption user data")]
    BadSignature,
    #[error("cc_data process flags not set: {0:#04x}")]
    MissingProcessFlags(u8),
    #[error("bad reserved em_data byte: {0:#04x}")]
    BadReserved(u8),
}

/// One caption byte pair as carried on the wire: the cc header byte
/// (marker bits, cc_valid, cc_type) plus the two data bytes, still
/// parity-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcData {
    pub cc_header: u8,
    pub byte1: u8,
    pub byte2: u8,
}

impl CcData {
    /// The five marker bits that must all be set on a well-formed header
    pub fn marker_valid(&self) -> bool {
        self.cc_header & 0xF8 == 0xF8
    }

    /// cc_valid flag; clear means the pair is padding
    pub fn cc_valid(&self) -> bool {
        self.cc_header & 0x04 != 0
    }

    /// cc_type: 0/1 are NTSC fields one and two, 2/3 are DTVCC
    pub fn cc_type(&self) -> u8 {
        self.cc_header & 0x03
    }
}

/// Validate one user-data block and unpack its caption triplets.
pub fn parse_user_data(data: &[u8]) -> Result<Vec<CcData>, FramingError> {
    if data.len() < 10 {
        return Err(FramingError::Truncated {
            got: data.len(),
            needed: 10,
        });
    }
    if data[0] != USA_COUNTRY_CODE
        || u16::from_be_bytes([data[1], data[2]]) != ATSC_PROVIDER_CODE
        || u32::from_be_bytes([data[3], data[4], data[5], data[6]]) != ATSC1_USER_IDENTIFIER
        || data[7] != USER_DATA_TYPE_CC
    {
        return Err(FramingError::BadSignature);
    }

    let header = data[8];
    // process_em_data and process_cc_data must both be set
    if header & 0xC0 != 0xC0 {
        return Err(FramingError::MissingProcessFlags(header));
    }
    let count = (header & 0x1F) as usize;
    if data[9] != EM_DATA_RESERVED {
        return Err(FramingError::BadReserved(data[9]));
    }

    let needed = 10 + count * 3;
    if data.len() < needed {
        return Err(FramingError::Truncated {
            got: data.len(),
            needed,
        });
    }

    let mut triplets = Vec::with_capacity(count);
    for chunk in data[10..needed].chunks_exact(3) {
        triplets.push(CcData {
            cc_header: chunk[0],
            byte1: chunk[1],
            byte2: chunk[2],
        });
    }
    Ok(triplets)
}

/// Check the odd parity CEA-608 requires on each data byte
pub fn odd_parity(byte: u8) -> bool {
    byte.count_ones() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(pairs: &[(u8, u8, u8)]) -> Vec<u8> {
        let mut data = vec![
            0xB5, 0x00, 0x31, 0x47, 0x41, 0x39, 0x34, 0x03,
            0xC0 | pairs.len() as u8,
            0xFF,
        ];
        for &(header, b1, b2) in pairs {
            data.extend_from_slice(&[header, b1, b2]);
        }
        data
    }

    #[test]
    fn test_parse_valid_block() {
        let data = block(&[(0xFC, 0x94, 0x2C), (0xFD, 0x80, 0x80)]);
        let triplets = parse_user_data(&data).unwrap();
        assert_eq!(triplets.len(), 2);
        assert_eq!(triplets[0].byte1, 0x94);
        assert!(triplets[0].marker_valid());
        assert!(triplets[0].cc_valid());
        assert_eq!(triplets[0].cc_type(), 0);
        assert_eq!(triplets[1].cc_type(), 1);
    }

    #[test]
    fn test_bad_signature_rejected() {
        let mut data = block(&[(0xFC, 0x80, 0x80)]);
        data[3] = 0x00;
        assert_eq!(parse_user_data(&data), Err(FramingError::BadSignature));
    }

    #[test]
    fn test_missing_process_flags() {
        let mut data = block(&[(0xFC, 0x80, 0x80)]);
        data[8] &= !0x40;
        assert!(matches!(
            parse_user_data(&data),
            Err(FramingError::MissingProcessFlags(_))
        ));
    }

    #[test]
    fn test_bad_reserved_byte() {
        let mut data = block(&[(0xFC, 0x80, 0x80)]);
        data[9] = 0x00;
        assert_eq!(parse_user_data(&data), Err(FramingError::BadReserved(0x00)));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            parse_user_data(&[0xB5, 0x00, 0x31]),
            Err(FramingError::Truncated { .. })
        ));
    }

    #[test]
    fn test_truncated_triplets() {
        let mut data = block(&[(0xFC, 0x80, 0x80)]);
        // Claim two pairs but carry one
        data[8] = 0xC2;
        assert!(matches!(
            parse_user_data(&data),
            Err(FramingError::Truncated { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_tolerated() {
        let mut data = block(&[(0xFC, 0x80, 0x80)]);
        data.extend_from_slice(&[0xDE, 0xAD]);
        assert_eq!(parse_user_data(&data).unwrap().len(), 1);
    }

    #[test]
    fn test_odd_parity() {
        assert!(odd_parity(0x80)); // 0x00 with parity bit
        assert!(odd_parity(0x94)); // 0x14 with parity bit
        assert!(!odd_parity(0x14));
        assert!(!odd_parity(0xFF));
    }
}

//! `ORIENT` atom payloads: a single byte encoding a vertical/horizontal flag plus a horizontal-
//! and vertical-justification pair, rendered as a 3-letter code such as `vcf` or `hlt`
//! (`spec.md` §4.1, §4.3).
//!
//! Bit layout of the payload byte: bit 6 is the vertical flag, bits 5-3 are the horizontal
//! justification code, bits 2-0 are the vertical justification code.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::error::{Error, ErrorKind};

const VERTICAL_BIT: u8 = 0b0100_0000;

/// Horizontal-justification letters and their 3-bit codes.
const HJ_CODES: &[(char, u8)] = &[('l', 0), ('c', 1), ('r', 2), ('f', 3)];
/// Vertical-justification letters and their 3-bit codes.
const VJ_CODES: &[(char, u8)] = &[('t', 0), ('m', 1), ('b', 2), ('f', 3)];

lazy_static! {
    static ref CODE_TO_BYTE: HashMap<[u8; 3], u8> = build_table().0;
    static ref BYTE_TO_CODE: HashMap<u8, [u8; 3]> = build_table().1;
}

fn build_table() -> (HashMap<[u8; 3], u8>, HashMap<u8, [u8; 3]>) {
    let mut by_code = HashMap::new();
    let mut by_byte = HashMap::new();

    for &vertical in &[false, true] {
        for &(hj_ch, hj_val) in HJ_CODES {
            for &(vj_ch, vj_val) in VJ_CODES {
                let first = if vertical { b'v' } else { b'h' };
                let code = [first, hj_ch as u8, vj_ch as u8];
                let mut byte = (hj_val << 3) | vj_val;
                if vertical {
                    byte |= VERTICAL_BIT;
                }
                by_code.insert(code, byte);
                by_byte.insert(byte, code);
            }
        }
    }

    (by_code, by_byte)
}

/// Encodes a 3-letter orientation code (e.g. `"vcf"`) to its payload byte.
pub fn encode(code: &str) -> crate::error::Result<u8> {
    let bytes = code.as_bytes();
    if bytes.len() != 3 {
        return Err(bad(code));
    }
    let key = [bytes[0].to_ascii_lowercase(), bytes[1].to_ascii_lowercase(), bytes[2].to_ascii_lowercase()];
    CODE_TO_BYTE.get(&key).copied().ok_or_else(|| bad(code))
}

/// Decodes a payload byte back to its 3-letter orientation code.
pub fn decode(byte: u8) -> crate::error::Result<String> {
    BYTE_TO_CODE
        .get(&byte)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidBinaryFormat("unrecognized orientation byte".into()),
                format!("unrecognized orientation byte 0x{byte:02x}"),
            )
        })
}

fn bad(code: &str) -> Error {
    Error::new(ErrorKind::BadArgumentFormat, format!("invalid orientation code '{code}'"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vcf_matches_the_spec_s7_scenario() {
        assert_eq!(encode("vcf").unwrap(), 0x43);
        assert_eq!(decode(0x43).unwrap(), "vcf");
    }

    #[test]
    fn hlt_is_self_consistent() {
        let byte = encode("hlt").unwrap();
        assert_eq!(decode(byte).unwrap(), "hlt");
    }

    #[test]
    fn unknown_code_is_an_error() {
        assert!(encode("xyz").is_err());
    }

    #[test]
    fn every_table_entry_round_trips() {
        for &(_, byte) in CODE_TO_BYTE.iter() {
            let code = decode(*byte).unwrap();
            assert_eq!(encode(&code).unwrap(), *byte);
        }
    }
}

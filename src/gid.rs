//! The FDO global identifier (`GID`) type: a 2-part `(type, id)` or 3-part
//! `(type, subtype, id)` reference, see `spec.md` §3 and §4.3.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// A global identifier. The 2-part and 3-part-with-subtype-0 forms are kept as distinct variants
/// so that round-tripping preserves which form a value was read or written as (`spec.md` §3's
/// invariant and testable property S5).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FdoGid {
    /// `"T-I"`.
    TwoPart { type_: u32, id: u32 },
    /// `"T-S-I"`. `subtype == 0` is valid and distinct from [`FdoGid::TwoPart`].
    ThreePart { type_: u32, subtype: u32, id: u32 },
}

impl FdoGid {
    pub const fn two(type_: u32, id: u32) -> Self {
        FdoGid::TwoPart { type_, id }
    }

    pub const fn three(type_: u32, subtype: u32, id: u32) -> Self {
        FdoGid::ThreePart { type_, subtype, id }
    }

    /// Encodes the GID using the byte-length rules of `spec.md` §4.3.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            FdoGid::TwoPart { type_, id } => {
                vec![type_ as u8, (id >> 8) as u8, id as u8]
            }
            FdoGid::ThreePart { type_: 0, subtype: 0, id } if id <= 255 => {
                vec![id as u8]
            }
            FdoGid::ThreePart { type_: 0, subtype: 0, id } => {
                vec![(id >> 8) as u8, id as u8]
            }
            FdoGid::ThreePart { type_: 0, subtype, id } => {
                vec![subtype as u8, (id >> 8) as u8, id as u8]
            }
            FdoGid::ThreePart { type_, subtype, id } => {
                vec![type_ as u8, subtype as u8, (id >> 8) as u8, id as u8]
            }
        }
    }

    /// Decodes a GID from its payload bytes. `prefer_three_part` selects the interpretation of a
    /// 3-byte payload: DOD-protocol atoms (and the other per-atom overrides named in `spec.md`
    /// §4.3) prefer the 3-part-with-type-0 form; everything else defaults to the 2-part form.
    pub fn decode(bytes: &[u8], prefer_three_part: bool) -> crate::error::Result<Self> {
        match bytes.len() {
            1 => Ok(FdoGid::ThreePart { type_: 0, subtype: 0, id: bytes[0] as u32 }),
            2 => Ok(FdoGid::ThreePart { type_: 0, subtype: 0, id: u16_be(bytes) as u32 }),
            3 if prefer_three_part => {
                Ok(FdoGid::ThreePart { type_: 0, subtype: bytes[0] as u32, id: u16_be(&bytes[1..]) as u32 })
            }
            3 => Ok(FdoGid::TwoPart { type_: bytes[0] as u32, id: u16_be(&bytes[1..]) as u32 }),
            4 => Ok(FdoGid::ThreePart {
                type_: bytes[0] as u32,
                subtype: bytes[1] as u32,
                id: u16_be(&bytes[2..]) as u32,
            }),
            _ => Err(Error::new(
                ErrorKind::InvalidBinaryFormat("GID payload must be 1 to 4 bytes".into()),
                format!("invalid GID payload length {}", bytes.len()),
            )),
        }
    }
}

fn u16_be(b: &[u8]) -> u16 {
    ((b[0] as u16) << 8) | b[1] as u16
}

impl fmt::Display for FdoGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FdoGid::TwoPart { type_, id } => write!(f, "{type_}-{id}"),
            FdoGid::ThreePart { type_, subtype, id } => write!(f, "{type_}-{subtype}-{id}"),
        }
    }
}

impl FromStr for FdoGid {
    type Err = Error;

    /// Parses the `"T-I"` or `"T-S-I"` text forms. At least two segments are required, see the
    /// lexer's `GID` token grammar in `spec.md` §6.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        let bad = || Error::new(ErrorKind::BadGidFormat(s.to_owned()), format!("invalid GID '{s}'"));
        let num = |p: &str| p.parse::<u32>().map_err(|_| bad());

        match parts.as_slice() {
            [t, i] => Ok(FdoGid::TwoPart { type_: num(t)?, id: num(i)? }),
            [t, s, i] => Ok(FdoGid::ThreePart { type_: num(t)?, subtype: num(s)?, id: num(i)? }),
            _ => Err(bad()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn two_part_encodes_to_three_bytes() {
        let gid = FdoGid::two(32, 105);
        assert_eq!(gid.encode(), vec![0x20, 0x00, 0x69]);
    }

    #[test]
    fn three_part_type_zero_small_id_is_one_byte() {
        let gid = FdoGid::three(0, 0, 21029 % 256);
        assert_eq!(gid.encode().len(), 1);
    }

    #[test]
    fn three_part_with_type_round_trips_distinctly_from_two_part() {
        let three = FdoGid::three(1, 0, 21029);
        let bytes = three.encode();
        assert_eq!(bytes, vec![0x01, 0x00, 0x52, 0x25]);
        let decoded = FdoGid::decode(&bytes, false).unwrap();
        assert_eq!(decoded, three);
        assert_ne!(decoded, FdoGid::two(1, 21029));
    }

    #[test]
    fn three_byte_payload_prefers_two_part_by_default() {
        let decoded = FdoGid::decode(&[0x20, 0x00, 0x69], false).unwrap();
        assert_eq!(decoded, FdoGid::two(32, 105));
    }

    #[test]
    fn three_byte_payload_prefers_three_part_when_hinted() {
        let decoded = FdoGid::decode(&[0x05, 0x00, 0x69], true).unwrap();
        assert_eq!(decoded, FdoGid::three(0, 5, 105));
    }

    #[test]
    fn text_form_round_trips() {
        assert_eq!("32-105".parse::<FdoGid>().unwrap(), FdoGid::two(32, 105));
        assert_eq!("1-0-21029".parse::<FdoGid>().unwrap(), FdoGid::three(1, 0, 21029));
        assert_eq!(FdoGid::three(1, 0, 21029).to_string(), "1-0-21029");
    }
}

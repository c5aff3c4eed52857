//! The decoded object model: a [`Stream`] of [`Atom`]s with a query surface, independent of
//! whichever front end (text or binary) produced it (`spec.md` §3, §4.6).

use crate::binary::{reassemble_continuations, AtomFrame, BinaryDecoder, BinaryEncoder, StylePolicy};
use crate::error::{Error, ErrorKind, Result};
use crate::table::{AtomDefinition, ATOM_TABLE};
use crate::text::StreamNode;
use crate::value::{self, Value};

/// A single atom occurrence in the object model: its table definition (when recognized) and its
/// decoded [`Value`].
#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub protocol: u8,
    pub atom_number: u8,
    pub definition: Option<AtomDefinition>,
    pub value: Value,
}

impl Atom {
    /// The atom's canonical name, when its `(protocol, atom_number)` pair is known.
    pub fn name(&self) -> Option<&'static str> {
        self.definition.map(|d| d.name)
    }

    pub fn as_string(&self) -> Result<&str> {
        self.value.as_string()
    }

    pub fn as_number(&self) -> Result<i64> {
        self.value.as_number()
    }

    pub fn as_gid(&self) -> Result<crate::gid::FdoGid> {
        self.value.as_gid()
    }

    pub fn as_boolean(&self) -> Result<bool> {
        self.value.as_boolean()
    }

    pub fn as_stream(&self) -> Result<&Stream> {
        self.value.as_stream()
    }

    pub fn as_raw(&self) -> Result<&[u8]> {
        self.value.as_raw()
    }

    /// The infallible sibling of [`Atom::as_string`]; never errors.
    pub fn string(&self) -> Option<&str> {
        self.value.string()
    }

    /// The infallible sibling of [`Atom::as_number`]; never errors.
    pub fn number(&self) -> Option<i64> {
        self.value.number()
    }
}

/// An ordered sequence of atoms: the top-level decoded unit, or the payload of a `STREAM`-typed
/// atom.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stream {
    pub atoms: Vec<Atom>,
}

impl Stream {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// Builds a [`Stream`] from a parsed [`StreamNode`], resolving each atom's argument into a
    /// [`Value`]. Fails with [`ErrorKind::UnrecognizedAtom`] on the first atom the text front end
    /// couldn't resolve against the atom table (`spec.md` §7): unlike the parser, the object model
    /// requires every atom to be known.
    pub fn from_ast(node: &StreamNode) -> Result<Stream> {
        let atoms = node
            .atoms
            .iter()
            .map(|atom_node| {
                let def = atom_node.definition.ok_or_else(|| {
                    Error::new(
                        ErrorKind::UnrecognizedAtom(atom_node.name.clone()),
                        format!("unrecognized atom '{}'", atom_node.name),
                    )
                })?;
                let value = value::from_argument(def, atom_node.arguments.as_deref())?;
                Ok(Atom { protocol: def.protocol, atom_number: def.atom_number, definition: Some(def), value })
            })
            .collect::<Result<Vec<Atom>>>()?;
        Ok(Stream { atoms })
    }

    /// Decodes a binary byte stream into a [`Stream`], reassembling large-atom continuations
    /// first (`spec.md` §4.4, §4.6). Atoms whose `(protocol, atom_number)` pair is unknown are
    /// kept as [`Value::Raw`] with `definition: None`, mirroring the text parser's tolerance of
    /// unrecognized atoms.
    pub fn decode(bytes: &[u8]) -> Result<Stream> {
        match BinaryDecoder::decode_all(bytes) {
            Ok(frames) => {
                let frames = reassemble_continuations(frames)?;
                let atoms = frames
                    .into_iter()
                    .map(Self::decode_frame)
                    .collect::<Result<Vec<Atom>>>()?;
                Ok(Stream { atoms })
            }
            // A STREAM atom's payload may be too short to be framed stream data; if it otherwise
            // looks like `[protocol, atom_number, data...]` for a known atom, decode that single
            // atom directly (`spec.md` §4.3's STREAM fallback rule).
            Err(err) => Self::decode_single_atom_fallback(bytes).ok_or(err),
        }
    }

    fn decode_single_atom_fallback(bytes: &[u8]) -> Option<Stream> {
        if bytes.len() < 2 {
            return None;
        }
        let def = ATOM_TABLE.by_protocol_atom(bytes[0], bytes[1])?;
        let value = value::from_payload(def, &bytes[2..]).ok()?;
        Some(Stream { atoms: vec![Atom { protocol: def.protocol, atom_number: def.atom_number, definition: Some(def), value }] })
    }

    fn decode_frame(frame: AtomFrame) -> Result<Atom> {
        match ATOM_TABLE.by_protocol_atom(frame.protocol, frame.atom_number) {
            Some(def) => {
                let value = value::from_payload(def, &frame.payload)?;
                Ok(Atom { protocol: frame.protocol, atom_number: frame.atom_number, definition: Some(def), value })
            }
            None => {
                log::warn!("unrecognized atom {}:{} kept as raw bytes", frame.protocol, frame.atom_number);
                Ok(Atom {
                    protocol: frame.protocol,
                    atom_number: frame.atom_number,
                    definition: None,
                    value: Value::Raw(frame.payload),
                })
            }
        }
    }

    /// Encodes this stream back to bytes using the `FULL` style unconditionally, the only
    /// normative wire form (`spec.md` §9).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = BinaryEncoder::new(StylePolicy::FullOnly);
        for atom in &self.atoms {
            let payload = match atom.definition {
                Some(def) => value::to_payload(def, &atom.value).unwrap_or_default(),
                None => atom.value.as_raw().map(<[u8]>::to_vec).unwrap_or_default(),
            };
            encoder.encode_frame(&AtomFrame::new(atom.protocol, atom.atom_number, payload));
        }
        encoder.into_bytes()
    }

    /// The first atom named `name`, if present.
    pub fn find_first(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.name() == Some(name))
    }

    /// Every atom named `name`, in stream order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Atom> + 'a {
        self.atoms.iter().filter(move |a| a.name() == Some(name))
    }

    /// Every atom belonging to `protocol`, in stream order.
    pub fn find_by_protocol(&self, protocol: u8) -> impl Iterator<Item = &Atom> {
        self.atoms.iter().filter(move |a| a.protocol == protocol)
    }

    /// Every atom matching `predicate`, in stream order.
    pub fn filter<'a>(&'a self, predicate: impl Fn(&Atom) -> bool + 'a) -> impl Iterator<Item = &'a Atom> + 'a {
        self.atoms.iter().filter(move |a| predicate(a))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

impl<'a> IntoIterator for &'a Stream {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::text::Parser;

    #[test]
    fn empty_stream_round_trips_to_s1_bytes() {
        let stream = Stream::new(Vec::new());
        assert_eq!(stream.to_bytes(), Vec::<u8>::new());
    }

    #[test]
    fn decode_tolerates_unknown_atoms() {
        let mut encoder = BinaryEncoder::new(StylePolicy::FullOnly);
        encoder.encode_frame(&AtomFrame::new(99, 250, vec![1, 2, 3]));
        let bytes = encoder.into_bytes();
        let stream = Stream::decode(&bytes).unwrap();
        assert_eq!(stream.atoms.len(), 1);
        assert!(stream.atoms[0].definition.is_none());
        assert_eq!(stream.atoms[0].as_raw().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn from_ast_rejects_unrecognized_atoms() {
        let node = Parser::parse("not_a_real_atom_name").unwrap();
        let err = Stream::from_ast(&node).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnrecognizedAtom(_)));
    }

    #[test]
    fn from_ast_then_to_bytes_then_decode_round_trips_a_known_atom() {
        let node = Parser::parse("uni_start_stream").unwrap();
        let stream = Stream::from_ast(&node).unwrap();
        let bytes = stream.to_bytes();
        let decoded = Stream::decode(&bytes).unwrap();
        assert_eq!(decoded, stream);
    }

    #[test]
    fn find_first_locates_by_name() {
        let node = Parser::parse("uni_start_stream uni_end_stream").unwrap();
        let stream = Stream::from_ast(&node).unwrap();
        assert!(stream.find_first("uni_end_stream").is_some());
        assert!(stream.find_first("not_present").is_none());
    }
}

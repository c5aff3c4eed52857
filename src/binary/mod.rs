//! The binary codec: eight frame encoding styles plus the extended-protocol prefix style, the
//! `current_protocol` context register, and the large-atom continuation sub-protocol
//! (`spec.md` §4.4).

pub mod frame_aware;

use crate::error::{Error, ErrorKind};
use crate::util::ReadUtil;

/// The UNI protocol carries stream framing and the large-atom continuation sub-protocol.
pub const UNI_PROTOCOL: u8 = 0;
pub const UNI_LARGE_ATOM_START: u8 = 4;
pub const UNI_LARGE_ATOM_SEGMENT: u8 = 5;
pub const UNI_LARGE_ATOM_END: u8 = 6;

/// A decoded or to-be-encoded atom at the wire level: protocol, atom number, and owned payload
/// bytes (`spec.md` §3).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AtomFrame {
    pub protocol: u8,
    pub atom_number: u8,
    pub payload: Vec<u8>,
}

impl AtomFrame {
    pub fn new(protocol: u8, atom_number: u8, payload: Vec<u8>) -> Self {
        Self { protocol, atom_number, payload }
    }
}

/// Encoder style policy (`spec.md` §4.4): emit `FULL` unconditionally (the reference-compatible
/// default, and the only style with a normative, byte-stable wire form) or greedily pick the most
/// compact applicable style.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StylePolicy {
    FullOnly,
    Compact,
}

fn write_length(out: &mut Vec<u8>, len: usize) {
    if len <= 127 {
        out.push(len as u8);
    } else {
        out.push(0x80 | ((len >> 8) as u8));
        out.push((len & 0xFF) as u8);
    }
}

fn invalid_binary(msg: impl Into<std::borrow::Cow<'static, str>>) -> Error {
    let msg = msg.into();
    Error::new(ErrorKind::InvalidBinaryFormat(msg.clone()), msg)
}

const fn prefix_byte0(pp: u8, aa: u8) -> u8 {
    0b111_00000 | ((pp & 0b11) << 3) | ((aa & 0b11) << 1)
}

const fn prefix_byte1(inner_style: u8, protocol_low5: u8) -> u8 {
    ((inner_style & 0b111) << 5) | (protocol_low5 & 0x1F)
}

/// Appends `frame` to `out` choosing a style per `policy` and the given `current_protocol`
/// context, returning the context's new value. A pure function so the frame-aware encoder can
/// measure a frame's encoded size without committing it to a bucket.
pub fn write_frame(out: &mut Vec<u8>, frame: &AtomFrame, policy: StylePolicy, current_protocol: u8) -> u8 {
    if frame.protocol > 31 {
        return write_prefix(out, frame, policy);
    }
    match policy {
        StylePolicy::FullOnly => write_full(out, frame),
        StylePolicy::Compact => write_compact(out, frame, current_protocol),
    }
}

/// The encoded length of `frame` under `policy`/`current_protocol`, without writing it anywhere.
pub fn frame_encoded_len(frame: &AtomFrame, policy: StylePolicy, current_protocol: u8) -> usize {
    let mut scratch = Vec::new();
    write_frame(&mut scratch, frame, policy, current_protocol);
    scratch.len()
}

fn write_full(out: &mut Vec<u8>, frame: &AtomFrame) -> u8 {
    out.push(0b000_00000 | (frame.protocol & 0x1F));
    out.push(frame.atom_number);
    write_length(out, frame.payload.len());
    out.extend_from_slice(&frame.payload);
    frame.protocol
}

fn write_compact(out: &mut Vec<u8>, frame: &AtomFrame, current_protocol: u8) -> u8 {
    let atom = frame.atom_number;
    let data = &frame.payload[..];
    let same_protocol = frame.protocol == current_protocol;

    if same_protocol && atom < 32 && data.is_empty() {
        out.push(0b011_00000 | atom);
        return current_protocol;
    }
    if same_protocol && atom < 32 && data == [0] {
        out.push(0b101_00000 | atom);
        return current_protocol;
    }
    if same_protocol && atom < 32 && data == [1] {
        out.push(0b110_00000 | atom);
        return current_protocol;
    }
    if atom < 32 && data.len() == 1 && data[0] <= 7 {
        out.push(0b010_00000 | (frame.protocol & 0x1F));
        out.push((data[0] << 5) | atom);
        return frame.protocol;
    }
    if atom < 32 && (1..=7).contains(&data.len()) {
        out.push(0b001_00000 | (frame.protocol & 0x1F));
        out.push(((data.len() as u8) << 5) | atom);
        out.extend_from_slice(data);
        return frame.protocol;
    }
    if same_protocol && atom < 32 {
        out.push(0b100_00000 | atom);
        write_length(out, data.len());
        out.extend_from_slice(data);
        return current_protocol;
    }
    write_full(out, frame)
}

fn write_prefix(out: &mut Vec<u8>, frame: &AtomFrame, policy: StylePolicy) -> u8 {
    let protocol = frame.protocol;
    let pp = (protocol >> 5) & 0b11;
    let protocol_low5 = protocol & 0x1F;
    let atom = frame.atom_number;
    let data = &frame.payload[..];
    let compact = matches!(policy, StylePolicy::Compact) && atom < 128;

    if compact && data.is_empty() {
        out.push(prefix_byte0(pp, (atom >> 5) & 0b11));
        out.push(prefix_byte1(3, protocol_low5));
        out.push(atom & 0x1F);
    } else if compact && data == [0] {
        out.push(prefix_byte0(pp, (atom >> 5) & 0b11));
        out.push(prefix_byte1(5, protocol_low5));
        out.push(atom & 0x1F);
    } else if compact && data == [1] {
        out.push(prefix_byte0(pp, (atom >> 5) & 0b11));
        out.push(prefix_byte1(6, protocol_low5));
        out.push(atom & 0x1F);
    } else if compact && data.len() == 1 && data[0] <= 7 {
        out.push(prefix_byte0(pp, (atom >> 5) & 0b11));
        out.push(prefix_byte1(2, protocol_low5));
        out.push((data[0] << 5) | (atom & 0x1F));
    } else if compact && (1..=7).contains(&data.len()) {
        out.push(prefix_byte0(pp, (atom >> 5) & 0b11));
        out.push(prefix_byte1(1, protocol_low5));
        out.push(((data.len() as u8) << 5) | (atom & 0x1F));
        out.extend_from_slice(data);
    } else {
        out.push(prefix_byte0(pp, 0));
        out.push(prefix_byte1(0, protocol_low5));
        out.push(atom);
        write_length(out, data.len());
        out.extend_from_slice(data);
    }
    protocol
}

/// A cursor over an input byte slice, decoding one frame at a time and maintaining the
/// `current_protocol` context register.
pub struct BinaryDecoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    current_protocol: u8,
}

impl<'a> BinaryDecoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, current_protocol: 0 }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Decodes every frame in the input, without large-atom reassembly.
    pub fn decode_all(bytes: &[u8]) -> crate::error::Result<Vec<AtomFrame>> {
        let mut decoder = BinaryDecoder::new(bytes);
        let mut frames = Vec::new();
        while !decoder.is_at_end() {
            frames.push(decoder.decode_one()?);
        }
        Ok(frames)
    }

    fn read_u8(&mut self) -> crate::error::Result<u8> {
        let mut slice = &self.bytes[self.pos..];
        let byte = slice
            .read_u8()
            .map_err(|_| Error::new(ErrorKind::UnexpectedEof, "unexpected end of binary stream"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> crate::error::Result<Vec<u8>> {
        if self.pos + len > self.bytes.len() {
            return Err(Error::new(ErrorKind::UnexpectedEof, "unexpected end of binary stream"));
        }
        let data = self.bytes[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(data)
    }

    fn read_length(&mut self) -> crate::error::Result<usize> {
        let b0 = self.read_u8()?;
        if b0 & 0x80 == 0 {
            Ok(b0 as usize)
        } else {
            let b1 = self.read_u8()?;
            Ok((((b0 & 0x7F) as usize) << 8) | b1 as usize)
        }
    }

    pub fn decode_one(&mut self) -> crate::error::Result<AtomFrame> {
        let b0 = self.read_u8()?;
        let style_code = b0 >> 5;
        let frame = match style_code {
            0 => {
                let protocol = b0 & 0x1F;
                let atom = self.read_u8()?;
                let len = self.read_length()?;
                let data = self.read_bytes(len)?;
                self.current_protocol = protocol;
                AtomFrame::new(protocol, atom, data)
            }
            1 => {
                let protocol = b0 & 0x1F;
                let b1 = self.read_u8()?;
                let len = (b1 >> 5) as usize;
                let atom = b1 & 0x1F;
                let data = self.read_bytes(len)?;
                self.current_protocol = protocol;
                AtomFrame::new(protocol, atom, data)
            }
            2 => {
                let protocol = b0 & 0x1F;
                let b1 = self.read_u8()?;
                let d = b1 >> 5;
                let atom = b1 & 0x1F;
                self.current_protocol = protocol;
                AtomFrame::new(protocol, atom, vec![d])
            }
            3 => AtomFrame::new(self.current_protocol, b0 & 0x1F, Vec::new()),
            4 => {
                let atom = b0 & 0x1F;
                let len = self.read_length()?;
                let data = self.read_bytes(len)?;
                AtomFrame::new(self.current_protocol, atom, data)
            }
            5 => AtomFrame::new(self.current_protocol, b0 & 0x1F, vec![0]),
            6 => AtomFrame::new(self.current_protocol, b0 & 0x1F, vec![1]),
            7 => self.decode_prefix(b0)?,
            _ => unreachable!("style code is 3 bits"),
        };
        Ok(frame)
    }

    fn decode_prefix(&mut self, b0: u8) -> crate::error::Result<AtomFrame> {
        let pp = (b0 >> 3) & 0b11;
        let aa = (b0 >> 1) & 0b11;
        let b1 = self.read_u8()?;
        let inner_style = b1 >> 5;
        let protocol_low5 = b1 & 0x1F;
        let protocol = (pp << 5) | protocol_low5;

        let frame = match inner_style {
            0 | 4 => {
                let atom = self.read_u8()?;
                let len = self.read_length()?;
                let data = self.read_bytes(len)?;
                AtomFrame::new(protocol, atom, data)
            }
            1 => {
                let b2 = self.read_u8()?;
                let len = (b2 >> 5) as usize;
                let atom = (aa << 5) | (b2 & 0x1F);
                let data = self.read_bytes(len)?;
                AtomFrame::new(protocol, atom, data)
            }
            2 => {
                let b2 = self.read_u8()?;
                let d = b2 >> 5;
                let atom = (aa << 5) | (b2 & 0x1F);
                AtomFrame::new(protocol, atom, vec![d])
            }
            3 => {
                let b2 = self.read_u8()?;
                let atom = (aa << 5) | (b2 & 0x1F);
                AtomFrame::new(protocol, atom, Vec::new())
            }
            5 => {
                let b2 = self.read_u8()?;
                let atom = (aa << 5) | (b2 & 0x1F);
                AtomFrame::new(protocol, atom, vec![0])
            }
            6 => {
                let b2 = self.read_u8()?;
                let atom = (aa << 5) | (b2 & 0x1F);
                AtomFrame::new(protocol, atom, vec![1])
            }
            _ => return Err(invalid_binary("unsupported prefix inner style")),
        };
        self.current_protocol = protocol;
        Ok(frame)
    }
}

/// An owned, stateful encoder: a `current_protocol` register and output buffer. Not shareable
/// across concurrent compilations (`spec.md` §5); each caller owns its instance.
pub struct BinaryEncoder {
    policy: StylePolicy,
    current_protocol: u8,
    buffer: Vec<u8>,
}

impl BinaryEncoder {
    pub fn new(policy: StylePolicy) -> Self {
        Self { policy, current_protocol: 0, buffer: Vec::new() }
    }

    pub fn reset(&mut self) {
        self.current_protocol = 0;
        self.buffer.clear();
    }

    pub fn encode_frame(&mut self, frame: &AtomFrame) {
        self.current_protocol = write_frame(&mut self.buffer, frame, self.policy, self.current_protocol);
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Reassembles UNI `4`/`5`/`6` continuation triples into single logical frames
/// (`spec.md` §4.4, §4.6). Stray `5`/`6` frames outside an in-progress continuation are passed
/// through unchanged, per the reference's documented behavior (`spec.md` §9).
pub fn reassemble_continuations(frames: Vec<AtomFrame>) -> crate::error::Result<Vec<AtomFrame>> {
    let mut out = Vec::with_capacity(frames.len());
    let mut collecting: Option<(u8, u8, Vec<u8>)> = None;

    for frame in frames {
        let is_uni = frame.protocol == UNI_PROTOCOL;
        match (is_uni, frame.atom_number) {
            (true, UNI_LARGE_ATOM_START) => {
                if frame.payload.len() < 2 {
                    return Err(invalid_binary("large-atom start payload shorter than 2 bytes"));
                }
                let target_protocol = frame.payload[0];
                let target_atom = frame.payload[1];
                let data = frame.payload[2..].to_vec();
                collecting = Some((target_protocol, target_atom, data));
            }
            (true, UNI_LARGE_ATOM_SEGMENT) => match &mut collecting {
                Some((_, _, data)) => data.extend_from_slice(&frame.payload),
                None => {
                    log::warn!("stray large-atom segment frame outside a continuation, passing through");
                    out.push(frame);
                }
            },
            (true, UNI_LARGE_ATOM_END) => match collecting.take() {
                Some((protocol, atom_number, mut data)) => {
                    data.extend_from_slice(&frame.payload);
                    out.push(AtomFrame::new(protocol, atom_number, data));
                }
                None => {
                    log::warn!("stray large-atom end frame outside a continuation, passing through");
                    out.push(frame);
                }
            },
            _ => out.push(frame),
        }
    }

    Ok(out)
}

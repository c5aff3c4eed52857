//! The frame-aware streaming encoder: packs atoms into size-bounded buckets and splits oversized
//! atoms via the UNI large-atom continuation sub-protocol (`spec.md` §4.5).

use super::{frame_encoded_len, write_frame, AtomFrame, StylePolicy, UNI_LARGE_ATOM_END, UNI_LARGE_ATOM_SEGMENT,
    UNI_LARGE_ATOM_START, UNI_PROTOCOL};

/// Owns the in-flight bucket and delivers completed buckets through the caller's `on_frame`
/// callback. Not shareable across concurrent encodings, like [`super::BinaryEncoder`]
/// (`spec.md` §5, §9).
pub struct FrameAwareEncoder {
    policy: StylePolicy,
    max_frame_size: usize,
    bucket: Vec<u8>,
    bucket_protocol: u8,
    frame_index: u64,
}

impl FrameAwareEncoder {
    pub fn new(max_frame_size: usize, policy: StylePolicy) -> Self {
        assert!(max_frame_size >= 4, "max_frame_size must be at least 4");
        Self { policy, max_frame_size, bucket: Vec::new(), bucket_protocol: 0, frame_index: 0 }
    }

    /// Encodes one atom, flushing or splitting buckets as needed. `on_frame` is called zero or
    /// more times with completed (non-final) buckets.
    pub fn encode(&mut self, frame: &AtomFrame, mut on_frame: impl FnMut(&[u8], u64, bool)) {
        let mut whole_len = frame_encoded_len(frame, self.policy, self.bucket_protocol);

        if whole_len <= self.max_frame_size {
            if !self.bucket.is_empty() && self.bucket.len() + whole_len > self.max_frame_size {
                self.flush(&mut on_frame);
                // `flush` resets the protocol context (line below), so the frame's encoded
                // length against the fresh context may differ from (and exceed) `whole_len`.
                whole_len = frame_encoded_len(frame, self.policy, self.bucket_protocol);
            }
            if whole_len <= self.max_frame_size {
                self.bucket_protocol = write_frame(&mut self.bucket, frame, self.policy, self.bucket_protocol);
                return;
            }
        } else if !self.bucket.is_empty() {
            self.flush(&mut on_frame);
        }

        self.emit_large_atom(frame, &mut on_frame);
    }

    /// Flushes the final (possibly empty) bucket with `is_last=true`. Consumes `self`: no further
    /// atoms may be encoded afterward.
    pub fn finish(mut self, mut on_frame: impl FnMut(&[u8], u64, bool)) {
        on_frame(&self.bucket, self.frame_index, true);
        self.bucket.clear();
    }

    fn flush(&mut self, on_frame: &mut impl FnMut(&[u8], u64, bool)) {
        on_frame(&self.bucket, self.frame_index, false);
        self.frame_index += 1;
        self.bucket.clear();
        self.bucket_protocol = 0;
    }

    /// Splits `frame`'s payload across UNI `4`/`5`/`6` continuation frames, each flushed as its
    /// own bucket (`spec.md` §4.5 point 2). Continuation frames always use `FULL` style so each
    /// bucket is independently decodable regardless of the encoder's style policy.
    fn emit_large_atom(&mut self, frame: &AtomFrame, on_frame: &mut impl FnMut(&[u8], u64, bool)) {
        let len_field_len = |n: usize| if n <= 127 { 1 } else { 2 };
        // Conservative fixed overhead (assumes a 2-byte length field) keeps chunk sizing simple
        // at the cost of occasionally under-filling a bucket.
        let start_capacity = self.max_frame_size.saturating_sub(2 + 2 + 2).max(1);
        let segment_capacity = self.max_frame_size.saturating_sub(2 + 2).max(1);
        let _ = len_field_len; // overhead is already accounted for conservatively above

        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let mut remaining = &frame.payload[..];
        let mut first = true;
        while !remaining.is_empty() {
            let cap = if first { start_capacity } else { segment_capacity };
            let take = cap.min(remaining.len());
            let (chunk, rest) = remaining.split_at(take);
            chunks.push(chunk.to_vec());
            remaining = rest;
            first = false;
        }
        if chunks.is_empty() {
            chunks.push(Vec::new());
        }
        if chunks.len() == 1 {
            let mut only = chunks.pop().expect("just checked len == 1");
            let last_byte = only.pop();
            chunks.push(only);
            chunks.push(last_byte.into_iter().collect());
        }

        let last_index = chunks.len() - 1;
        for (i, chunk) in chunks.into_iter().enumerate() {
            let atom_number = if i == 0 {
                UNI_LARGE_ATOM_START
            } else if i == last_index {
                UNI_LARGE_ATOM_END
            } else {
                UNI_LARGE_ATOM_SEGMENT
            };
            let payload = if i == 0 {
                let mut p = Vec::with_capacity(2 + chunk.len());
                p.push(frame.protocol);
                p.push(frame.atom_number);
                p.extend_from_slice(&chunk);
                p
            } else {
                chunk
            };
            let uni_frame = AtomFrame::new(UNI_PROTOCOL, atom_number, payload);
            let mut bucket = Vec::new();
            write_frame(&mut bucket, &uni_frame, StylePolicy::FullOnly, 0);
            on_frame(&bucket, self.frame_index, false);
            self.frame_index += 1;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::binary::reassemble_continuations;

    #[test]
    fn empty_input_produces_one_final_empty_bucket() {
        let enc = FrameAwareEncoder::new(16, StylePolicy::FullOnly);
        let mut calls = Vec::new();
        enc.finish(|bytes, idx, is_last| calls.push((bytes.to_vec(), idx, is_last)));
        assert_eq!(calls, vec![(Vec::new(), 0, true)]);
    }

    #[test]
    fn small_atoms_pack_into_one_bucket() {
        let mut enc = FrameAwareEncoder::new(64, StylePolicy::FullOnly);
        let mut calls = Vec::new();
        enc.encode(&AtomFrame::new(0, 1, vec![]), |b, i, l| calls.push((b.to_vec(), i, l)));
        enc.encode(&AtomFrame::new(0, 2, vec![]), |b, i, l| calls.push((b.to_vec(), i, l)));
        enc.finish(|b, i, l| calls.push((b.to_vec(), i, l)));
        assert_eq!(calls.len(), 1);
        assert!(calls[0].2);
        assert_eq!(calls[0].0, vec![0x00, 0x01, 0x00, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn s6_large_atom_split_stays_within_budget_and_reassembles() {
        let payload: Vec<u8> = (0..25u8).collect(); // FULL encoding is 2 + 1 + 25 = 28 bytes
        let frame = AtomFrame::new(3, 9, payload.clone());
        assert_eq!(frame_encoded_len(&frame, StylePolicy::FullOnly, 0), 28);

        let mut enc = FrameAwareEncoder::new(10, StylePolicy::FullOnly);
        let mut buckets = Vec::new();
        enc.encode(&frame, |b, i, l| buckets.push((b.to_vec(), i, l)));
        enc.finish(|b, i, l| buckets.push((b.to_vec(), i, l)));

        for (bytes, _, is_last) in &buckets {
            if !*is_last || !bytes.is_empty() {
                assert!(bytes.len() <= 10, "bucket exceeded max_frame_size: {}", bytes.len());
            }
        }

        let mut all_frames = Vec::new();
        for (bytes, _, _) in &buckets {
            if !bytes.is_empty() {
                all_frames.extend(crate::binary::BinaryDecoder::decode_all(bytes).unwrap());
            }
        }
        let reassembled = reassemble_continuations(all_frames).unwrap();
        assert_eq!(reassembled, vec![frame]);
    }

    #[test]
    fn flushing_before_a_compact_atom_never_overshoots_the_budget() {
        // Regression for a bug where `encode` measured the about-to-be-written atom against the
        // bucket's pre-flush protocol context, then flushed (which resets that context to 0)
        // before actually writing it — so the atom could be written in a wider, unmeasured style.
        let max_frame_size = 22;
        let mut enc = FrameAwareEncoder::new(max_frame_size, StylePolicy::Compact);
        let first = AtomFrame::new(5, 3, vec![]);
        let second = AtomFrame::new(5, 9, vec![7u8; 20]);
        let mut buckets = Vec::new();
        enc.encode(&first, |b, i, l| buckets.push((b.to_vec(), i, l)));
        enc.encode(&second, |b, i, l| buckets.push((b.to_vec(), i, l)));
        enc.finish(|b, i, l| buckets.push((b.to_vec(), i, l)));

        for (bytes, _, is_last) in &buckets {
            if !*is_last || !bytes.is_empty() {
                assert!(bytes.len() <= max_frame_size, "bucket of {} bytes exceeded budget of {max_frame_size}", bytes.len());
            }
        }

        let mut all_frames = Vec::new();
        for (bytes, _, _) in &buckets {
            if !bytes.is_empty() {
                all_frames.extend(crate::binary::BinaryDecoder::decode_all(bytes).unwrap());
            }
        }
        let reassembled = reassemble_continuations(all_frames).unwrap();
        assert_eq!(reassembled, vec![first, second]);
    }

    #[test]
    fn bucket_never_exceeds_max_frame_size_for_mixed_input() {
        let mut enc = FrameAwareEncoder::new(12, StylePolicy::FullOnly);
        let mut buckets = Vec::new();
        for i in 0..10u8 {
            enc.encode(&AtomFrame::new(1, i, vec![i; 3]), |b, idx, l| buckets.push((b.to_vec(), idx, l)));
        }
        enc.finish(|b, idx, l| buckets.push((b.to_vec(), idx, l)));
        for (bytes, _, _) in &buckets {
            assert!(bytes.len() <= 12);
        }
    }
}

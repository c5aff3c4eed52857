//! The quantified round-trip properties from `spec.md` §8, exercised over a handful of concrete
//! instances (the codec has no property-testing harness in this tree; each property gets a
//! representative case instead of a generator).

use fdo::binary::frame_aware::FrameAwareEncoder;
use fdo::binary::{AtomFrame, BinaryDecoder, StylePolicy};
use fdo::text::Parser;
use fdo::{FdoGid, Stream};

const SOURCES: &[&str] = &[
    "uni_start_stream\nuni_end_stream\n",
    r#"de_data<"TOSAdvisor">"#,
    "mat_object_id<32-105>",
    "dod_gid<1-0-21029>",
    "mat_orientation<vcf>",
    "act_set_criterion<select>",
    "gen_set_visible<yes>",
    "gen_create_object<ind_group, \"Title\">",
    "var_set_string<A,\"hi\">",
    "uni_start_stream\nact_replace_select_action<uni_start_stream uni_end_stream>\nuni_end_stream\n",
];

#[test]
fn property_1_typed_round_trip() {
    for src in SOURCES {
        let parsed = Parser::parse(src).unwrap();
        let bytes = fdo::compile(src).unwrap();
        let text = fdo::decompile(&bytes).unwrap();
        let reparsed = Parser::parse(&text).unwrap();
        assert!(parsed.eq_ignoring_position(&reparsed), "round-trip mismatch for {src:?}");
    }
}

#[test]
fn property_2_byte_round_trip() {
    for src in SOURCES {
        let bytes = fdo::compile(src).unwrap();
        let decoded = Stream::decode(&bytes).unwrap();
        assert_eq!(decoded.to_bytes(), bytes, "byte round-trip mismatch for {src:?}");
    }
}

#[test]
fn property_3_frame_discipline() {
    let payload: Vec<u8> = (0..50u8).collect();
    let frame = AtomFrame::new(5, 7, payload);
    for max_frame_size in [4usize, 8, 16, 32, 64] {
        let mut enc = FrameAwareEncoder::new(max_frame_size, StylePolicy::FullOnly);
        let mut buckets = Vec::new();
        enc.encode(&frame, |b, i, l| buckets.push((b.to_vec(), i, l)));
        enc.finish(|b, i, l| buckets.push((b.to_vec(), i, l)));

        for (bytes, _, is_last) in &buckets {
            if !*is_last || !bytes.is_empty() {
                assert!(bytes.len() <= max_frame_size);
            }
        }

        let mut frames = Vec::new();
        for (bytes, _, _) in &buckets {
            if !bytes.is_empty() {
                frames.extend(BinaryDecoder::decode_all(bytes).unwrap());
            }
        }
        let reassembled = fdo::binary::reassemble_continuations(frames).unwrap();
        assert_eq!(reassembled, vec![frame.clone()]);
    }
}

#[test]
fn property_4_style_choice_preserves_semantics() {
    for src in SOURCES {
        let ast = Parser::parse(src).unwrap();
        let stream = Stream::from_ast(&ast).unwrap();

        let mut full = fdo::binary::BinaryEncoder::new(StylePolicy::FullOnly);
        let mut compact = fdo::binary::BinaryEncoder::new(StylePolicy::Compact);
        for atom in stream.iter() {
            let payload = match atom.definition {
                Some(def) => fdo::value::to_payload(def, &atom.value).unwrap(),
                None => atom.as_raw().unwrap().to_vec(),
            };
            let frame = AtomFrame::new(atom.protocol, atom.atom_number, payload);
            full.encode_frame(&frame);
            compact.encode_frame(&frame);
        }

        let full_frames = BinaryDecoder::decode_all(full.bytes()).unwrap();
        let compact_frames = BinaryDecoder::decode_all(compact.bytes()).unwrap();
        assert_eq!(full_frames, compact_frames, "style divergence for {src:?}");
    }
}

#[test]
fn property_5_gid_form_stability() {
    let three = FdoGid::three(1, 0, 21029);
    let two = FdoGid::two(1, 21029);
    assert_ne!(three, two);

    let three_bytes = three.encode();
    assert_eq!(FdoGid::decode(&three_bytes, false).unwrap(), two);
    assert_eq!(FdoGid::decode(&three_bytes, true).unwrap(), three);
}

#[test]
fn property_6_indentation_never_goes_negative() {
    let src = "uni_end_stream\nuni_end_stream\nuni_start_stream\n";
    let bytes = fdo::compile(src).unwrap();
    let text = fdo::decompile(&bytes).unwrap();
    for line in text.lines() {
        assert!(!line.starts_with("  -"));
    }
    assert_eq!(text.lines().next().unwrap(), "uni_end_stream");
}

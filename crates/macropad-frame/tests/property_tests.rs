//! Property tests for stream reassembly

use proptest::prelude::*;

use macropad_frame::{FrameCodec, FrameError, FrameMode, MAGIC_WORD};

/// Feed `bytes` to a fresh decoder in chunks of `chunk` bytes, collecting
/// every payload produced.
fn decode_in_chunks(
    codec: &FrameCodec,
    bytes: &[u8],
    chunk: usize,
) -> Result<Vec<Vec<u8>>, FrameError> {
    let mut decoder = codec.decoder();
    let mut out = Vec::new();
    for piece in bytes.chunks(chunk.max(1)) {
        if let Some(payload) = decoder.feed(piece)? {
            out.push(payload);
        }
        while let Some(payload) = decoder.poll()? {
            out.push(payload);
        }
    }
    Ok(out)
}

fn json_document() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::btree_map("[a-z]{1,8}", "[ -~]{0,32}", 0..8).prop_map(|map| {
        serde_json::to_vec(&map).expect("string map serializes")
    })
}

proptest! {
    #[test]
    fn prop_framed_reassembly_is_split_independent(
        payload in prop::collection::vec(any::<u8>(), 0..4096),
        chunk in 1usize..=2048
    ) {
        let codec = FrameCodec::new(FrameMode::Framed);
        let bytes = codec.encode(&payload).expect("encode should succeed");

        let decoded = decode_in_chunks(&codec, &bytes, chunk).expect("decode should succeed");
        prop_assert_eq!(decoded, vec![payload]);
    }

    #[test]
    fn prop_framed_split_at_every_boundary(
        payload in prop::collection::vec(any::<u8>(), 1..256),
        split in 0usize..264
    ) {
        let codec = FrameCodec::new(FrameMode::Framed);
        let bytes = codec.encode(&payload).expect("encode should succeed");
        let split = split.min(bytes.len());
        let (head, tail) = bytes.split_at(split);

        let mut decoder = codec.decoder();
        let first = decoder.feed(head).expect("head should not fail");
        let result = match first {
            Some(done) => Some(done),
            None => decoder.feed(tail).expect("tail should not fail"),
        };
        prop_assert_eq!(result, Some(payload));
    }

    #[test]
    fn prop_raw_reassembly_is_split_independent(
        doc in json_document(),
        chunk in 1usize..=64
    ) {
        let codec = FrameCodec::new(FrameMode::Raw);
        let decoded = decode_in_chunks(&codec, &doc, chunk).expect("decode should succeed");
        prop_assert_eq!(decoded, vec![doc]);
    }

    #[test]
    fn prop_multiple_frames_in_one_stream(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..128), 1..6),
        chunk in 1usize..=300
    ) {
        let codec = FrameCodec::new(FrameMode::Framed);
        let mut stream = Vec::new();
        for payload in &payloads {
            stream.extend(codec.encode(payload).expect("encode should succeed"));
        }

        let decoded = decode_in_chunks(&codec, &stream, chunk).expect("decode should succeed");
        prop_assert_eq!(decoded, payloads);
    }

    #[test]
    fn prop_wrong_magic_always_rejected(
        magic in any::<u32>().prop_filter("must differ", |m| *m != MAGIC_WORD),
        payload in prop::collection::vec(any::<u8>(), 0..64)
    ) {
        let sender = FrameCodec::new(FrameMode::Framed).with_magic(magic);
        let bytes = sender.encode(&payload).expect("encode should succeed");

        let mut decoder = FrameCodec::new(FrameMode::Framed).decoder();
        let is_mismatch = matches!(
            decoder.feed(&bytes),
            Err(FrameError::MagicMismatch { found, .. }) if found == magic
        );
        prop_assert!(is_mismatch);
    }
}

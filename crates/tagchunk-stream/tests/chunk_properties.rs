#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Property tests for the chunk protocol
//!
//! Chunks are written with the closure helper and the scoped writer, then
//! read back with `read_chunk`, `try_read_chunk` and `ChunkReader`.

use proptest::prelude::*;
use tagchunk_stream::{CHUNK_HEADER_SIZE, ChunkReader, ChunkWriter, FourCC, TypedStream};

fn tag() -> impl Strategy<Value = FourCC> {
    prop_oneof![
        Just(FourCC(*b"CcnK")),
        Just(FourCC(*b"LENT")),
        Just(FourCC(*b"List")),
        any::<[u8; 4]>().prop_map(FourCC),
    ]
}

fn chunk() -> impl Strategy<Value = (FourCC, u32, Vec<u8>)> {
    (tag(), any::<u32>(), prop::collection::vec(any::<u8>(), 0..256))
}

fn write_all(chunks: &[(FourCC, u32, Vec<u8>)]) -> TypedStream<'static> {
    let mut stream = TypedStream::new();
    for (i, (tag, version, payload)) in chunks.iter().enumerate() {
        // Alternate between the two writing styles
        if i % 2 == 0 {
            stream
                .write_chunk(*tag, *version, |s| s.write_bytes(payload))
                .unwrap();
        } else {
            let mut cw = ChunkWriter::new(&mut stream, *tag, *version).unwrap();
            cw.write_bytes(payload).unwrap();
        }
    }
    stream
}

proptest! {
    /// Every chunk reads back with identical tag, version and payload
    #[test]
    fn chunk_round_trip(chunks in prop::collection::vec(chunk(), 0..16)) {
        let mut stream = write_all(&chunks);
        let total: usize = chunks.iter().map(|(_, _, p)| CHUNK_HEADER_SIZE + p.len()).sum();
        prop_assert_eq!(stream.size(), total);

        for (tag, version, payload) in &chunks {
            let mut read = stream.read_chunk().unwrap();
            prop_assert_eq!(read.tag, *tag);
            prop_assert_eq!(read.version, *version);
            prop_assert_eq!(read.length as usize, payload.len());
            prop_assert!(read.is_complete());
            let bytes = read.data.read_bytes(payload.len()).unwrap();
            prop_assert_eq!(&bytes, payload);
        }
        prop_assert!(stream.at_end());
        prop_assert!(!stream.failed());
    }

    /// A wrong tag or a too-new version leaves the read cursor untouched
    #[test]
    fn try_read_chunk_rolls_back(
        (chunk_tag, version, payload) in chunk(),
        other in tag(),
        skip in 0usize..3,
    ) {
        prop_assume!(version > 0);
        let mut stream = TypedStream::from_vec(vec![0xAA; skip]);
        stream.write_chunk(chunk_tag, version, |s| s.write_bytes(&payload)).unwrap();
        stream.skip(skip).unwrap();

        if other != chunk_tag {
            prop_assert!(stream.try_read_chunk(other, u32::MAX).is_none());
            prop_assert_eq!(stream.tell_read(), skip);
        }

        prop_assert!(stream.try_read_chunk(chunk_tag, version - 1).is_none());
        prop_assert_eq!(stream.tell_read(), skip);

        let found = stream.try_read_chunk(chunk_tag, version).map(|c| c.length as usize);
        prop_assert_eq!(found, Some(payload.len()));
        prop_assert_eq!(stream.tell_read(), skip + CHUNK_HEADER_SIZE + payload.len());
    }

    /// Handlers run exactly for matching tags with an acceptable version
    #[test]
    fn reader_dispatch_counts(
        chunks in prop::collection::vec(chunk(), 0..16),
        watched in tag(),
        max_version in any::<u32>(),
    ) {
        let expected = chunks
            .iter()
            .filter(|(t, v, _)| *t == watched && *v <= max_version)
            .count() as u32;

        let mut stream = write_all(&chunks);
        let mut calls = 0u32;
        let mut reader = ChunkReader::new(&mut stream);
        reader.add(watched, max_version, |_, _| {
            calls += 1;
            Ok(())
        });
        reader.read(None).unwrap();

        let (num_chunks, num_read) = (reader.num_chunks(), reader.num_read());
        drop(reader);

        prop_assert_eq!(num_chunks as usize, chunks.len());
        prop_assert_eq!(num_read, expected);
        prop_assert_eq!(calls, expected);
        prop_assert!(num_chunks >= num_read);
    }
}

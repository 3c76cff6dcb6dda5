#![no_main]

use libfuzzer_sys::fuzz_target;
use rabinrs::{ChunkConfig, Chunker, HashConfig};

fuzz_target!(|data: Vec<u8>| {
    let configs = [
        // Tiny chunks, narrow window
        ChunkConfig::new(4, 16).unwrap().with_window_size(4).with_boundary_bits(3),
        // Medium chunks
        ChunkConfig::new(64, 1024).unwrap().with_boundary_bits(8),
        // Full 64-bit modulus
        ChunkConfig::new(256, 16384).unwrap().with_shift(64).with_boundary_bits(10),
        // Default config
        ChunkConfig::default(),
    ];

    for config in configs {
        let chunker = Chunker::new(config).unwrap();
        let chunks = chunker.chunk_bytes(data.clone()).unwrap();

        // Verify: all chunks are within bounds; only the last may be short
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(!chunk.is_empty());
            assert!(chunk.len() as u64 <= config.max_chunk_len());
            if i + 1 < chunks.len() {
                assert!(chunk.len() as u64 > config.min_size());
            }
        }

        // Verify: chunks partition the input
        let mut expected_offset = 0u64;
        for chunk in &chunks {
            assert_eq!(chunk.offset, expected_offset);
            assert_eq!(
                &chunk.data[..],
                &data[expected_offset as usize..chunk.end() as usize]
            );
            expected_offset = chunk.end();
        }
        assert_eq!(expected_offset, data.len() as u64);

        // Verify: determinism across chunkers and read block sizes
        let other = Chunker::new(config.with_read_block_size(7)).unwrap();
        let again = other.chunk_bytes(data.clone()).unwrap();
        assert_eq!(chunks, again);
    }

    // Hashes are attached only when enabled
    let unhashed = Chunker::new(ChunkConfig::new(16, 256).unwrap().with_hash_config(HashConfig::disabled()))
        .unwrap()
        .chunk_bytes(data)
        .unwrap();
    assert!(unhashed.iter().all(|c| c.hash.is_none()));
});

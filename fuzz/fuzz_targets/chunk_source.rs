#![no_main]

use std::io::Read;

use libfuzzer_sys::fuzz_target;
use rabinrs::{ChunkConfig, Chunker};

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (block, data) = input;
    let config = ChunkConfig::new(32, 512)
        .unwrap()
        .with_boundary_bits(6)
        .with_read_block_size(usize::from(block) + 1);
    let chunker = Chunker::new(config).unwrap();

    // Views read through the source must reassemble the input
    let mut iter = chunker.chunk(&data[..]).unwrap();
    let mut rebuilt = Vec::with_capacity(data.len());
    let mut ranges = Vec::new();
    for view in iter.by_ref() {
        let mut view = view.unwrap();
        ranges.push(view.range());
        view.read_to_end(&mut rebuilt).unwrap();
    }
    assert_eq!(rebuilt, data);

    // Reset replays the same boundaries
    iter.reset().unwrap();
    let replay: Vec<_> = iter.map(|v| v.unwrap().range()).collect();
    assert_eq!(ranges, replay);
});

use std::io::{self, Write};

use crate::{postings::compression::BlockEncoder, TermFreq, POSITION_BITMAP_BLOCK_LEN};

/// Builds the tf bitmap read by [`super::PositionBitmapReader`].
#[derive(Default)]
pub struct PositionBitmapWriter {
    doc_count: usize,
    total_bits: u32,
    block_offsets: Vec<u32>,
    words: Vec<u32>,
}

impl PositionBitmapWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, bit: u32) {
        let word_index = bit as usize / 32;
        if word_index >= self.words.len() {
            self.words.resize(word_index + 1, 0);
        }
        self.words[word_index] |= 0x8000_0000 >> (bit % 32);
    }

    pub fn end_doc(&mut self, tf: TermFreq) {
        debug_assert!(tf > 0);
        self.total_bits += tf;
        let last_bit = self.total_bits - 1;
        self.set(last_bit);
        self.doc_count += 1;
        if self.doc_count % POSITION_BITMAP_BLOCK_LEN == 0 {
            self.block_offsets.push(last_bit);
        }
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn dump<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let block_encoder = BlockEncoder;
        let mut written = block_encoder.encode_vu32(self.block_offsets.len() as u32, writer)?;
        written += block_encoder.encode_vu32(self.total_bits, writer)?;
        for offset in &self.block_offsets {
            writer.write_all(&offset.to_le_bytes())?;
        }
        let word_count = (self.total_bits as usize).div_ceil(32);
        for index in 0..word_count {
            let word = self.words.get(index).copied().unwrap_or_default();
            writer.write_all(&word.to_le_bytes())?;
        }
        written += (self.block_offsets.len() + word_count) * 4;
        Ok(written)
    }
}

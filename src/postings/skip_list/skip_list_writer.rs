use std::io::{self, Write};

use tantivy_common::CountingWriter;

use crate::{postings::compression::BlockEncoder, SKIP_LIST_BLOCK_LEN};

use super::SkipListFormat;

/// Buffers skip items and writes them block by block: key deltas, offset
/// deltas, then value deltas when the format carries values.
pub struct SkipListWriter<W: Write> {
    item_count: usize,
    last_key: u64,
    last_offset: u64,
    last_value: u64,
    buffer_len: usize,
    keys: [u32; SKIP_LIST_BLOCK_LEN],
    offsets: [u32; SKIP_LIST_BLOCK_LEN],
    values: [u32; SKIP_LIST_BLOCK_LEN],
    output_writer: CountingWriter<W>,
    skip_list_format: SkipListFormat,
}

impl<W: Write> SkipListWriter<W> {
    pub fn new(skip_list_format: SkipListFormat, output_writer: W) -> Self {
        Self {
            item_count: 0,
            last_key: 0,
            last_offset: 0,
            last_value: 0,
            buffer_len: 0,
            keys: [0; SKIP_LIST_BLOCK_LEN],
            offsets: [0; SKIP_LIST_BLOCK_LEN],
            values: [0; SKIP_LIST_BLOCK_LEN],
            output_writer: CountingWriter::wrap(output_writer),
            skip_list_format,
        }
    }

    /// Keys, offsets and values are absolute and must not decrease.
    pub fn add_skip_item(&mut self, key: u64, offset: u64, value: Option<u64>) -> io::Result<()> {
        debug_assert!(key >= self.last_key && offset >= self.last_offset);
        self.item_count += 1;
        self.keys[self.buffer_len] = (key - self.last_key) as u32;
        self.offsets[self.buffer_len] = (offset - self.last_offset) as u32;
        let value = value.unwrap_or_default();
        self.values[self.buffer_len] = (value - self.last_value) as u32;
        self.buffer_len += 1;

        self.last_key = key;
        self.last_offset = offset;
        self.last_value = value;

        if self.buffer_len == SKIP_LIST_BLOCK_LEN {
            self.flush()?;
        }

        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer_len > 0 {
            let block_encoder = BlockEncoder;
            block_encoder.encode_u32(&self.keys[0..self.buffer_len], &mut self.output_writer)?;
            block_encoder.encode_u32(&self.offsets[0..self.buffer_len], &mut self.output_writer)?;
            if self.skip_list_format.has_value() {
                block_encoder
                    .encode_u32(&self.values[0..self.buffer_len], &mut self.output_writer)?;
            }
            self.buffer_len = 0;
        }

        Ok(())
    }

    /// Flushes the pending block and returns the number of bytes written.
    pub fn finish(mut self) -> io::Result<usize> {
        self.flush()?;
        self.output_writer.flush()?;
        Ok(self.output_writer.written_bytes() as usize)
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }
}

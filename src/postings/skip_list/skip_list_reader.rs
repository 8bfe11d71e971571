use crate::{
    postings::{compression::BlockEncoder, ByteSliceReader},
    Result, SKIP_LIST_BLOCK_LEN,
};

use super::{SkipListBlock, SkipListFormat};

/// Result of [`SkipListReader::seek`].
///
/// When `found`, the item describes the first checkpoint whose key is not
/// less than the sought key: `start_offset..end_offset` is the byte range it
/// covers, `prev_key`/`prev_value` are the accumulated values before it.
/// Otherwise every field reflects the last item of the list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipListSeek {
    pub found: bool,
    pub prev_key: u64,
    pub key: u64,
    pub start_offset: u64,
    pub end_offset: u64,
    pub prev_value: u64,
    pub value: u64,
    pub skipped_count: usize,
}

/// Forward-only cursor over an encoded skip list. [`Self::reopen`] rewinds it
/// to the first item.
pub struct SkipListReader<'a> {
    item_count: usize,
    read_count: usize,
    skipped_item_count: usize,
    has_current: bool,
    prev_key: u64,
    current_key: u64,
    prev_offset: u64,
    current_offset: u64,
    prev_value: u64,
    current_value: u64,
    current_cursor: usize,
    skip_list_block: SkipListBlock,
    origin: ByteSliceReader<'a>,
    reader: ByteSliceReader<'a>,
    skip_list_format: SkipListFormat,
}

impl<'a> SkipListReader<'a> {
    pub fn open(
        skip_list_format: SkipListFormat,
        item_count: usize,
        reader: ByteSliceReader<'a>,
    ) -> Self {
        Self {
            item_count,
            read_count: 0,
            skipped_item_count: 0,
            has_current: false,
            prev_key: 0,
            current_key: 0,
            prev_offset: 0,
            current_offset: 0,
            prev_value: 0,
            current_value: 0,
            current_cursor: 0,
            skip_list_block: SkipListBlock::new(&skip_list_format),
            origin: reader.clone(),
            reader,
            skip_list_format,
        }
    }

    pub fn reopen(&mut self) {
        self.read_count = 0;
        self.skipped_item_count = 0;
        self.has_current = false;
        self.prev_key = 0;
        self.current_key = 0;
        self.prev_offset = 0;
        self.current_offset = 0;
        self.prev_value = 0;
        self.current_value = 0;
        self.current_cursor = 0;
        self.skip_list_block.len = 0;
        self.reader = self.origin.clone();
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn eof(&self) -> bool {
        self.read_count == self.item_count && self.current_cursor == self.skip_list_block.len
    }

    fn decode_one_block(&mut self) -> Result<bool> {
        self.skip_list_block.len = 0;
        self.current_cursor = 0;
        if self.read_count == self.item_count {
            return Ok(false);
        }

        let skip_list_block = &mut self.skip_list_block;
        let block_len = std::cmp::min(self.item_count - self.read_count, SKIP_LIST_BLOCK_LEN);
        let block_encoder = BlockEncoder;
        block_encoder.decode_u32(&mut self.reader, &mut skip_list_block.keys[0..block_len])?;
        block_encoder.decode_u32(&mut self.reader, &mut skip_list_block.offsets[0..block_len])?;
        if self.skip_list_format.has_value() {
            if let Some(values) = skip_list_block.values.as_deref_mut() {
                block_encoder.decode_u32(&mut self.reader, &mut values[0..block_len])?;
            }
        }
        skip_list_block.len = block_len;
        self.read_count += block_len;

        Ok(true)
    }

    fn current_seek(&self, found: bool) -> SkipListSeek {
        SkipListSeek {
            found,
            prev_key: self.prev_key,
            key: self.current_key,
            start_offset: self.prev_offset,
            end_offset: self.current_offset,
            prev_value: self.prev_value,
            value: self.current_value,
            skipped_count: self.skipped_item_count.saturating_sub(1),
        }
    }

    /// Moves to the first item whose key is `>= key`. Seeking a key already
    /// covered by the current item returns that item again.
    pub fn seek(&mut self, key: u64) -> Result<SkipListSeek> {
        if self.has_current && self.current_key >= key {
            return Ok(self.current_seek(true));
        }

        loop {
            if self.current_cursor == self.skip_list_block.len && !self.decode_one_block()? {
                break;
            }

            let cursor = self.current_cursor;
            self.prev_key = self.current_key;
            self.prev_offset = self.current_offset;
            self.prev_value = self.current_value;

            self.current_key += self.skip_list_block.keys[cursor] as u64;
            self.current_offset += self.skip_list_block.offsets[cursor] as u64;
            self.current_value += self
                .skip_list_block
                .values
                .as_ref()
                .map_or(0, |values| values[cursor] as u64);
            self.skipped_item_count += 1;
            self.current_cursor += 1;
            self.has_current = true;

            if self.current_key >= key {
                return Ok(self.current_seek(true));
            }
        }

        Ok(self.current_seek(false))
    }
}

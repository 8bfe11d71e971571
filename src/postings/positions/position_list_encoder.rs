use std::io::{self, Write};

use tantivy_common::CountingWriter;

use crate::{
    postings::{
        compression::BlockEncoder, skip_list::SkipListWriter, PostingFormat, TermPostingInfo,
    },
    Pos, PosPayload, POSITION_RECORD_LEN,
};

use super::PositionBitmapWriter;

/// Collects one term's positions in one segment and dumps its position region:
/// the tf bitmap when enabled, the position skip/list sizes, the skip list and
/// the records.
pub struct PositionListEncoder {
    posting_format: PostingFormat,
    deltas: Vec<u32>,
    payloads: Vec<PosPayload>,
    doc_positions: u32,
    last_pos: Pos,
    bitmap_writer: Option<PositionBitmapWriter>,
}

impl PositionListEncoder {
    pub fn new(posting_format: PostingFormat) -> Self {
        let bitmap_writer = if posting_format.has_tf_bitmap() {
            Some(PositionBitmapWriter::new())
        } else {
            None
        };

        Self {
            posting_format,
            deltas: Vec::new(),
            payloads: Vec::new(),
            doc_positions: 0,
            last_pos: 0,
            bitmap_writer,
        }
    }

    /// Positions of a document must be added in non-decreasing order.
    pub fn add_position(&mut self, pos: Pos, payload: PosPayload) {
        let delta = if self.doc_positions == 0 {
            pos
        } else {
            debug_assert!(pos >= self.last_pos);
            pos - self.last_pos
        };
        self.deltas.push(delta);
        if self.posting_format.has_position_payload() {
            self.payloads.push(payload);
        }
        self.last_pos = pos;
        self.doc_positions += 1;
    }

    pub fn end_doc(&mut self) {
        if let Some(bitmap_writer) = self.bitmap_writer.as_mut() {
            bitmap_writer.end_doc(self.doc_positions);
        }
        self.doc_positions = 0;
        self.last_pos = 0;
    }

    pub fn ttf(&self) -> u64 {
        self.deltas.len() as u64
    }

    pub fn record_count(&self) -> usize {
        self.deltas.len().div_ceil(POSITION_RECORD_LEN)
    }

    /// Writes the region and returns the stored skip/list sizes.
    pub fn dump<W: Write>(&self, writer: W) -> io::Result<(TermPostingInfo, usize)> {
        let block_encoder = BlockEncoder;
        let mut records = Vec::new();
        let mut skip_list = Vec::new();
        let mut skip_list_writer =
            SkipListWriter::new(self.posting_format.position_skip_list_format(), &mut skip_list);
        let record_count = self.record_count();
        for (record, chunk) in self.deltas.chunks(POSITION_RECORD_LEN).enumerate() {
            block_encoder.encode_u32(chunk, &mut records)?;
            if self.posting_format.has_position_payload() {
                let start = record * POSITION_RECORD_LEN;
                block_encoder.encode_u8(&self.payloads[start..start + chunk.len()], &mut records)?;
            }
            if record_count > 1 {
                let last_ttf = (record * POSITION_RECORD_LEN + chunk.len() - 1) as u64;
                skip_list_writer.add_skip_item(last_ttf, records.len() as u64, None)?;
            }
        }
        let skip_size = skip_list_writer.finish()?;

        let mut writer = CountingWriter::wrap(writer);
        if let Some(bitmap_writer) = &self.bitmap_writer {
            bitmap_writer.dump(&mut writer)?;
        }
        let term_posting_info = TermPostingInfo {
            position_skip_size: skip_size as u32,
            position_list_size: records.len() as u32,
            ..Default::default()
        };
        term_posting_info.store_position(&mut writer)?;
        writer.write_all(&skip_list)?;
        writer.write_all(&records)?;
        writer.flush()?;

        Ok((term_posting_info, writer.written_bytes() as usize))
    }
}

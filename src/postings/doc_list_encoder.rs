use std::io::{self, Write};

use tantivy_common::CountingWriter;

use crate::{DocId, DocPayload, FieldMap, TermFreq, DOC_LIST_BLOCK_LEN};

use super::{
    compression::BlockEncoder, skip_list::SkipListWriter, PostingFormat, TermPostingInfo,
};

/// Collects one term's documents in one segment and dumps its doc region:
/// the doc skip/list sizes, the skip list and the blocks.
pub struct DocListEncoder {
    posting_format: PostingFormat,
    docids: Vec<DocId>,
    termfreqs: Vec<TermFreq>,
    doc_payloads: Vec<DocPayload>,
    fieldmaps: Vec<FieldMap>,
}

impl DocListEncoder {
    pub fn new(posting_format: PostingFormat) -> Self {
        Self {
            posting_format,
            docids: Vec::new(),
            termfreqs: Vec::new(),
            doc_payloads: Vec::new(),
            fieldmaps: Vec::new(),
        }
    }

    /// Documents must be added in increasing doc id order.
    pub fn add_doc(
        &mut self,
        docid: DocId,
        tf: TermFreq,
        doc_payload: DocPayload,
        fieldmap: FieldMap,
    ) {
        debug_assert!(self.docids.last().map_or(docid >= 0, |&last| docid > last));
        self.docids.push(docid);
        self.termfreqs.push(tf);
        self.doc_payloads.push(doc_payload);
        self.fieldmaps.push(fieldmap);
    }

    pub fn df(&self) -> usize {
        self.docids.len()
    }

    pub fn block_count(&self) -> usize {
        self.docids.len().div_ceil(DOC_LIST_BLOCK_LEN)
    }

    fn encode_block<W: Write>(&self, start: usize, end: usize, prev_docid: DocId, writer: &mut W) -> io::Result<()> {
        let block_encoder = BlockEncoder;
        let mut last_docid = prev_docid;
        let deltas: Vec<u32> = self.docids[start..end]
            .iter()
            .map(|&docid| {
                let delta = (docid - last_docid) as u32;
                last_docid = docid;
                delta
            })
            .collect();
        block_encoder.encode_u32(&deltas, writer)?;
        if self.posting_format.has_tflist() {
            block_encoder.encode_u32(&self.termfreqs[start..end], writer)?;
        }
        if self.posting_format.has_doc_payload() {
            block_encoder.encode_u16(&self.doc_payloads[start..end], writer)?;
        }
        if self.posting_format.has_fieldmap() {
            block_encoder.encode_u8(&self.fieldmaps[start..end], writer)?;
        }
        Ok(())
    }

    pub fn dump<W: Write>(&self, writer: W) -> io::Result<(TermPostingInfo, usize)> {
        let mut blocks = Vec::new();
        let mut skip_list = Vec::new();
        let mut skip_list_writer =
            SkipListWriter::new(self.posting_format.doc_skip_list_format(), &mut skip_list);
        let block_count = self.block_count();
        let mut prev_docid = 0;
        let mut tf_sum = 0u64;
        for block in 0..block_count {
            let start = block * DOC_LIST_BLOCK_LEN;
            let end = std::cmp::min(start + DOC_LIST_BLOCK_LEN, self.docids.len());
            self.encode_block(start, end, prev_docid, &mut blocks)?;
            prev_docid = self.docids[end - 1];
            tf_sum += self.termfreqs[start..end]
                .iter()
                .map(|&tf| tf as u64)
                .sum::<u64>();
            if block_count > 1 {
                let value = self.posting_format.has_tflist().then_some(tf_sum);
                skip_list_writer.add_skip_item(prev_docid as u64, blocks.len() as u64, value)?;
            }
        }
        let skip_size = skip_list_writer.finish()?;

        let mut writer = CountingWriter::wrap(writer);
        let term_posting_info = TermPostingInfo {
            posting_skip_size: skip_size as u32,
            posting_list_size: blocks.len() as u32,
            ..Default::default()
        };
        term_posting_info.store_posting(&mut writer)?;
        writer.write_all(&skip_list)?;
        writer.write_all(&blocks)?;
        writer.flush()?;

        Ok((term_posting_info, writer.written_bytes() as usize))
    }
}

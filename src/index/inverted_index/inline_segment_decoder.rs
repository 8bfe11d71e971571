use crate::{
    postings::{DocListBlock, PostingFormat},
    DocId, Result, TermFreq,
};

use super::SegmentDocDecode;

/// Decoder of a term stored inline in the dictionary: a single document.
pub struct InlineSegmentDecoder {
    doc_list_block: DocListBlock,
}

impl InlineSegmentDecoder {
    pub fn new(posting_format: &PostingFormat, docid: DocId, tf: TermFreq) -> Self {
        let mut doc_list_block = DocListBlock::new(posting_format);
        doc_list_block.len = 1;
        doc_list_block.docids[0] = docid;
        doc_list_block.first_docid = docid;
        doc_list_block.last_docid = docid;
        if let Some(termfreqs) = doc_list_block.termfreqs.as_deref_mut() {
            termfreqs[0] = tf;
        }

        Self { doc_list_block }
    }
}

impl SegmentDocDecode for InlineSegmentDecoder {
    fn decode_doc_buffer_may_copy(&mut self, docid: DocId) -> Result<Option<&DocListBlock>> {
        if docid > self.doc_list_block.last_docid {
            return Ok(None);
        }
        Ok(Some(&self.doc_list_block))
    }
}

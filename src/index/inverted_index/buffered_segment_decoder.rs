use crate::{postings::DocListBlock, DocId, Result};

/// Doc-id decoding of one term in one segment, over segment-relative doc ids.
pub trait SegmentDocDecode {
    /// Decodes the page holding the smallest doc id `>= docid` and returns it,
    /// or `None` when the segment has no such doc id.
    fn decode_doc_buffer_may_copy(&mut self, docid: DocId) -> Result<Option<&DocListBlock>>;

    /// Like [`Self::decode_doc_buffer_may_copy`], copying the page into
    /// `doc_list_block`.
    fn decode_doc_buffer(&mut self, docid: DocId, doc_list_block: &mut DocListBlock) -> Result<bool> {
        match self.decode_doc_buffer_may_copy(docid)? {
            Some(decoded) => {
                doc_list_block.copy_from(decoded);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

use crate::{DocId, DocPayload, FieldMap, PostingError, Result, TermFreq, DOC_LIST_BLOCK_LEN};

use super::PostingFormat;

/// One decoded page of a doc list: absolute doc ids plus the optional
/// per-document channels.
pub struct DocListBlock {
    pub len: usize,
    pub docids: [DocId; DOC_LIST_BLOCK_LEN],
    pub first_docid: DocId,
    pub last_docid: DocId,
    /// Sum of term frequencies of the segment's documents before this block.
    pub base_ttf: u64,
    /// Documents of the segment before this block.
    pub skipped_doc_count: usize,
    pub termfreqs: Option<Box<[TermFreq]>>,
    pub doc_payloads: Option<Box<[DocPayload]>>,
    pub fieldmaps: Option<Box<[FieldMap]>>,
}

fn channel<T: Copy + Default>(enabled: bool) -> Option<Box<[T]>> {
    enabled.then(|| vec![T::default(); DOC_LIST_BLOCK_LEN].into_boxed_slice())
}

impl DocListBlock {
    pub fn new(posting_format: &PostingFormat) -> Self {
        Self {
            len: 0,
            docids: [0; DOC_LIST_BLOCK_LEN],
            first_docid: 0,
            last_docid: 0,
            base_ttf: 0,
            skipped_doc_count: 0,
            termfreqs: channel(posting_format.has_tflist()),
            doc_payloads: channel(posting_format.has_doc_payload()),
            fieldmaps: channel(posting_format.has_fieldmap()),
        }
    }

    /// Turns the decoded doc id deltas into absolute doc ids.
    pub fn decode(&mut self, base_docid: DocId) -> Result<()> {
        if self.len == 0 {
            return Ok(());
        }
        let mut acc = base_docid;
        for (index, docid) in self.docids[0..self.len].iter_mut().enumerate() {
            acc = acc.checked_add(*docid).ok_or_else(|| {
                PostingError::Corruption(format!(
                    "doc id overflow at entry {} after doc {}",
                    index, acc
                ))
            })?;
            *docid = acc;
        }
        self.first_docid = self.docids[0];
        self.last_docid = self.docids[self.len - 1];
        Ok(())
    }

    pub fn add_base_docid(&mut self, base_docid: DocId) {
        for docid in &mut self.docids[0..self.len] {
            *docid += base_docid;
        }
        self.first_docid += base_docid;
        self.last_docid += base_docid;
    }

    pub fn copy_from(&mut self, other: &DocListBlock) {
        let len = other.len;
        self.len = len;
        self.docids[0..len].copy_from_slice(&other.docids[0..len]);
        self.first_docid = other.first_docid;
        self.last_docid = other.last_docid;
        self.base_ttf = other.base_ttf;
        self.skipped_doc_count = other.skipped_doc_count;
        if let (Some(dst), Some(src)) = (self.termfreqs.as_deref_mut(), other.termfreqs.as_deref()) {
            dst[0..len].copy_from_slice(&src[0..len]);
        }
        if let (Some(dst), Some(src)) = (
            self.doc_payloads.as_deref_mut(),
            other.doc_payloads.as_deref(),
        ) {
            dst[0..len].copy_from_slice(&src[0..len]);
        }
        if let (Some(dst), Some(src)) = (self.fieldmaps.as_deref_mut(), other.fieldmaps.as_deref()) {
            dst[0..len].copy_from_slice(&src[0..len]);
        }
    }

    pub fn term_freq(&self, cursor: usize) -> Option<TermFreq> {
        self.termfreqs.as_ref().map(|termfreqs| termfreqs[cursor])
    }

    pub fn doc_payload(&self, cursor: usize) -> DocPayload {
        self.doc_payloads
            .as_ref()
            .map_or(0, |doc_payloads| doc_payloads[cursor])
    }

    pub fn fieldmap(&self, cursor: usize) -> FieldMap {
        self.fieldmaps.as_ref().map_or(0, |fieldmaps| fieldmaps[cursor])
    }

    /// Sum of term frequencies of the segment's documents before `cursor`.
    pub fn ttf_before(&self, cursor: usize) -> u64 {
        self.base_ttf
            + self.termfreqs.as_ref().map_or(0, |termfreqs| {
                termfreqs[0..cursor].iter().map(|&tf| tf as u64).sum()
            })
    }
}

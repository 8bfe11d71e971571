use crate::{
    postings::{
        positions::{PositionListSegmentDecoder, RecordLocation},
        section::SectionAttributeReader,
        PostingFormat,
    },
    util::{SlotArena, SlotId},
    DocId, PostingError, Result, TermFreq, INVALID_DOCID,
};

use super::InDocPositionIterator;

/// Position decoders of one query, addressed by [`SlotId`].
pub type DecoderArena<'a> = SlotArena<PositionListSegmentDecoder<'a>>;

/// Caller-owned pool the in-doc states are unpacked into.
pub type StatePool<'a> = SlotArena<NormalInDocState<'a>>;

/// Cursor state of one term in one document.
pub trait InDocPositionState<'a> {
    fn docid(&self) -> DocId;

    fn term_freq(&self, decoders: &DecoderArena<'a>) -> Result<TermFreq>;

    /// 1-based ordinal of the document among the term's documents of its
    /// segment.
    fn seeked_doc_count(&self) -> u32;

    fn section_reader(&self) -> Option<&'a dyn SectionAttributeReader>;

    fn create_iterator(&self, decoders: &DecoderArena<'a>) -> Result<InDocPositionIterator<'a>>;
}

/// In-doc state bound to a segment's [`PositionListSegmentDecoder`].
#[derive(Clone)]
pub struct NormalInDocState<'a> {
    pub(crate) docid: DocId,
    pub(crate) tf: Option<TermFreq>,
    pub(crate) seeked_doc_count: u32,
    pub(crate) section_reader: Option<&'a dyn SectionAttributeReader>,
    pub(crate) decoder: Option<SlotId>,
    pub(crate) location: Option<RecordLocation>,
    pub(crate) offset_in_record: usize,
    pub(crate) need_decode: bool,
    pub(crate) posting_format: PostingFormat,
}

impl<'a> NormalInDocState<'a> {
    pub fn new(
        posting_format: PostingFormat,
        section_reader: Option<&'a dyn SectionAttributeReader>,
    ) -> Self {
        Self {
            docid: INVALID_DOCID,
            tf: None,
            seeked_doc_count: 0,
            section_reader,
            decoder: None,
            location: None,
            offset_in_record: 0,
            need_decode: true,
            posting_format,
        }
    }

    pub fn decoder(&self) -> Option<SlotId> {
        self.decoder
    }

    pub fn location(&self) -> Option<&RecordLocation> {
        self.location.as_ref()
    }

    pub fn offset_in_record(&self) -> usize {
        self.offset_in_record
    }

    pub fn need_decode(&self) -> bool {
        self.need_decode
    }

    pub fn posting_format(&self) -> &PostingFormat {
        &self.posting_format
    }

    /// Whether term frequencies come from the decoder's tf bitmap.
    pub fn bitmap_mode(&self) -> bool {
        self.posting_format.has_tf_bitmap()
    }
}

impl<'a> InDocPositionState<'a> for NormalInDocState<'a> {
    fn docid(&self) -> DocId {
        self.docid
    }

    fn term_freq(&self, decoders: &DecoderArena<'a>) -> Result<TermFreq> {
        if let Some(tf) = self.tf {
            return Ok(tf);
        }
        if !self.bitmap_mode() {
            return Ok(1);
        }
        let handle = self.decoder.ok_or_else(|| {
            PostingError::InvalidArgument("in-doc state is not bound to a segment".to_string())
        })?;
        let bitmap = decoders.try_get(handle)?.bitmap().ok_or_else(|| {
            PostingError::Corruption("position list lacks its tf bitmap".to_string())
        })?;
        Ok(bitmap.get_pos_count_info(self.seeked_doc_count)?.own_count)
    }

    fn seeked_doc_count(&self) -> u32 {
        self.seeked_doc_count
    }

    fn section_reader(&self) -> Option<&'a dyn SectionAttributeReader> {
        self.section_reader
    }

    fn create_iterator(&self, decoders: &DecoderArena<'a>) -> Result<InDocPositionIterator<'a>> {
        let mut iterator = InDocPositionIterator::new(self.posting_format);
        iterator.init(self, decoders)?;
        Ok(iterator)
    }
}

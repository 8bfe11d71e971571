use crate::{
    postings::{
        in_doc::{DecoderArena, NormalInDocState, StateKeeper},
        section::SectionAttributeReader,
        DocListBlock, PostingFormat,
    },
    DocId, PostingError, Result, TermFreq,
};

use super::{
    DocListData, DocListSegmentDecoder, InlineSegmentDecoder, SegmentDocDecode, SegmentPosting,
};

/// Decodes doc-id pages of one term across the segments of an index.
///
/// Segments are ordered by base doc id and visited forward only. The held
/// [`StateKeeper`] follows the active segment for position iteration.
pub struct BufferedIndexDecoder<'q, 'a> {
    posting_format: PostingFormat,
    segment_postings: Vec<SegmentPosting<'a>>,
    cursor: Option<usize>,
    segment_decoder: Option<Box<dyn SegmentDocDecode + 'a>>,
    state_keeper: StateKeeper<'q, 'a>,
}

impl<'q, 'a> BufferedIndexDecoder<'q, 'a> {
    pub fn new(
        posting_format: PostingFormat,
        segment_postings: Vec<SegmentPosting<'a>>,
        decoders: &'q mut DecoderArena<'a>,
        section_reader: Option<&'a dyn SectionAttributeReader>,
    ) -> Self {
        Self {
            posting_format,
            segment_postings,
            cursor: None,
            segment_decoder: None,
            state_keeper: StateKeeper::new(decoders, posting_format, section_reader),
        }
    }

    pub fn segment_postings(&self) -> &[SegmentPosting<'a>] {
        &self.segment_postings
    }

    /// Index of the active segment.
    pub fn segment_cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Fills `doc_list_block` with the page holding the smallest doc id
    /// `>= docid` of any segment, with absolute doc ids.
    pub fn decode_doc_buffer(
        &mut self,
        docid: DocId,
        doc_list_block: &mut DocListBlock,
    ) -> Result<bool> {
        if self.need_move_to_segment(docid) && !self.move_to_segment(docid)? {
            return Ok(false);
        }
        loop {
            let (Some(cursor), Some(segment_decoder)) =
                (self.cursor, self.segment_decoder.as_mut())
            else {
                return Ok(false);
            };
            let base_docid = self.segment_postings[cursor].base_docid();
            let local_docid = std::cmp::max(docid.saturating_sub(base_docid), 0);
            if segment_decoder.decode_doc_buffer(local_docid, doc_list_block)? {
                doc_list_block.add_base_docid(base_docid);
                return Ok(true);
            }
            if !self.move_to_segment(docid)? {
                return Ok(false);
            }
        }
    }

    fn need_move_to_segment(&self, docid: DocId) -> bool {
        match self.cursor {
            None => true,
            Some(cursor) => self
                .segment_postings
                .get(cursor + 1)
                .is_some_and(|next| docid >= next.base_docid()),
        }
    }

    /// Opens the decoder of the segment owning `docid`, searching forward from
    /// the segment after the active one.
    fn move_to_segment(&mut self, docid: DocId) -> Result<bool> {
        let start = self.cursor.map_or(0, |cursor| cursor + 1);
        if start >= self.segment_postings.len() {
            self.segment_decoder = None;
            return Ok(false);
        }
        let cursor = self.locate_segment(start, docid);
        let segment_posting = self.segment_postings[cursor];

        log::debug!(
            "move to segment {} (base doc {}) for doc {}",
            cursor,
            segment_posting.base_docid(),
            docid
        );

        let segment_decoder: Box<dyn SegmentDocDecode + 'a> = match *segment_posting.doc_list() {
            DocListData::Slices { list, offset } => Box::new(DocListSegmentDecoder::open(
                list,
                offset,
                segment_posting.term_meta().doc_freq as usize,
                self.posting_format,
            )?),
            DocListData::DictInline { docid, tf } => {
                Box::new(InlineSegmentDecoder::new(&self.posting_format, docid, tf))
            }
        };
        self.segment_decoder = Some(segment_decoder);
        self.cursor = Some(cursor);

        Ok(true)
    }

    fn locate_segment(&self, start: usize, docid: DocId) -> usize {
        let mut cursor = start;
        while self
            .segment_postings
            .get(cursor + 1)
            .is_some_and(|next| docid >= next.base_docid())
        {
            cursor += 1;
        }
        cursor
    }

    /// Moves the in-doc state to `docid` of the active segment.
    pub fn move_state_to_doc(
        &mut self,
        docid: DocId,
        tf: Option<TermFreq>,
        ttf_before: u64,
        seeked_doc_count: u32,
    ) -> Result<&NormalInDocState<'a>> {
        let cursor = self.cursor.ok_or_else(|| {
            PostingError::InvalidArgument("no active segment".to_string())
        })?;
        let segment_posting = &self.segment_postings[cursor];
        let position_list = segment_posting.position_list().copied().ok_or_else(|| {
            PostingError::InvalidArgument(format!("segment {} has no position list", cursor))
        })?;
        let ttf = segment_posting.term_meta().total_term_freq;

        self.state_keeper
            .move_to_segment(cursor, position_list.list, position_list.offset, ttf)?;
        self.state_keeper
            .move_to_doc(docid, tf, ttf_before, seeked_doc_count)?;

        Ok(self.state_keeper.state())
    }

    pub fn state_keeper(&self) -> &StateKeeper<'q, 'a> {
        &self.state_keeper
    }

    pub fn decoders(&mut self) -> &mut DecoderArena<'a> {
        self.state_keeper.decoders()
    }
}

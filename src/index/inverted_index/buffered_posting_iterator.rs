use crate::{
    index::PostingIterator,
    postings::{
        in_doc::{DecoderArena, StatePool},
        section::SectionAttributeReader,
        DocListBlock, MatchData, PostingFormat,
    },
    util::SlotId,
    DocId, PostingError, Result, TermFreq, END_DOCID, INVALID_DOCID,
};

use super::{buffered_index_decoder::BufferedIndexDecoder, SegmentPosting};

/// Iterates the documents of one term across segments, one decoded page at a
/// time, and unpacks in-doc states for position iteration.
pub struct BufferedPostingIterator<'q, 'a> {
    posting_format: PostingFormat,
    current_docid: DocId,
    block_cursor: usize,
    doc_list_block: DocListBlock,
    index_decoder: BufferedIndexDecoder<'q, 'a>,
    doc_freq: usize,
    total_term_freq: u64,
}

impl<'q, 'a> BufferedPostingIterator<'q, 'a> {
    pub fn new(
        posting_format: PostingFormat,
        segment_postings: Vec<SegmentPosting<'a>>,
        decoders: &'q mut DecoderArena<'a>,
        section_reader: Option<&'a dyn SectionAttributeReader>,
    ) -> Self {
        let doc_freq = segment_postings
            .iter()
            .map(|segment_posting| segment_posting.term_meta().doc_freq as usize)
            .sum();
        let total_term_freq = segment_postings
            .iter()
            .map(|segment_posting| segment_posting.term_meta().total_term_freq)
            .sum();
        let doc_list_block = DocListBlock::new(&posting_format);
        let index_decoder =
            BufferedIndexDecoder::new(posting_format, segment_postings, decoders, section_reader);

        Self {
            posting_format,
            current_docid: INVALID_DOCID,
            block_cursor: 0,
            doc_list_block,
            index_decoder,
            doc_freq,
            total_term_freq,
        }
    }

    pub fn posting_format(&self) -> &PostingFormat {
        &self.posting_format
    }

    /// The current doc id, `INVALID_DOCID` before the first seek.
    pub fn docid(&self) -> DocId {
        self.current_docid
    }

    pub fn doc_freq(&self) -> usize {
        self.doc_freq
    }

    pub fn total_term_freq(&self) -> u64 {
        self.total_term_freq
    }

    pub fn seek_doc(&mut self, docid: DocId) -> Result<DocId> {
        if self.current_docid == END_DOCID {
            return Ok(END_DOCID);
        }
        if self.doc_list_block.len == 0 || self.doc_list_block.last_docid < docid {
            if !self
                .index_decoder
                .decode_doc_buffer(docid, &mut self.doc_list_block)?
            {
                self.doc_list_block.len = 0;
                self.current_docid = END_DOCID;
                return Ok(END_DOCID);
            }
            self.block_cursor = 0;
            self.current_docid = self.doc_list_block.docids[0];
        }

        while self.current_docid < docid {
            self.block_cursor += 1;
            self.current_docid = self.doc_list_block.docids[self.block_cursor];
        }

        Ok(self.current_docid)
    }

    fn check_on_doc(&self) -> Result<()> {
        if self.current_docid == INVALID_DOCID || self.current_docid == END_DOCID {
            return Err(PostingError::InvalidArgument(format!(
                "posting iterator is not on a document: {}",
                self.current_docid
            )));
        }
        Ok(())
    }

    /// 1-based ordinal of the current document within its segment.
    fn seeked_doc_count(&self) -> u32 {
        (self.doc_list_block.skipped_doc_count + self.block_cursor + 1) as u32
    }

    fn move_state_to_current_doc(&mut self) -> Result<()> {
        self.check_on_doc()?;
        let tf = self.doc_list_block.term_freq(self.block_cursor);
        let ttf_before = self.doc_list_block.ttf_before(self.block_cursor);
        let seeked_doc_count = self.seeked_doc_count();
        self.index_decoder
            .move_state_to_doc(self.current_docid, tf, ttf_before, seeked_doc_count)?;
        Ok(())
    }

    pub fn term_freq(&mut self) -> Result<TermFreq> {
        self.check_on_doc()?;
        if let Some(tf) = self.doc_list_block.term_freq(self.block_cursor) {
            return Ok(tf);
        }
        if !self.posting_format.has_tf_bitmap() {
            return Ok(1);
        }
        self.move_state_to_current_doc()?;
        self.index_decoder.state_keeper().term_freq()
    }

    /// Copies the in-doc state of the current document into `pool`.
    pub fn unpack(&mut self, pool: &mut StatePool<'a>) -> Result<SlotId> {
        self.move_state_to_current_doc()?;
        let state = self.index_decoder.state_keeper().state().clone();
        Ok(pool.alloc(state))
    }

    /// The arena holding the position decoders of the unpacked states.
    pub fn decoders(&mut self) -> &mut DecoderArena<'a> {
        self.index_decoder.decoders()
    }
}

impl<'q, 'a> PostingIterator for BufferedPostingIterator<'q, 'a> {
    fn seek(&mut self, docid: DocId) -> Result<DocId> {
        self.seek_doc(docid)
    }

    fn match_data(&mut self) -> Result<MatchData> {
        let tf = self.term_freq()?;
        Ok(MatchData {
            tf,
            fieldmap: self.doc_list_block.fieldmap(self.block_cursor),
            doc_payload: self.doc_list_block.doc_payload(self.block_cursor),
        })
    }
}

use std::collections::HashMap;

use crate::{
    postings::{
        positions::PositionListSegmentDecoder, section::SectionAttributeReader, ByteSliceList,
        PostingFormat,
    },
    util::SlotId,
    DocId, PostingError, Result, TermFreq,
};

use super::{DecoderArena, InDocPositionState, NormalInDocState};

/// Binds an in-doc state to the position decoders of the segments it visits.
///
/// Every decoder created through a keeper lives in the caller's arena until
/// the keeper is dropped, which frees them all.
pub struct StateKeeper<'q, 'a> {
    decoders: &'q mut DecoderArena<'a>,
    created: Vec<SlotId>,
    segment_decoders: HashMap<usize, SlotId>,
    current_segment: Option<usize>,
    state: NormalInDocState<'a>,
}

impl<'q, 'a> StateKeeper<'q, 'a> {
    pub fn new(
        decoders: &'q mut DecoderArena<'a>,
        posting_format: PostingFormat,
        section_reader: Option<&'a dyn SectionAttributeReader>,
    ) -> Self {
        Self {
            decoders,
            created: Vec::new(),
            segment_decoders: HashMap::new(),
            current_segment: None,
            state: NormalInDocState::new(posting_format, section_reader),
        }
    }

    pub fn state(&self) -> &NormalInDocState<'a> {
        &self.state
    }

    pub fn decoders(&mut self) -> &mut DecoderArena<'a> {
        &mut *self.decoders
    }

    /// Term frequency of the state's current document.
    pub fn term_freq(&self) -> Result<TermFreq> {
        self.state.term_freq(&*self.decoders)
    }

    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    pub fn current_segment(&self) -> Option<usize> {
        self.current_segment
    }

    /// Creates the position decoder of `segment` on first visit, attaches to
    /// the existing one afterwards.
    pub fn move_to_segment(
        &mut self,
        segment: usize,
        byte_slice_list: &'a ByteSliceList,
        offset: usize,
        ttf: u64,
    ) -> Result<()> {
        if self.current_segment == Some(segment) {
            return Ok(());
        }

        let existing = self.segment_decoders.get(&segment).copied();
        let handle = match existing {
            Some(handle) => {
                log::debug!("attach position decoder of segment {}", segment);
                self.decoders.try_get_mut(handle)?.set_need_reopen();
                handle
            }
            None => {
                log::debug!("create position decoder for segment {}", segment);
                let decoder = PositionListSegmentDecoder::open(
                    byte_slice_list,
                    offset,
                    ttf,
                    self.state.posting_format,
                )?;
                let handle = self.decoders.alloc(decoder);
                self.created.push(handle);
                self.segment_decoders.insert(segment, handle);
                handle
            }
        };

        self.state.decoder = Some(handle);
        self.state.location = None;
        self.current_segment = Some(segment);

        Ok(())
    }

    /// Locates the positions of `docid`. `ttf_before` is the number of
    /// positions of the segment's earlier documents, `seeked_doc_count` the
    /// 1-based ordinal of `docid` in the segment; in bitmap mode the former
    /// is derived from the latter.
    pub fn move_to_doc(
        &mut self,
        docid: DocId,
        tf: Option<TermFreq>,
        ttf_before: u64,
        seeked_doc_count: u32,
    ) -> Result<()> {
        let handle = self.state.decoder.ok_or_else(|| {
            PostingError::InvalidArgument("state keeper is not on a segment".to_string())
        })?;
        let decoder = self.decoders.try_get_mut(handle)?;

        let target_ttf = match decoder.bitmap() {
            Some(bitmap) => bitmap.get_pos_count_info(seeked_doc_count)?.prior_count as u64,
            None => ttf_before,
        };
        let (location, need_decode) = decoder.skip_to(target_ttf, self.state.location.as_ref())?;

        self.state.docid = docid;
        self.state.tf = tf;
        self.state.seeked_doc_count = seeked_doc_count;
        self.state.offset_in_record = (target_ttf - location.start_ttf) as usize;
        self.state.location = Some(location);
        self.state.need_decode = need_decode;

        Ok(())
    }
}

impl<'q, 'a> Drop for StateKeeper<'q, 'a> {
    fn drop(&mut self) {
        for handle in self.created.drain(..) {
            self.decoders.free(handle);
        }
    }
}

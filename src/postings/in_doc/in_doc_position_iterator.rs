use crate::{
    postings::{
        positions::RecordLocation,
        section::{SectionInfo, SectionMeta},
        PostingFormat,
    },
    util::SlotId,
    DocId, FieldId, Pos, PosPayload, PostingError, Result, SectionId, SectionLen, SectionWeight,
    TermFreq, END_POSITION, POSITION_RECORD_LEN,
};

use super::{DecoderArena, InDocPositionState, NormalInDocState};

/// Walks the positions of one term in one document, and the section layout
/// around the current position.
///
/// An iterator can be re-initialized for the next document of the same term;
/// when that document starts in the record already buffered, the record is
/// not decoded again.
pub struct InDocPositionIterator<'a> {
    state: NormalInDocState<'a>,
    tf: TermFreq,
    positions: Box<[u32]>,
    payloads: Option<Box<[PosPayload]>>,
    resident: Option<(SlotId, usize)>,
    record: RecordLocation,
    record_cursor: usize,
    pending_decode: bool,
    visited: TermFreq,
    current_pos: Option<Pos>,
    current_payload: PosPayload,

    section_buf: Vec<u8>,
    section_meta: Option<SectionMeta>,
    visited_section: Option<usize>,
    visited_section_end: u64,
    field_id: FieldId,
    field_start: u64,
    section_in_field: SectionId,
}

impl<'a> InDocPositionIterator<'a> {
    pub fn new(posting_format: PostingFormat) -> Self {
        let payloads = posting_format
            .has_position_payload()
            .then(|| vec![0; POSITION_RECORD_LEN].into_boxed_slice());

        Self {
            state: NormalInDocState::new(posting_format, None),
            tf: 0,
            positions: vec![0; POSITION_RECORD_LEN].into_boxed_slice(),
            payloads,
            resident: None,
            record: RecordLocation::default(),
            record_cursor: 0,
            pending_decode: true,
            visited: 0,
            current_pos: None,
            current_payload: 0,
            section_buf: Vec::new(),
            section_meta: None,
            visited_section: None,
            visited_section_end: 0,
            field_id: 0,
            field_start: 0,
            section_in_field: 0,
        }
    }

    /// Binds the iterator to `state`'s document.
    pub fn init(&mut self, state: &NormalInDocState<'a>, decoders: &DecoderArena<'a>) -> Result<()> {
        self.state = state.clone();
        self.tf = state.term_freq(decoders)?;
        self.record = state.location.unwrap_or_default();
        self.record_cursor = state.offset_in_record;
        self.pending_decode = match (state.decoder, state.location) {
            (Some(handle), Some(location)) => {
                state.need_decode || self.resident != Some((handle, location.index))
            }
            _ => true,
        };
        self.visited = 0;
        self.current_pos = None;
        self.current_payload = 0;

        self.section_meta = None;
        self.visited_section = None;
        self.visited_section_end = 0;
        self.field_id = 0;
        self.field_start = 0;
        self.section_in_field = 0;

        Ok(())
    }

    pub fn docid(&self) -> DocId {
        self.state.docid()
    }

    pub fn term_freq(&self) -> TermFreq {
        self.tf
    }

    /// The position the iterator is on, `None` before the first seek.
    pub fn current_position(&self) -> Option<Pos> {
        self.current_pos
    }

    /// Smallest position of the document not less than `pos` and greater than
    /// the current one, or `END_POSITION` once all positions are consumed.
    pub fn seek_position(&mut self, decoders: &mut DecoderArena<'a>, pos: Pos) -> Result<Pos> {
        if self.current_pos == Some(END_POSITION) {
            return Ok(END_POSITION);
        }
        let target = match self.current_pos {
            Some(current) => std::cmp::max(pos, current.saturating_add(1)),
            None => pos,
        };
        loop {
            if self.visited == self.tf {
                self.current_pos = Some(END_POSITION);
                return Ok(END_POSITION);
            }
            let current = self.next_position(decoders)?;
            if current >= target {
                return Ok(current);
            }
        }
    }

    pub fn position_payload(&self) -> PosPayload {
        self.current_payload
    }

    fn next_position(&mut self, decoders: &mut DecoderArena<'a>) -> Result<Pos> {
        if self.pending_decode || self.record_cursor >= self.record.len {
            self.fill_record(decoders)?;
        }
        let delta = self.positions[self.record_cursor];
        let pos = match self.current_pos {
            Some(current) if self.visited > 0 => current.checked_add(delta).ok_or_else(|| {
                PostingError::Corruption(format!(
                    "position overflow in doc {}",
                    self.state.docid()
                ))
            })?,
            _ => delta,
        };
        if let Some(payloads) = &self.payloads {
            self.current_payload = payloads[self.record_cursor];
        }
        self.record_cursor += 1;
        self.visited += 1;
        self.current_pos = Some(pos);

        Ok(pos)
    }

    fn fill_record(&mut self, decoders: &mut DecoderArena<'a>) -> Result<()> {
        let (Some(handle), Some(_)) = (self.state.decoder, self.state.location) else {
            return Err(PostingError::InvalidArgument(
                "in-doc state was not moved to a document".to_string(),
            ));
        };
        let decoder = decoders.try_get_mut(handle)?;
        if !self.pending_decode {
            let next_ttf = self.record.start_ttf + self.record.len as u64;
            let (location, _) = decoder.skip_to(next_ttf, Some(&self.record))?;
            self.record = location;
            self.record_cursor = 0;
        }
        let len =
            decoder.decode_record(&self.record, &mut self.positions, self.payloads.as_deref_mut())?;
        if len == 0 || self.record_cursor >= len {
            log::warn!(
                "empty position record {} for doc {}",
                self.record.index,
                self.state.docid()
            );
            return Err(PostingError::Corruption(format!(
                "position record {} holds no position at {}",
                self.record.index, self.record_cursor
            )));
        }
        self.resident = Some((handle, self.record.index));
        self.pending_decode = false;

        Ok(())
    }

    fn load_section_meta(&mut self) -> Result<()> {
        if self.section_meta.is_some() {
            return Ok(());
        }
        let section_reader = self.state.section_reader().ok_or_else(|| {
            PostingError::InvalidArgument("no section attribute reader".to_string())
        })?;
        section_reader.read(self.state.docid(), &mut self.section_buf)?;
        self.section_meta = Some(SectionMeta::parse(
            &self.section_buf,
            section_reader.has_field_id(),
            section_reader.has_section_weight(),
        )?);
        Ok(())
    }

    /// Moves the visited-section cursor forward to the section holding the
    /// current position.
    fn seek_section(&mut self) -> Result<SectionInfo> {
        let pos = match self.current_pos {
            Some(pos) if pos != END_POSITION => pos as u64,
            _ => {
                return Err(PostingError::InvalidArgument(
                    "iterator is not on a position".to_string(),
                ))
            }
        };
        self.load_section_meta()?;
        let Some(section_meta) = self.section_meta.as_ref() else {
            return Err(PostingError::InvalidArgument(
                "no section meta loaded".to_string(),
            ));
        };

        while self.visited_section.is_none() || pos >= self.visited_section_end {
            let next = self.visited_section.map_or(0, |index| index + 1);
            let Some(section) = section_meta.get(next) else {
                log::warn!(
                    "position {} beyond the {} sections of doc {}",
                    pos,
                    section_meta.len(),
                    self.state.docid()
                );
                return Err(PostingError::Corruption(format!(
                    "position {} beyond section layout",
                    pos
                )));
            };
            let section_start = self.visited_section_end;
            if self.visited_section.is_none() || section.field_id != self.field_id {
                self.field_id = section.field_id;
                self.field_start = section_start;
                self.section_in_field = 0;
            } else {
                self.section_in_field += 1;
            }
            self.visited_section = Some(next);
            self.visited_section_end += section.len as u64;
        }

        let index = self.visited_section.unwrap_or_default();
        section_meta.get(index).copied().ok_or_else(|| {
            PostingError::Corruption(format!("section {} vanished", index))
        })
    }

    /// Ordinal of the current section among the consecutive sections of its field.
    pub fn section_id(&mut self) -> Result<SectionId> {
        self.seek_section()?;
        Ok(self.section_in_field)
    }

    pub fn section_len(&mut self) -> Result<SectionLen> {
        Ok(self.seek_section()?.len)
    }

    pub fn section_weight(&mut self) -> Result<SectionWeight> {
        Ok(self.seek_section()?.weight)
    }

    pub fn field_id(&mut self) -> Result<FieldId> {
        Ok(self.seek_section()?.field_id)
    }

    /// Current position relative to the start of its field.
    pub fn field_position(&mut self) -> Result<Pos> {
        self.seek_section()?;
        let pos = self.current_pos.unwrap_or_default() as u64;
        Ok((pos - self.field_start) as Pos)
    }
}

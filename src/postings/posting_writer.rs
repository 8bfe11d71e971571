use std::io::{self, Write};

use crate::{DocId, DocPayload, FieldMap, Pos, PosPayload, TermFreq, TermPayload};

use super::{
    positions::PositionListEncoder, DocListEncoder, PostingFormat, TermMeta, TermPostingInfo,
};

/// Result of dumping one term of one segment.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TermPostingDump {
    pub term_meta: TermMeta,
    pub term_posting_info: TermPostingInfo,
    pub doc_list_bytes: usize,
    pub position_list_bytes: usize,
}

/// Builds the doc region and position region of one term in one segment.
pub struct TermPostingWriter {
    posting_format: PostingFormat,
    term_payload: TermPayload,
    total_term_freq: u64,
    first_doc: Option<(DocId, TermFreq)>,
    doc_list_encoder: DocListEncoder,
    position_list_encoder: Option<PositionListEncoder>,
}

impl TermPostingWriter {
    pub fn new(posting_format: PostingFormat) -> Self {
        let position_list_encoder = if posting_format.has_position_list() {
            Some(PositionListEncoder::new(posting_format))
        } else {
            None
        };

        Self {
            posting_format,
            term_payload: 0,
            total_term_freq: 0,
            first_doc: None,
            doc_list_encoder: DocListEncoder::new(posting_format),
            position_list_encoder,
        }
    }

    pub fn posting_format(&self) -> &PostingFormat {
        &self.posting_format
    }

    pub fn set_term_payload(&mut self, term_payload: TermPayload) {
        self.term_payload = term_payload;
    }

    /// Adds a document of a format without position list.
    pub fn add_doc(
        &mut self,
        docid: DocId,
        tf: TermFreq,
        doc_payload: DocPayload,
        fieldmap: FieldMap,
    ) {
        debug_assert!(self.position_list_encoder.is_none());
        self.end_doc(docid, tf, doc_payload, fieldmap);
    }

    /// Adds a document with its sorted positions; `position_payloads` is either
    /// empty or holds one payload per position.
    pub fn add_doc_with_positions(
        &mut self,
        docid: DocId,
        positions: &[Pos],
        position_payloads: &[PosPayload],
        doc_payload: DocPayload,
        fieldmap: FieldMap,
    ) {
        debug_assert!(!positions.is_empty());
        debug_assert!(position_payloads.is_empty() || position_payloads.len() == positions.len());
        if let Some(position_list_encoder) = self.position_list_encoder.as_mut() {
            for (i, &pos) in positions.iter().enumerate() {
                let payload = position_payloads.get(i).copied().unwrap_or_default();
                position_list_encoder.add_position(pos, payload);
            }
            position_list_encoder.end_doc();
        }
        self.end_doc(docid, positions.len() as TermFreq, doc_payload, fieldmap);
    }

    fn end_doc(&mut self, docid: DocId, tf: TermFreq, doc_payload: DocPayload, fieldmap: FieldMap) {
        self.total_term_freq += tf as u64;
        if self.first_doc.is_none() {
            self.first_doc = Some((docid, tf));
        }
        self.doc_list_encoder
            .add_doc(docid, tf, doc_payload, fieldmap);
    }

    pub fn doc_freq(&self) -> usize {
        self.doc_list_encoder.df()
    }

    pub fn term_meta(&self) -> TermMeta {
        TermMeta::new(
            self.doc_list_encoder.df() as u32,
            self.total_term_freq,
            self.term_payload,
        )
    }

    /// The single document of a term that can be stored inline in the
    /// dictionary instead of in a doc region.
    pub fn inline_doc(&self) -> Option<(DocId, TermFreq)> {
        if self.doc_list_encoder.df() == 1 {
            self.first_doc
        } else {
            None
        }
    }

    pub fn dump<D: Write, P: Write>(
        &self,
        doc_writer: D,
        position_writer: P,
    ) -> io::Result<TermPostingDump> {
        let (doc_info, doc_list_bytes) = self.doc_list_encoder.dump(doc_writer)?;
        let (position_info, position_list_bytes) = match &self.position_list_encoder {
            Some(position_list_encoder) => position_list_encoder.dump(position_writer)?,
            None => (TermPostingInfo::default(), 0),
        };

        Ok(TermPostingDump {
            term_meta: self.term_meta(),
            term_posting_info: TermPostingInfo {
                position_skip_size: position_info.position_skip_size,
                position_list_size: position_info.position_list_size,
                ..doc_info
            },
            doc_list_bytes,
            position_list_bytes,
        })
    }
}

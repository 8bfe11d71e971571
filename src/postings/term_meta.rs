use std::io::{self, Write};

use crate::{DocFreq, Result, TermPayload};

use super::{compression::BlockEncoder, ByteSliceReader, PostingFormat};

/// Term-level statistics of one term in one segment.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermMeta {
    pub doc_freq: DocFreq,
    pub total_term_freq: u64,
    pub payload: TermPayload,
}

impl TermMeta {
    pub fn new(doc_freq: DocFreq, total_term_freq: u64, payload: TermPayload) -> Self {
        Self {
            doc_freq,
            total_term_freq,
            payload,
        }
    }

    pub fn load(reader: &mut ByteSliceReader, posting_format: &PostingFormat) -> Result<Self> {
        let doc_freq = reader.read_vu32()?;
        let total_term_freq = reader.read_vu64()?;
        let payload = if posting_format.has_term_payload() {
            reader.read_u16()?
        } else {
            0
        };

        Ok(Self {
            doc_freq,
            total_term_freq,
            payload,
        })
    }

    pub fn store<W: Write>(&self, writer: &mut W, posting_format: &PostingFormat) -> io::Result<usize> {
        let block_encoder = BlockEncoder;
        let mut written = block_encoder.encode_vu32(self.doc_freq, writer)?;
        written += block_encoder.encode_vu64(self.total_term_freq, writer)?;
        if posting_format.has_term_payload() {
            written += block_encoder.encode_u16(&[self.payload], writer)?;
        }
        Ok(written)
    }
}

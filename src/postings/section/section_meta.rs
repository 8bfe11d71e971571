use std::io::{self, Write};

use crate::{
    postings::compression::BlockEncoder, FieldId, PostingError, Result, SectionLen, SectionWeight,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    pub len: SectionLen,
    pub field_id: FieldId,
    pub weight: SectionWeight,
}

/// Decoded section layout of one document: consecutive sections covering the
/// document's positions in order.
#[derive(Debug, Default, Clone)]
pub struct SectionMeta {
    sections: Vec<SectionInfo>,
}

impl SectionMeta {
    pub fn parse(blob: &[u8], has_field_id: bool, has_section_weight: bool) -> Result<Self> {
        let block_encoder = BlockEncoder;
        let mut cursor = 0;
        let count = block_encoder.decode_vu32_from_slice(blob, &mut cursor)? as usize;
        let mut sections = Vec::with_capacity(std::cmp::min(count, blob.len()));
        for _ in 0..count {
            let len = block_encoder.decode_vu32_from_slice(blob, &mut cursor)?;
            let field_id = if has_field_id {
                block_encoder.decode_vu32_from_slice(blob, &mut cursor)?
            } else {
                0
            };
            let weight = if has_section_weight {
                let bytes = blob.get(cursor..cursor + 2).ok_or(PostingError::Range {
                    offset: cursor,
                    total_size: blob.len(),
                })?;
                cursor += 2;
                u16::from_le_bytes([bytes[0], bytes[1]])
            } else {
                0
            };
            sections.push(SectionInfo {
                len,
                field_id,
                weight,
            });
        }

        Ok(Self { sections })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SectionInfo> {
        self.sections.get(index)
    }
}

#[derive(Default)]
pub struct SectionMetaWriter {
    sections: Vec<SectionInfo>,
}

impl SectionMetaWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_section(&mut self, len: SectionLen, field_id: FieldId, weight: SectionWeight) {
        self.sections.push(SectionInfo {
            len,
            field_id,
            weight,
        });
    }

    pub fn write<W: Write>(
        &self,
        writer: &mut W,
        has_field_id: bool,
        has_section_weight: bool,
    ) -> io::Result<usize> {
        let block_encoder = BlockEncoder;
        let mut written = block_encoder.encode_vu32(self.sections.len() as u32, writer)?;
        for section in &self.sections {
            written += block_encoder.encode_vu32(section.len, writer)?;
            if has_field_id {
                written += block_encoder.encode_vu32(section.field_id, writer)?;
            }
            if has_section_weight {
                written += block_encoder.encode_u16(&[section.weight], writer)?;
            }
        }
        Ok(written)
    }

    pub fn to_bytes(&self, has_field_id: bool, has_section_weight: bool) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf, has_field_id, has_section_weight)?;
        Ok(buf)
    }
}

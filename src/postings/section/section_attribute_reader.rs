use std::collections::HashMap;

use crate::{DocId, PostingError, Result};

/// Per-document section layout channel, shared read-only by every iterator
/// of a query.
pub trait SectionAttributeReader: Send + Sync {
    /// Replaces the contents of `buf` with the packed section blob of
    /// `docid` and returns its length.
    fn read(&self, docid: DocId, buf: &mut Vec<u8>) -> Result<usize>;

    fn has_field_id(&self) -> bool;

    fn has_section_weight(&self) -> bool;
}

#[derive(Default)]
pub struct InMemorySectionAttributeReader {
    has_field_id: bool,
    has_section_weight: bool,
    blobs: HashMap<DocId, Vec<u8>>,
}

impl InMemorySectionAttributeReader {
    pub fn new(has_field_id: bool, has_section_weight: bool) -> Self {
        Self {
            has_field_id,
            has_section_weight,
            blobs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, docid: DocId, blob: Vec<u8>) {
        self.blobs.insert(docid, blob);
    }
}

impl SectionAttributeReader for InMemorySectionAttributeReader {
    fn read(&self, docid: DocId, buf: &mut Vec<u8>) -> Result<usize> {
        let blob = self.blobs.get(&docid).ok_or_else(|| {
            PostingError::InvalidArgument(format!("no section attribute for doc {}", docid))
        })?;
        buf.clear();
        buf.extend_from_slice(blob);
        Ok(blob.len())
    }

    fn has_field_id(&self) -> bool {
        self.has_field_id
    }

    fn has_section_weight(&self) -> bool {
        self.has_section_weight
    }
}

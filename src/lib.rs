pub mod error;
pub mod index;
pub mod postings;
pub mod util;

pub use error::{PostingError, Result};

pub type DocId = i32;
pub type DocFreq = u32;
pub type TermFreq = u32;
pub type Pos = u32;
pub type FieldMap = u8;
pub type DocPayload = u16;
pub type PosPayload = u8;
pub type TermPayload = u16;

pub type FieldId = u32;
pub type SectionId = u32;
pub type SectionLen = u32;
pub type SectionWeight = u16;

pub const INVALID_DOCID: DocId = -1;
pub const END_DOCID: DocId = DocId::MAX;
pub const END_POSITION: Pos = Pos::MAX;

pub const DOC_LIST_BLOCK_LEN: usize = 128;
pub const POSITION_RECORD_LEN: usize = 128;
pub const SKIP_LIST_BLOCK_LEN: usize = 32;
pub const POSITION_BITMAP_BLOCK_LEN: usize = 128;

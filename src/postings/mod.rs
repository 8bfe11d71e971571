mod byte_slice_list;
mod byte_slice_reader;
pub mod compression;
mod doc_list_block;
mod doc_list_encoder;
pub mod in_doc;
mod match_data;
mod posting_format;
mod posting_writer;
pub mod positions;
pub mod section;
pub mod skip_list;
mod term_meta;
mod term_posting_info;

pub use byte_slice_list::{ByteSlice, ByteSliceList, ByteSliceWriter, SliceLoader};
pub use byte_slice_reader::ByteSliceReader;
pub use doc_list_block::DocListBlock;
pub use doc_list_encoder::DocListEncoder;
pub use match_data::MatchData;
pub use posting_format::{PostingFormat, PostingFormatBuilder};
pub use posting_writer::{TermPostingDump, TermPostingWriter};
pub use term_meta::TermMeta;
pub use term_posting_info::TermPostingInfo;

mod buffered_index_decoder;
mod buffered_posting_iterator;
mod buffered_segment_decoder;
mod doc_list_segment_decoder;
mod inline_segment_decoder;
mod segment_posting;

pub use buffered_index_decoder::BufferedIndexDecoder;
pub use buffered_posting_iterator::BufferedPostingIterator;
pub use buffered_segment_decoder::SegmentDocDecode;
pub use doc_list_segment_decoder::DocListSegmentDecoder;
pub use inline_segment_decoder::InlineSegmentDecoder;
pub use segment_posting::{DocListData, PositionListData, SegmentPosting};

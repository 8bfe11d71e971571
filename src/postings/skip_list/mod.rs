mod skip_list_block;
mod skip_list_format;
mod skip_list_reader;
mod skip_list_writer;

pub use skip_list_block::SkipListBlock;
pub use skip_list_format::{SkipListFormat, SkipListFormatBuilder};
pub use skip_list_reader::{SkipListReader, SkipListSeek};
pub use skip_list_writer::SkipListWriter;

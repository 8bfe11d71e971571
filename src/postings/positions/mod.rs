mod position_bitmap_reader;
mod position_bitmap_writer;
mod position_list_encoder;
mod position_list_segment_decoder;

pub use position_bitmap_reader::{PosCountInfo, PositionBitmapReader};
pub use position_bitmap_writer::PositionBitmapWriter;
pub use position_list_encoder::PositionListEncoder;
pub use position_list_segment_decoder::{PositionListSegmentDecoder, RecordLocation};

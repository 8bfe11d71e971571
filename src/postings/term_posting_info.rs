use std::io::{self, Write};

use crate::Result;

use super::{compression::BlockEncoder, ByteSliceReader};

/// Byte sizes of the skip list and list sections of a term's doc region and
/// position region, as stored in front of each region.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermPostingInfo {
    pub posting_skip_size: u32,
    pub posting_list_size: u32,
    pub position_skip_size: u32,
    pub position_list_size: u32,
}

impl TermPostingInfo {
    pub fn load_posting(&mut self, reader: &mut ByteSliceReader) -> Result<()> {
        self.posting_skip_size = reader.read_vu32()?;
        self.posting_list_size = reader.read_vu32()?;
        Ok(())
    }

    pub fn load_position(&mut self, reader: &mut ByteSliceReader) -> Result<()> {
        self.position_skip_size = reader.read_vu32()?;
        self.position_list_size = reader.read_vu32()?;
        Ok(())
    }

    pub fn store_posting<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let block_encoder = BlockEncoder;
        Ok(block_encoder.encode_vu32(self.posting_skip_size, writer)?
            + block_encoder.encode_vu32(self.posting_list_size, writer)?)
    }

    pub fn store_position<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let block_encoder = BlockEncoder;
        Ok(block_encoder.encode_vu32(self.position_skip_size, writer)?
            + block_encoder.encode_vu32(self.position_list_size, writer)?)
    }
}

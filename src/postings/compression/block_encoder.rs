use std::io::{self, Write};

use crate::{postings::ByteSliceReader, PostingError, Result};

/// Variable-length integer codec: 7 data bits per byte, high bit set when more
/// bytes follow, least significant group first.
pub struct BlockEncoder;

impl BlockEncoder {
    pub fn encode_vu32<W: Write>(&self, value: u32, writer: &mut W) -> io::Result<usize> {
        self.encode_vu64(value as u64, writer)
    }

    pub fn encode_vu64<W: Write>(&self, value: u64, writer: &mut W) -> io::Result<usize> {
        let mut buf = [0u8; 10];
        let mut len = 0;
        let mut to_encode = value;
        loop {
            let next_byte = (to_encode & 0x7f) as u8;
            to_encode >>= 7;
            if to_encode == 0 {
                buf[len] = next_byte;
                len += 1;
                break;
            }
            buf[len] = next_byte | 0x80;
            len += 1;
        }
        writer.write_all(&buf[..len])?;
        Ok(len)
    }

    pub fn encode_u32<W: Write>(&self, input: &[u32], writer: &mut W) -> io::Result<usize> {
        let mut bytes_written = 0;
        for &v in input {
            bytes_written += self.encode_vu32(v, writer)?;
        }
        Ok(bytes_written)
    }

    pub fn encode_u16<W: Write>(&self, input: &[u16], writer: &mut W) -> io::Result<usize> {
        for &v in input {
            writer.write_all(&v.to_le_bytes())?;
        }
        Ok(input.len() * 2)
    }

    pub fn encode_u8<W: Write>(&self, input: &[u8], writer: &mut W) -> io::Result<usize> {
        writer.write_all(input)?;
        Ok(input.len())
    }

    pub fn decode_u32(&self, reader: &mut ByteSliceReader, output_arr: &mut [u32]) -> Result<()> {
        for output_mut in output_arr.iter_mut() {
            *output_mut = reader.read_vu32()?;
        }
        Ok(())
    }

    pub fn decode_u16(&self, reader: &mut ByteSliceReader, output_arr: &mut [u16]) -> Result<()> {
        for output_mut in output_arr.iter_mut() {
            *output_mut = reader.read_u16()?;
        }
        Ok(())
    }

    pub fn decode_u8(&self, reader: &mut ByteSliceReader, output_arr: &mut [u8]) -> Result<()> {
        reader.read_exact_bytes(output_arr)
    }

    /// Decodes one varint from an in-memory buffer, advancing `cursor`.
    pub fn decode_vu32_from_slice(&self, data: &[u8], cursor: &mut usize) -> Result<u32> {
        let mut result = 0u32;
        let mut shift = 0u32;
        loop {
            let Some(&cur_byte) = data.get(*cursor) else {
                return Err(PostingError::Range {
                    offset: *cursor,
                    total_size: data.len(),
                });
            };
            *cursor += 1;
            if shift > 28 {
                return Err(PostingError::Corruption(format!(
                    "varint longer than 5 bytes at {}",
                    *cursor - 1
                )));
            }
            result |= ((cur_byte & 0x7f) as u32) << shift;
            if cur_byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }
}

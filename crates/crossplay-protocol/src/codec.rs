use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("VarInt too big")]
    VarIntTooBig,
    #[error("Not enough data")]
    NotEnoughData,
    #[error("Invalid palette: {0}")]
    InvalidPalette(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Read a VarInt from the buffer.
pub fn read_varint(buf: &mut BytesMut) -> CodecResult<i32> {
    let mut result: i32 = 0;
    let mut shift: u32 = 0;
    loop {
        if !buf.has_remaining() {
            return Err(CodecError::NotEnoughData);
        }
        let byte = buf.get_u8();
        result |= ((byte & 0x7F) as i32) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 32 {
            return Err(CodecError::VarIntTooBig);
        }
    }
}

/// Write a VarInt to the buffer.
pub fn write_varint(buf: &mut BytesMut, mut value: i32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value = ((value as u32) >> 7) as i32;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

pub fn read_u8(buf: &mut BytesMut) -> CodecResult<u8> {
    if buf.remaining() < 1 {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.get_u8())
}

pub fn read_i16(buf: &mut BytesMut) -> CodecResult<i16> {
    if buf.remaining() < 2 {
        return Err(CodecError::NotEnoughData);
    }
    Ok(buf.get_i16())
}

/// Read a VarInt-prefixed array of longs.
pub fn read_long_array(buf: &mut BytesMut) -> CodecResult<Vec<i64>> {
    let len = read_varint(buf)?;
    if len < 0 || buf.remaining() < len as usize * 8 {
        return Err(CodecError::NotEnoughData);
    }
    let mut longs = Vec::with_capacity(len as usize);
    for _ in 0..len {
        longs.push(buf.get_i64());
    }
    Ok(longs)
}

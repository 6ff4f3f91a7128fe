//! Growable byte buffer with a typed little-endian cursor.

use super::{CodecError, CodecResult};
use kurbo::Point;
use uuid::Uuid;

/// Byte buffer that is written at its end and read from a separate cursor.
///
/// Reading past the written data is an error, never a short read.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl ByteBuffer {
    pub const INITIAL_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Wrap existing bytes for reading.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            read_pos: 0,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Read cursor offset.
    pub fn position(&self) -> usize {
        self.read_pos
    }

    /// Bytes left between the read cursor and the end of written data.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.read_pos
    }

    /// Fail if anything is left to read.
    pub fn ensure_consumed(&self) -> CodecResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Grow by doubling until `additional` more bytes fit.
    fn ensure(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        let capacity = self.data.capacity();
        if needed > capacity {
            let target = (capacity * 2).max(needed).max(Self::INITIAL_CAPACITY);
            self.data.reserve_exact(target - self.data.len());
        }
    }

    // --- Writing ---

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.ensure(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Narrow an in-memory `f64` to its `f32` wire form.
    pub fn write_f64_as_f32(&mut self, value: f64) {
        self.write_f32(value as f32);
    }

    /// 7 bits per byte, least significant group first, high bit continues.
    pub fn write_varint(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.write_u8((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.write_u8(value as u8);
    }

    /// Varint byte length followed by UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) -> CodecResult<()> {
        let len = u32::try_from(value.len()).map_err(|_| CodecError::CountOutOfRange {
            what: "string byte",
            count: value.len() as i64,
            max: u32::MAX as usize,
        })?;
        self.write_varint(len);
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    /// 16-byte identifier with the first three groups byte-reversed.
    pub fn write_id(&mut self, id: Uuid) {
        self.write_bytes(&id.to_bytes_le());
    }

    pub fn write_point(&mut self, point: Point) {
        self.write_f64_as_f32(point.x);
        self.write_f64_as_f32(point.y);
    }

    // --- Reading ---

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&[u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining,
            });
        }
        let start = self.read_pos;
        self.read_pos += len;
        Ok(&self.data[start..self.read_pos])
    }

    fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> CodecResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> CodecResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32_as_f64(&mut self) -> CodecResult<f64> {
        Ok(self.read_f32()? as f64)
    }

    pub fn read_varint(&mut self) -> CodecResult<u32> {
        let mut value = 0u32;
        for i in 0..5 {
            let byte = self.read_u8()?;
            // The fifth byte may only carry the top four bits.
            if i == 4 && byte > 0x0F {
                return Err(CodecError::VarintOverflow);
            }
            value |= u32::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::VarintOverflow)
    }

    pub fn read_string(&mut self) -> CodecResult<String> {
        let len = self.read_varint()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    pub fn read_id(&mut self) -> CodecResult<Uuid> {
        Ok(Uuid::from_bytes_le(self.read_array()?))
    }

    pub fn read_point(&mut self) -> CodecResult<Point> {
        let x = self.read_f32_as_f64()?;
        let y = self.read_f32_as_f64()?;
        Ok(Point::new(x, y))
    }

    /// Read an `i32` element count, rejecting negatives and anything above `max`.
    pub fn read_count(&mut self, what: &'static str, max: usize) -> CodecResult<usize> {
        let count = self.read_i32()?;
        match usize::try_from(count) {
            Ok(n) if n <= max => Ok(n),
            _ => Err(CodecError::CountOutOfRange {
                what,
                count: i64::from(count),
                max,
            }),
        }
    }
}

/// Write a collection length as an `i32` count, enforcing the same cap the reader does.
pub(crate) fn write_count(buf: &mut ByteBuffer, what: &'static str, count: usize, max: usize) -> CodecResult<()> {
    if count > max {
        return Err(CodecError::CountOutOfRange {
            what,
            count: count as i64,
            max,
        });
    }
    // max never exceeds i32::MAX for any cap in this crate.
    buf.write_i32(count as i32);
    Ok(())
}

//! Page blob: `[version i32][count i32][drawable × count]`.

use super::buffer::{ByteBuffer, write_count};
use super::drawable::{read_drawable, write_drawable};
use super::{CodecError, CodecResult, MAX_DRAWABLES_PER_PAGE, PAGE_FORMAT_VERSION};
use crate::shapes::Drawable;

/// Append a versioned drawable list to `buf`.
pub fn write_drawables(buf: &mut ByteBuffer, drawables: &[Drawable]) -> CodecResult<()> {
    buf.write_i32(PAGE_FORMAT_VERSION);
    write_count(buf, "drawable", drawables.len(), MAX_DRAWABLES_PER_PAGE)?;
    for d in drawables {
        write_drawable(buf, d)?;
    }
    Ok(())
}

/// Read a versioned drawable list. The version must match exactly.
pub fn read_drawables(buf: &mut ByteBuffer) -> CodecResult<Vec<Drawable>> {
    let version = buf.read_i32()?;
    if version != PAGE_FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: version,
            supported: PAGE_FORMAT_VERSION,
        });
    }
    let count = buf.read_count("drawable", MAX_DRAWABLES_PER_PAGE)?;
    let mut drawables = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        drawables.push(read_drawable(buf)?);
    }
    Ok(drawables)
}

pub fn encode_drawables(drawables: &[Drawable]) -> CodecResult<Vec<u8>> {
    let mut buf = ByteBuffer::new();
    write_drawables(&mut buf, drawables)?;
    Ok(buf.into_bytes())
}

/// Decode a standalone page blob. Bytes past the last drawable are an error.
pub fn decode_drawables(bytes: &[u8]) -> CodecResult<Vec<Drawable>> {
    let mut buf = ByteBuffer::from_bytes(bytes);
    let drawables = read_drawables(&mut buf)?;
    buf.ensure_consumed()?;
    Ok(drawables)
}

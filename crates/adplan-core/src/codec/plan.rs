//! Plan container.
//!
//! ```text
//! "ADPN" [version i32] [major u16][minor u16][patch u16] [name str] [pageCount i32]
//! per page: [name str] [blobLen i32] [page blob]
//! ```

use super::buffer::{ByteBuffer, write_count};
use super::page::{encode_drawables, decode_drawables};
use super::{CodecError, CodecResult, MAX_PAGES_PER_PLAN, PLAN_FORMAT_VERSION, PLAN_SIGNATURE};
use crate::plan::{AppVersion, Page, Plan};

pub fn encode_plan(plan: &Plan) -> CodecResult<Vec<u8>> {
    let mut buf = ByteBuffer::new();
    buf.write_bytes(&PLAN_SIGNATURE);
    buf.write_i32(PLAN_FORMAT_VERSION);
    buf.write_u16(plan.app_version.major);
    buf.write_u16(plan.app_version.minor);
    buf.write_u16(plan.app_version.patch);
    buf.write_string(&plan.name)?;
    write_count(&mut buf, "page", plan.pages.len(), MAX_PAGES_PER_PLAN)?;
    for page in &plan.pages {
        buf.write_string(&page.name)?;
        let blob = encode_drawables(&page.drawables)?;
        write_count(&mut buf, "page byte", blob.len(), i32::MAX as usize)?;
        buf.write_bytes(&blob);
    }
    Ok(buf.into_bytes())
}

/// Decode a plan. Any malformed page fails the whole plan.
pub fn decode_plan(bytes: &[u8]) -> CodecResult<Plan> {
    let mut buf = ByteBuffer::from_bytes(bytes);
    match buf.read_bytes(PLAN_SIGNATURE.len()) {
        Ok(sig) if sig == PLAN_SIGNATURE => {}
        _ => return Err(CodecError::InvalidSignature),
    }

    let format_version = buf.read_i32()?;
    if !(1..=PLAN_FORMAT_VERSION).contains(&format_version) {
        return Err(CodecError::UnsupportedVersion {
            found: format_version,
            supported: PLAN_FORMAT_VERSION,
        });
    }
    let app_version = AppVersion::new(buf.read_u16()?, buf.read_u16()?, buf.read_u16()?);
    let name = buf.read_string()?;

    let page_count = buf.read_count("page", MAX_PAGES_PER_PLAN)?;
    let mut pages = Vec::with_capacity(page_count);
    for _ in 0..page_count {
        let page_name = buf.read_string()?;
        let declared = buf.read_i32()?;
        let remaining = buf.remaining();
        let len = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= remaining)
            .ok_or(CodecError::LengthOutOfBounds {
                declared: i64::from(declared),
                remaining,
            })?;
        let drawables = decode_drawables(buf.read_bytes(len)?)?;
        pages.push(Page::with_drawables(page_name, drawables));
    }

    Ok(Plan {
        name,
        format_version,
        app_version,
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{DrawableStyle, Image, Rectangle, Text};
    use kurbo::Point;

    fn sample_plan() -> Plan {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), Point::new(400.0, 300.0), DrawableStyle::default());
        rect.rotation = 90.0;
        let ground = Page::with_drawables(
            "Ground floor",
            vec![
                rect.into(),
                Text::new(Point::new(10.0, 10.0), "Living", 16.0, 0.0, DrawableStyle::default()).into(),
            ],
        );
        let first = Page::with_drawables(
            "First floor",
            vec![Image::new(1, "icons/stairs.png", Point::new(50.0, 50.0), 64.0, 64.0, DrawableStyle::default()).into()],
        );
        Plan::with_pages("Maison", vec![ground, first, Page::new("Attic")])
    }

    #[test]
    fn test_plan_round_trip() {
        let plan = sample_plan();
        let decoded = decode_plan(&encode_plan(&plan).unwrap()).unwrap();
        assert_eq!(decoded.name, "Maison");
        assert_eq!(decoded.app_version, plan.app_version);
        assert_eq!(decoded.pages.len(), 3);
        for (a, b) in plan.pages.iter().zip(&decoded.pages) {
            assert_eq!(a.name, b.name);
            let ids_a: Vec<_> = a.drawables.iter().map(|d| d.id()).collect();
            let ids_b: Vec<_> = b.drawables.iter().map(|d| d.id()).collect();
            assert_eq!(ids_a, ids_b);
        }
        assert!(decoded.pages[2].drawables.is_empty());
    }

    #[test]
    fn test_corrupt_signature_rejected() {
        let bytes = encode_plan(&sample_plan()).unwrap();
        for i in 0..4 {
            let mut corrupt = bytes.clone();
            corrupt[i] ^= 0xFF;
            assert_eq!(decode_plan(&corrupt), Err(CodecError::InvalidSignature));
        }
        assert_eq!(decode_plan(b"AD"), Err(CodecError::InvalidSignature));
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut bytes = encode_plan(&sample_plan()).unwrap();
        bytes[4..8].copy_from_slice(&(PLAN_FORMAT_VERSION + 1).to_le_bytes());
        assert!(matches!(decode_plan(&bytes), Err(CodecError::UnsupportedVersion { .. })));
    }

    #[test]
    fn test_page_length_beyond_data_rejected() {
        let plan = Plan::with_pages("P", vec![Page::new("Only")]);
        let mut bytes = encode_plan(&plan).unwrap();
        // The blob length sits just before the final 8-byte empty page blob.
        let at = bytes.len() - 12;
        bytes[at..at + 4].copy_from_slice(&1000i32.to_le_bytes());
        assert!(matches!(decode_plan(&bytes), Err(CodecError::LengthOutOfBounds { .. })));
    }

    #[test]
    fn test_bad_page_fails_whole_plan() {
        let plan = Plan::with_pages("P", vec![Page::new("Only")]);
        let mut bytes = encode_plan(&plan).unwrap();
        let at = bytes.len() - 8;
        bytes[at..at + 4].copy_from_slice(&7i32.to_le_bytes());
        assert!(matches!(decode_plan(&bytes), Err(CodecError::UnsupportedVersion { found: 7, .. })));
    }
}

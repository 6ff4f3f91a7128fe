//! Binary encoding of drawables, pages, plans and network payloads.
//!
//! All multi-byte values are little-endian. Coordinates are narrowed to `f32`
//! on the wire, so decoded geometry matches the original to `f32` precision.

mod buffer;
mod drawable;
mod page;
mod payload;
mod plan;

pub use buffer::ByteBuffer;
pub use drawable::{read_drawable, write_drawable};
pub use page::{decode_drawables, encode_drawables, read_drawables, write_drawables};
pub use payload::{NetworkPayload, PayloadAction};
pub use plan::{decode_plan, encode_plan};

use crate::plan::Plan;
use crate::shapes::Drawable;
use thiserror::Error;

/// Page blob format version. Readers require an exact match.
pub const PAGE_FORMAT_VERSION: i32 = 1;
/// Plan container format version. Readers accept this version and older.
pub const PLAN_FORMAT_VERSION: i32 = 1;
/// Leading bytes of every plan file.
pub const PLAN_SIGNATURE: [u8; 4] = *b"ADPN";

pub const MAX_DRAWABLES_PER_PAGE: usize = 10_000;
pub const MAX_POINTS_PER_DRAWABLE: usize = 50_000;
pub const MAX_PAGES_PER_PLAN: usize = 1_000;
pub const MAX_DELETE_IDS: usize = 10_000;

/// Codec errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("Invalid plan signature")]
    InvalidSignature,
    #[error("Unsupported format version {found} (supported: {supported})")]
    UnsupportedVersion { found: i32, supported: i32 },
    #[error("{what} count {count} out of range (max {max})")]
    CountOutOfRange {
        what: &'static str,
        count: i64,
        max: usize,
    },
    #[error("Declared length {declared} exceeds remaining {remaining} bytes")]
    LengthOutOfBounds { declared: i64, remaining: usize },
    #[error("Unknown drawable type tag {0}")]
    UnknownDrawableType(u8),
    #[error("Unknown payload action tag {0}")]
    UnknownAction(u8),
    #[error("Malformed variable-length integer")]
    VarintOverflow,
    #[error("String is not valid UTF-8")]
    InvalidUtf8,
    #[error("{0} unexpected bytes after the end of the data")]
    TrailingBytes(usize),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Stateful facade over the codec functions.
///
/// Failures are reported through sentinels (empty list, `None`) and the most
/// recent error message is kept for display. A success clears it.
#[derive(Debug, Default)]
pub struct Serializer {
    last_error: Option<String>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message of the last failed operation, if the last operation failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record<T>(&mut self, context: &str, result: CodecResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(e) => {
                log::warn!("{context} failed: {e}");
                self.last_error = Some(format!("{context}: {e}"));
                None
            }
        }
    }

    pub fn serialize_drawables(&mut self, drawables: &[Drawable]) -> Option<Vec<u8>> {
        self.record("Serializing drawables", encode_drawables(drawables))
    }

    /// Decode a page blob, returning an empty list on failure.
    pub fn deserialize_drawables(&mut self, bytes: &[u8]) -> Vec<Drawable> {
        self.record("Deserializing drawables", decode_drawables(bytes))
            .unwrap_or_default()
    }

    pub fn serialize_plan(&mut self, plan: &Plan) -> Option<Vec<u8>> {
        self.record("Serializing plan", encode_plan(plan))
    }

    pub fn deserialize_plan(&mut self, bytes: &[u8]) -> Option<Plan> {
        self.record("Deserializing plan", decode_plan(bytes))
    }

    pub fn serialize_payload(&mut self, payload: &NetworkPayload) -> Option<Vec<u8>> {
        self.record("Serializing payload", payload.encode())
    }

    pub fn deserialize_payload(&mut self, bytes: &[u8]) -> Option<NetworkPayload> {
        self.record("Deserializing payload", NetworkPayload::decode(bytes))
    }
}

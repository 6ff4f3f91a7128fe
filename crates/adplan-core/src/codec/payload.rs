//! Network payloads: one page mutation per message.
//!
//! `[pageIndex i32][action u8][dataLen i32][data]`

use super::buffer::{ByteBuffer, write_count};
use super::page::{decode_drawables, encode_drawables};
use super::{CodecError, CodecResult, MAX_DELETE_IDS};
use crate::shapes::{Drawable, DrawableId};

/// What a payload does to its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadAction {
    AddObjects = 0,
    DeleteObjects = 1,
    UpdateObjects = 2,
    ClearPage = 3,
    ReplacePage = 4,
}

impl PayloadAction {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::AddObjects),
            1 => Some(Self::DeleteObjects),
            2 => Some(Self::UpdateObjects),
            3 => Some(Self::ClearPage),
            4 => Some(Self::ReplacePage),
            _ => None,
        }
    }
}

/// A single page mutation exchanged between peers.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkPayload {
    pub page_index: i32,
    pub action: PayloadAction,
    /// Page blob for add/update/replace, id list for delete, empty for clear.
    pub data: Vec<u8>,
}

impl NetworkPayload {
    pub fn add_objects(page_index: i32, drawables: &[Drawable]) -> CodecResult<Self> {
        Self::with_drawables(page_index, PayloadAction::AddObjects, drawables)
    }

    pub fn update_objects(page_index: i32, drawables: &[Drawable]) -> CodecResult<Self> {
        Self::with_drawables(page_index, PayloadAction::UpdateObjects, drawables)
    }

    pub fn replace_page(page_index: i32, drawables: &[Drawable]) -> CodecResult<Self> {
        Self::with_drawables(page_index, PayloadAction::ReplacePage, drawables)
    }

    pub fn delete_objects(page_index: i32, ids: &[DrawableId]) -> CodecResult<Self> {
        let mut buf = ByteBuffer::with_capacity(4 + ids.len() * 16);
        write_count(&mut buf, "deleted id", ids.len(), MAX_DELETE_IDS)?;
        for id in ids {
            buf.write_id(*id);
        }
        Ok(Self {
            page_index,
            action: PayloadAction::DeleteObjects,
            data: buf.into_bytes(),
        })
    }

    pub fn clear_page(page_index: i32) -> Self {
        Self {
            page_index,
            action: PayloadAction::ClearPage,
            data: Vec::new(),
        }
    }

    fn with_drawables(page_index: i32, action: PayloadAction, drawables: &[Drawable]) -> CodecResult<Self> {
        Ok(Self {
            page_index,
            action,
            data: encode_drawables(drawables)?,
        })
    }

    /// Drawables carried by an add, update or replace payload.
    pub fn drawables(&self) -> CodecResult<Vec<Drawable>> {
        decode_drawables(&self.data)
    }

    /// Ids carried by a delete payload.
    pub fn deleted_ids(&self) -> CodecResult<Vec<DrawableId>> {
        let mut buf = ByteBuffer::from_bytes(self.data.as_slice());
        let count = buf.read_count("deleted id", MAX_DELETE_IDS)?;
        let mut ids = Vec::with_capacity(count.min(buf.remaining() / 16));
        for _ in 0..count {
            ids.push(buf.read_id()?);
        }
        buf.ensure_consumed()?;
        Ok(ids)
    }

    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut buf = ByteBuffer::with_capacity(9 + self.data.len());
        buf.write_i32(self.page_index);
        buf.write_u8(self.action as u8);
        write_count(&mut buf, "payload byte", self.data.len(), i32::MAX as usize)?;
        buf.write_bytes(&self.data);
        Ok(buf.into_bytes())
    }

    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let mut buf = ByteBuffer::from_bytes(bytes);
        let page_index = buf.read_i32()?;
        let tag = buf.read_u8()?;
        let action = PayloadAction::from_u8(tag).ok_or(CodecError::UnknownAction(tag))?;
        let declared = buf.read_i32()?;
        let remaining = buf.remaining();
        let len = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= remaining)
            .ok_or(CodecError::LengthOutOfBounds {
                declared: i64::from(declared),
                remaining,
            })?;
        let data = buf.read_bytes(len)?.to_vec();
        buf.ensure_consumed()?;
        Ok(Self {
            page_index,
            action,
            data,
        })
    }
}

//! AdPlan Core Library
//!
//! Drawable model, binary plan codec and page synchronization for
//! collaboratively edited multi-page plans.

pub mod codec;
pub mod collaboration;
pub mod config;
pub mod geometry;
pub mod history;
pub mod plan;
pub mod shapes;
pub mod storage;
pub mod store;
pub mod sync;
pub mod tools;

pub use codec::{CodecError, NetworkPayload, PayloadAction, Serializer};
pub use collaboration::{CollaborationEvent, CollaborationManager};
pub use config::{ConfigError, CoreConfig, SyncConfig};
pub use history::{UndoManager, UndoSnapshot};
pub use plan::{AppVersion, Page, Plan};
pub use shapes::{Drawable, DrawableId, DrawableStyle, DrawableType, Rgba};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{PageStore, StoreError};
pub use sync::{ConnectionState, NativeWebSocket, SyncError, SyncEvent, SyncTransport};
pub use tools::{ToolKind, ToolManager};

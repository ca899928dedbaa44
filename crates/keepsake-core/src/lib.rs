//! Core contracts for Keepsake: formats, codecs, storage descriptors, lifecycle events.
//! Nothing in this crate touches the filesystem; see `keepsake-storage` for that.

pub mod codec;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod format;
pub mod path;
pub mod save_info;

pub use codec::Codec;
pub use descriptor::StorageDescriptor;
pub use error::StoreError;
pub use events::{Hooks, Operation, StoreEvent};
pub use format::SerializationFormat;
pub use path::PathResolver;
pub use save_info::SaveInfo;

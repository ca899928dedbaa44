//! Filesystem-backed record persistence with optional encryption at rest.
//! Uses deterministic AES-256-GCM keyed by a SHA-256 digest of a caller secret.

pub mod cipher;
pub mod file_utils;
pub mod record_store;
pub mod resolver;

pub use cipher::{Cipher, CipherError};
pub use record_store::RecordStore;
pub use resolver::{DataDirResolver, DirectoryResolver};

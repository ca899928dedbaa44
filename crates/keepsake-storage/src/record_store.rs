use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use keepsake_core::{
    Codec, Hooks, Operation, PathResolver, SerializationFormat, StorageDescriptor, StoreError,
    StoreEvent,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{cipher::Cipher, file_utils};

/// Owns one in-memory record and persists it to a single file.
///
/// `save`, `load` and `delete` each fire a `Before` event ahead of any I/O and
/// exactly one `After` event carrying the outcome. Failures are returned as
/// `Err` and never leave a half-written value in memory. Calls must not
/// overlap; the store has no internal locking.
pub struct RecordStore<T, R> {
    descriptor: StorageDescriptor,
    codec: Codec,
    cipher: Option<Cipher>,
    resolver: R,
    data: T,
    hooks: Hooks,
}

/// What an encrypted record looks like on disk: one opaque string written
/// with the configured format.
#[derive(Debug, Serialize, Deserialize)]
struct SealedPayload {
    ciphertext: String,
}

impl<T, R> RecordStore<T, R>
where
    T: Serialize + DeserializeOwned + Default,
    R: PathResolver,
{
    pub fn new(descriptor: StorageDescriptor, resolver: R, data: T) -> Self {
        let cipher = descriptor.secret().map(Cipher::new);
        Self {
            codec: descriptor.codec(),
            descriptor,
            cipher,
            resolver,
            data,
            hooks: Hooks::new(),
        }
    }

    /// Store holding `T::default()` until the first successful load.
    pub fn with_default(descriptor: StorageDescriptor, resolver: R) -> Self {
        Self::new(descriptor, resolver, T::default())
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Mutate the held value in place; changes reach disk on the next `save`.
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn set_data(&mut self, data: T) {
        self.data = data;
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn descriptor(&self) -> &StorageDescriptor {
        &self.descriptor
    }

    pub fn format(&self) -> SerializationFormat {
        self.codec.format()
    }

    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_some()
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    /// Observe every lifecycle event of this store.
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + Send + 'static) {
        self.hooks.subscribe(observer);
    }

    pub fn on_before(&mut self, operation: Operation, observer: impl FnMut() + Send + 'static) {
        self.hooks.on_before(operation, observer);
    }

    pub fn on_after(
        &mut self,
        operation: Operation,
        observer: impl FnMut(bool) + Send + 'static,
    ) {
        self.hooks.on_after(operation, observer);
    }

    /// File name including extension.
    pub fn file_name(&self) -> String {
        self.descriptor.file_name()
    }

    /// Full path of the backing file, resolved afresh on every call.
    pub fn path(&self) -> Result<PathBuf, StoreError> {
        self.resolver.resolve(&self.descriptor.file_name())
    }

    /// Whether the backing file currently exists. A name the resolver
    /// rejects is an error, not a missing file.
    pub fn exists(&self) -> Result<bool, StoreError> {
        Ok(file_utils::file_exists(self.path()?))
    }

    /// Size of the backing file in bytes.
    pub fn file_size(&self) -> Result<u64, StoreError> {
        let path = self.path()?;
        file_utils::file_size(&path).map_err(|err| io_err(&path, err))
    }

    /// Serialize the held value and overwrite the backing file with it.
    #[instrument(skip_all, fields(file = %self.descriptor.file_name()))]
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.hooks.emit(&StoreEvent::Before(Operation::Save));
        let result = self.try_save();
        self.finish(Operation::Save, result)
    }

    /// Replace the held value with the file's contents.
    ///
    /// A missing file is reported as `Err(MissingFile)`; the `After` event
    /// still fires and the held value is left untouched, as for any other
    /// failure.
    #[instrument(skip_all, fields(file = %self.descriptor.file_name()))]
    pub fn load(&mut self) -> Result<(), StoreError> {
        self.hooks.emit(&StoreEvent::Before(Operation::Load));
        let result = self.try_load().map(|value| {
            self.data = value;
        });
        self.finish(Operation::Load, result)
    }

    /// Remove the backing file and reset the held value to its default.
    ///
    /// The reset happens even when the file was already absent, in which case
    /// `Err(MissingFile)` is returned.
    #[instrument(skip_all, fields(file = %self.descriptor.file_name()))]
    pub fn delete(&mut self) -> Result<(), StoreError> {
        self.hooks.emit(&StoreEvent::Before(Operation::Delete));
        let result = self.path().and_then(|path| remove_file(&path));
        self.data = T::default();
        self.finish(Operation::Delete, result)
    }

    fn try_save(&self) -> Result<(), StoreError> {
        let path = self.path()?;
        let bytes = self.encode_payload()?;
        write_file(&path, &bytes)?;
        debug!(?path, len = bytes.len(), "wrote record");
        Ok(())
    }

    fn try_load(&self) -> Result<T, StoreError> {
        let path = self.path()?;
        let bytes = read_file(&path)?;
        self.decode_payload(&bytes)
    }

    fn encode_payload(&self) -> Result<Vec<u8>, StoreError> {
        match &self.cipher {
            None => self.codec.encode_checked(&self.data),
            Some(cipher) => {
                let text = serde_json::to_string(&self.data)
                    .map_err(|e| StoreError::serialization(SerializationFormat::Json, e))?;
                let ciphertext = cipher.encrypt(&text)?;
                self.codec.encode(&SealedPayload { ciphertext })
            }
        }
    }

    fn decode_payload(&self, bytes: &[u8]) -> Result<T, StoreError> {
        match &self.cipher {
            None => self.codec.decode(bytes),
            Some(cipher) => {
                let sealed: SealedPayload = self.codec.decode(bytes)?;
                let text = cipher.decrypt(&sealed.ciphertext)?;
                serde_json::from_str(&text)
                    .map_err(|e| StoreError::serialization(SerializationFormat::Json, e))
            }
        }
    }

    fn finish(
        &mut self,
        operation: Operation,
        result: Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        match &result {
            Ok(()) => debug!(%operation, "record operation succeeded"),
            Err(err) if err.is_missing_file() => warn!(%operation, "{err}"),
            Err(err) => warn!(%operation, error = %err, "record operation failed"),
        }
        self.hooks.emit(&StoreEvent::After {
            operation,
            success: result.is_ok(),
        });
        result
    }
}

impl<T: std::fmt::Debug, R: std::fmt::Debug> std::fmt::Debug for RecordStore<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("descriptor", &self.descriptor)
            .field("resolver", &self.resolver)
            .field("data", &self.data)
            .field("hooks", &self.hooks)
            .finish()
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_err(parent, err))?;
    }
    let mut file = File::create(path).map_err(|err| io_err(path, err))?;
    file.write_all(bytes).map_err(|err| io_err(path, err))?;
    file.flush().map_err(|err| io_err(path, err))
}

fn read_file(path: &Path) -> Result<Vec<u8>, StoreError> {
    fs::read(path).map_err(|err| io_err(path, err))
}

fn remove_file(path: &Path) -> Result<(), StoreError> {
    fs::remove_file(path).map_err(|err| io_err(path, err))
}

fn io_err(path: &Path, err: io::Error) -> StoreError {
    if err.kind() == io::ErrorKind::NotFound {
        StoreError::MissingFile {
            path: path.to_string_lossy().to_string(),
        }
    } else {
        StoreError::storage(format!("{}: {err}", path.display()))
    }
}

use crate::{
    config::{Config, RecordConfig},
    records::SampleRecord,
};
use color_eyre::Result;
use keepsake_core::{PathResolver, SerializationFormat, StorageDescriptor};
use keepsake_storage::{DataDirResolver, DirectoryResolver, RecordStore};
use tracing::debug;

pub const APP_NAME: &str = "keepsake";
pub const SECRET_ENV: &str = "KEEPSAKE_SECRET";

/// Resolver type shared by every store the CLI opens.
pub type Resolver = Box<dyn PathResolver>;

/// Pick the resolver honoring the config override.
pub fn resolver_from_config(config: &Config) -> Resolver {
    match &config.data_dir {
        Some(root) => {
            debug!(?root, "using data dir override");
            Box::new(DirectoryResolver::new(root.clone()))
        }
        None => Box::new(DataDirResolver::new(APP_NAME)),
    }
}

/// Config secret first, then the environment.
pub fn resolve_secret(config: &Config, env_secret: Option<String>) -> Option<String> {
    config.secret.clone().or(env_secret)
}

/// Build the descriptor for a record. Unknown formats are rejected here,
/// before any store exists.
pub fn descriptor_for<T: SampleRecord>(
    section: Option<&RecordConfig>,
    secret: Option<String>,
) -> Result<StorageDescriptor> {
    let file_name = section
        .and_then(|s| s.file_name.clone())
        .unwrap_or_else(|| T::DEFAULT_FILE.to_string());
    let format = match section.and_then(|s| s.format.as_deref()) {
        Some(name) => name.parse::<SerializationFormat>()?,
        None => T::DEFAULT_FORMAT,
    };
    let secret = if T::ENCRYPTED { secret } else { None };
    Ok(StorageDescriptor::new(file_name, format, secret))
}

/// Open a store for `T` with lifecycle events traced at debug level.
pub fn open_store<T, R>(descriptor: StorageDescriptor, resolver: R) -> RecordStore<T, R>
where
    T: SampleRecord,
    R: PathResolver + 'static,
{
    let mut store = RecordStore::with_default(descriptor, resolver);
    store.subscribe(|event| debug!(record = T::NAME, ?event, "lifecycle event"));
    store
}

/// Open the store for `T` as configured by the user.
pub fn store_from_config<T: SampleRecord>(
    config: &Config,
    section: Option<&RecordConfig>,
) -> Result<RecordStore<T, Resolver>> {
    let secret = resolve_secret(config, std::env::var(SECRET_ENV).ok());
    let descriptor = descriptor_for::<T>(section, secret)?;
    Ok(open_store(descriptor, resolver_from_config(config)))
}

#[cfg(test)]
mod tests {
    use keepsake_core::StoreError;

    use super::*;
    use crate::records::{IngameData, UserSettingsData};

    #[test]
    fn defaults_follow_record_kind() {
        let ingame = descriptor_for::<IngameData>(None, Some("salt".into())).expect("descriptor");
        assert_eq!(ingame.file_name(), "data.bin");
        assert!(ingame.is_encrypted());

        let settings =
            descriptor_for::<UserSettingsData>(None, Some("salt".into())).expect("descriptor");
        assert_eq!(settings.file_name(), "settings.xml");
        assert!(!settings.is_encrypted(), "settings are never encrypted");
    }

    #[test]
    fn section_overrides_name_and_format() {
        let section = RecordConfig {
            file_name: Some("scores".into()),
            format: Some("JSON".into()),
        };
        let desc = descriptor_for::<IngameData>(Some(&section), None).expect("descriptor");
        assert_eq!(desc.file_name(), "scores.json");
        assert!(!desc.is_encrypted());
    }

    #[test]
    fn unknown_format_is_rejected_up_front() {
        let section = RecordConfig {
            file_name: None,
            format: Some("yaml".into()),
        };
        let err = descriptor_for::<UserSettingsData>(Some(&section), None)
            .expect_err("yaml must be rejected");
        let store_err = err.downcast_ref::<StoreError>().expect("store error");
        assert!(matches!(store_err, StoreError::UnsupportedFormat { .. }));
    }

    #[test]
    fn config_secret_wins_over_env() {
        let cfg = Config {
            secret: Some("from-config".into()),
            ..Config::default()
        };
        assert_eq!(
            resolve_secret(&cfg, Some("from-env".into())).as_deref(),
            Some("from-config")
        );
        assert_eq!(
            resolve_secret(&Config::default(), Some("from-env".into())).as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn data_dir_override_is_used() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let store = store_from_config::<UserSettingsData>(&cfg, None).expect("store");
        assert_eq!(
            store.path().expect("path"),
            dir.path().join("settings.xml")
        );
    }
}

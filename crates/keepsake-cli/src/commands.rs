use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use color_eyre::{eyre::eyre, Result};
use keepsake_core::{Operation, PathResolver};
use keepsake_storage::{file_utils, RecordStore};
use tracing::debug;

use crate::records::SampleRecord;

/// Version information stamped into every saved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStamp {
    pub app_version: String,
    pub test_build: bool,
}

/// Load the record, apply `field=value` assignments, stamp it and save.
///
/// A missing file starts from defaults. An unreadable one aborts so a wrong
/// secret never clobbers existing data.
pub fn save<T, R>(
    store: &mut RecordStore<T, R>,
    assignments: &[String],
    stamp: &BuildStamp,
    out: &mut dyn Write,
) -> Result<()>
where
    T: SampleRecord,
    R: PathResolver,
{
    match store.load() {
        Ok(()) => {}
        Err(err) if err.is_missing_file() => {}
        Err(err) => return Err(eyre!("refusing to overwrite {}: {err}", T::NAME)),
    }

    for assignment in assignments {
        let (field, value) = assignment
            .split_once('=')
            .ok_or_else(|| eyre!("expected FIELD=VALUE, got {assignment:?}"))?;
        store
            .data_mut()
            .assign(field.trim(), value.trim())
            .map_err(|e| eyre!(e.to_string()))?;
    }

    store
        .data_mut()
        .save_info_mut()
        .stamp(stamp.app_version.clone(), stamp.test_build);
    store.save()?;

    writeln!(out, "Saved {} to {}", T::NAME, store.path()?.display())?;
    print_fields(store.data(), out)
}

/// Load the record and print it. A missing file prints the defaults.
pub fn load<T, R>(store: &mut RecordStore<T, R>, out: &mut dyn Write) -> Result<()>
where
    T: SampleRecord,
    R: PathResolver,
{
    match store.load() {
        Ok(()) => writeln!(out, "Loaded {} from {}", T::NAME, store.path()?.display())?,
        Err(err) if err.is_missing_file() => {
            writeln!(out, "No saved {} yet; showing defaults.", T::NAME)?
        }
        Err(err) => return Err(err.into()),
    }
    print_fields(store.data(), out)
}

/// Delete the record file. Deleting an absent file is reported, not an error.
pub fn delete<T, R>(store: &mut RecordStore<T, R>, out: &mut dyn Write) -> Result<()>
where
    T: SampleRecord,
    R: PathResolver,
{
    match store.delete() {
        Ok(()) => writeln!(out, "Deleted {}", store.path()?.display())?,
        Err(err) if err.is_missing_file() => {
            writeln!(out, "Nothing to delete for {}", T::NAME)?
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Describe where and how the record is stored.
pub fn info<T, R>(store: &RecordStore<T, R>, out: &mut dyn Write) -> Result<()>
where
    T: SampleRecord,
    R: PathResolver,
{
    let path = store.path()?;
    writeln!(out, "record:    {}", T::NAME)?;
    writeln!(out, "path:      {}", path.display())?;
    writeln!(
        out,
        "name:      {}",
        file_utils::file_stem(&path).unwrap_or_default()
    )?;
    writeln!(out, "format:    {}", store.format())?;
    writeln!(out, "encrypted: {}", store.is_encrypted())?;
    if store.exists()? {
        writeln!(out, "size:      {}", file_utils::human_file_size(&path)?)?;
    } else {
        writeln!(out, "size:      (not saved yet)")?;
    }
    Ok(())
}

/// Create both records with defaults, save them, then load them back.
pub fn demo<A, B, R>(
    ingame: &mut RecordStore<A, R>,
    settings: &mut RecordStore<B, R>,
    stamp: &BuildStamp,
    out: &mut dyn Write,
) -> Result<()>
where
    A: SampleRecord,
    B: SampleRecord,
    R: PathResolver + 'static,
{
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    track_outcomes(ingame, &outcomes);
    track_outcomes(settings, &outcomes);

    ingame.set_data(A::default());
    settings.set_data(B::default());
    ingame
        .data_mut()
        .save_info_mut()
        .stamp(stamp.app_version.clone(), stamp.test_build);
    settings
        .data_mut()
        .save_info_mut()
        .stamp(stamp.app_version.clone(), stamp.test_build);

    ingame.save()?;
    settings.save()?;
    ingame.load()?;
    settings.load()?;

    let outcomes = outcomes
        .lock()
        .map_err(|err| eyre!("outcome log poisoned: {err}"))?;
    for (record, operation, success) in outcomes.iter() {
        let status = if *success { "ok" } else { "failed" };
        writeln!(out, "{operation:<6} {record:<8} {status}")?;
    }
    debug!(operations = outcomes.len(), "demo finished");
    Ok(())
}

fn track_outcomes<T, R>(
    store: &mut RecordStore<T, R>,
    outcomes: &Arc<Mutex<Vec<(&'static str, Operation, bool)>>>,
) where
    T: SampleRecord,
    R: PathResolver + 'static,
{
    for operation in [Operation::Save, Operation::Load, Operation::Delete] {
        let outcomes = Arc::clone(outcomes);
        store.on_after(operation, move |success| {
            if let Ok(mut log) = outcomes.lock() {
                log.push((T::NAME, operation, success));
            }
        });
    }
}

fn print_fields<T: SampleRecord>(data: &T, out: &mut dyn Write) -> Result<()> {
    for (name, value) in data.fields() {
        writeln!(out, "  {name} = {value}")?;
    }
    let info = data.save_info();
    writeln!(
        out,
        "  (saved {} time(s) by {}{}, last at {})",
        info.save_counter,
        info.app_version,
        if info.test_build { " [test build]" } else { "" },
        info.last_save.to_rfc3339()
    )?;
    Ok(())
}

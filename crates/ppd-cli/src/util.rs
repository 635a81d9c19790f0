use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use ppd_core::{schema::ProfileSchema, thresholds::Thresholds};
use serde::{Serialize, de::DeserializeOwned};

/// Report destination: stdout, or a file when `--output` is given.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `path`, or to stdout when `path` is `None`.
    pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let mut output = match path {
            Some(path) => Output::create(path)?,
            None => Output::Stdout(io::stdout().lock()),
        };
        output
            .write_json(value)
            .with_context(|| format!("Failed to write JSON to {}", output.describe()))?;
        tracing::info!(output = %output.describe(), "report written");
        Ok(())
    }

    fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    fn describe(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let writer: &mut dyn io::Write = match self {
            Output::Stdout(writer) => writer,
            Output::File { writer, .. } => writer,
        };
        serde_json::to_writer_pretty(&mut *writer, value)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Reads and parses a JSON file; `file_kind` names the file in error messages.
pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {file_kind} file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Read a profile schema from a JSON file
///
/// The schema is validated while it is deserialized.
pub fn read_schema_file<P>(path: P) -> anyhow::Result<ProfileSchema>
where
    P: AsRef<Path>,
{
    read_json_file("schema", path)
}

/// Read the thresholds from a JSON file, or use the defaults when no path is given
///
/// # Errors
///
/// Returns error if the file cannot be read or the thresholds are incoherent
pub fn load_thresholds(path: Option<&Path>) -> anyhow::Result<Thresholds> {
    let thresholds = match path {
        Some(path) => read_json_file::<Thresholds, _>("thresholds", path)?,
        None => Thresholds::default(),
    };
    thresholds.validate()?;
    tracing::debug!(version = %thresholds.version, "thresholds loaded");
    Ok(thresholds)
}

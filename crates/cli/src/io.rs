//! JSON input and output

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::spinner;

/// Read a JSON document, or an empty default when no path is given
pub fn read_optional<T: DeserializeOwned + Default>(path: Option<&Path>, what: &str) -> Result<T> {
    match path {
        Some(path) => read_json(path, what),
        None => Ok(T::default()),
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let pb = spinner(&format!("Reading {what}..."));
    let file = File::open(path).with_context(|| format!("Failed to open {what}: {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {what}: {}", path.display()))?;
    pb.finish_and_clear();
    Ok(value)
}

/// Write pretty JSON to a file, or to stdout when no path is given
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let pb = spinner("Writing output...");
            let file =
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value).context("Failed to write output")?;
            writer.flush().context("Failed to write output")?;
            pb.finish_and_clear();
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value).context("Failed to write output")?;
            writeln!(lock).context("Failed to write output")?;
        }
    }
    Ok(())
}

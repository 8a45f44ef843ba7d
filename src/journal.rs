//! CSV record streams written at every generation boundary.
//!
//! Writing is best-effort: a failed write is logged and skipped, it never
//! stops evolution.

use crate::config::LoggingConfig;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header shared by both streams
pub const CSV_HEADER: &str = "generation,fitness,distanceFromTarget";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One creature at one generation boundary
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogRow {
    pub generation: u64,
    pub fitness: f32,
    pub distance: f32,
}

impl LogRow {
    pub fn to_csv_row(&self) -> String {
        format!("{},{},{}", self.generation, self.fitness, self.distance)
    }
}

/// One append-only CSV file
pub struct RecordStream {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RecordStream {
    /// Create (truncate) the file and write the header
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| LogError::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", CSV_HEADER).map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        Ok(Self { path, writer })
    }

    /// Open the file for appending, writing the header only if it is empty
    pub fn open_append<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| LogError::Io {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        let empty = file.metadata().map_err(io_err)?.len() == 0;
        let mut writer = BufWriter::new(file);
        if empty {
            writeln!(writer, "{}", CSV_HEADER).map_err(io_err)?;
            writer.flush().map_err(io_err)?;
        }

        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows and flush
    pub fn append(&mut self, rows: &[LogRow]) -> Result<(), LogError> {
        let path = &self.path;
        let io_err = |source| LogError::Io {
            path: path.clone(),
            source,
        };
        for row in rows {
            writeln!(self.writer, "{}", row.to_csv_row()).map_err(io_err)?;
        }
        self.writer.flush().map_err(io_err)
    }
}

/// Generation-level and fittest-only streams
#[derive(Default)]
pub struct Journal {
    generation: Option<RecordStream>,
    fittest: Option<RecordStream>,
}

impl Journal {
    /// Journal that writes nothing
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Start fresh streams inside `dir`; a stream that cannot be opened is skipped
    pub fn create<P: AsRef<Path>>(dir: P, generation_file: &str, fittest_file: &str) -> Self {
        Self::open(dir.as_ref(), generation_file, fittest_file, false)
    }

    /// Continue existing streams inside `dir`, keeping earlier rows
    pub fn resume<P: AsRef<Path>>(dir: P, generation_file: &str, fittest_file: &str) -> Self {
        Self::open(dir.as_ref(), generation_file, fittest_file, true)
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::create(&config.output_dir, &config.generation_log, &config.fittest_log)
    }

    pub fn resume_from_config(config: &LoggingConfig) -> Self {
        Self::resume(&config.output_dir, &config.generation_log, &config.fittest_log)
    }

    fn open(dir: &Path, generation_file: &str, fittest_file: &str, append: bool) -> Self {
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::warn!("Cannot create log directory {:?}: {}", dir, e);
        }
        Self {
            generation: open_stream(dir.join(generation_file), append),
            fittest: open_stream(dir.join(fittest_file), append),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.generation.is_some() || self.fittest.is_some()
    }

    /// One row per creature of the finished generation
    pub fn record_generation(&mut self, rows: &[LogRow]) {
        if let Some(stream) = self.generation.as_mut() {
            if let Err(e) = stream.append(rows) {
                log::warn!("Generation log skipped: {}", e);
            }
        }
    }

    /// One row for the fittest creature
    pub fn record_fittest(&mut self, row: &LogRow) {
        if let Some(stream) = self.fittest.as_mut() {
            if let Err(e) = stream.append(std::slice::from_ref(row)) {
                log::warn!("Fittest log skipped: {}", e);
            }
        }
    }
}

fn open_stream(path: PathBuf, append: bool) -> Option<RecordStream> {
    let opened = if append {
        RecordStream::open_append(&path)
    } else {
        RecordStream::create(&path)
    };
    match opened {
        Ok(stream) => {
            log::debug!("Record stream open: {:?}", stream.path());
            Some(stream)
        }
        Err(e) => {
            log::warn!("Record stream disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streams_have_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::create(dir.path(), "GenerationData.csv", "Fittest.csv");
        assert!(journal.is_enabled());

        journal.record_generation(&[
            LogRow { generation: 1, fitness: 2.5, distance: 10.0 },
            LogRow { generation: 1, fitness: 0.0, distance: 12.0 },
        ]);
        journal.record_fittest(&LogRow { generation: 1, fitness: 2.5, distance: 10.0 });

        let generation = std::fs::read_to_string(dir.path().join("GenerationData.csv")).unwrap();
        let fittest = std::fs::read_to_string(dir.path().join("Fittest.csv")).unwrap();

        assert_eq!(generation, "generation,fitness,distanceFromTarget\n1,2.5,10\n1,0,12\n");
        assert_eq!(fittest, "generation,fitness,distanceFromTarget\n1,2.5,10\n");
    }

    #[test]
    fn test_resume_keeps_earlier_rows() {
        let dir = tempfile::tempdir().unwrap();
        let row = |generation| LogRow { generation, fitness: 1.5, distance: 3.0 };

        let mut journal = Journal::create(dir.path(), "GenerationData.csv", "Fittest.csv");
        journal.record_fittest(&row(1));
        drop(journal);

        let mut journal = Journal::resume(dir.path(), "GenerationData.csv", "Fittest.csv");
        journal.record_fittest(&row(2));

        let fittest = std::fs::read_to_string(dir.path().join("Fittest.csv")).unwrap();
        assert_eq!(fittest, "generation,fitness,distanceFromTarget\n1,1.5,3\n2,1.5,3\n");
    }

    #[test]
    fn test_append_to_new_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.csv");

        let mut stream = RecordStream::open_append(&path).unwrap();
        assert_eq!(stream.path(), path.as_path());
        stream.append(&[LogRow { generation: 4, fitness: 0.0, distance: 2.0 }]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "generation,fitness,distanceFromTarget\n4,0,2\n");
    }

    #[test]
    fn test_unwritable_directory_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();

        let mut journal = Journal::create(&blocker, "a.csv", "b.csv");
        assert!(!journal.is_enabled());

        // Still callable
        journal.record_generation(&[LogRow { generation: 1, fitness: 1.0, distance: 1.0 }]);
        journal.record_fittest(&LogRow { generation: 1, fitness: 1.0, distance: 1.0 });
    }

    #[test]
    fn test_disabled_journal() {
        let mut journal = Journal::disabled();
        assert!(!journal.is_enabled());
        journal.record_fittest(&LogRow { generation: 3, fitness: 0.0, distance: 0.0 });
    }
}

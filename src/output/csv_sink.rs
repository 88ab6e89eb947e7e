//! CSV partitions on the local filesystem
//!
//! Every tracked language gets `<key>.csv` with the columns
//! `Game,Interface,Audio,Subtitles,URI`, and pages that could not be
//! inspected go to `inaccessible.csv` with `Link,Reason`. Partitions are
//! truncated and given a header when the sink is initialized; afterwards
//! rows are only ever appended.

use crate::catalog::Language;
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use crate::state::ScrapeOutcome;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the inaccessible-page partition
pub const INACCESSIBLE_FILE: &str = "inaccessible.csv";

const LANGUAGE_HEADER: [&str; 5] = ["Game", "Interface", "Audio", "Subtitles", "URI"];
const INACCESSIBLE_HEADER: [&str; 2] = ["Link", "Reason"];

/// Returns the partition path for a language inside `directory`
pub fn partition_path(directory: &Path, language: Language) -> PathBuf {
    directory.join(format!("{}.csv", language.key()))
}

/// One append-only CSV file guarded by its own lock
struct Partition {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
}

impl Partition {
    /// Creates or truncates the file and writes the header row
    fn create(path: PathBuf, header: &[&str]) -> OutputResult<Self> {
        let file = File::create(&path).map_err(|source| OutputError::NotWritable {
            path: path.display().to_string(),
            source,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(header)?;
        writer.flush()?;

        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    /// Appends one row and flushes it while the lock is held
    fn append<I, T>(&self, record: I) -> OutputResult<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut writer = self.writer.lock().map_err(|_| {
            OutputError::Write(format!("lock poisoned for {}", self.path.display()))
        })?;
        writer.write_record(record)?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        let mut writer = self.writer.lock().map_err(|_| {
            OutputError::Write(format!("lock poisoned for {}", self.path.display()))
        })?;
        writer.flush()?;
        Ok(())
    }
}

/// A [`ResultSink`] writing CSV partitions into one directory
pub struct CsvResultSink {
    directory: PathBuf,
    languages: BTreeMap<Language, Partition>,
    inaccessible: Partition,
}

impl CsvResultSink {
    /// Creates (or truncates) one partition per language plus the
    /// inaccessible partition, each holding only its header row
    ///
    /// The directory is created if it does not exist. Running this twice on
    /// the same directory leaves header-only partitions.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lingo_sweep::output::CsvResultSink;
    /// use lingo_sweep::Language;
    /// use std::path::Path;
    ///
    /// let languages = [Language::parse("swedish").unwrap()];
    /// let sink = CsvResultSink::initialize(&languages, Path::new("./out")).unwrap();
    /// ```
    pub fn initialize(languages: &[Language], directory: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(directory).map_err(|source| OutputError::NotWritable {
            path: directory.display().to_string(),
            source,
        })?;

        let mut partitions = BTreeMap::new();
        for &language in languages {
            let partition = Partition::create(partition_path(directory, language), &LANGUAGE_HEADER)?;
            partitions.insert(language, partition);
        }

        let inaccessible =
            Partition::create(directory.join(INACCESSIBLE_FILE), &INACCESSIBLE_HEADER)?;

        tracing::debug!(
            "Initialized {} language partitions in {}",
            partitions.len(),
            directory.display()
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            languages: partitions,
            inaccessible,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ResultSink for CsvResultSink {
    fn record(&self, outcome: &ScrapeOutcome, uri: &str) -> OutputResult<()> {
        match outcome {
            ScrapeOutcome::Accessible {
                name,
                support_by_language,
            } => {
                for (language, support) in support_by_language {
                    let Some(partition) = self.languages.get(language) else {
                        tracing::debug!("No partition for {}, skipping row for {}", language, uri);
                        continue;
                    };

                    partition.append([
                        name.as_str(),
                        bool_field(support.interface),
                        bool_field(support.audio),
                        bool_field(support.subtitles),
                        uri,
                    ])?;
                }
            }
            ScrapeOutcome::Inaccessible { uri, reason } => {
                self.inaccessible.append([uri.as_str(), reason.as_str()])?;
            }
        }

        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        for partition in self.languages.values() {
            partition.flush()?;
        }
        self.inaccessible.flush()
    }
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

//! Append-only write log.
//!
//! One log file per node, opt-in via the `--wal-dir` flag. Every accepted
//! write and delete is appended as a single JSON line and the whole file is
//! replayed into the shards before the node starts accepting traffic.
//!
//! Deletions are logged too: a log that only records writes would resurrect
//! deleted keys on restart.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::shards::ShardedStore;

/// One logged operation. Serialized as a JSON object per line, so keys and
/// values with any content except newlines survive a round trip (and
/// newlines are rejected at write time anyway).
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Record {
    Set { key: String, val: String },
    Del { key: String },
}

/// Handle to an open log file. Appends are serialized through a mutex and
/// flushed per record; the node trades write latency for not losing
/// acknowledged operations on a crash.
pub struct WriteLog {
    file: Mutex<File>,
}

impl WriteLog {
    /// Open (creating if absent) the log at `path` for appending.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("opening write log {}", path.display()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Replay an existing log into `store`, in file order. Returns the
    /// number of applied records. A missing file is an empty log; a corrupt
    /// line is skipped with a warning rather than failing startup.
    pub fn replay(path: &Path, store: &ShardedStore) -> Result<usize> {
        if !path.exists() {
            return Ok(0);
        }
        let file = File::open(path)
            .with_context(|| format!("reading write log {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut applied = 0;
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("reading write log {}", path.display()))?;
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Record>(&line) {
                Ok(Record::Set { key, val }) => {
                    store.put(&key, &val);
                    applied += 1;
                }
                Ok(Record::Del { key }) => {
                    store.del(&key);
                    applied += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping corrupt write log record at {}:{}: {}",
                        path.display(),
                        line_no + 1,
                        e
                    );
                }
            }
        }
        Ok(applied)
    }

    pub fn append_set(&self, key: &str, val: &str) -> Result<()> {
        self.append(&Record::Set {
            key: key.to_string(),
            val: val.to_string(),
        })
    }

    pub fn append_del(&self, key: &str) -> Result<()> {
        self.append(&Record::Del {
            key: key.to_string(),
        })
    }

    fn append(&self, record: &Record) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = self.file.lock().expect("write log mutex poisoned");
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

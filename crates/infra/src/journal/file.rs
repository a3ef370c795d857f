use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use super::r#trait::{Journal, JournalEntry, JournalError, JournalRecord};

/// JSON-lines journal on the local filesystem.
///
/// One record per line, each append is flushed with `sync_data` before it is
/// acknowledged. A trailing line without its newline is a write that never
/// completed: it is dropped (and truncated away) when the journal is opened.
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    state: Mutex<FileState>,
}

#[derive(Debug)]
struct FileState {
    file: File,
    len: u64,
    next_sequence: u64,
}

/// Result of scanning the journal file.
struct Scan {
    records: Vec<JournalRecord>,
    /// Byte length of the committed prefix.
    committed_len: u64,
}

fn scan(bytes: &[u8]) -> Result<Scan, JournalError> {
    let mut records = Vec::new();
    let mut committed_len = 0u64;
    let mut offset = 0usize;
    let mut line_no = 0usize;

    while offset < bytes.len() {
        line_no += 1;
        let rest = &bytes[offset..];
        let Some(end) = rest.iter().position(|b| *b == b'\n') else {
            tracing::warn!(line = line_no, "dropping torn journal tail");
            break;
        };

        let line = &rest[..end];
        if !line.iter().all(u8::is_ascii_whitespace) {
            let record: JournalRecord =
                serde_json::from_slice(line).map_err(|e| JournalError::Corrupt {
                    line: line_no,
                    reason: e.to_string(),
                })?;
            let expected = records.last().map(|r: &JournalRecord| r.sequence + 1).unwrap_or(1);
            if record.sequence != expected {
                return Err(JournalError::Corrupt {
                    line: line_no,
                    reason: format!(
                        "non-monotonic sequence (expected={expected}, found={})",
                        record.sequence
                    ),
                });
            }
            records.push(record);
        }

        offset += end + 1;
        committed_len = offset as u64;
    }

    Ok(Scan {
        records,
        committed_len,
    })
}

fn read_all(path: &Path) -> Result<Vec<u8>, JournalError> {
    let mut bytes = Vec::new();
    match File::open(path) {
        Ok(mut f) => {
            f.read_to_end(&mut bytes)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(bytes)
}

impl FileJournal {
    /// Open (or create) the journal at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let scanned = scan(&read_all(&path)?)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        let on_disk = file.metadata()?.len();
        if on_disk != scanned.committed_len {
            file.set_len(scanned.committed_len)?;
            file.sync_data()?;
        }

        tracing::info!(
            path = %path.display(),
            records = scanned.records.len(),
            "journal opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(FileState {
                file,
                len: scanned.committed_len,
                next_sequence: scanned.records.last().map(|r| r.sequence).unwrap_or(0) + 1,
            }),
        })
    }
}

impl Journal for FileJournal {
    fn append(&self, entry: JournalEntry) -> Result<JournalRecord, JournalError> {
        let mut state = self.state.lock().map_err(|_| JournalError::Poisoned)?;

        let record = JournalRecord {
            sequence: state.next_sequence,
            recorded_at: Utc::now(),
            entry,
        };
        let mut line =
            serde_json::to_vec(&record).map_err(|e| JournalError::Encode(e.to_string()))?;
        line.push(b'\n');

        let len_before = state.len;
        let written = write_at_end(&mut state.file, len_before, &line);
        if let Err(e) = written {
            // Cut any partial write so the next append starts on a clean line.
            discard_partial_write(&state.file, len_before);
            return Err(e.into());
        }

        state.len = len_before + line.len() as u64;
        state.next_sequence += 1;
        tracing::debug!(sequence = record.sequence, kind = record.entry.kind(), "journal append");
        Ok(record)
    }

    fn load(&self) -> Result<Vec<JournalRecord>, JournalError> {
        // Hold the append lock so the scan never sees a half-written line.
        let _state = self.state.lock().map_err(|_| JournalError::Poisoned)?;
        Ok(scan(&read_all(&self.path)?)?.records)
    }
}

/// Truncate back to the last committed record. Returns false, after logging,
/// if the file could not be cut and may now end in a torn line.
fn discard_partial_write(file: &File, committed_len: u64) -> bool {
    match file.set_len(committed_len) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                error = %e,
                committed_len,
                "failed to truncate partial journal write; journal may end in a torn line"
            );
            false
        }
    }
}

fn write_at_end(file: &mut File, offset: u64, line: &[u8]) -> std::io::Result<()> {
    use std::io::{Seek, SeekFrom};

    file.seek(SeekFrom::Start(offset))?;
    file.write_all(line)?;
    file.sync_data()
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltran_core::{MaterialId, OwnerId};

    fn deleted(owner_id: OwnerId) -> JournalEntry {
        JournalEntry::MaterialDeleted {
            owner_id,
            material_id: MaterialId::new(),
        }
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("journal.jsonl");
        let owner = OwnerId::new();

        {
            let journal = FileJournal::open(&path).unwrap();
            assert_eq!(journal.append(deleted(owner)).unwrap().sequence, 1);
            assert_eq!(journal.append(deleted(owner)).unwrap().sequence, 2);
        }

        let journal = FileJournal::open(&path).unwrap();
        let records = journal.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(journal.append(deleted(owner)).unwrap().sequence, 3);
    }

    #[test]
    fn torn_tail_is_dropped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");

        {
            let journal = FileJournal::open(&path).unwrap();
            journal.append(deleted(OwnerId::new())).unwrap();
        }
        {
            let mut f = OpenOptions::new().append(true).open(&path).unwrap();
            f.write_all(br#"{"sequence":2,"recorded_at":"#).unwrap();
        }

        let journal = FileJournal::open(&path).unwrap();
        assert_eq!(journal.load().unwrap().len(), 1);
        assert_eq!(journal.append(deleted(OwnerId::new())).unwrap().sequence, 2);
        assert_eq!(journal.load().unwrap().len(), 2);
    }

    #[test]
    fn partial_write_is_cut_back_to_the_committed_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        fs::write(&path, b"{\"committed\":true}\n{\"sequ").unwrap();

        let file = OpenOptions::new().write(true).open(&path).unwrap();
        assert!(discard_partial_write(&file, 19));
        assert_eq!(fs::read(&path).unwrap(), b"{\"committed\":true}\n");

        // A handle that cannot truncate leaves the tail in place and reports it.
        fs::write(&path, b"{\"committed\":true}\n{\"sequ").unwrap();
        let read_only = File::open(&path).unwrap();
        assert!(!discard_partial_write(&read_only, 19));
        assert_eq!(fs::metadata(&path).unwrap().len(), 25);
    }

    #[test]
    fn corrupt_committed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        fs::write(&path, b"not json\n").unwrap();

        let err = FileJournal::open(&path).unwrap_err();
        assert!(matches!(err, JournalError::Corrupt { line: 1, .. }));
    }
}

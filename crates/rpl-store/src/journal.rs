use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use rpl_types::EntityKey;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::changeset::{ChangeSet, CommitReceipt};
use crate::error::{StoreError, StoreResult};
use crate::memory::LedgerState;
use crate::traits::{KvLedger, Versioned};

/// Flush/sync strategy for the journal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every commit (safest, highest latency).
    EveryCommit,
    /// Flush to the OS page cache only.
    #[default]
    OsDefault,
}

/// Configuration for the journal-backed ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default)]
    pub sync_mode: SyncMode,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: u64 = 8;

/// Durable ledger: committed change sets are appended to a journal file and
/// replayed into memory when the ledger is opened.
///
/// On-disk frame format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized ChangeSet)]
/// ```
///
/// Only validated change sets are journaled, so replay applies them without
/// re-validation. A torn or corrupt frame ends recovery; the file is cut back
/// to the last good frame so later appends stay readable. An append that
/// fails partway is cut back the same way before the error is returned.
pub struct JournalLedger {
    path: PathBuf,
    state: RwLock<LedgerState>,
    file: Mutex<File>,
    config: JournalConfig,
}

impl JournalLedger {
    /// Open (or create) a journal at `path` and replay it.
    pub fn open(path: &Path, config: JournalConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let (state, valid_len) = replay(path)?;
        let file_len = file.metadata()?.len();
        if valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len,
                file_len,
                "discarding unreadable journal tail"
            );
            file.set_len(valid_len)?;
        }

        info!(
            path = %path.display(),
            height = state.height(),
            keys = state.len(),
            "journal ledger opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            state: RwLock::new(state),
            file: Mutex::new(file),
            config,
        })
    }

    /// Path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, changes: &ChangeSet) -> StoreResult<()> {
        let frame = encode_frame(changes)?;
        let mut file = self.file.lock().map_err(|_| StoreError::LockPoisoned)?;
        write_frame(&mut *file, &frame, self.config.sync_mode == SyncMode::EveryCommit)?;
        debug!(tx = %changes.tx_id, len = frame.len(), "journal append");
        Ok(())
    }
}

/// Header plus bincode payload for one change set.
fn encode_frame(changes: &ChangeSet) -> StoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(changes).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len()).map_err(|_| {
        StoreError::Serialization(format!("change set too large: {} bytes", payload.len()))
    })?;
    let mut frame = Vec::with_capacity(HEADER_SIZE as usize + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// The append-only file a journal writes frames to.
trait FrameSink: Write {
    fn end(&self) -> io::Result<u64>;
    fn truncate(&self, len: u64) -> io::Result<()>;
    fn sync(&self) -> io::Result<()>;
}

impl FrameSink for File {
    fn end(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Append `frame` in full or not at all.
///
/// Nothing is buffered between calls, so a failed write cannot resurface
/// later; whatever part of the frame reached the file is cut off again.
fn write_frame<S: FrameSink>(sink: &mut S, frame: &[u8], sync: bool) -> io::Result<()> {
    let start = sink.end()?;
    let written = sink
        .write_all(frame)
        .and_then(|()| sink.flush())
        .and_then(|()| if sync { sink.sync() } else { Ok(()) });
    if let Err(err) = written {
        if let Err(cut) = sink.truncate(start) {
            warn!(start, error = %cut, "failed to cut back a partial journal frame");
        }
        return Err(err);
    }
    Ok(())
}

/// Rebuild state from the journal. Returns the state and the byte length of
/// the readable prefix.
fn replay(path: &Path) -> StoreResult<(LedgerState, u64)> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut state = LedgerState::default();
    let mut offset: u64 = 0;
    let mut frames = 0usize;

    loop {
        let mut header = [0u8; HEADER_SIZE as usize];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if length == 0 || offset + HEADER_SIZE + u64::from(length) > file_len {
            warn!(offset, length, file_len, "invalid journal frame length; stopping replay");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match reader.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, length, "truncated journal frame; stopping replay");
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(
                offset,
                expected = expected_crc,
                actual = actual_crc,
                "journal CRC mismatch; stopping replay"
            );
            break;
        }

        let changes: ChangeSet = match bincode::deserialize(&payload) {
            Ok(changes) => changes,
            Err(e) => {
                warn!(offset, error = %e, "undecodable journal frame; stopping replay");
                break;
            }
        };
        state.apply(&changes);
        frames += 1;
        offset += HEADER_SIZE + u64::from(length);
    }

    debug!(frames, height = state.height(), "journal replay complete");
    Ok((state, offset))
}

impl KvLedger for JournalLedger {
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Versioned>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.get(key))
    }

    fn commit(&self, changes: ChangeSet) -> StoreResult<CommitReceipt> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        state.validate(&changes)?;
        if !changes.is_read_only() {
            // Journal first: a failed append leaves memory untouched.
            self.append(&changes)?;
        }
        let receipt = state.apply(&changes);
        debug!(tx = %receipt.tx_id, height = receipt.height, "commit applied");
        Ok(receipt)
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<EntityKey>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.keys(prefix))
    }

    fn height(&self) -> StoreResult<u64> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.height())
    }
}

impl std::fmt::Debug for JournalLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalLedger")
            .field("path", &self.path)
            .field("sync_mode", &self.config.sync_mode)
            .finish()
    }
}

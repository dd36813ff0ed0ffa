//! Concurrent row-group writing: one column-writer handle per thread,
//! sharing nothing but the commit lock. Handles buffer rows independently
//! and commit in construction order.
use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::value::Row;

use super::writer::Writer;

struct Shared<W: Write> {
    writer: Writer<W>,
    next_commit: usize,
}

/// A facade over [`Writer`] that hands out independent per-thread handles.
pub struct ConcurrentRowGroupWriter<W: Write> {
    shared: Arc<Mutex<Shared<W>>>,
    next_handle: usize,
}

impl<W: Write> ConcurrentRowGroupWriter<W> {
    pub fn new(writer: Writer<W>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                writer,
                next_commit: 0,
            })),
            next_handle: 0,
        }
    }

    /// A new handle. Handles commit in the order they were created.
    pub fn handle(&mut self) -> ColumnWriterHandle<W> {
        let sequence = self.next_handle;
        self.next_handle += 1;
        ColumnWriterHandle {
            shared: self.shared.clone(),
            sequence,
            rows: vec![],
        }
    }

    /// Closes the underlying writer. All handles must have committed.
    pub fn close(self) -> Result<(u64, W)> {
        let shared = Arc::into_inner(self.shared).ok_or_else(|| {
            Error::InvalidConfiguration(
                "cannot close while column-writer handles are alive".to_string(),
            )
        })?;
        let shared = shared
            .into_inner()
            .map_err(|_| Error::Transport("the commit lock is poisoned".to_string()))?;
        if shared.next_commit != self.next_handle {
            return Err(Error::InvalidConfiguration(format!(
                "{} handles were created but only {} committed",
                self.next_handle, shared.next_commit
            )));
        }
        shared.writer.close()
    }
}

/// A per-thread buffer of rows. Writing never touches shared state;
/// [`ColumnWriterHandle::commit`] takes the lock once.
pub struct ColumnWriterHandle<W: Write> {
    shared: Arc<Mutex<Shared<W>>>,
    sequence: usize,
    rows: Vec<Row>,
}

impl<W: Write> ColumnWriterHandle<W> {
    pub fn write_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn write_rows<I: IntoIterator<Item = Row>>(&mut self, rows: I) {
        self.rows.extend(rows);
    }

    /// The number of the handle, which is also its committing position.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// Merges the buffered rows into the shared writer. Commits serialize
    /// in handle-construction order; committing early fails with
    /// [`Error::OutOfOrderCommit`].
    pub fn commit(self) -> Result<()> {
        let mut shared = self
            .shared
            .lock()
            .map_err(|_| Error::Transport("the commit lock is poisoned".to_string()))?;
        if shared.next_commit != self.sequence {
            return Err(Error::OutOfOrderCommit {
                expected: shared.next_commit,
                found: self.sequence,
            });
        }
        shared.writer.write_rows(self.rows)?;
        shared.next_commit += 1;
        Ok(())
    }
}

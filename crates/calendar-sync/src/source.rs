use shared_types::SourceRecord;

use crate::error::SyncError;

/// Records read from one source, plus how many entries could not be
/// decoded into a record at all.
#[derive(Debug, Clone)]
pub struct SourceBatch<R> {
    pub records: Vec<R>,
    pub malformed: usize,
}

impl<R> SourceBatch<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            malformed: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.records.len() + self.malformed
    }
}

/// Produces the source records of one job.
///
/// A failed read aborts the job; there is no retry.
#[allow(async_fn_in_trait)]
pub trait SourceReader {
    type Record: SourceRecord;

    /// Where the records come from, for log lines.
    fn describe(&self) -> String;

    async fn read(&self) -> Result<SourceBatch<Self::Record>, SyncError>;
}

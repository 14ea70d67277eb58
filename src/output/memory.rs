use crate::output::{OutputSink, SinkError};

/// Collects records in memory, in the order they were written
#[derive(Debug)]
pub struct MemorySink<R> {
    records: Vec<R>,
    finalized: bool,
}

impl<R> MemorySink<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            finalized: false,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// Was the output marked complete?
    #[must_use]
    pub fn finalized(&self) -> bool {
        self.finalized
    }
}

impl<R> Default for MemorySink<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> OutputSink<R> for MemorySink<R> {
    fn write(&mut self, record: R) -> Result<(), SinkError> {
        if self.finalized {
            return Err(SinkError::Closed);
        }
        self.records.push(record);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SinkError> {
        if self.finalized {
            return Err(SinkError::Closed);
        }
        self.finalized = true;
        Ok(())
    }
}

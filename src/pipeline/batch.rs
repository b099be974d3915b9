/*!
 * Batch processing of table rows.
 *
 * Rows run through the row pipeline either one after the other or with a
 * bounded number in flight. Results always come back in input order.
 */

use futures::stream::{self, StreamExt};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use super::row::{ProcessedRow, RowPipeline, TextInput};

/// Ordered results of a batch, one per input row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResult {
    rows: Vec<ProcessedRow>,
}

impl BatchResult {
    pub fn new(rows: Vec<ProcessedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ProcessedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ProcessedRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessedRow> {
        self.rows.iter()
    }

    pub fn success_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.rows.len() - self.success_count()
    }
}

impl IntoIterator for BatchResult {
    type Item = ProcessedRow;
    type IntoIter = std::vec::IntoIter<ProcessedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a ProcessedRow;
    type IntoIter = std::slice::Iter<'a, ProcessedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Runs every row of a table through a `RowPipeline`
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    pipeline: RowPipeline,
    /// Maximum number of rows in flight (1 = sequential)
    max_concurrent_rows: usize,
}

impl BatchProcessor {
    /// Create a sequential batch processor
    pub fn new(pipeline: RowPipeline) -> Self {
        Self {
            pipeline,
            max_concurrent_rows: 1,
        }
    }

    /// Allow up to `max_concurrent_rows` rows in flight (0 is treated as 1)
    pub fn with_concurrency(mut self, max_concurrent_rows: usize) -> Self {
        self.max_concurrent_rows = max_concurrent_rows.max(1);
        self
    }

    pub fn pipeline(&self) -> &RowPipeline {
        &self.pipeline
    }

    pub fn max_concurrent_rows(&self) -> usize {
        self.max_concurrent_rows
    }

    /// Process every row, in order
    pub async fn process(&self, rows: &[TextInput]) -> BatchResult {
        self.process_with_progress(rows, |_, _| {}).await
    }

    /// Process every row, in order, reporting `(done, total)` after each row
    pub async fn process_with_progress<F>(&self, rows: &[TextInput], progress: F) -> BatchResult
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let total = rows.len();
        let start = Instant::now();
        let done = AtomicUsize::new(0);

        let processed: Vec<ProcessedRow> = stream::iter(rows)
            .map(|row| {
                let done = &done;
                let progress = &progress;
                async move {
                    let result = self.pipeline.process(row).await;
                    progress(done.fetch_add(1, Ordering::SeqCst) + 1, total);
                    result
                }
            })
            .buffered(self.max_concurrent_rows)
            .collect()
            .await;

        let result = BatchResult::new(processed);
        info!(
            "Processed {} rows ({} succeeded, {} failed) in {:.2}s",
            total,
            result.success_count(),
            result.failure_count(),
            start.elapsed().as_secs_f64()
        );
        result
    }
}

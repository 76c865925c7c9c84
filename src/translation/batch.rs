/*!
 * Batch translation processing.
 *
 * Texts are split into contiguous batches that are sent one at a time. The
 * result always lines up with the input: short replies are padded, long
 * replies are cut, and a failed batch falls back to its source texts.
 */

use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::TranslationCommonConfig;
use crate::errors::TranslationError;

use super::core::Translator;

/// Default number of texts per request
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default pause between two requests
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

/// Summary of one `translate_all` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of batches the input was split into
    pub total_batches: usize,
    /// Batches that fell back to source text after an error
    pub failed_batches: usize,
    /// Batches whose reply had fewer lines than the batch
    pub padded_batches: usize,
    /// Batches never sent because the run was cancelled
    pub skipped_batches: usize,
    /// Whether the run was cancelled before every batch was sent
    pub cancelled: bool,
}

impl BatchReport {
    /// Batches that were answered by the translator
    pub fn translated_batches(&self) -> usize {
        self.total_batches.saturating_sub(self.failed_batches + self.skipped_batches)
    }
}

/// Batch translator for processing subtitle texts in batches
pub struct BatchTranslator<T: Translator> {
    /// The translator to use
    translator: T,

    /// Maximum number of texts per request
    batch_size: usize,

    /// Pause between two requests
    batch_delay: Duration,

    /// Checked before each batch is sent
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl<T: Translator> BatchTranslator<T> {
    /// Create a new batch translator
    pub fn new(translator: T, batch_size: usize) -> Self {
        Self {
            translator,
            batch_size: batch_size.max(1),
            batch_delay: DEFAULT_BATCH_DELAY,
            cancel_flag: None,
        }
    }

    /// Create a batch translator using the configured batch size and delay
    pub fn from_config(translator: T, common: &TranslationCommonConfig) -> Self {
        Self::new(translator, common.batch_size).with_delay(Duration::from_millis(common.batch_delay_ms))
    }

    /// Set the pause between two requests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Stop sending requests once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// The wrapped translator
    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Maximum number of texts per request
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Translate all texts; the result has the same length and order as `texts`
    pub async fn translate_all(&self, texts: &[String]) -> (Vec<String>, BatchReport) {
        self.translate_all_with_progress(texts, |_, _| {}).await
    }

    /// Translate all texts, reporting `(completed_batches, total_batches)` after each batch
    pub async fn translate_all_with_progress(
        &self,
        texts: &[String],
        progress_callback: impl Fn(usize, usize),
    ) -> (Vec<String>, BatchReport) {
        let batches: Vec<&[String]> = texts.chunks(self.batch_size).collect();
        let mut report = BatchReport {
            total_batches: batches.len(),
            ..BatchReport::default()
        };
        let mut results: Vec<String> = Vec::with_capacity(texts.len());

        for (batch_index, batch) in batches.iter().enumerate() {
            if batch_index > 0 && !self.batch_delay.is_zero() && !self.is_cancelled() {
                tokio::time::sleep(self.batch_delay).await;
            }

            if self.is_cancelled() {
                if !report.cancelled {
                    warn!(
                        "Translation cancelled, keeping source text for batches {}-{}",
                        batch_index + 1,
                        report.total_batches
                    );
                }
                report.cancelled = true;
                report.skipped_batches += 1;
                results.extend(batch.iter().cloned());
                progress_callback(batch_index + 1, report.total_batches);
                continue;
            }

            debug!("Sending batch {}/{} ({} entries)", batch_index + 1, report.total_batches, batch.len());
            let start_time = Instant::now();

            match self.translator.translate_batch(batch).await {
                Ok(reply) => {
                    let (aligned, padded) = align_to_batch(reply, batch.len(), batch_index);
                    if padded {
                        report.padded_batches += 1;
                    }
                    debug!("Batch {} completed in {:?}", batch_index + 1, start_time.elapsed());
                    results.extend(aligned);
                }
                Err(TranslationError::Cancelled) => {
                    warn!("Batch {} cancelled mid-request, keeping source text", batch_index + 1);
                    report.cancelled = true;
                    report.skipped_batches += 1;
                    results.extend(batch.iter().cloned());
                }
                Err(e) => {
                    warn!("Batch {} failed, keeping source text: {}", batch_index + 1, e);
                    report.failed_batches += 1;
                    results.extend(batch.iter().cloned());
                }
            }

            progress_callback(batch_index + 1, report.total_batches);
        }

        (results, report)
    }
}

/// Pad or cut a reply to exactly `len` items; reports whether padding happened
fn align_to_batch(mut reply: Vec<String>, len: usize, batch_index: usize) -> (Vec<String>, bool) {
    let received = reply.len();
    if received > len {
        warn!(
            "Batch {} returned {} lines for {} entries, dropping the extra lines",
            batch_index + 1,
            received,
            len
        );
        reply.truncate(len);
        return (reply, false);
    }

    if received < len {
        warn!(
            "Batch {} returned {} lines for {} entries, padding the rest",
            batch_index + 1,
            received,
            len
        );
        reply.resize(len, String::new());
        return (reply, true);
    }

    (reply, false)
}

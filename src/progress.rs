//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline reads each page.
//!
//! # Example
//!
//! ```rust
//! use bionic_pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     extracted: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_extracted(&self, page_num: usize, total_pages: usize, text_len: usize) {
//!         self.extracted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} read ({} bytes)", page_num, total_pages, text_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     extracted: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// Runs are executed on a blocking worker thread, so implementations must be
/// `Send + Sync`. All methods have default no-op implementations so callers
/// only override what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first page is read.
    ///
    /// # Arguments
    /// * `total_pages` — number of selected pages that will be read
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page's text has been extracted and normalised.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — number of selected pages
    /// * `text_len`    — byte length of the normalised text
    fn on_page_extracted(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called when a page is left out of the output.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — number of selected pages
    /// * `error`       — human-readable reason
    fn on_page_skipped(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the output document has been finalised.
    ///
    /// # Arguments
    /// * `total_pages`   — number of selected pages
    /// * `success_count` — pages whose text made it into the output
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        extracted: AtomicUsize,
        skipped: AtomicUsize,
        completed_success: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_pages: usize) {
            self.started_total.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_extracted(&self, _page_num: usize, _total_pages: usize, _text_len: usize) {
            self.extracted.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_skipped(&self, _page_num: usize, _total_pages: usize, _error: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _total_pages: usize, success_count: usize) {
            self.completed_success.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_compiles_and_runs() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(10);
        cb.on_page_extracted(1, 10, 500);
        cb.on_page_skipped(2, 10, "some error");
        cb.on_conversion_complete(10, 9);
    }

    #[test]
    fn tracking_callback_counts_events() {
        let cb = TrackingCallback::default();
        cb.on_conversion_start(3);
        cb.on_page_extracted(1, 3, 10);
        cb.on_page_skipped(2, 3, "bad");
        cb.on_page_extracted(3, 3, 12);
        cb.on_conversion_complete(3, 2);

        assert_eq!(cb.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(cb.extracted.load(Ordering::SeqCst), 2);
        assert_eq!(cb.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(cb.completed_success.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoopProgressCallback>();
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        std::thread::spawn(move || cb.on_conversion_start(1))
            .join()
            .unwrap();
    }
}

//! Fetch pipeline
//!
//! Drives one run over a list of URLs:
//! 1. Rejects URLs without an `http://` or `https://` scheme
//! 2. Retrieves each image through an [`ImageSource`], one request at a time
//! 3. Checks the declared content type, deduplicates by content digest and
//!    optionally verifies image integrity
//! 4. Writes accepted images to the download directory and registers their digest
//! 5. Reports progress, outcomes, previews and a final summary as [`FetchEvent`]s
//!
//! A failure while handling one URL, including a panic, becomes that URL's
//! [`FetchOutcome`]; the run always continues with the next URL.

use std::any::Any;
use std::io;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::fetcher::{
    Digest, FetchEvent, FetchOutcome, FilenameResolver, HashStore, ImageRecord, ImageSource,
    ImageValidator, RunSummary, SourceError, SourceResponse,
};

/// Schemes the pipeline will request
const SUPPORTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Per-run switches chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub skip_duplicates: bool,
    pub verify_integrity: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            skip_duplicates: true,
            verify_integrity: true,
        }
    }
}

/// Reasons a URL was not saved
#[derive(Error, Debug)]
enum PipelineError {
    #[error("URL must start with http:// or https://")]
    InvalidUrl,

    #[error("Network error: {0}")]
    Source(#[from] SourceError),

    #[error("Declared content type {0:?} is not an image")]
    NotAnImage(String),

    #[error("Content {0} was already downloaded")]
    Duplicate(Digest),

    #[error("Image failed integrity check")]
    Corrupt,

    #[error("{0}")]
    Io(#[from] io::Error),
}

impl PipelineError {
    fn into_outcome(self) -> FetchOutcome {
        match self {
            PipelineError::InvalidUrl => FetchOutcome::InvalidUrl,
            PipelineError::Source(e) => FetchOutcome::NetworkError {
                detail: e.to_string(),
            },
            PipelineError::NotAnImage(_) => FetchOutcome::NotAnImage,
            PipelineError::Duplicate(_) => FetchOutcome::SkippedDuplicate,
            PipelineError::Corrupt => FetchOutcome::CorruptImage,
            PipelineError::Io(e) => FetchOutcome::OtherError {
                detail: e.to_string(),
            },
        }
    }
}

/// An image that was written to disk
struct Accepted {
    filename: String,
    record: ImageRecord,
}

/// Sequential image fetcher writing into one destination directory
pub struct FetchPipeline<S> {
    source: S,
    hash_store: Arc<HashStore>,
    destination: PathBuf,
}

impl<S: ImageSource + 'static> FetchPipeline<S> {
    /// Create a new pipeline. `destination` must already exist.
    pub fn new(source: S, hash_store: Arc<HashStore>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source,
            hash_store,
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn hash_store(&self) -> &Arc<HashStore> {
        &self.hash_store
    }

    /// Run over `urls` on a dedicated task.
    ///
    /// Events arrive on the returned receiver in emission order; the handle
    /// resolves to the same summary carried by the final `Finished` event.
    pub fn spawn(
        self: Arc<Self>,
        urls: Vec<String>,
        options: FetchOptions,
    ) -> (UnboundedReceiver<FetchEvent>, JoinHandle<RunSummary>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move { self.run(&urls, options, &event_tx).await });
        (event_rx, handle)
    }

    /// Process every URL in order and return the run totals.
    ///
    /// Never fails. Events are dropped silently if the receiver has gone away.
    pub async fn run(
        &self,
        urls: &[String],
        options: FetchOptions,
        events: &UnboundedSender<FetchEvent>,
    ) -> RunSummary {
        let run_id = Uuid::new_v4();
        let span = info_span!("fetch_run", %run_id, total = urls.len());
        self.run_urls(run_id, urls, options, events).instrument(span).await
    }

    async fn run_urls(
        &self,
        run_id: Uuid,
        urls: &[String],
        options: FetchOptions,
        events: &UnboundedSender<FetchEvent>,
    ) -> RunSummary {
        let started_at = Utc::now();
        let total = urls.len();
        let mut successful = 0;

        info!(
            skip_duplicates = options.skip_duplicates,
            verify_integrity = options.verify_integrity,
            "Starting fetch run"
        );
        let _ = events.send(FetchEvent::Started { run_id, total });

        for (index, url) in urls.iter().enumerate() {
            let _ = events.send(FetchEvent::Progress {
                index,
                total,
                url: url.clone(),
            });

            let result = AssertUnwindSafe(self.process(url, options))
                .catch_unwind()
                .await;

            let mut preview = None;
            let outcome = match result {
                Ok(Ok(accepted)) => {
                    successful += 1;
                    if successful == 1 || index + 1 == total {
                        preview = Some(FetchEvent::Preview {
                            filename: accepted.filename.clone(),
                            bytes: accepted.record.content,
                        });
                    }
                    FetchOutcome::Saved {
                        filename: accepted.filename,
                    }
                }
                Ok(Err(e)) => {
                    debug!(url = %url, "{}", e);
                    e.into_outcome()
                }
                Err(panic) => FetchOutcome::OtherError {
                    detail: panic_detail(panic.as_ref()),
                },
            };

            if outcome.is_saved() {
                info!(index, url = %url, outcome = ?outcome, "Fetched image");
            } else {
                warn!(index, url = %url, outcome = ?outcome, "Image not saved");
            }

            let line = outcome.log_line(url);
            let _ = events.send(FetchEvent::Outcome {
                index,
                url: url.clone(),
                outcome,
                line,
            });
            if let Some(preview) = preview {
                let _ = events.send(preview);
            }
        }

        let summary = RunSummary {
            run_id,
            successful,
            total,
            started_at,
            finished_at: Utc::now(),
        };
        match serde_json::to_string(&summary) {
            Ok(json) => info!(summary = %json, "Fetch run finished"),
            Err(e) => warn!("Failed to serialize run summary: {}", e),
        }
        let _ = events.send(FetchEvent::Finished(summary.clone()));
        summary
    }

    /// Handle a single URL from scheme check to persistence
    async fn process(&self, url: &str, options: FetchOptions) -> Result<Accepted, PipelineError> {
        if !SUPPORTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            return Err(PipelineError::InvalidUrl);
        }

        let response = self.source.open(url).await?;
        let content_type = response.content_type().to_string();
        if !content_type.contains("image") {
            return Err(PipelineError::NotAnImage(content_type));
        }

        let content = response.read_all().await?;
        let record = ImageRecord {
            url: url.to_string(),
            hash: Digest::of(&content),
            content,
            content_type,
        };

        if options.skip_duplicates && self.hash_store.contains(&record.hash) {
            return Err(PipelineError::Duplicate(record.hash));
        }

        if options.verify_integrity && !ImageValidator::is_valid(&record.content) {
            return Err(PipelineError::Corrupt);
        }

        let filename = FilenameResolver::resolve(&record.url, &record.content_type);
        self.persist(&filename, &record).await?;

        Ok(Accepted { filename, record })
    }

    /// Write the image and register its digest.
    ///
    /// The digest is registered only after the file is in place; a failed
    /// write leaves the hash store untouched and removes the partial file.
    async fn persist(&self, filename: &str, record: &ImageRecord) -> Result<PathBuf, PipelineError> {
        let target = self.destination.join(filename);
        // Fixed-length temp name so any name the file system accepts as a target also works here.
        let temp = self.destination.join(temp_file_name(&record.hash));

        if let Err(e) = write_then_rename(&temp, &target, &record.content).await {
            match tokio::fs::remove_file(&temp).await {
                Ok(()) => {}
                Err(cleanup) if cleanup.kind() == io::ErrorKind::NotFound => {}
                Err(cleanup) => debug!(path = %temp.display(), "Failed to remove partial file: {}", cleanup),
            }
            return Err(PipelineError::Io(e));
        }

        self.hash_store.insert(record.hash);
        debug!(
            path = %target.display(),
            size = record.content.len(),
            digest = %record.hash,
            "Saved image"
        );
        Ok(target)
    }
}

/// Hidden sibling used while an image is being written
fn temp_file_name(digest: &Digest) -> String {
    format!(".{}.part", &digest.to_hex()[..16])
}

async fn write_then_rename(temp: &Path, target: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp).await?;
    file.write_all(content).await?;
    file.flush().await?;
    drop(file);
    tokio::fs::rename(temp, target).await
}

fn panic_detail(panic: &(dyn Any + Send)) -> String {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned());

    match message {
        Some(message) => format!("unexpected panic: {}", message),
        None => "unexpected panic".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::fs;

    use tempfile::{tempdir, TempDir};

    use crate::fetcher::source::SourceResult;
    use crate::fetcher::validator::tests::png_bytes;

    /// What the in-memory source does for a URL
    #[derive(Clone)]
    enum Reply {
        Body { content_type: String, bytes: Vec<u8> },
        Fail(String),
        Panic,
    }

    /// In-memory source that counts requests
    #[derive(Default)]
    struct FakeSource {
        replies: HashMap<String, Reply>,
        requests: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, url: &str, reply: Reply) -> Self {
            self.replies.insert(url.to_string(), reply);
            self
        }

        fn image(self, url: &str, bytes: Vec<u8>) -> Self {
            self.with(url, Reply::Body { content_type: "image/png".into(), bytes })
        }
    }

    struct FakeResponse {
        content_type: String,
        bytes: Vec<u8>,
    }

    impl SourceResponse for FakeResponse {
        fn content_type(&self) -> &str {
            &self.content_type
        }

        fn read_all(self) -> impl Future<Output = SourceResult<Vec<u8>>> + Send {
            async move { Ok(self.bytes) }
        }
    }

    impl ImageSource for FakeSource {
        type Response = FakeResponse;

        async fn open(&self, url: &str) -> SourceResult<FakeResponse> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.replies.get(url).cloned() {
                Some(Reply::Body { content_type, bytes }) => Ok(FakeResponse { content_type, bytes }),
                Some(Reply::Fail(detail)) => Err(SourceError::Network(detail)),
                Some(Reply::Panic) => panic!("decoder exploded"),
                None => Err(SourceError::Network("404 Not Found".into())),
            }
        }
    }

    fn pipeline(source: FakeSource) -> (FetchPipeline<FakeSource>, TempDir) {
        let dir = tempdir().unwrap();
        let pipeline = FetchPipeline::new(source, Arc::new(HashStore::new()), dir.path());
        (pipeline, dir)
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Run and collect every emitted event
    async fn run_collect(
        pipeline: &FetchPipeline<FakeSource>,
        list: &[&str],
        options: FetchOptions,
    ) -> (RunSummary, Vec<FetchEvent>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let summary = pipeline.run(&urls(list), options, &tx).await;
        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (summary, events)
    }

    fn outcomes(events: &[FetchEvent]) -> Vec<FetchOutcome> {
        events
            .iter()
            .filter_map(|event| match event {
                FetchEvent::Outcome { outcome, .. } => Some(outcome.clone()),
                _ => None,
            })
            .collect()
    }

    fn saved(name: &str) -> FetchOutcome {
        FetchOutcome::Saved { filename: name.to_string() }
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_request() {
        let (pipeline, _dir) = pipeline(FakeSource::default());
        let (summary, events) =
            run_collect(&pipeline, &["not-a-url", "ftp://x.test/a.png", "HTTP://x.test/a.png"], FetchOptions::default())
                .await;

        assert_eq!(outcomes(&events), vec![FetchOutcome::InvalidUrl; 3]);
        assert_eq!(pipeline.source.requests.load(Ordering::SeqCst), 0);
        assert_eq!((summary.successful, summary.total), (0, 3));
    }

    #[tokio::test]
    async fn test_failing_url_does_not_block_later_success() {
        let source = FakeSource::default().image("http://x.test/ok.png", png_bytes(4, 4, 1));
        let (pipeline, dir) = pipeline(source);
        let (summary, events) =
            run_collect(&pipeline, &["not-a-url", "http://x.test/ok.png"], FetchOptions::default()).await;

        assert_eq!(outcomes(&events), vec![FetchOutcome::InvalidUrl, saved("ok.png")]);
        assert_eq!((summary.successful, summary.total), (1, 2));
        assert_eq!(fs::read(dir.path().join("ok.png")).unwrap(), png_bytes(4, 4, 1));
    }

    #[tokio::test]
    async fn test_event_order() {
        let source = FakeSource::default().image("http://x.test/a.png", png_bytes(4, 4, 1));
        let (pipeline, _dir) = pipeline(source);
        let (_, events) = run_collect(&pipeline, &["bad", "http://x.test/a.png"], FetchOptions::default()).await;

        let kinds: Vec<&str> = events
            .iter()
            .map(|event| match event {
                FetchEvent::Started { .. } => "started",
                FetchEvent::Progress { .. } => "progress",
                FetchEvent::Outcome { .. } => "outcome",
                FetchEvent::Preview { .. } => "preview",
                FetchEvent::Finished(_) => "finished",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["started", "progress", "outcome", "progress", "outcome", "preview", "finished"]
        );

        match &events[2] {
            FetchEvent::Outcome { index, line, .. } => {
                assert_eq!(*index, 0);
                assert_eq!(line, "✗ Invalid URL: bad");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicates_within_a_run_are_skipped() {
        let bytes = png_bytes(4, 4, 7);
        let source = FakeSource::default()
            .image("http://x.test/a.png", bytes.clone())
            .image("http://mirror.test/copy.png", bytes);
        let (pipeline, dir) = pipeline(source);
        let (summary, events) = run_collect(
            &pipeline,
            &["http://x.test/a.png", "http://x.test/a.png", "http://mirror.test/copy.png"],
            FetchOptions::default(),
        )
        .await;

        assert_eq!(
            outcomes(&events),
            vec![saved("a.png"), FetchOutcome::SkippedDuplicate, FetchOutcome::SkippedDuplicate]
        );
        assert_eq!(summary.successful, 1);
        assert!(!dir.path().join("copy.png").exists());
    }

    #[tokio::test]
    async fn test_duplicates_saved_when_skipping_disabled() {
        let source = FakeSource::default().image("http://x.test/a.png", png_bytes(4, 4, 7));
        let (pipeline, _dir) = pipeline(source);
        let options = FetchOptions { skip_duplicates: false, verify_integrity: true };
        let (summary, events) =
            run_collect(&pipeline, &["http://x.test/a.png", "http://x.test/a.png"], options).await;

        assert_eq!(outcomes(&events), vec![saved("a.png"), saved("a.png")]);
        assert_eq!(summary.successful, 2);
        assert_eq!(pipeline.hash_store().len(), 1);
    }

    #[tokio::test]
    async fn test_second_run_with_reloaded_store_skips() {
        let source = FakeSource::default().image("http://x.test/no-ext", png_bytes(6, 6, 3));
        let (pipeline, dir) = pipeline(source);
        let (_, first) = run_collect(&pipeline, &["http://x.test/no-ext"], FetchOptions::default()).await;
        assert!(outcomes(&first)[0].is_saved());

        let source = FakeSource::default().image("http://x.test/no-ext", png_bytes(6, 6, 3));
        let reloaded = FetchPipeline::new(source, Arc::new(HashStore::load(dir.path())), dir.path());
        let (summary, second) = run_collect(&reloaded, &["http://x.test/no-ext"], FetchOptions::default()).await;

        assert_eq!(outcomes(&second), vec![FetchOutcome::SkippedDuplicate]);
        assert_eq!(summary.successful, 0);
    }

    #[tokio::test]
    async fn test_non_image_content_type() {
        let source = FakeSource::default().with(
            "http://x.test/page.png",
            Reply::Body { content_type: "text/html".into(), bytes: png_bytes(4, 4, 1) },
        );
        let (pipeline, dir) = pipeline(source);
        let (_, events) = run_collect(&pipeline, &["http://x.test/page.png"], FetchOptions::default()).await;

        assert_eq!(outcomes(&events), vec![FetchOutcome::NotAnImage]);
        assert!(!dir.path().join("page.png").exists());
    }

    #[tokio::test]
    async fn test_corrupt_image_only_rejected_when_verifying() {
        let body = Reply::Body { content_type: "image/jpeg".into(), bytes: b"definitely not a jpeg".to_vec() };
        let source = FakeSource::default().with("http://x.test/broken.jpg", body.clone());
        let (pipeline, dir) = pipeline(source);
        let (_, events) = run_collect(&pipeline, &["http://x.test/broken.jpg"], FetchOptions::default()).await;
        assert_eq!(outcomes(&events), vec![FetchOutcome::CorruptImage]);
        assert!(pipeline.hash_store().is_empty());
        assert!(!dir.path().join("broken.jpg").exists());

        let source = FakeSource::default().with("http://x.test/broken.jpg", body);
        let (pipeline, dir) = self::pipeline(source);
        let options = FetchOptions { skip_duplicates: true, verify_integrity: false };
        let (_, events) = run_collect(&pipeline, &["http://x.test/broken.jpg"], options).await;
        assert_eq!(outcomes(&events), vec![saved("broken.jpg")]);
        assert!(dir.path().join("broken.jpg").exists());
    }

    #[tokio::test]
    async fn test_network_error_detail() {
        let source = FakeSource::default().with("http://x.test/a.png", Reply::Fail("connection refused".into()));
        let (pipeline, _dir) = pipeline(source);
        let (_, events) = run_collect(&pipeline, &["http://x.test/a.png"], FetchOptions::default()).await;

        assert_eq!(
            outcomes(&events),
            vec![FetchOutcome::NetworkError { detail: "connection refused".into() }]
        );
    }

    #[tokio::test]
    async fn test_write_failure_does_not_register_digest() {
        let bytes = png_bytes(4, 4, 9);
        let source = FakeSource::default().image("http://x.test/a.png", bytes.clone());
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let store = Arc::new(HashStore::new());
        let pipeline = FetchPipeline::new(source, store.clone(), &missing);

        let (summary, events) = run_collect(&pipeline, &["http://x.test/a.png"], FetchOptions::default()).await;

        assert!(matches!(outcomes(&events)[0], FetchOutcome::OtherError { .. }));
        assert_eq!(summary.successful, 0);
        assert!(!store.contains(&Digest::of(&bytes)));
    }

    #[tokio::test]
    async fn test_panic_is_isolated_to_its_url() {
        let source = FakeSource::default()
            .with("http://x.test/boom.png", Reply::Panic)
            .image("http://x.test/ok.png", png_bytes(4, 4, 2));
        let (pipeline, _dir) = pipeline(source);
        let (summary, events) =
            run_collect(&pipeline, &["http://x.test/boom.png", "http://x.test/ok.png"], FetchOptions::default()).await;

        let outcomes = outcomes(&events);
        assert_eq!(
            outcomes[0],
            FetchOutcome::OtherError { detail: "unexpected panic: decoder exploded".into() }
        );
        assert_eq!(outcomes[1], saved("ok.png"));
        assert_eq!(summary.successful, 1);
    }

    #[tokio::test]
    async fn test_overwrites_existing_file() {
        let source = FakeSource::default().image("http://x.test/a.png", png_bytes(4, 4, 5));
        let (pipeline, dir) = pipeline(source);
        fs::write(dir.path().join("a.png"), b"old").unwrap();

        let (_, events) = run_collect(&pipeline, &["http://x.test/a.png"], FetchOptions::default()).await;

        assert_eq!(outcomes(&events), vec![saved("a.png")]);
        assert_eq!(fs::read(dir.path().join("a.png")).unwrap(), png_bytes(4, 4, 5));
        let temp = temp_file_name(&Digest::of(&png_bytes(4, 4, 5)));
        assert!(!dir.path().join(temp).exists());
    }

    #[tokio::test]
    async fn test_saves_name_at_file_system_limit() {
        let name = format!("{}.png", "a".repeat(250));
        assert_eq!(name.len(), 254);
        let url = format!("http://x.test/{}", name);
        let source = FakeSource::default().image(&url, png_bytes(4, 4, 6));
        let (pipeline, dir) = pipeline(source);

        let (summary, events) = run_collect(&pipeline, &[url.as_str()], FetchOptions::default()).await;

        assert_eq!(outcomes(&events), vec![saved(&name)]);
        assert_eq!(summary.successful, 1);
        assert_eq!(fs::read(dir.path().join(&name)).unwrap(), png_bytes(4, 4, 6));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_partial_file() {
        let source = FakeSource::default().image("http://x.test/taken.png", png_bytes(4, 4, 8));
        let (pipeline, dir) = pipeline(source);
        // A directory with the target name makes the final rename fail.
        fs::create_dir(dir.path().join("taken.png")).unwrap();
        fs::write(dir.path().join("taken.png").join("keep"), b"x").unwrap();

        let (_, events) = run_collect(&pipeline, &["http://x.test/taken.png"], FetchOptions::default()).await;

        assert!(matches!(outcomes(&events)[0], FetchOutcome::OtherError { .. }));
        let temp = temp_file_name(&Digest::of(&png_bytes(4, 4, 8)));
        assert!(!dir.path().join(temp).exists());
        assert!(pipeline.hash_store().is_empty());
    }

    #[tokio::test]
    async fn test_preview_on_first_and_last_success() {
        let source = FakeSource::default()
            .image("http://x.test/1.png", png_bytes(4, 4, 1))
            .image("http://x.test/2.png", png_bytes(4, 4, 2))
            .image("http://x.test/3.png", png_bytes(4, 4, 3));
        let (pipeline, _dir) = pipeline(source);
        let (_, events) = run_collect(
            &pipeline,
            &["http://x.test/1.png", "http://x.test/2.png", "http://x.test/3.png"],
            FetchOptions::default(),
        )
        .await;

        let previews: Vec<(String, Vec<u8>)> = events
            .into_iter()
            .filter_map(|event| match event {
                FetchEvent::Preview { filename, bytes } => Some((filename, bytes)),
                _ => None,
            })
            .collect();
        assert_eq!(
            previews,
            vec![("1.png".to_string(), png_bytes(4, 4, 1)), ("3.png".to_string(), png_bytes(4, 4, 3))]
        );
    }

    #[tokio::test]
    async fn test_no_preview_when_last_url_fails() {
        let source = FakeSource::default()
            .image("http://x.test/1.png", png_bytes(4, 4, 1))
            .image("http://x.test/2.png", png_bytes(4, 4, 2));
        let (pipeline, _dir) = pipeline(source);
        let (_, events) = run_collect(
            &pipeline,
            &["http://x.test/1.png", "http://x.test/2.png", "bad"],
            FetchOptions::default(),
        )
        .await;

        let previews = events.iter().filter(|e| matches!(e, FetchEvent::Preview { .. })).count();
        assert_eq!(previews, 1);
    }

    #[tokio::test]
    async fn test_empty_run() {
        let (pipeline, _dir) = pipeline(FakeSource::default());
        let (summary, events) = run_collect(&pipeline, &[], FetchOptions::default()).await;

        assert_eq!((summary.successful, summary.total), (0, 0));
        assert!(outcomes(&events).is_empty());
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], FetchEvent::Finished(_)));
    }

    #[tokio::test]
    async fn test_spawn_streams_events() {
        let source = FakeSource::default().image("http://x.test/a.png", png_bytes(4, 4, 1));
        let (pipeline, _dir) = pipeline(source);
        let pipeline = Arc::new(pipeline);

        let (mut rx, handle) = pipeline.clone().spawn(urls(&["http://x.test/a.png"]), FetchOptions::default());
        let mut finished = None;
        while let Some(event) = rx.recv().await {
            if let FetchEvent::Finished(summary) = event {
                finished = Some(summary);
            }
        }

        let summary = handle.await.unwrap();
        assert_eq!(finished, Some(summary.clone()));
        assert_eq!(summary.successful, 1);
    }
}

//! Image fetching core
//! Downloads images one URL at a time, deduplicates them by content and
//! reports progress to the front end over a channel

pub mod config;
pub mod events;
pub mod filename;
pub mod hash_store;
pub mod logger;
pub mod pipeline;
pub mod preview;
pub mod source;
pub mod validator;

// Re-export commonly used types for convenience
pub use config::AppConfig;

pub use events::{FetchEvent, FetchOutcome, ImageRecord, RunSummary};

pub use filename::FilenameResolver;

pub use hash_store::{Digest, HashStore};

pub use logger::init_logger;

pub use pipeline::{FetchOptions, FetchPipeline};

pub use preview::{PreviewProjector, Projection};

pub use source::{HttpImageSource, ImageSource, SourceError, SourceResponse};

pub use validator::ImageValidator;

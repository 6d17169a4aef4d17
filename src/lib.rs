pub mod align;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod subtitle;
pub mod sync;

pub use config::Config;
pub use error::{DubsyncError, Result};
pub use pipeline::{
    prepare_segments, print_summary, synchronize, PipelineConfig, SyncRequest, SyncResult,
    SyncStats,
};

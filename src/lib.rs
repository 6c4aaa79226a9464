pub mod error;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod stats;

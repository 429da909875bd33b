//! Command-line facing layer: the publish workflow behind the binary

pub mod orchestration;

pub use orchestration::{run_publish_workflow, PublishOutcome, PublishRequest};

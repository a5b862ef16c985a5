pub mod writer;

pub use writer::{ReportWriter, RunOutput};

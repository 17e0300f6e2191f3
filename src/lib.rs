pub mod error;
pub mod extractor;
pub mod filter;
pub mod formatter;
pub mod logging;
pub mod mailbox;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod similarity;

pub use error::{AnalyzerError, Result};
pub use extractor::SenderNameExtractor;
pub use filter::SenderFilter;
pub use formatter::NameFormatter;
pub use pipeline::{Outcome, Pipeline};
pub use reference::ReferenceIndex;

pub mod compare;
pub mod error;
pub mod fetch;
pub mod formatters;
pub mod metrics;
pub mod page;
pub mod parse;
#[cfg(feature = "fetch")]
pub mod pipeline;
pub mod preprocess;
pub mod sampler;
pub mod source;
pub mod text;

pub use compare::{
    ComparatorConfig, ComparatorConfigBuilder, ComparisonResult, DiffKind, DiffSegment, PageComparator,
    SimilarityCategory, compare,
};
pub use error::{EncyclodiffError, Result};
pub use fetch::{FetchConfig, fetch_file, fetch_stdin};
#[cfg(feature = "fetch")]
pub use fetch::Fetcher;
pub use formatters::{
    ExportRecord, JsonConfig, JsonFormatter, ReportWriter, SavedResult, TextReportConfig, TextReportFormatter,
};
pub use metrics::{BiasComparison, BiasMetrics, MetricsAnalyzer, QualityComparison, QualityMetrics};
pub use page::{Citation, Infobox, PageRecord, Section, Sections};
pub use parse::Document;
#[cfg(feature = "fetch")]
pub use pipeline::{ComparisonPipeline, Progress, TopicRequest, most_different, most_similar};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
pub use sampler::{CategorySample, SamplingConfig, TopicSampler};
pub use source::{GrokipediaSource, PageSource, WikipediaSource};

//! Batch orchestration: fetch both pages for each topic, then compare them.
//!
//! Topics run one after another through a single [`Fetcher`], so the fetcher's
//! rate limit spaces out every request of the batch. A topic whose pages
//! cannot be fetched is logged and skipped; the batch carries on.

use crate::Result;
use crate::compare::{ComparisonResult, PageComparator};
use crate::fetch::Fetcher;
use crate::source::{GrokipediaSource, PageSource, WikipediaSource};

/// One topic to compare, optionally tagged with the category it was sampled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest {
    pub topic: String,
    pub category: Option<String>,
}

impl TopicRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self { topic: topic.into(), category: None }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl From<(String, String)> for TopicRequest {
    /// Takes the `(category, topic)` pairs produced by the sampler.
    fn from((category, topic): (String, String)) -> Self {
        Self::new(topic).with_category(category)
    }
}

/// Progress of a batch, reported after every topic.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub completed: usize,
    pub total: usize,
    pub request: &'a TopicRequest,
    pub succeeded: bool,
}

pub struct ComparisonPipeline {
    fetcher: Fetcher,
    source_a: Box<dyn PageSource>,
    source_b: Box<dyn PageSource>,
    comparator: PageComparator,
}

impl ComparisonPipeline {
    /// Grokipedia as page A, Wikipedia as page B.
    pub fn new(fetcher: Fetcher) -> Self {
        Self::with_sources(fetcher, Box::new(GrokipediaSource::new()), Box::new(WikipediaSource::new()))
    }

    pub fn with_sources(fetcher: Fetcher, source_a: Box<dyn PageSource>, source_b: Box<dyn PageSource>) -> Self {
        Self { fetcher, source_a, source_b, comparator: PageComparator::new() }
    }

    pub fn with_comparator(mut self, comparator: PageComparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Fetches page B and then page A, and compares them.
    pub async fn compare_topic(&self, topic: &str, category: Option<&str>) -> Result<ComparisonResult> {
        let page_b = self.fetcher.fetch_page(self.source_b.as_ref(), topic).await?;
        let page_a = self.fetcher.fetch_page(self.source_a.as_ref(), topic).await?;

        let mut result = self.comparator.compare(&page_a, &page_b);
        if let Some(category) = category {
            result.set_category(category);
        }
        Ok(result)
    }

    /// Compares every topic in order and returns the comparisons that succeeded.
    pub async fn run(
        &self, topics: &[TopicRequest], mut on_progress: impl FnMut(Progress<'_>),
    ) -> Vec<ComparisonResult> {
        let mut results = Vec::with_capacity(topics.len());

        for (i, request) in topics.iter().enumerate() {
            let outcome = self.compare_topic(&request.topic, request.category.as_deref()).await;
            let succeeded = outcome.is_ok();

            match outcome {
                Ok(result) => results.push(result),
                Err(err) => tracing::warn!(topic = %request.topic, error = %err, "skipping topic"),
            }

            on_progress(Progress { completed: i + 1, total: topics.len(), request, succeeded });
        }

        tracing::info!(compared = results.len(), requested = topics.len(), "batch finished");
        results
    }
}

/// The comparison with the highest text similarity, earliest on ties.
pub fn most_similar(results: &[ComparisonResult]) -> Option<&ComparisonResult> {
    // max_by keeps the last of equal maxima, so scan from the back.
    results.iter().rev().max_by(|a, b| a.text_similarity.total_cmp(&b.text_similarity))
}

/// The comparison with the lowest text similarity, earliest on ties.
pub fn most_different(results: &[ComparisonResult]) -> Option<&ComparisonResult> {
    results.iter().min_by(|a, b| a.text_similarity.total_cmp(&b.text_similarity))
}

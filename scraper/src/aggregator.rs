//! Runs every source in order and concatenates the results.

use common::{sample_jobs, JobListing};
use tracing::{error, info, warn};

use crate::error::ExtractError;
use crate::extractor::{Extractor, SourceDescriptor};
use crate::fetcher::{Fetcher, Sleeper, Transport};

pub struct Aggregator<T, S> {
    fetcher: Fetcher<T, S>,
    extractors: Vec<Extractor>,
    sample_fallback: bool,
}

impl<T: Transport, S: Sleeper> Aggregator<T, S> {
    pub fn new(fetcher: Fetcher<T, S>, extractors: Vec<Extractor>) -> Self {
        Self {
            fetcher,
            extractors,
            sample_fallback: false,
        }
    }

    /// Compiles `descriptors` into extractors, failing on the first bad one.
    pub fn with_sources(
        fetcher: Fetcher<T, S>,
        descriptors: Vec<SourceDescriptor>,
    ) -> Result<Self, ExtractError> {
        let extractors = descriptors
            .into_iter()
            .map(Extractor::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(fetcher, extractors))
    }

    /// Substitute the canned sample listings when every source comes back empty.
    pub fn with_sample_fallback(mut self, enabled: bool) -> Self {
        self.sample_fallback = enabled;
        self
    }

    /// Fetches and extracts one source. A failed fetch yields no listings.
    pub fn scrape_source(&self, extractor: &Extractor) -> Vec<JobListing> {
        info!("Scraping {}...", extractor.name());

        let Some(document) = self.fetcher.fetch(extractor.page_url().as_str()) else {
            error!("Failed to scrape {}", extractor.name());
            return Vec::new();
        };

        let jobs = extractor.extract(&document);
        info!("Found {} jobs from {}", jobs.len(), extractor.name());
        jobs
    }

    pub fn run(&self) -> Vec<JobListing> {
        let batches = self
            .extractors
            .iter()
            .map(|extractor| self.scrape_source(extractor))
            .collect();
        combine(batches, self.sample_fallback)
    }
}

/// Concatenates per-source batches in order. An empty result is replaced
/// by the sample set only when `sample_fallback` is set.
pub fn combine(batches: Vec<Vec<JobListing>>, sample_fallback: bool) -> Vec<JobListing> {
    let jobs: Vec<JobListing> = batches.into_iter().flatten().collect();

    if jobs.is_empty() {
        if sample_fallback {
            info!("No jobs found from web scraping. Using sample data (demo mode)...");
            return sample_jobs();
        }
        warn!("No jobs found from web scraping");
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::{test_policy, FakeTransport, RecordingSleeper};
    use crate::sources::{all_sources, florida_state_parks, indeed, tampa_parks};

    fn job(title: &str, source: &str) -> JobListing {
        JobListing {
            title: title.to_string(),
            company: "c".to_string(),
            location: "l".to_string(),
            description: "d".to_string(),
            url: String::new(),
            date_posted: None,
            experience_level: None,
            source: source.to_string(),
        }
    }

    fn aggregator(
        transport: FakeTransport,
        descriptors: Vec<SourceDescriptor>,
    ) -> Aggregator<FakeTransport, RecordingSleeper> {
        let fetcher = Fetcher::new(transport, RecordingSleeper::default(), test_policy());
        Aggregator::with_sources(fetcher, descriptors).unwrap()
    }

    #[test]
    fn test_combine_preserves_order_and_length() {
        let batches = vec![
            vec![job("a1", "A"), job("a2", "A")],
            vec![],
            vec![job("b1", "B")],
            vec![job("c1", "C"), job("c2", "C"), job("c3", "C")],
        ];
        let combined = combine(batches, true);

        let titles: Vec<&str> = combined.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "a2", "b1", "c1", "c2", "c3"]);
    }

    #[test]
    fn test_empty_with_fallback_is_sample_set() {
        assert_eq!(combine(vec![vec![], vec![]], true), sample_jobs());
    }

    #[test]
    fn test_empty_without_fallback_stays_empty() {
        assert!(combine(vec![vec![], vec![]], false).is_empty());
    }

    #[test]
    fn test_fallback_not_used_when_anything_found() {
        let combined = combine(vec![vec![], vec![job("x", "X")]], true);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].title, "x");
    }

    #[test]
    fn test_run_scrapes_sources_in_order() {
        let transport = FakeTransport::default()
            .with_page(
                "https://www.tampa.gov/careers",
                r#"<a href="/jobs/1">Park Aide</a><a href="/jobs/2">Nature Guide</a>"#,
            )
            .with_page(
                "https://www.floridastateparks.org/employment",
                r#"<a href="/careers/9">Park Ranger</a>"#,
            );
        let aggregator = aggregator(transport, vec![tampa_parks(), florida_state_parks()]);

        let jobs = aggregator.run();
        let titles: Vec<&str> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Park Aide", "Nature Guide", "Park Ranger"]);
        assert_eq!(jobs[0].source, "Tampa Parks & Recreation");
        assert_eq!(jobs[2].source, "Florida State Parks");
    }

    #[test]
    fn test_failed_source_contributes_nothing() {
        let transport = FakeTransport::default().with_page(
            "https://www.floridastateparks.org/employment",
            r#"<a href="/careers/9">Park Ranger</a>"#,
        );
        let aggregator = aggregator(transport, vec![indeed(), florida_state_parks()]);

        let jobs = aggregator.run();
        assert_eq!(jobs.len(), 1);
        // three attempts against the job board, one against the state parks page
        assert_eq!(aggregator.fetcher_calls(), 4);
    }

    #[test]
    fn test_all_sources_down_in_demo_mode_yields_samples() {
        let aggregator =
            aggregator(FakeTransport::default(), all_sources()).with_sample_fallback(true);
        assert_eq!(aggregator.run(), sample_jobs());
    }

    #[test]
    fn test_all_sources_down_without_demo_mode_is_empty() {
        let aggregator = aggregator(FakeTransport::default(), all_sources());
        assert!(aggregator.run().is_empty());
    }

    impl Aggregator<FakeTransport, RecordingSleeper> {
        fn fetcher_calls(&self) -> usize {
            self.fetcher.transport().calls.borrow().len()
        }
    }
}

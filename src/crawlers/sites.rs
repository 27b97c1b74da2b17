//! Job boards the pipeline knows how to collect from.

use crate::crawlers::listing::{ListingCollector, ListingSelectors};
use crate::crawlers::{CrawlerError, CrawlerResult, JobCollector, build_reqwest_client};
use crate::models::config::PipelineConfig;

pub const KNOWN_SOURCES: &[&str] = &["careersmw", "ntchito", "jobsearchmalawi"];

const NTCHITO_PAGES: usize = 2;

const CAREERSMW: ListingSelectors = ListingSelectors {
    card: &["article.job-card", "div.job-listing", "li.job"],
    link: &["a.job-card-title", "a.title", "a[href]"],
    company: &["span.job-card-company", "span.company"],
    location: &["li.job-card-location", "span.location"],
    job_type: &["li.job-card-type", "span.job-type"],
    excerpt: &["div.job-card-excerpt", "div.job-description", "p.excerpt"],
};

const NTCHITO: ListingSelectors = ListingSelectors {
    card: &["article.post", "div.job-listing", "li.job"],
    link: &["h2.entry-title a", "a.title", "a[href]"],
    company: &["span.company"],
    location: &["span.location"],
    job_type: &["span.job-type"],
    excerpt: &["div.entry-summary", "div.entry-content", "p.excerpt"],
};

const JOBSEARCHMALAWI: ListingSelectors = ListingSelectors {
    card: &["article.job-card", "div.job-listing", "li.job"],
    link: &["a.job-card-title", "a.title", "a[href]"],
    company: &["span.job-card-company", "span.company"],
    location: &["li.job-card-location", "span.location"],
    job_type: &["li.job-card-type", "span.job-type"],
    excerpt: &["div.job-card-excerpt", "p.excerpt"],
};

/// Build the collector registered under `name`.
pub fn build_collector(name: &str, config: &PipelineConfig) -> CrawlerResult<Box<dyn JobCollector>> {
    let client = build_reqwest_client(config.request_timeout())?;
    let concurrency = config.collector_concurrency;

    let collector = match name {
        "careersmw" => ListingCollector::new(
            "careersmw.com",
            "https://careersmw.com/",
            vec!["https://careersmw.com/jobs/".to_string()],
            &CAREERSMW,
            client,
            concurrency,
        )?,
        "ntchito" => ListingCollector::new(
            "ntchito.com",
            "https://ntchito.com/",
            (1..=NTCHITO_PAGES)
                .map(|page| format!("https://ntchito.com/page/{page}/"))
                .collect(),
            &NTCHITO,
            client,
            concurrency,
        )?,
        "jobsearchmalawi" => ListingCollector::new(
            "jobsearchmalawi.com",
            "https://jobsearchmalawi.com/",
            vec!["https://jobsearchmalawi.com/".to_string()],
            &JOBSEARCHMALAWI,
            client,
            concurrency,
        )?,
        _ => return Err(CrawlerError::Build(format!("Unknown crawler: {name}"))),
    };

    Ok(Box::new(collector))
}

/// Collectors for every configured source, in configuration order.
pub fn build_collectors(config: &PipelineConfig) -> CrawlerResult<Vec<Box<dyn JobCollector>>> {
    config
        .sources
        .iter()
        .map(|name| build_collector(name, config))
        .collect()
}

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use html_escape::decode_html_entities;
use scraper::{ElementRef, Html, Selector};
use tokio::sync::Semaphore;
use url::Url;

use crate::crawlers::{CrawlerError, CrawlerResult, JobCollector};
use crate::domain::posting::RawJobRecord;

/// Placeholder stored for listing fields a card does not show.
pub const MISSING_FIELD: &str = "N/A";

/// CSS selectors for one job board, each tried in order until one matches.
pub struct ListingSelectors {
    pub card: &'static [&'static str],
    pub link: &'static [&'static str],
    pub company: &'static [&'static str],
    pub location: &'static [&'static str],
    pub job_type: &'static [&'static str],
    pub excerpt: &'static [&'static str],
}

struct CompiledSelectors {
    card: Vec<Selector>,
    link: Vec<Selector>,
    company: Vec<Selector>,
    location: Vec<Selector>,
    job_type: Vec<Selector>,
    excerpt: Vec<Selector>,
}

fn compile(selectors: &[&str]) -> CrawlerResult<Vec<Selector>> {
    selectors
        .iter()
        .map(|selector| {
            Selector::parse(selector).map_err(|e| CrawlerError::Selector {
                selector: selector.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

impl CompiledSelectors {
    fn new(selectors: &ListingSelectors) -> CrawlerResult<Self> {
        Ok(Self {
            card: compile(selectors.card)?,
            link: compile(selectors.link)?,
            company: compile(selectors.company)?,
            location: compile(selectors.location)?,
            job_type: compile(selectors.job_type)?,
            excerpt: compile(selectors.excerpt)?,
        })
    }
}

/// Decode leftover entities and collapse whitespace.
fn clean_text(raw: &str) -> String {
    decode_html_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_match<'a>(element: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| element.select(selector).next())
}

fn text_of(element: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    first_match(element, selectors)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

/// Collector for boards that list every posting as a card on one or more
/// listing pages.
pub struct ListingCollector {
    source: String,
    base_url: Url,
    pages: Vec<String>,
    selectors: CompiledSelectors,
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl ListingCollector {
    /// Creates a collector for `pages`, resolving links against `base_url`.
    ///
    /// `concurrency` controls how many page requests may be in flight at the
    /// same time.
    pub fn new(
        source: &str,
        base_url: &str,
        pages: Vec<String>,
        selectors: &ListingSelectors,
        client: reqwest::Client,
        concurrency: usize,
    ) -> CrawlerResult<Self> {
        Ok(Self {
            source: source.to_string(),
            base_url: Url::parse(base_url).map_err(|e| CrawlerError::Build(e.to_string()))?,
            pages,
            selectors: CompiledSelectors::new(selectors)?,
            client,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        })
    }

    /// Fetches a listing page body.
    ///
    /// A permit from the internal [`Semaphore`] is acquired before issuing
    /// the request, enforcing the configured concurrency limit.
    async fn fetch_page(&self, url: &str) -> CrawlerResult<String> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| CrawlerError::Build(e.to_string()))?;

        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlerError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        if !res.status().is_success() {
            return Err(CrawlerError::Status {
                url: url.to_string(),
                status: res.status().as_u16(),
            });
        }

        res.text().await.map_err(|e| CrawlerError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Extracts every job card of a listing page.
    pub fn parse_listing(&self, html: &str, date_posted: NaiveDate) -> Vec<RawJobRecord> {
        let document = Html::parse_document(html);

        let cards = self
            .selectors
            .card
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|cards| !cards.is_empty())
            .unwrap_or_default();

        if cards.is_empty() {
            log::warn!("No job cards found on a {} listing page", self.source);
        }

        cards
            .into_iter()
            .filter_map(|card| self.parse_card(card, date_posted))
            .collect()
    }

    fn parse_card(&self, card: ElementRef<'_>, date_posted: NaiveDate) -> Option<RawJobRecord> {
        let Some(link) = first_match(card, &self.selectors.link) else {
            log::warn!("Skipping {} card without a title link", self.source);
            return None;
        };

        let title = clean_text(&link.text().collect::<String>());
        let url = link
            .value()
            .attr("href")
            .and_then(|href| self.base_url.join(href.trim()).ok())
            .map(|url| url.to_string());
        if url.is_none() {
            log::warn!("Missing job URL for job: {title}");
        }

        let or_missing = |value: Option<String>| value.unwrap_or_else(|| MISSING_FIELD.to_string());

        Some(RawJobRecord {
            title: if title.is_empty() { MISSING_FIELD.to_string() } else { title },
            company: or_missing(text_of(card, &self.selectors.company)),
            location: or_missing(text_of(card, &self.selectors.location)),
            job_type: or_missing(text_of(card, &self.selectors.job_type)),
            date_posted,
            url,
            source: self.source.clone(),
            description: text_of(card, &self.selectors.excerpt).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl JobCollector for ListingCollector {
    fn source(&self) -> &str {
        &self.source
    }

    /// Fetches all listing pages concurrently and returns the cards found,
    /// keeping the first card seen for each url.
    async fn collect(&self) -> CrawlerResult<Vec<RawJobRecord>> {
        let tasks = self.pages.iter().map(|page| async move {
            log::info!("Scraping {} page: {page}", self.source);
            self.fetch_page(page).await
        });
        let pages = futures::future::join_all(tasks).await;

        let today = Utc::now().date_naive();
        let mut records = Vec::new();
        for page in pages {
            records.extend(self.parse_listing(&page?, today));
        }

        let mut seen_urls = HashSet::new();
        records.retain(|record| match &record.url {
            Some(url) => seen_urls.insert(url.clone()),
            None => true,
        });

        log::info!("Parsed {} jobs from {}", records.len(), self.source);
        Ok(records)
    }
}

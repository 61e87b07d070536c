//! Scrape operation façade
//!
//! One public entry point per catalog attribute. Each call allocates an
//! operation record, drives one pagination stream per sub-category
//! sequentially, and hands the collected raw nodes to an [`Extractor`].
//!
//! # Example
//!
//! ```no_run
//! use reel_harvest::config::Config;
//! use reel_harvest::scrape::{RawNodes, Scraper};
//!
//! # async fn run() -> reel_harvest::Result<()> {
//! let scraper = Scraper::from_config(Config::default())?;
//! if let Some(scraped) = scraper.filming_dates("tt0068646", None, &RawNodes).await {
//!     println!("{} filming dates", scraped.node_count());
//! }
//! # Ok(())
//! # }
//! ```

mod extractor;

pub use extractor::{Attribute, Batch, Extractor, RawNodes, Scraped};

use crate::cache::SourceCache;
use crate::catalog::{
    AjaxListing, AwardEvent, CompanyCreditCategory, ConnectionCategory, JsonQuery, Operation,
    Parameter,
};
use crate::config::{load_config_with_hash, load_queries, Config, QueryTable};
use crate::paginate::{Pagination, Paginator, RawNode};
use crate::progress::ProgressTree;
use crate::transport::{HttpClient, ReqwestClient, Transport};
use crate::ScrapeError;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Public entry point for gathering catalog attributes
pub struct Scraper {
    config: Config,
    config_hash: Option<String>,
    transport: Transport,
    cache: SourceCache,
    progress: Arc<ProgressTree>,
    cancel: CancellationToken,
}

impl Scraper {
    /// Creates a scraper from its collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - Site, identity and pagination settings
    /// * `client` - Raw HTTP client
    /// * `queries` - Persisted-query table
    /// * `progress` - Progress tree receiving every operation
    pub fn new(
        config: Config,
        client: Arc<dyn HttpClient>,
        queries: QueryTable,
        progress: Arc<ProgressTree>,
    ) -> Result<Self, ScrapeError> {
        let transport = Transport::new(client, queries, &config)?;
        Ok(Self {
            config,
            config_hash: None,
            transport,
            cache: SourceCache::new(),
            progress,
            cancel: CancellationToken::new(),
        })
    }

    /// Creates a scraper with a reqwest client and the configured query table
    pub fn from_config(config: Config) -> Result<Self, ScrapeError> {
        let client = ReqwestClient::from_config(&config)?;
        let queries = load_queries(&config)?;
        Self::new(config, Arc::new(client), queries, Arc::new(ProgressTree::new()))
    }

    /// Loads a TOML configuration file and creates a scraper from it
    ///
    /// The file's SHA-256 hash is logged and kept, so diagnostics can tell
    /// which configuration produced a given progress history.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Scraper)` - Ready to use
    /// * `Err(ScrapeError)` - The file could not be read, parsed or validated
    pub fn from_config_file(path: &Path) -> Result<Self, ScrapeError> {
        let (config, hash) = load_config_with_hash(path)?;
        tracing::info!(path = %path.display(), config_hash = %hash, "Configuration loaded");

        let mut scraper = Self::from_config(config)?;
        scraper.config_hash = Some(hash);
        Ok(scraper)
    }

    /// Stops pagination between pages once the token is cancelled
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Progress tree holding every operation this scraper has run
    pub fn progress(&self) -> &Arc<ProgressTree> {
        &self.progress
    }

    /// Source cache shared by every call on this scraper
    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hash of the configuration file, when built by [`Scraper::from_config_file`]
    pub fn config_hash(&self) -> Option<&str> {
        self.config_hash.as_deref()
    }

    /// Gathers every filming date of a title
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Catalog key such as `tt0068646`
    /// * `max_pages` - Page cap; `None` uses the configured default, 0 is unbounded
    /// * `extractor` - Turns the raw nodes into the caller's record
    ///
    /// # Returns
    ///
    /// The extractor's result, or `None` when nothing was fetched
    pub async fn filming_dates<T>(
        &self,
        entity_id: &str,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        self.json_stream(
            entity_id,
            Attribute::FilmingDates,
            Operation::FilmingDates,
            max_pages,
            extractor,
        )
        .await
    }

    /// Gathers every filming location of a title; arguments as in [`Scraper::filming_dates`]
    pub async fn filming_locations<T>(
        &self,
        entity_id: &str,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        self.json_stream(
            entity_id,
            Attribute::FilmingLocations,
            Operation::FilmingLocations,
            max_pages,
            extractor,
        )
        .await
    }

    /// Gathers news items; arguments as in [`Scraper::filming_dates`]
    pub async fn news<T>(
        &self,
        entity_id: &str,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        self.json_stream(entity_id, Attribute::News, Operation::News, max_pages, extractor)
            .await
    }

    /// Gathers quotes; arguments as in [`Scraper::filming_dates`]
    pub async fn quotes<T>(
        &self,
        entity_id: &str,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        self.json_stream(entity_id, Attribute::Quotes, Operation::Quotes, max_pages, extractor)
            .await
    }

    /// Gathers trivia; arguments as in [`Scraper::filming_dates`]
    pub async fn trivia<T>(
        &self,
        entity_id: &str,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        self.json_stream(entity_id, Attribute::Trivia, Operation::Trivia, max_pages, extractor)
            .await
    }

    /// Gathers goofs; arguments as in [`Scraper::filming_dates`]
    pub async fn goofs<T>(
        &self,
        entity_id: &str,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        self.json_stream(entity_id, Attribute::Goofs, Operation::Goofs, max_pages, extractor)
            .await
    }

    /// All 14 connection categories, one stream each
    pub async fn connections<T>(
        &self,
        entity_id: &str,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        self.connections_in(entity_id, &ConnectionCategory::all(), extractor)
            .await
    }

    /// Selected connection categories, fetched one after another
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Catalog key of the title
    /// * `categories` - Categories to fetch, in request order
    /// * `extractor` - Receives one [`Batch`] per category
    ///
    /// # Returns
    ///
    /// The extractor's result, or `None` when no category yielded anything.
    /// A failing category leaves an empty batch; the others are kept.
    pub async fn connections_in<T>(
        &self,
        entity_id: &str,
        categories: &[ConnectionCategory],
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        let streams = categories
            .iter()
            .map(|category| {
                (
                    category.label().to_string(),
                    Pagination::Cursor(JsonQuery::with_parameter(
                        Operation::Connections,
                        Parameter::Connection(*category),
                    )),
                )
            })
            .collect();
        self.run(entity_id, Attribute::Connections, streams, None, extractor)
            .await
    }

    /// All company credit categories, one stream each
    pub async fn company_credits<T>(
        &self,
        entity_id: &str,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        self.company_credits_in(entity_id, &CompanyCreditCategory::all(), extractor)
            .await
    }

    /// Selected company credit categories; see [`Scraper::connections_in`]
    pub async fn company_credits_in<T>(
        &self,
        entity_id: &str,
        categories: &[CompanyCreditCategory],
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        let streams = categories
            .iter()
            .map(|category| {
                (
                    category.label().to_string(),
                    Pagination::Cursor(JsonQuery::with_parameter(
                        Operation::CompanyCredits,
                        Parameter::CompanyCredit(*category),
                    )),
                )
            })
            .collect();
        self.run(entity_id, Attribute::CompanyCredits, streams, None, extractor)
            .await
    }

    /// Award nominations, one stream per award ceremony
    ///
    /// An empty `events` slice makes no request and yields `None`.
    pub async fn awards<T>(
        &self,
        entity_id: &str,
        events: &[AwardEvent],
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        let streams = events
            .iter()
            .map(|event| {
                (
                    event.to_string(),
                    Pagination::Cursor(JsonQuery::with_parameter(
                        Operation::Awards,
                        Parameter::AwardEvent(event.clone()),
                    )),
                )
            })
            .collect();
        self.run(entity_id, Attribute::Awards, streams, None, extractor)
            .await
    }

    /// User reviews, following continuation keys
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Catalog key of the title
    /// * `max_pages` - Page cap; `None` uses the configured default, 0 is unbounded
    /// * `extractor` - Receives the pruned HTML fragments in page order
    pub async fn reviews<T>(
        &self,
        entity_id: &str,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        let streams = vec![(
            AjaxListing::Reviews.label().to_string(),
            Pagination::Keyed(AjaxListing::Reviews),
        )];
        self.run(entity_id, Attribute::Reviews, streams, max_pages, extractor)
            .await
    }

    /// Episodes, one page per discovered season
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Catalog key of the series
    /// * `max_seasons` - Season cap; `None` uses the configured default, 0 is unbounded
    /// * `extractor` - Receives one pruned HTML page per season
    pub async fn episodes<T>(
        &self,
        entity_id: &str,
        max_seasons: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        let streams = vec![(
            AjaxListing::Episodes.label().to_string(),
            Pagination::Counted(AjaxListing::Episodes),
        )];
        self.run(entity_id, Attribute::Episodes, streams, max_seasons, extractor)
            .await
    }

    /// A single pruned HTML page, e.g. `""` for the main page or `releaseinfo`
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Catalog key of the entity
    /// * `page` - Sub-path below the entity page
    /// * `extractor` - Receives one batch holding the page, if it was fetched
    pub async fn page<T>(
        &self,
        entity_id: &str,
        page: &str,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        let operation = self
            .progress
            .start_operation(entity_id, Attribute::Page.description(), 1);

        let html = self.paginator().fetch_page(entity_id, page, operation).await;
        self.progress.finish_operation(operation);

        let scraped = Scraped {
            entity_id: entity_id.to_string(),
            attribute: Attribute::Page,
            batches: vec![Batch {
                label: page.to_string(),
                nodes: html.map(RawNode::Html).into_iter().collect(),
            }],
        };
        self.hand_off(scraped, extractor)
    }

    fn paginator(&self) -> Paginator<'_> {
        Paginator::new(&self.transport, &self.cache, &self.progress, &self.config)
            .with_cancellation(self.cancel.clone())
    }

    async fn json_stream<T>(
        &self,
        entity_id: &str,
        attribute: Attribute,
        operation: Operation,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        let streams = vec![(
            operation.label().to_string(),
            Pagination::Cursor(JsonQuery::new(operation)),
        )];
        self.run(entity_id, attribute, streams, max_pages, extractor)
            .await
    }

    /// Runs streams one after another under a single operation record
    async fn run<T>(
        &self,
        entity_id: &str,
        attribute: Attribute,
        streams: Vec<(String, Pagination)>,
        max_pages: Option<u32>,
        extractor: &impl Extractor<T>,
    ) -> Option<T> {
        let max_pages = max_pages.unwrap_or(self.config.pagination.default_max_pages);
        let total = u32::try_from(streams.len()).unwrap_or(u32::MAX);
        let operation = self
            .progress
            .start_operation(entity_id, attribute.description(), total);
        let paginator = self.paginator();

        let mut batches = Vec::with_capacity(streams.len());
        for (finished, (label, pagination)) in (1u32..).zip(streams) {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    entity = %entity_id,
                    attribute = %attribute,
                    "Operation cancelled"
                );
                break;
            }

            let nodes = paginator
                .paginate(entity_id, &pagination, max_pages, operation)
                .await;
            self.progress.update_operation(operation, finished, total);
            batches.push(Batch { label, nodes });
        }
        self.progress.finish_operation(operation);

        let scraped = Scraped {
            entity_id: entity_id.to_string(),
            attribute,
            batches,
        };

        if let Some(record) = self.progress.operation(operation) {
            tracing::info!(
                entity = %entity_id,
                attribute = %attribute,
                nodes = scraped.node_count(),
                elapsed_ms = record.duration().map(|d| d.num_milliseconds()).unwrap_or(0),
                "Operation finished"
            );
        }

        self.hand_off(scraped, extractor)
    }

    fn hand_off<T>(&self, scraped: Scraped, extractor: &impl Extractor<T>) -> Option<T> {
        if scraped.is_empty() {
            tracing::debug!(
                entity = %scraped.entity_id,
                attribute = %scraped.attribute,
                "No data"
            );
            return None;
        }
        extractor.extract(&scraped)
    }
}

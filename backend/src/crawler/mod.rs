//! Listing-site crawler producing the raw listings CSV.
//!
//! Pages are fetched one at a time: listing page, then each detail page
//! (and its location page when the heading links to one). The output
//! file is rewritten after every listing page so an interrupted crawl
//! keeps what it already has.

pub mod extract;

use reqwest::{Client, StatusCode};
use std::path::Path;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::{CrawlError, CrawlResult};
use crate::export::write_listings;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::RawListing;

pub use extract::{
    clean_amenity, is_listing_date, parse_detail_page, parse_list_page, parse_location_page,
    split_location, DetailPage, ListingStub, LocationSource, NOT_AVAILABLE,
};

/// Sequential HTTP crawler over the paginated listing index.
pub struct Crawler {
    client: Client,
    config: CrawlConfig,
    origin: Url,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> CrawlResult<Self> {
        let origin = Url::parse(&config.site_origin)?;
        let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Self { client, config, origin })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// URL of listing page `page` (1-based).
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            self.config.base_url.clone()
        } else {
            format!("{}?page={}", self.config.base_url, page)
        }
    }

    /// Resolve a link from the markup against the site origin.
    pub fn resolve(&self, href: &str) -> CrawlResult<Url> {
        Ok(self.origin.join(href)?)
    }

    async fn fetch(&self, url: &str) -> CrawlResult<String> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(CrawlError::BadStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Crawl until the site runs out of pages or `max_pages` is reached.
    ///
    /// `on_page` receives all listings collected so far after each page.
    pub async fn crawl<F>(&self, mut on_page: F) -> CrawlResult<Vec<RawListing>>
    where
        F: FnMut(&[RawListing]) -> CrawlResult<()>,
    {
        let mut listings = Vec::new();
        let mut page = 1;

        loop {
            if self.config.max_pages.is_some_and(|max| page > max) {
                log_info(format!("Reached page limit ({})", page - 1));
                break;
            }

            let url = self.page_url(page);
            log_info(format!("🌐 Scraping page {}: {}", page, url));

            let html = match self.fetch(&url).await {
                Ok(html) => html,
                Err(CrawlError::BadStatus { status, .. }) => {
                    log_warning(format!("Failed to fetch page {} (status {})", page, status));
                    break;
                }
                Err(e) => return Err(e),
            };

            let Some(stubs) = parse_list_page(&html)? else {
                log_info("No more listings found");
                break;
            };

            for stub in &stubs {
                if let Some(listing) = self.scrape_listing(stub).await? {
                    listings.push(listing);
                }
            }

            on_page(&listings)?;
            log_success(format!("Page {} done, {} listings so far", page, listings.len()));
            page += 1;
        }

        Ok(listings)
    }

    /// Fetch and extract one detail page. Failed fetches are skipped.
    async fn scrape_listing(&self, stub: &ListingStub) -> CrawlResult<Option<RawListing>> {
        let Some(href) = stub.detail_href.as_deref() else {
            log_warning(format!("'{}' has no detail link, skipping", stub.heading));
            return Ok(None);
        };
        for date in [&stub.listed_date, &stub.updated_date] {
            if !is_listing_date(date) {
                log_warning(format!("'{}': unexpected date format '{}'", stub.heading, date));
            }
        }

        let url = self.resolve(href)?;
        let html = match self.fetch(url.as_str()).await {
            Ok(html) => html,
            Err(e @ (CrawlError::BadStatus { .. } | CrawlError::RequestFailed(_))) => {
                log_warning(format!("Skipping {}: {}", url, e));
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let detail = parse_detail_page(&html)?;
        let location = match &detail.location {
            LocationSource::Text(text) => text.clone(),
            LocationSource::Link(href) => self.fetch_location(href).await?,
            LocationSource::Missing => NOT_AVAILABLE.to_string(),
        };
        log_info_indent(format!("{} ({})", detail.property_name, location), 1);

        Ok(Some(detail.into_listing(stub, location)))
    }

    async fn fetch_location(&self, href: &str) -> CrawlResult<String> {
        let url = self.resolve(href)?;
        match self.fetch(url.as_str()).await {
            Ok(html) => Ok(parse_location_page(&html)?.unwrap_or_else(|| NOT_AVAILABLE.to_string())),
            Err(e @ (CrawlError::BadStatus { .. } | CrawlError::RequestFailed(_))) => {
                log_warning(format!("Location page {} unavailable: {}", url, e));
                Ok(NOT_AVAILABLE.to_string())
            }
            Err(e) => Err(e),
        }
    }
}

/// Crawl into a listings CSV at `output`. Returns the listing count.
pub async fn crawl_to_csv(config: CrawlConfig, output: &Path) -> CrawlResult<usize> {
    let crawler = Crawler::new(config)?;
    let listings = crawler
        .crawl(|so_far| {
            write_listings(so_far, output)?;
            Ok(())
        })
        .await?;

    log_success(format!("Saved {} listings to {}", listings.len(), output.display()));
    Ok(listings.len())
}

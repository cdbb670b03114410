// src/fetch.rs
//
// Session (browser + cookie-carrying HTTP client) and page fetching.

use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::config::{Engine, SessionOptions};
use crate::core::browser::BrowserSession;
use crate::core::net::{HttpClient, RetryPolicy, with_retry};
use crate::error::FetchError;
use crate::specs::ListingSpec;

/// Browser handle (when one is used) plus the HTTP client carrying the
/// browser's cookies. Chrome is closed when the context drops.
pub struct SessionContext {
    engine: Engine,
    table_wait: Duration,
    browser: Option<BrowserSession>,
    http: HttpClient,
}

impl SessionContext {
    /// Session for crawling the listing.
    ///
    /// Chrome is started for the browser engine, or whenever a profile is
    /// reused; in the latter case the profile's cookies for `site` are copied
    /// into the HTTP client once, up front. With the HTTP engine Chrome is
    /// closed right after that.
    pub fn open(opts: &SessionOptions, site: &Url) -> Result<Self, FetchError> {
        let http = HttpClient::new(&opts.user_agent, opts.timeout)?;
        let mut ctx = Self { engine: opts.engine, table_wait: opts.table_wait, browser: None, http };

        if opts.engine == Engine::Browser || opts.reuses_profile() {
            ctx.browser = Some(BrowserSession::launch(opts)?);
            if opts.reuses_profile() {
                ctx.visit(site)?;
                ctx.sync_cookies(site)?;
            }
            if opts.engine == Engine::Http {
                ctx.browser = None;
                debug!("chrome closed, continuing over plain HTTP");
            }
        }
        Ok(ctx)
    }

    /// Session that always keeps a browser, whatever the engine setting.
    pub fn open_browser(opts: &SessionOptions) -> Result<Self, FetchError> {
        let http = HttpClient::new(&opts.user_agent, opts.timeout)?;
        let browser = BrowserSession::launch(opts)?;
        Ok(Self { engine: Engine::Browser, table_wait: opts.table_wait, browser: Some(browser), http })
    }

    pub fn browser(&self) -> Option<&BrowserSession> {
        self.browser.as_ref()
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn visit(&self, url: &Url) -> Result<String, FetchError> {
        match &self.browser {
            Some(b) => b.render(url.as_str(), None, Duration::ZERO),
            None => self.http.get_text(url.as_str()),
        }
    }

    /// Copy the browser's cookies for `url` into the HTTP client.
    pub fn sync_cookies(&self, url: &Url) -> Result<usize, FetchError> {
        let Some(b) = &self.browser else { return Ok(0) };
        let cookies = b.cookies()?;
        self.http.add_cookies(&cookies, url);
        info!(count = cookies.len(), "browser cookies loaded into HTTP session");
        Ok(cookies.len())
    }

    /// One attempt at `url`, rendered or plain depending on the engine.
    pub fn fetch_markup(&self, url: &str, wait_for: Option<&str>) -> Result<String, FetchError> {
        match (&self.browser, self.engine) {
            (Some(b), Engine::Browser) => b.render(url, wait_for, self.table_wait),
            _ => self.http.get_text(url),
        }
    }
}

/// Where listing pages come from. The crawl loop only sees this trait.
pub trait PageSource {
    fn fetch(&mut self, page: u32) -> Result<String, FetchError>;
}

/// Live `PageSource`: builds the page URL and retries transient failures.
pub struct PageFetcher<'a> {
    session: &'a SessionContext,
    spec: &'a ListingSpec,
    retry: RetryPolicy,
}

impl<'a> PageFetcher<'a> {
    pub fn new(session: &'a SessionContext, spec: &'a ListingSpec, retry: RetryPolicy) -> Self {
        Self { session, spec, retry }
    }
}

impl PageSource for PageFetcher<'_> {
    fn fetch(&mut self, page: u32) -> Result<String, FetchError> {
        let url = self.spec.page_url(page);
        debug!(page, %url, "fetching");
        let session = self.session;
        let wait_for = self.spec.table_selector.as_str();
        with_retry(self.retry, &url, || session.fetch_markup(&url, Some(wait_for)))
    }
}

// src/core/browser.rs
//
// Chrome session for pages that only exist after JavaScript runs.
// One browser and one tab per run; pages load sequentially in that tab.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info};

use super::net::BrowserCookie;
use crate::config::SessionOptions;
use crate::config::consts::ACCEPT_LANGUAGE;
use crate::error::FetchError;

pub struct BrowserSession {
    // Dropping the browser closes Chrome; keep it alive with the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    pub fn launch(opts: &SessionOptions) -> Result<Self, FetchError> {
        let profile_arg = opts
            .chrome_profile_dir
            .as_deref()
            .map(|p| format!("--profile-directory={p}"));

        let mut args: Vec<&OsStr> = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--no-first-run"),
            OsStr::new("--no-default-browser-check"),
        ];
        if let Some(arg) = profile_arg.as_deref() {
            args.push(OsStr::new(arg));
        }

        let launch = LaunchOptions::default_builder()
            .headless(opts.headless)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .user_data_dir(opts.chrome_user_data_dir.clone())
            .idle_browser_timeout(opts.timeout.max(Duration::from_secs(60)) * 4)
            .args(args)
            .build()
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        let browser = Browser::new(launch).map_err(|e| FetchError::Launch(e.to_string()))?;
        let tab = browser.new_tab().map_err(|e| FetchError::Launch(e.to_string()))?;
        tab.set_default_timeout(opts.timeout);
        tab.set_user_agent(&opts.user_agent, Some(ACCEPT_LANGUAGE), None)
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        info!(
            headless = opts.headless,
            profile = opts.chrome_user_data_dir.is_some(),
            "chrome started"
        );
        Ok(Self { _browser: browser, tab })
    }

    /// Load `url` and return the rendered document. When `wait_for` is set
    /// the tab waits up to `wait` for that selector; a page where it never
    /// shows up is still returned (the parser reports what is missing).
    pub fn render(&self, url: &str, wait_for: Option<&str>, wait: Duration) -> Result<String, FetchError> {
        self.tab
            .navigate_to(url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| FetchError::navigation(url, e))?;

        if let Some(sel) = wait_for {
            if let Err(e) = self.tab.wait_for_element_with_custom_timeout(sel, wait) {
                debug!(%url, selector = sel, error = %e, "element did not appear");
            }
        }

        self.tab.get_content().map_err(|e| FetchError::navigation(url, e))
    }

    /// Cookies visible to the current page.
    pub fn cookies(&self) -> Result<Vec<BrowserCookie>, FetchError> {
        let url = self.tab.get_url();
        let cookies = self.tab.get_cookies().map_err(|e| FetchError::navigation(&url, e))?;
        Ok(cookies
            .into_iter()
            .map(|c| BrowserCookie { name: c.name, value: c.value, domain: c.domain, path: c.path })
            .collect())
    }

    /// Evaluate `js` in the page and return its result as a string.
    /// Non-string results are JSON-encoded.
    pub fn eval_string(&self, js: &str, await_promise: bool) -> Result<Option<String>, FetchError> {
        let url = self.tab.get_url();
        let obj = self.tab.evaluate(js, await_promise).map_err(|e| FetchError::navigation(&url, e))?;
        Ok(obj.value.and_then(|v| match v {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }))
    }
}

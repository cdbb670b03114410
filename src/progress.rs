// src/progress.rs
/// Progress reporting for the page loop.
/// The CLI implements this with a progress bar; library callers can ignore it.
pub trait Progress {
    /// Called once before the first page with the number of pages to fetch.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A page was fetched and parsed.
    fn page_done(&mut self, _page: u32, _rows: usize) {}

    /// A page was fetched but could not be parsed and was skipped.
    fn page_skipped(&mut self, _page: u32, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

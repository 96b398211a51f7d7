use crate::detector::ContainerDetector;
use crate::error::{Result, ScanError};
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::frontier::Frontier;
use crate::links::{LinkFilter, normalize_href};
use crate::result::{ContainerRecord, PageAudit};
use rand::Rng;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// What a worker should do after consulting the frontier.
enum NextStep {
    Fetch(Url),
    Wait,
    Done,
}

/// Drives the scan: seeds the frontier from the scoped hostnames, fans the
/// queue out over a worker pool and collects one `PageAudit` per page that
/// could be fetched and parsed.
///
/// All frontier access goes through one mutex, so the membership check and
/// the enqueue are a single atomic step and no URL can be handed to two
/// workers. A page's audit is pushed before its links are offered, so by the
/// time a link is dequeued the page that referred it has been fully recorded.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    frontier: Arc<Mutex<Frontier>>,
    audits: Arc<Mutex<Vec<PageAudit>>>,
    hostnames: Vec<String>,
    scope: Arc<HashSet<String>>,
    detector: Arc<ContainerDetector>,
    link_filter: Arc<LinkFilter>,
    progress_callback: Option<ProgressCallback>,
    max_delay_ms: u64,
}

impl Crawler {
    /// A crawler scoped to the given hostnames, fetching over HTTP.
    pub fn new(hostnames: Vec<String>) -> Self {
        Self::with_fetcher(hostnames, Arc::new(HttpFetcher::new()))
    }

    /// Same, but with a caller-supplied fetcher.
    pub fn with_fetcher(hostnames: Vec<String>, fetcher: Arc<dyn PageFetcher>) -> Self {
        let scope: HashSet<String> = hostnames.iter().cloned().collect();

        Self {
            fetcher,
            frontier: Arc::new(Mutex::new(Frontier::new())),
            audits: Arc::new(Mutex::new(Vec::new())),
            hostnames,
            scope: Arc::new(scope),
            detector: Arc::new(ContainerDetector::new()),
            link_filter: Arc::new(LinkFilter::new()),
            progress_callback: None,
            max_delay_ms: 0,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Sleep a random 0..=max_delay_ms before each fetch. Politeness only;
    /// zero disables the pause entirely.
    pub fn with_request_jitter(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub async fn crawl(&self, workers: usize) -> Result<Vec<PageAudit>> {
        let workers = workers.max(1);
        info!(
            "starting scan of {} hostname(s) with {} workers",
            self.hostnames.len(),
            workers
        );

        let seeded = {
            let mut frontier = self.frontier.lock().await;
            frontier.seed(&self.hostnames)
        };
        if seeded == 0 {
            return Err(ScanError::EmptySeed);
        }

        let mut worker_handles = Vec::new();

        for worker_id in 0..workers {
            let fetcher = self.fetcher.clone();
            let frontier = self.frontier.clone();
            let audits = self.audits.clone();
            let scope = self.scope.clone();
            let detector = self.detector.clone();
            let link_filter = self.link_filter.clone();
            let progress_cb = self.progress_callback.clone();
            let max_delay_ms = self.max_delay_ms;

            let handle = tokio::spawn(async move {
                debug!("worker {} started", worker_id);

                loop {
                    let step = {
                        let mut frontier = frontier.lock().await;
                        match frontier.dequeue() {
                            Some(url) => NextStep::Fetch(url),
                            None if frontier.is_idle() => NextStep::Done,
                            None => NextStep::Wait,
                        }
                    };

                    let url = match step {
                        NextStep::Fetch(url) => url,
                        NextStep::Wait => {
                            // Queue is empty but another worker still has a
                            // page in flight that may discover more links.
                            tokio::time::sleep(tokio::time::Duration::from_millis(25)).await;
                            continue;
                        }
                        NextStep::Done => break,
                    };

                    if max_delay_ms > 0 {
                        let pause = rand::rng().random_range(0..=max_delay_ms);
                        tokio::time::sleep(tokio::time::Duration::from_millis(pause)).await;
                    }

                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, url.to_string());
                    }

                    match fetcher.fetch(&url).await {
                        Ok(body) => {
                            let (containers, candidates) =
                                Self::process_document(&body, &url, &scope, &detector, &link_filter);

                            {
                                let mut audits = audits.lock().await;
                                audits.push(PageAudit::new(url.to_string(), containers));
                            }

                            // mark_checked and the offers share one lock
                            // acquisition so the page is terminal before any
                            // of its links become visible to other workers.
                            let mut frontier = frontier.lock().await;
                            frontier.mark_checked(url);
                            for candidate in candidates {
                                frontier.offer(candidate);
                            }
                        }
                        Err(e) => {
                            warn!("scan error for {}: {}", url, e);
                            let mut frontier = frontier.lock().await;
                            frontier.mark_errored(url);
                        }
                    }
                }

                debug!("worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        for handle in worker_handles {
            handle.await?;
        }

        let audits = self.audits.lock().await;
        info!("scan complete, {} page(s) checked", audits.len());
        Ok(audits.clone())
    }

    /// Parse once, pull out both the containers and the next crawl
    /// candidates. Synchronous on purpose: the parsed document never crosses
    /// an await point.
    fn process_document(
        body: &str,
        page: &Url,
        scope: &HashSet<String>,
        detector: &ContainerDetector,
        link_filter: &LinkFilter,
    ) -> (Vec<ContainerRecord>, Vec<Url>) {
        let document = Html::parse_document(body);
        let containers = detector.detect(&document);

        let anchor_selector = Selector::parse("a[href]").unwrap();
        let mut candidates = Vec::new();

        for element in document.select(&anchor_selector) {
            if let Some(href) = element.value().attr("href")
                && link_filter.is_navigable(href)
                && let Some(candidate) = normalize_href(href, page)
                && candidate
                    .host_str()
                    .is_some_and(|host| scope.contains(host))
            {
                candidates.push(candidate);
            }
        }

        (containers, candidates)
    }

    pub async fn get_audits(&self) -> Vec<PageAudit> {
        self.audits.lock().await.clone()
    }

    pub async fn get_checked_count(&self) -> usize {
        self.frontier.lock().await.checked_count()
    }

    pub async fn get_errored_count(&self) -> usize {
        self.frontier.lock().await.errored_count()
    }

    pub async fn get_errored_urls(&self) -> Vec<String> {
        self.frontier.lock().await.errored_urls()
    }
}

use std::collections::{HashSet, VecDeque};
use tracing::warn;
use url::Url;

/// Crawl bookkeeping: what is waiting, what is done, what failed.
///
/// A URL moves through exactly one lifecycle: offered once into `queued`,
/// popped in FIFO order, then retired into either `checked` or `errored`.
/// The `seen` set holds every URL that was ever accepted, including those
/// currently in flight between `dequeue` and `mark_*`, so a URL can never be
/// queued a second time no matter how many pages link to it.
#[derive(Debug, Default)]
pub struct Frontier {
    queued: VecDeque<Url>,
    seen: HashSet<Url>,
    checked: HashSet<Url>,
    errored: HashSet<Url>,
    in_flight: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the https root of every hostname. Returns how many were
    /// accepted; hostnames that do not parse into a URL are skipped.
    pub fn seed(&mut self, hostnames: &[String]) -> usize {
        let mut seeded = 0;
        for hostname in hostnames {
            let root = format!("https://{}/", hostname);
            match Url::parse(&root) {
                Ok(url) if url.host_str().is_some() => {
                    if self.offer(url) {
                        seeded += 1;
                    }
                }
                _ => warn!("skipping unusable hostname: {}", hostname),
            }
        }
        seeded
    }

    /// Test-and-insert: queue the URL unless it was ever seen before.
    /// Callers normalize and scope-check first; this only guards uniqueness.
    pub fn offer(&mut self, url: Url) -> bool {
        if self.seen.insert(url.clone()) {
            self.queued.push_back(url);
            true
        } else {
            false
        }
    }

    /// Pop the oldest queued URL. `None` means the queue is empty, which is
    /// the loop-termination signal rather than an error. The popped URL is
    /// counted as in flight until `mark_checked` or `mark_errored` retires
    /// it.
    pub fn dequeue(&mut self) -> Option<Url> {
        let url = self.queued.pop_front()?;
        self.in_flight += 1;
        Some(url)
    }

    pub fn mark_checked(&mut self, url: Url) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.checked.insert(url);
    }

    pub fn mark_errored(&mut self, url: Url) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.errored.insert(url);
    }

    /// Nothing queued and nothing in flight: the crawl is over.
    pub fn is_idle(&self) -> bool {
        self.queued.is_empty() && self.in_flight == 0
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    pub fn errored_count(&self) -> usize {
        self.errored.len()
    }

    pub fn is_checked(&self, url: &Url) -> bool {
        self.checked.contains(url)
    }

    pub fn is_errored(&self, url: &Url) -> bool {
        self.errored.contains(url)
    }

    pub fn errored_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.errored.iter().map(|u| u.to_string()).collect();
        urls.sort();
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_seed_queues_https_roots_in_input_order() {
        let mut frontier = Frontier::new();
        let seeded = frontier.seed(&["example.com".to_string(), "shop.example.com".to_string()]);

        assert_eq!(seeded, 2);
        assert_eq!(frontier.dequeue(), Some(url("https://example.com/")));
        assert_eq!(frontier.dequeue(), Some(url("https://shop.example.com/")));
        assert_eq!(frontier.dequeue(), None);
    }

    #[test]
    fn test_seed_skips_unusable_hostnames() {
        let mut frontier = Frontier::new();
        let seeded = frontier.seed(&["not a host".to_string(), "example.com".to_string()]);

        assert_eq!(seeded, 1);
        assert_eq!(frontier.queued_count(), 1);
    }

    #[test]
    fn test_offer_is_fifo() {
        let mut frontier = Frontier::new();
        frontier.offer(url("https://example.com/a"));
        frontier.offer(url("https://example.com/b"));

        assert_eq!(frontier.dequeue(), Some(url("https://example.com/a")));
        assert_eq!(frontier.dequeue(), Some(url("https://example.com/b")));
    }

    #[test]
    fn test_offer_rejects_duplicates() {
        let mut frontier = Frontier::new();
        assert!(frontier.offer(url("https://example.com/page")));
        assert!(!frontier.offer(url("https://example.com/page")));
        assert_eq!(frontier.queued_count(), 1);
    }

    #[test]
    fn test_checked_url_is_never_requeued() {
        let mut frontier = Frontier::new();
        frontier.offer(url("https://example.com/page"));
        let popped = frontier.dequeue().unwrap();
        frontier.mark_checked(popped);

        assert!(!frontier.offer(url("https://example.com/page")));
        assert_eq!(frontier.queued_count(), 0);
    }

    #[test]
    fn test_errored_url_is_never_requeued() {
        let mut frontier = Frontier::new();
        frontier.offer(url("https://example.com/broken"));
        let popped = frontier.dequeue().unwrap();
        frontier.mark_errored(popped);

        assert!(!frontier.offer(url("https://example.com/broken")));
        assert!(frontier.is_errored(&url("https://example.com/broken")));
    }

    #[test]
    fn test_in_flight_url_is_never_requeued() {
        let mut frontier = Frontier::new();
        frontier.offer(url("https://example.com/page"));
        let _held = frontier.dequeue().unwrap();

        // Another page links back to the URL while it is being fetched.
        assert!(!frontier.offer(url("https://example.com/page")));
        assert!(!frontier.is_idle());
    }

    #[test]
    fn test_terminal_sets_stay_disjoint() {
        let mut frontier = Frontier::new();
        frontier.offer(url("https://example.com/ok"));
        frontier.offer(url("https://example.com/bad"));

        let ok = frontier.dequeue().unwrap();
        frontier.mark_checked(ok);
        let bad = frontier.dequeue().unwrap();
        frontier.mark_errored(bad);

        assert!(frontier.is_checked(&url("https://example.com/ok")));
        assert!(!frontier.is_errored(&url("https://example.com/ok")));
        assert!(frontier.is_errored(&url("https://example.com/bad")));
        assert!(!frontier.is_checked(&url("https://example.com/bad")));
    }

    #[test]
    fn test_idle_only_after_last_mark() {
        let mut frontier = Frontier::new();
        frontier.offer(url("https://example.com/"));
        assert!(!frontier.is_idle());

        let popped = frontier.dequeue().unwrap();
        assert!(!frontier.is_idle()); // queue empty but fetch outstanding

        frontier.mark_checked(popped);
        assert!(frontier.is_idle());
    }

    #[test]
    fn test_errored_urls_are_sorted_for_stable_output() {
        let mut frontier = Frontier::new();
        for path in ["/z", "/a", "/m"] {
            frontier.offer(url(&format!("https://example.com{}", path)));
            let popped = frontier.dequeue().unwrap();
            frontier.mark_errored(popped);
        }

        assert_eq!(
            frontier.errored_urls(),
            vec![
                "https://example.com/a",
                "https://example.com/m",
                "https://example.com/z"
            ]
        );
    }
}

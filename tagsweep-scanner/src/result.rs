use serde::{Deserialize, Serialize};

/// One GTM container found on a page, with where it was wired in.
///
/// `in_head` and `in_body` are independent: a correctly installed container
/// has the loader script in the head and the noscript iframe in the body, so
/// both flags are true. Either one alone usually means a half-finished
/// installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: String,
    pub in_head: bool,
    pub in_body: bool,
}

/// The audit outcome for a single checked page.
///
/// An empty `containers` list means the page was fetched and inspected and no
/// container was found, which is different from the page never having been
/// checked at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAudit {
    pub url: String,
    pub containers: Vec<ContainerRecord>,
}

impl PageAudit {
    pub fn new(url: String, containers: Vec<ContainerRecord>) -> Self {
        Self { url, containers }
    }
}

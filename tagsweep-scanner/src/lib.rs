pub mod crawler;
pub mod detector;
pub mod error;
pub mod fetcher;
pub mod frontier;
pub mod links;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use detector::ContainerDetector;
pub use error::ScanError;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use frontier::Frontier;
pub use result::{ContainerRecord, PageAudit};

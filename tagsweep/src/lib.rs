// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    load_hostnames_from_file,
    load_hostnames_from_source,
    parse_hostname_line,
};

// Re-export scan functionality from tagsweep-core
pub use tagsweep_core::crawl::{
    CrawlOptions, CrawlProgressCallback, CrawlRun, execute_crawl, extract_url_path,
    generate_crawl_summary,
};

pub mod scraper_proxy;

pub use scraper_proxy::ScraperProxyAdapter;

//! Priority-frontier site crawler (components E and F): drives a browser
//! across the discovered surface of a target site, building a `SiteModel`.
//! Grounded on `examples/original_source/src/crawler/crawler.py`.

mod auth_probe;
mod crawler;
mod frontier;
mod links;
mod scope;
mod sitemap;

pub use crawler::Crawler;
pub use frontier::{CrawlEntry, Frontier, PRIORITY_ORGANIC, PRIORITY_SITEMAP, PRIORITY_START};

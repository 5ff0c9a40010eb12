//! Client code for marketlens.
//!
//! This crate provides the extraction pipeline shared by the server: site
//! detection, browser session control and page stabilization, and the
//! per-site product card extractors.

pub mod extract;
pub mod pipeline;
pub mod render;
pub mod site;

pub use extract::{RawCandidate, SiteExtractor, extract_products, parse_price, parse_sales_count};
#[cfg(feature = "render")]
pub use pipeline::run_extraction;
pub use pipeline::{ExtractionRequest, Milestone, Pipeline};
pub use render::{BrowserSession, RenderError, SessionOptions};
pub use site::{Idiom, SiteVariant, Target};

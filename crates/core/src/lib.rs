//! Core types and shared functionality for marketlens.
//!
//! This crate provides:
//! - The product model and list ordering
//! - The market analytics engine
//! - Unified error types
//! - Configuration structures

pub mod analytics;
pub mod config;
pub mod error;
pub mod product;

pub use analytics::{AnalyticsEngine, CategoryStat, DEFAULT_TOP_LIMIT, MarketReport};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use product::{CategoryFilter, Product, SortBy};

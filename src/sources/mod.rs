//! Site adapters
//!
//! One adapter per crawled source, each a thin translation layer between
//! the engine and that site's HTML/JSON shape. The engine never depends
//! on a concrete adapter; everything goes through the
//! [`SourceAdapter`](crate::engine::SourceAdapter) contract.

mod bna;
mod kingabdullah;
mod spa;

pub use bna::BnaAdapter;
pub use kingabdullah::KingAbdullahAdapter;
pub use spa::SpaAdapter;

use crate::config::{Config, SourceEntry};
use crate::engine::SourceAdapter;
use crate::ConfigError;

/// Builds adapters for every enabled source entry in the configuration
pub fn build_adapters(config: &Config) -> Result<Vec<Box<dyn SourceAdapter>>, ConfigError> {
    config
        .sources
        .iter()
        .filter(|entry| entry.enabled)
        .map(|entry| build_adapter(entry))
        .collect()
}

fn build_adapter(entry: &SourceEntry) -> Result<Box<dyn SourceAdapter>, ConfigError> {
    let adapter: Box<dyn SourceAdapter> = match entry.id.as_str() {
        "bna" => Box::new(BnaAdapter::new(entry.speakers.clone(), entry.danger_accept_invalid_certs)),
        "spa" => Box::new(SpaAdapter::new(entry.speakers.clone(), entry.danger_accept_invalid_certs)),
        "kingabdullah" => Box::new(KingAbdullahAdapter::new(
            entry.speakers.clone(),
            entry.danger_accept_invalid_certs,
        )),
        other => return Err(ConfigError::UnknownSource(other.to_string())),
    };
    Ok(adapter)
}

//! Search engine implementations

mod elasticsearch;
mod in_memory;
mod seed;

pub use elasticsearch::{etf_index_mapping, ElasticsearchClient};
pub use in_memory::InMemorySearchEngine;
pub use seed::sample_etfs;

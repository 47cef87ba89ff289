//! DNS resolution: cache, lookup strategies and hostname handling

pub mod cache;
pub mod hostname;
pub mod lookup;
pub mod resolver;

pub use cache::{CacheStats, DnsCache, DEFAULT_TTL};
pub use hostname::extract_hostname;
pub use lookup::{HickoryLookup, Lookup};
pub use resolver::Resolver;

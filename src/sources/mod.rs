//! Configuration fetcher implementations.

mod fetcher;

#[cfg(feature = "remote")]
mod remote;

pub use fetcher::ConfigFetcher;

#[cfg(feature = "remote")]
pub use remote::{
    DEFAULT_TIMEOUT, HttpFetcher, INSTANCE_HEADER, PASSWORD_HEADER, SOURCE_HEADER,
};

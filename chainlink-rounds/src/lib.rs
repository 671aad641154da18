//! Chainlink price-feed round history.
//!
//! Reads the latest round and a run of preceding rounds from
//! `AggregatorV3Interface` proxies listed in a static per-network registry,
//! and shapes them into fixture records whose numbers are decimal strings.
//!
//! ```no_run
//! use alloy::providers::ProviderBuilder;
//! use chainlink_rounds::{Network, ProviderSource, history};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProviderBuilder::new().connect_http("https://eth.llamarpc.com".parse()?);
//! let source = ProviderSource::new(provider);
//! let fixture = history::collect_network(&source, Network::Mainnet, 10).await?;
//! println!("{}", fixture.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod contracts;
pub mod error;
pub mod history;
pub mod networks;
pub mod source;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use networks::{Feed, Network, Token};
pub use source::{ProviderSource, RoundSource};
pub use types::{FeedHistory, FeedMetadata, Fixture, RoundData, RoundRecord};

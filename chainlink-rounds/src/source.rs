//! Where round data comes from.
//!
//! [`RoundSource`] is the seam between round collection and the chain: the
//! collector only ever asks for the latest round or a specific round of an
//! oracle. [`ProviderSource`] answers through any alloy [`Provider`]; tests
//! substitute an in-memory table.

use std::future::{Future, IntoFuture};
use std::time::Duration;

use alloy::primitives::Address;
use alloy::primitives::aliases::U80;
use alloy::providers::Provider;

use crate::contracts::IAggregatorV3;
use crate::error::{Error, Result};
use crate::types::{FeedMetadata, RoundData};

/// Read access to `AggregatorV3Interface` feeds.
pub trait RoundSource {
    /// Call `latestRoundData()` on `oracle`.
    fn latest_round_data(&self, oracle: Address) -> impl Future<Output = Result<RoundData>> + Send;

    /// Call `getRoundData(round_id)` on `oracle`.
    fn get_round_data(
        &self,
        oracle: Address,
        round_id: U80,
    ) -> impl Future<Output = Result<RoundData>> + Send;

    /// Read `description()`, `decimals()` and `version()` from `oracle`.
    fn metadata(&self, oracle: Address) -> impl Future<Output = Result<FeedMetadata>> + Send;
}

/// [`RoundSource`] backed by JSON-RPC `eth_call`s through an alloy provider.
///
/// Each call is bounded by a request timeout. Failures are returned as-is;
/// nothing is retried.
#[derive(Debug, Clone)]
pub struct ProviderSource<P> {
    provider: P,
    timeout: Duration,
}

/// Per-request timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl<P: Provider> ProviderSource<P> {
    /// Wrap `provider` with the default timeout.
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Await `fut`, mapping an elapsed deadline to [`Error::Timeout`].
async fn bounded<T, F>(call: &'static str, timeout: Duration, fut: F) -> Result<T>
where
    F: IntoFuture<Output = std::result::Result<T, alloy::contract::Error>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| Error::Timeout { call, timeout })?
        .map_err(Error::from)
}

impl<P: Provider> RoundSource for ProviderSource<P> {
    async fn latest_round_data(&self, oracle: Address) -> Result<RoundData> {
        let feed = IAggregatorV3::new(oracle, &self.provider);
        let round = bounded("latestRoundData", self.timeout, feed.latestRoundData().call()).await?;
        Ok(round.into())
    }

    async fn get_round_data(&self, oracle: Address, round_id: U80) -> Result<RoundData> {
        let feed = IAggregatorV3::new(oracle, &self.provider);
        let round = bounded(
            "getRoundData",
            self.timeout,
            feed.getRoundData(round_id).call(),
        )
        .await?;
        Ok(round.into())
    }

    async fn metadata(&self, oracle: Address) -> Result<FeedMetadata> {
        let feed = IAggregatorV3::new(oracle, &self.provider);
        let description = bounded("description", self.timeout, feed.description().call()).await?;
        let decimals = bounded("decimals", self.timeout, feed.decimals().call()).await?;
        let version = bounded("version", self.timeout, feed.version().call()).await?;
        Ok(FeedMetadata {
            description,
            decimals,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Bytes, I256, U256, address};
    use alloy::providers::ProviderBuilder;
    use alloy::sol_types::SolCall;
    use alloy::transports::mock::Asserter;

    use super::*;
    use crate::error::ErrorKind;

    const ETH_USD: Address = address!("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419");

    fn mocked() -> (Asserter, ProviderSource<impl Provider>) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
        (asserter, ProviderSource::new(provider))
    }

    fn expected(id: u64, answer: i64, updated_at: u64) -> RoundData {
        RoundData {
            round_id: U80::from(id),
            answer: I256::try_from(answer).unwrap_or_default(),
            started_at: U256::ZERO,
            updated_at: U256::from(updated_at),
            answered_in_round: U80::from(id),
        }
    }

    #[tokio::test]
    async fn decodes_latest_round_data() {
        let (asserter, source) = mocked();
        let encoded = IAggregatorV3::latestRoundDataCall::abi_encode_returns(
            &IAggregatorV3::latestRoundDataReturn {
                roundId: U80::from(100),
                answer: I256::try_from(123_456).unwrap_or_default(),
                startedAt: U256::ZERO,
                updatedAt: U256::from(999),
                answeredInRound: U80::from(100),
            },
        );
        asserter.push_success(&Bytes::from(encoded));

        let round = source.latest_round_data(ETH_USD).await;
        assert_eq!(round.ok(), Some(expected(100, 123_456, 999)), "latest round");
    }

    #[tokio::test]
    async fn decodes_historical_round_data() {
        let (asserter, source) = mocked();
        let encoded = IAggregatorV3::getRoundDataCall::abi_encode_returns(
            &IAggregatorV3::getRoundDataReturn {
                roundId: U80::from(99),
                answer: I256::try_from(-123_000).unwrap_or_default(),
                startedAt: U256::ZERO,
                updatedAt: U256::from(998),
                answeredInRound: U80::from(99),
            },
        );
        asserter.push_success(&Bytes::from(encoded));

        let round = source.get_round_data(ETH_USD, U80::from(99)).await;
        assert_eq!(round.ok(), Some(expected(99, -123_000, 998)), "round 99");
    }

    #[tokio::test]
    async fn decodes_metadata() {
        let (asserter, source) = mocked();
        asserter.push_success(&Bytes::from(IAggregatorV3::descriptionCall::abi_encode_returns(
            &"ETH / USD".to_owned(),
        )));
        asserter.push_success(&Bytes::from(IAggregatorV3::decimalsCall::abi_encode_returns(&8)));
        asserter.push_success(&Bytes::from(IAggregatorV3::versionCall::abi_encode_returns(
            &U256::from(4),
        )));

        let meta = source.metadata(ETH_USD).await;
        assert_eq!(
            meta.ok(),
            Some(FeedMetadata {
                description: "ETH / USD".into(),
                decimals: 8,
                version: U256::from(4),
            }),
            "metadata"
        );
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        let (_asserter, source) = mocked();
        let err = source.latest_round_data(ETH_USD).await.err();
        assert!(
            matches!(err, Some(Error::Contract(_))),
            "unexpected: {err:?}"
        );
        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::Network), "kind");
    }

    #[tokio::test]
    async fn unanswered_call_times_out() {
        let timeout = Duration::from_millis(20);
        let never = std::future::pending::<std::result::Result<(), alloy::contract::Error>>();
        let err = bounded("latestRoundData", timeout, never).await.err();
        assert!(
            matches!(
                err,
                Some(Error::Timeout { call: "latestRoundData", timeout: t }) if t == timeout
            ),
            "unexpected: {err:?}"
        );
    }

    #[tokio::test]
    async fn timeout_is_configurable() {
        let (_asserter, source) = mocked();
        assert_eq!(source.timeout, DEFAULT_TIMEOUT, "default timeout");
        let source = source.with_timeout(Duration::from_secs(2));
        assert_eq!(source.timeout, Duration::from_secs(2), "overridden timeout");
    }
}

//! Round history collection.
//!
//! For each feed the collector reads the latest round, then walks backwards
//! one round ID at a time with `getRoundData` until the requested number of
//! rounds has been gathered. Calls are issued strictly one after another and
//! the first failure aborts the whole collection.

use alloy::primitives::aliases::U80;

use crate::error::{Error, Result};
use crate::networks::{Feed, Network};
use crate::source::RoundSource;
use crate::types::{FeedHistory, Fixture, RoundData, RoundRecord};

/// Number of rounds collected per feed unless told otherwise.
pub const DEFAULT_ROUNDS: usize = 10;

fn log_round(feed: &Feed, call: &'static str, round: &RoundData) {
    tracing::info!(
        token = %feed.token,
        call,
        round_id = %round.round_id,
        answer = %round.answer,
        started_at = %round.started_at,
        updated_at = %round.updated_at,
        answered_in_round = %round.answered_in_round,
        "round"
    );
}

/// Collect `num_rounds` records for `feed`, newest first.
///
/// The first record is the feed's latest round; each following record is the
/// round whose ID is one lower than the previous.
///
/// # Errors
///
/// - [`Error::InvalidRoundCount`] if `num_rounds` is zero.
/// - [`Error::RoundUnderflow`] if round ID zero is passed before enough rounds were read.
/// - [`Error::RoundMismatch`] if the feed answers for a round other than the one requested.
/// - Any error returned by `source`.
pub async fn collect_feed<S: RoundSource>(
    source: &S,
    feed: &Feed,
    num_rounds: usize,
) -> Result<FeedHistory> {
    if num_rounds == 0 {
        return Err(Error::InvalidRoundCount(num_rounds));
    }

    let mut history = FeedHistory::new(feed.address);
    history.data.reserve(num_rounds);

    let latest = source.latest_round_data(feed.address).await?;
    log_round(feed, "latestRoundData", &latest);
    history.data.push(RoundRecord::from(&latest));

    let mut cursor = latest.round_id;
    while history.data.len() < num_rounds {
        cursor = cursor
            .checked_sub(U80::from(1))
            .ok_or(Error::RoundUnderflow {
                collected: history.data.len(),
                wanted: num_rounds,
            })?;

        let round = source.get_round_data(feed.address, cursor).await?;
        log_round(feed, "getRoundData", &round);
        if round.round_id != cursor {
            return Err(Error::RoundMismatch {
                requested: cursor.to_string(),
                returned: round.round_id.to_string(),
            });
        }
        history.data.push(RoundRecord::from(&round));
    }

    Ok(history)
}

/// Collect round histories for every feed of `network`, in registry order.
///
/// # Errors
///
/// Returns the first error hit by [`collect_feed`]; no partial fixture is returned.
pub async fn collect_network<S: RoundSource>(
    source: &S,
    network: Network,
    num_rounds: usize,
) -> Result<Fixture> {
    if num_rounds == 0 {
        return Err(Error::InvalidRoundCount(num_rounds));
    }

    let mut fixture = Fixture::new();
    for feed in network.feeds() {
        tracing::info!(%network, token = %feed.token, oracle = %feed.address, num_rounds, "collecting");
        let history = collect_feed(source, feed, num_rounds).await?;
        fixture.insert(feed.token, history);
    }
    Ok(fixture)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use alloy::primitives::{Address, I256, U256};

    use super::*;
    use crate::networks::Token;
    use crate::types::FeedMetadata;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Latest(Address),
        Round(Address, u64),
    }

    /// Answers the same rounds for every oracle and records each call.
    #[derive(Debug)]
    struct MockSource {
        latest: Option<RoundData>,
        rounds: HashMap<U80, RoundData>,
        calls: Mutex<Vec<Call>>,
    }

    impl MockSource {
        fn with_rounds(latest: RoundData, rounds: impl IntoIterator<Item = RoundData>) -> Self {
            Self {
                latest: Some(latest),
                rounds: rounds.into_iter().map(|r| (r.round_id, r)).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// A feed whose latest round is `latest_id` and which knows every earlier round.
        fn linear(latest_id: u64) -> Self {
            let older = (0..latest_id).map(|id| {
                let age = latest_id - id;
                round(id, 1_000 - i64::try_from(age).unwrap_or(0), 5_000 - age)
            });
            Self::with_rounds(round(latest_id, 1_000, 5_000), older)
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn record(&self, call: Call) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }
    }

    fn missing(call: &'static str) -> Error {
        Error::Timeout {
            call,
            timeout: Duration::ZERO,
        }
    }

    impl RoundSource for MockSource {
        async fn latest_round_data(&self, oracle: Address) -> Result<RoundData> {
            self.record(Call::Latest(oracle));
            self.latest.ok_or_else(|| missing("latestRoundData"))
        }

        async fn get_round_data(&self, oracle: Address, round_id: U80) -> Result<RoundData> {
            self.record(Call::Round(oracle, round_id.to::<u64>()));
            self.rounds
                .get(&round_id)
                .copied()
                .ok_or_else(|| missing("getRoundData"))
        }

        async fn metadata(&self, _oracle: Address) -> Result<FeedMetadata> {
            Err(missing("description"))
        }
    }

    fn round(id: u64, answer: i64, updated_at: u64) -> RoundData {
        RoundData {
            round_id: U80::from(id),
            answer: I256::try_from(answer).unwrap_or_default(),
            started_at: U256::ZERO,
            updated_at: U256::from(updated_at),
            answered_in_round: U80::from(id),
        }
    }

    fn record(id: &str, price: &str, timestamp: &str) -> RoundRecord {
        RoundRecord {
            round_id: id.into(),
            price: price.into(),
            timestamp: timestamp.into(),
        }
    }

    fn eth_feed() -> Feed {
        Network::Mainnet.feeds()[0]
    }

    #[tokio::test]
    async fn mainnet_three_rounds_end_to_end() {
        let source = MockSource::with_rounds(
            round(100, 123_456, 999),
            [round(99, 123_000, 998), round(98, 122_900, 997)],
        );

        let fixture = collect_network(&source, Network::Mainnet, 3).await;
        let fixture = fixture.unwrap_or_default();

        let eth = fixture.get(Token::Eth).cloned();
        assert_eq!(
            eth,
            Some(FeedHistory {
                oracle: "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419".into(),
                data: vec![
                    record("100", "123456", "999"),
                    record("99", "123000", "998"),
                    record("98", "122900", "997"),
                ],
            }),
            "ETH entry"
        );
        assert_eq!(fixture.len(), 3, "one entry per mainnet feed");

        let json: serde_json::Value =
            serde_json::from_str(&fixture.to_json().unwrap_or_default()).unwrap_or_default();
        assert_eq!(
            json["ETH"],
            serde_json::json!({
                "oracle": "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419",
                "data": [
                    {"round_id": "100", "price": "123456", "timestamp": "999"},
                    {"round_id": "99", "price": "123000", "timestamp": "998"},
                    {"round_id": "98", "price": "122900", "timestamp": "997"},
                ]
            }),
            "ETH JSON"
        );
    }

    #[tokio::test]
    async fn collects_exactly_num_rounds_with_decreasing_ids() {
        let source = MockSource::linear(50);
        for num_rounds in [1, 2, 10, 25] {
            let history = collect_feed(&source, &eth_feed(), num_rounds)
                .await
                .unwrap_or_else(|_| FeedHistory::new(Address::ZERO));
            assert_eq!(history.data.len(), num_rounds, "length for {num_rounds}");
            for (i, rec) in history.data.iter().enumerate() {
                assert_eq!(rec.round_id, (50 - i).to_string(), "round {i} of {num_rounds}");
            }
        }
    }

    #[tokio::test]
    async fn issues_one_latest_then_descending_round_calls() {
        let source = MockSource::linear(10);
        let feed = eth_feed();
        let result = collect_feed(&source, &feed, 4).await;
        assert!(result.is_ok(), "collect failed: {result:?}");
        assert_eq!(
            source.calls(),
            vec![
                Call::Latest(feed.address),
                Call::Round(feed.address, 9),
                Call::Round(feed.address, 8),
                Call::Round(feed.address, 7),
            ],
            "call sequence"
        );
    }

    #[tokio::test]
    async fn single_round_only_reads_latest() {
        let source = MockSource::linear(10);
        let history = collect_feed(&source, &eth_feed(), 1).await;
        assert_eq!(
            history.map(|h| h.data).ok(),
            Some(vec![record("10", "1000", "5000")]),
            "latest only"
        );
        assert_eq!(source.calls().len(), 1, "no getRoundData calls");
    }

    #[tokio::test]
    async fn zero_rounds_is_rejected_before_any_call() {
        let source = MockSource::linear(10);
        let err = collect_network(&source, Network::Mainnet, 0).await.err();
        assert!(
            matches!(err, Some(Error::InvalidRoundCount(0))),
            "unexpected: {err:?}"
        );
        assert!(source.calls().is_empty(), "no RPC calls expected");
    }

    #[tokio::test]
    async fn running_out_of_rounds_is_a_data_error() {
        let source = MockSource::linear(2);
        let err = collect_feed(&source, &eth_feed(), 5).await.err();
        assert!(
            matches!(
                err,
                Some(Error::RoundUnderflow {
                    collected: 3,
                    wanted: 5
                })
            ),
            "unexpected: {err:?}"
        );
    }

    #[tokio::test]
    async fn mismatched_round_id_is_rejected() {
        let mut stale = round(41, 7, 7);
        stale.round_id = U80::from(40);
        let mut source = MockSource::with_rounds(round(42, 1, 1), Vec::<RoundData>::new());
        source.rounds.insert(U80::from(41), stale);

        let err = collect_feed(&source, &eth_feed(), 2).await.err();
        assert!(
            matches!(
                err,
                Some(Error::RoundMismatch { ref requested, ref returned })
                    if requested == "41" && returned == "40"
            ),
            "unexpected: {err:?}"
        );
    }

    #[tokio::test]
    async fn first_failure_aborts_the_network() {
        let source = MockSource::with_rounds(round(5, 1, 1), [round(4, 1, 1)]);
        let err = collect_network(&source, Network::Kovan, 3).await.err();
        assert!(
            matches!(err, Some(Error::Timeout { call: "getRoundData", .. })),
            "unexpected: {err:?}"
        );
        let btc = Network::Kovan.feed(Token::Btc).map(|f| f.address);
        assert!(
            !source
                .calls()
                .iter()
                .any(|c| matches!(c, Call::Latest(a) if Some(*a) == btc)),
            "BTC must not be queried after ETH failed"
        );
    }

    #[tokio::test]
    async fn network_fixture_follows_registry_order() {
        let source = MockSource::linear(3);
        let fixture = collect_network(&source, Network::PolygonMainnet, 2)
            .await
            .unwrap_or_default();
        let order: Vec<(Token, String)> = fixture
            .iter()
            .map(|(t, h)| (t, h.oracle.clone()))
            .collect();
        let expected: Vec<(Token, String)> = Network::PolygonMainnet
            .feeds()
            .iter()
            .map(|f| (f.token, f.address.to_checksum(None)))
            .collect();
        assert_eq!(order, expected, "fixture order");
    }
}

//! Round data as read from the chain and as written to fixtures.
//!
//! On-chain values keep their native widths ([`U80`], [`I256`], [`U256`]).
//! Fixture records carry the same values as base-10 strings so that no JSON
//! consumer ever rounds them through a float.

use alloy::primitives::aliases::U80;
use alloy::primitives::{Address, I256, U256};
use serde::{Serialize, Serializer};

use crate::contracts::IAggregatorV3;
use crate::networks::Token;

/// One oracle round as returned by `latestRoundData` / `getRoundData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    /// Round identifier (phase ID in the top 16 bits, aggregator round below).
    pub round_id: U80,
    /// Reported price, scaled by the feed's `decimals()`.
    pub answer: I256,
    /// Timestamp at which the round started.
    pub started_at: U256,
    /// Timestamp of the last update to the round.
    pub updated_at: U256,
    /// Round in which the answer was computed.
    pub answered_in_round: U80,
}

impl From<IAggregatorV3::latestRoundDataReturn> for RoundData {
    fn from(r: IAggregatorV3::latestRoundDataReturn) -> Self {
        Self {
            round_id: r.roundId,
            answer: r.answer,
            started_at: r.startedAt,
            updated_at: r.updatedAt,
            answered_in_round: r.answeredInRound,
        }
    }
}

impl From<IAggregatorV3::getRoundDataReturn> for RoundData {
    fn from(r: IAggregatorV3::getRoundDataReturn) -> Self {
        Self {
            round_id: r.roundId,
            answer: r.answer,
            started_at: r.startedAt,
            updated_at: r.updatedAt,
            answered_in_round: r.answeredInRound,
        }
    }
}

/// A fixture entry: round ID, price and update timestamp as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundRecord {
    /// Round identifier.
    pub round_id: String,
    /// The round's `answer`.
    pub price: String,
    /// The round's `updatedAt`.
    pub timestamp: String,
}

impl From<&RoundData> for RoundRecord {
    fn from(round: &RoundData) -> Self {
        Self {
            round_id: round.round_id.to_string(),
            price: round.answer.to_string(),
            timestamp: round.updated_at.to_string(),
        }
    }
}

/// Collected history of one feed, newest round first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedHistory {
    /// Checksummed address of the aggregator proxy.
    pub oracle: String,
    /// Round records ordered from latest to oldest.
    pub data: Vec<RoundRecord>,
}

impl FeedHistory {
    /// Start an empty history for the feed at `oracle`.
    #[must_use]
    pub fn new(oracle: Address) -> Self {
        Self {
            oracle: oracle.to_checksum(None),
            data: Vec::new(),
        }
    }
}

/// Round histories for every feed of a network, keyed by token symbol.
///
/// Serializes as a JSON object whose keys keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fixture {
    entries: Vec<(Token, FeedHistory)>,
}

impl Fixture {
    /// Create an empty fixture.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Store the history for `token`, replacing any earlier entry.
    pub fn insert(&mut self, token: Token, history: FeedHistory) {
        if let Some(slot) = self.entries.iter_mut().find(|(t, _)| *t == token) {
            slot.1 = history;
        } else {
            self.entries.push((token, history));
        }
    }

    /// History collected for `token`, if any.
    #[must_use]
    pub fn get(&self, token: Token) -> Option<&FeedHistory> {
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, h)| h)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Token, &FeedHistory)> {
        self.entries.iter().map(|(t, h)| (*t, h))
    }

    /// Number of feeds in the fixture.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the fixture holds no feeds.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Fixture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(t, h)| (t.symbol(), h)))
    }
}

/// Descriptive metadata exposed by an aggregator proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMetadata {
    /// Human-readable pair, e.g. `"ETH / USD"`.
    pub description: String,
    /// Number of decimals in `answer`.
    pub decimals: u8,
    /// Aggregator version.
    pub version: U256,
}

//! Static registry of Chainlink price feeds per network.
//!
//! Every supported network carries the same three USD feeds (ETH, BTC, DAI).
//! The tables are declared in a fixed order which is also the order used when
//! collecting rounds and when writing fixtures.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, address};

use crate::error::Error;

/// Token whose USD price a feed reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Ether.
    Eth,
    /// Bitcoin.
    Btc,
    /// Dai stablecoin.
    Dai,
}

impl Token {
    /// Returns the ticker symbol used as the fixture key.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eth => "ETH",
            Self::Btc => "BTC",
            Self::Dai => "DAI",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single price feed: the token and its aggregator proxy address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feed {
    /// Token reported by the feed.
    pub token: Token,
    /// Address of the `AggregatorV3Interface` proxy.
    pub address: Address,
}

/// Networks with a known feed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Ethereum Mainnet (chain ID 1).
    Mainnet,
    /// Kovan testnet (chain ID 42).
    Kovan,
    /// Rinkeby testnet (chain ID 4).
    Rinkeby,
    /// Polygon PoS Mainnet (chain ID 137).
    PolygonMainnet,
}

const MAINNET_FEEDS: &[Feed] = &[
    Feed {
        token: Token::Eth,
        address: address!("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419"),
    },
    Feed {
        token: Token::Btc,
        address: address!("F4030086522a5bEEa4988F8cA5B36dbC97BeE88c"),
    },
    Feed {
        token: Token::Dai,
        address: address!("Aed0c38402a5d19df6E4c03F4E2DceD6e29c1ee9"),
    },
];

const KOVAN_FEEDS: &[Feed] = &[
    Feed {
        token: Token::Eth,
        address: address!("9326BFA02ADD2366b30bacB125260Af641031331"),
    },
    Feed {
        token: Token::Btc,
        address: address!("6135b13325bfC4B00278B4abC5e20bbce2D6580e"),
    },
    Feed {
        token: Token::Dai,
        address: address!("777A68032a88E5A84678A77Af2CD65A7b3c0775a"),
    },
];

const RINKEBY_FEEDS: &[Feed] = &[
    Feed {
        token: Token::Eth,
        address: address!("8A753747A1Fa494EC906cE90E9f37563A8AF630e"),
    },
    Feed {
        token: Token::Btc,
        address: address!("ECe365B379E1dD183B20fc5f022230C044d51404"),
    },
    Feed {
        token: Token::Dai,
        address: address!("2bA49Aaa16E6afD2a993473cfB70Fa8559B523cF"),
    },
];

const POLYGON_MAINNET_FEEDS: &[Feed] = &[
    Feed {
        token: Token::Eth,
        address: address!("F9680D99D6C9589e2a93a78A04A279e509205945"),
    },
    Feed {
        token: Token::Btc,
        address: address!("c907E116054Ad103354f2D350FD2514433D57F6f"),
    },
    Feed {
        token: Token::Dai,
        address: address!("4746DeC9e833A82EC7C2C1356372CcF2cfcD2F3D"),
    },
];

impl Network {
    /// Network used when none is given.
    pub const DEFAULT: Self = Self::Mainnet;

    /// All known networks, in declaration order.
    pub const ALL: &[Self] = &[
        Self::Mainnet,
        Self::Kovan,
        Self::Rinkeby,
        Self::PolygonMainnet,
    ];

    /// Returns the canonical network name (`mainnet`, `polygon-mainnet`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Kovan => "kovan",
            Self::Rinkeby => "rinkeby",
            Self::PolygonMainnet => "polygon-mainnet",
        }
    }

    /// Returns the EIP-155 chain ID for this network.
    #[must_use]
    pub const fn chain_id(self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Kovan => 42,
            Self::Rinkeby => 4,
            Self::PolygonMainnet => 137,
        }
    }

    /// Returns the feed table for this network in declared order.
    #[must_use]
    pub const fn feeds(self) -> &'static [Feed] {
        match self {
            Self::Mainnet => MAINNET_FEEDS,
            Self::Kovan => KOVAN_FEEDS,
            Self::Rinkeby => RINKEBY_FEEDS,
            Self::PolygonMainnet => POLYGON_MAINNET_FEEDS,
        }
    }

    /// Look up the feed for `token` on this network.
    #[must_use]
    pub fn feed(self, token: Token) -> Option<Feed> {
        self.feeds().iter().find(|f| f.token == token).copied()
    }

    /// Look up a [`Network`] by its canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNetwork`] if `name` is not a known network.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .find(|n| n.name() == name)
            .copied()
            .ok_or_else(|| Error::UnknownNetwork(name.to_owned()))
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

//! `AggregatorV3Interface` bindings shared by every feed.

use alloy::sol;

sol! {
    /// Read interface of a Chainlink aggregator proxy.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IAggregatorV3 {
        function decimals() external view returns (uint8);

        function description() external view returns (string memory);

        function version() external view returns (uint256);

        function getRoundData(uint80 _roundId)
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );

        function latestRoundData()
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
    }
}

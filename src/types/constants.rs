//! Common constants for networks and schemes

/// EVM networks known to the exact scheme
pub mod networks {
    /// Base mainnet
    pub const BASE_MAINNET: &str = "base";
    /// Base Sepolia testnet
    pub const BASE_SEPOLIA: &str = "base-sepolia";
    /// Avalanche mainnet
    pub const AVALANCHE_MAINNET: &str = "avalanche";
    /// Avalanche Fuji testnet
    pub const AVALANCHE_FUJI: &str = "avalanche-fuji";
    /// Polygon mainnet
    pub const POLYGON_MAINNET: &str = "polygon";
    /// Polygon Amoy testnet
    pub const POLYGON_AMOY: &str = "polygon-amoy";
    pub const IOTEX: &str = "iotex";
    pub const SEI: &str = "sei";
    pub const SEI_TESTNET: &str = "sei-testnet";

    /// Check if a network is an EVM network the exact scheme is defined for
    pub fn is_evm(network: &str) -> bool {
        matches!(
            network,
            BASE_MAINNET
                | BASE_SEPOLIA
                | AVALANCHE_MAINNET
                | AVALANCHE_FUJI
                | POLYGON_MAINNET
                | POLYGON_AMOY
                | IOTEX
                | SEI
                | SEI_TESTNET
        )
    }
}

/// Common payment schemes
pub mod schemes {
    /// Exact payment scheme (EIP-3009)
    pub const EXACT: &str = "exact";
}

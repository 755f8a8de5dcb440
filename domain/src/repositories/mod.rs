pub mod contract;
pub mod farcaster;
pub mod wallet;

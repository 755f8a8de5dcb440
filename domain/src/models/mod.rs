pub mod errors;
pub mod farcaster;
pub mod primitives;
pub mod raffle;
pub mod sign_in;

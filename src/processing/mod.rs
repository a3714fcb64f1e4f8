pub mod aggregate;
pub mod downsampling;
pub mod filter;
pub mod statistics;

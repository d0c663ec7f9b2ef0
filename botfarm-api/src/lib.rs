pub mod bots;

#[cfg(feature = "client")]
pub mod client;

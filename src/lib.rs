pub mod aggregator;
pub mod api;
pub mod config;
pub mod loader;
pub mod output;

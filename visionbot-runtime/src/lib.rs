pub mod client;
pub mod config_store;
pub mod runtime_engine;

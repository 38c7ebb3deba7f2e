pub mod instance;
pub mod store;
pub mod reachability;
pub mod gateway;

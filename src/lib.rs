//! Scripts for deploying and using the Maltcoin ERC20 token on a local node.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod scripts;

pub use blockchain::{NodeClient, RpcNodeClient, SigningIdentity};
pub use config::ScriptsConfig;

//! Core types for the NFT collection deployment orchestrator

pub mod artifact;
pub mod collection;
pub mod instance;
pub mod mode;
pub mod network;
pub mod run;

pub use artifact::*;
pub use collection::*;
pub use instance::*;
pub use mode::*;
pub use network::*;
pub use run::*;

/// Contract type provisioned by the fixed catalog
pub const DEFAULT_TYPE_NAME: &str = "NFTMinter";

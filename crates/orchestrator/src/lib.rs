//! Lifecycle orchestration of NFT collection contract instances
//!
//! The orchestrator turns validated instance specifications into per-instance
//! state machines, drives them against an execution endpoint and reports a
//! `RunResult`. Artifacts and the network identity diagnostic are produced
//! from that result.

pub mod artifact;
pub mod error;
pub mod identity;
pub mod instance;
pub mod orchestrator;
pub mod registry;
pub mod strategy;

#[cfg(test)]
mod mock;

// Re-export main types
pub use artifact::ArtifactWriter;
pub use error::{ArtifactError, InstanceError, OrchestratorError, RegistryError};
pub use identity::NetworkIdentityReporter;
pub use instance::{InstanceManager, CONFIGURE_METHOD, VERIFY_METHOD};
pub use orchestrator::{
    BuilderError, LifecycleOrchestrator, LifecycleOrchestratorBuilder, OrchestratorConfig,
};
pub use registry::{HttpRegistry, NoopRegistry, RegistryPublisher};
pub use strategy::{plan_instances, InstancePlan, ProvisionStep};

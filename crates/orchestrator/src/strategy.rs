//! Per-instance step plans derived from the lifecycle mode

use std::collections::HashSet;

use nft_deploy_types::{Configuration, InstanceSpecs, LifecycleMode, Provisioning};

use crate::OrchestratorError;

/// How an instance obtains its contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionStep {
    Create { constructor_args: Vec<String> },
    Attach { address: String },
}

/// Steps the orchestrator runs for one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePlan {
    pub instance_id: String,
    pub provision: ProvisionStep,
    /// Pointer to apply, `None` when the mode skips configuration
    pub configuration: Option<String>,
}

/// Build instance plans, rejecting specs that do not fit `mode`
pub fn plan_instances(
    mode: LifecycleMode,
    type_name: &str,
    specs: &InstanceSpecs,
) -> Result<Vec<InstancePlan>, OrchestratorError> {
    let plan = mode.plan();

    let configure = |pointer: &str| match plan.configuration {
        Configuration::Configure => Some(pointer.to_string()),
        Configuration::Skip => None,
    };

    let plans: Vec<InstancePlan> = match (plan.provisioning, specs) {
        (Provisioning::Create, InstanceSpecs::Create(definitions)) => definitions
            .iter()
            .map(|def| InstancePlan {
                instance_id: def.collection_id.clone(),
                provision: ProvisionStep::Create {
                    constructor_args: def.constructor_args(),
                },
                configuration: configure(&def.configuration_pointer),
            })
            .collect(),
        (Provisioning::Attach, InstanceSpecs::Attach(instances)) => instances
            .iter()
            .map(|spec| InstancePlan {
                instance_id: spec.instance_id.clone(),
                provision: ProvisionStep::Attach {
                    address: spec.address.clone(),
                },
                configuration: configure(&spec.configuration_pointer),
            })
            .collect(),
        (Provisioning::Create, InstanceSpecs::Attach(_)) => {
            return Err(OrchestratorError::ModeMismatch {
                mode,
                expected: "collection definition",
            })
        }
        (Provisioning::Attach, InstanceSpecs::Create(_)) => {
            return Err(OrchestratorError::ModeMismatch {
                mode,
                expected: "existing instance",
            })
        }
    };

    let mut seen = HashSet::new();
    for plan in &plans {
        if !seen.insert(plan.instance_id.as_str()) {
            return Err(OrchestratorError::DuplicateInstance {
                type_name: type_name.to_string(),
                instance_id: plan.instance_id.clone(),
            });
        }
    }

    Ok(plans)
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one contract instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    Pending,
    Creating,
    Attaching,
    Created,
    Attached,
    Configuring,
    /// Configuration applied and verified
    Configured,
    /// Provisioned in a mode that intentionally skips configuration
    Deployed,
    Failed,
}

impl InstanceState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InstanceState::Configured | InstanceState::Deployed | InstanceState::Failed
        )
    }

    /// Terminal states whose instances are published in artifacts
    pub fn is_success(&self) -> bool {
        matches!(self, InstanceState::Configured | InstanceState::Deployed)
    }

    pub fn can_transition_to(&self, next: InstanceState) -> bool {
        use InstanceState::*;

        matches!(
            (self, next),
            (Pending, Creating)
                | (Pending, Attaching)
                | (Creating, Created)
                | (Creating, Failed)
                | (Attaching, Attached)
                | (Attaching, Failed)
                | (Created, Configuring)
                | (Attached, Configuring)
                | (Created, Deployed)
                | (Attached, Deployed)
                | (Configuring, Configured)
                | (Configuring, Failed)
        )
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceState::Pending => "PENDING",
            InstanceState::Creating => "CREATING",
            InstanceState::Attaching => "ATTACHING",
            InstanceState::Created => "CREATED",
            InstanceState::Attached => "ATTACHED",
            InstanceState::Configuring => "CONFIGURING",
            InstanceState::Configured => "CONFIGURED",
            InstanceState::Deployed => "DEPLOYED",
            InstanceState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Rejected state change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("invalid transition for {instance_id}: {from} -> {to}")]
    InvalidTransition {
        instance_id: String,
        from: InstanceState,
        to: InstanceState,
    },

    #[error("address of {instance_id} already set to {current}")]
    AddressAlreadySet { instance_id: String, current: String },

    #[error("empty address for {instance_id}")]
    EmptyAddress { instance_id: String },
}

/// Runtime state of one logical contract instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    pub type_name: String,
    pub instance_id: String,
    address: String,
    state: InstanceState,
    configured_pointer: Option<String>,
    /// Creation attempts used (0 for attached instances)
    pub attempts: u32,
    failure: Option<String>,
}

impl InstanceRecord {
    pub fn new(type_name: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            instance_id: instance_id.into(),
            address: String::new(),
            state: InstanceState::Pending,
            configured_pointer: None,
            attempts: 0,
            failure: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    pub fn configured_pointer(&self) -> Option<&str> {
        self.configured_pointer.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn transition(&mut self, next: InstanceState) -> Result<(), RecordError> {
        if !self.state.can_transition_to(next) {
            return Err(RecordError::InvalidTransition {
                instance_id: self.instance_id.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Record the address once; an address is never reassigned
    pub fn set_address(&mut self, address: impl Into<String>) -> Result<(), RecordError> {
        let address = address.into();
        if address.is_empty() {
            return Err(RecordError::EmptyAddress {
                instance_id: self.instance_id.clone(),
            });
        }
        if !self.address.is_empty() {
            return Err(RecordError::AddressAlreadySet {
                instance_id: self.instance_id.clone(),
                current: self.address.clone(),
            });
        }
        self.address = address;
        Ok(())
    }

    pub fn mark_configured(&mut self, pointer: impl Into<String>) -> Result<(), RecordError> {
        self.transition(InstanceState::Configured)?;
        self.configured_pointer = Some(pointer.into());
        Ok(())
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), RecordError> {
        self.transition(InstanceState::Failed)?;
        self.failure = Some(reason.into());
        Ok(())
    }
}

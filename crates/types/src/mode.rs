use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle mode selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleMode {
    /// Create fresh instances, then apply and verify their configuration
    CreateConfigure,

    /// Disposable end-to-end bootstrap from the built-in fixture; no configuration
    Bootstrap,

    /// Attach to pre-existing instances and apply configuration only
    ConfigureOnly,
}

/// How an instance obtains its remote handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioning {
    Create,
    Attach,
}

/// Whether the configuration pointer is applied after provisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configuration {
    Configure,
    Skip,
}

/// The capability combination a mode runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePlan {
    pub provisioning: Provisioning,
    pub configuration: Configuration,
}

impl LifecycleMode {
    pub const ALL: [LifecycleMode; 3] = [
        LifecycleMode::CreateConfigure,
        LifecycleMode::Bootstrap,
        LifecycleMode::ConfigureOnly,
    ];

    pub fn plan(&self) -> ModePlan {
        match self {
            LifecycleMode::CreateConfigure => ModePlan {
                provisioning: Provisioning::Create,
                configuration: Configuration::Configure,
            },
            LifecycleMode::Bootstrap => ModePlan {
                provisioning: Provisioning::Create,
                configuration: Configuration::Skip,
            },
            LifecycleMode::ConfigureOnly => ModePlan {
                provisioning: Provisioning::Attach,
                configuration: Configuration::Configure,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleMode::CreateConfigure => "create-configure",
            LifecycleMode::Bootstrap => "bootstrap",
            LifecycleMode::ConfigureOnly => "configure-only",
        }
    }
}

impl fmt::Display for LifecycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lifecycle mode '{0}' (expected create-configure, bootstrap or configure-only)")]
pub struct UnknownMode(pub String);

impl FromStr for LifecycleMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create-configure" | "create_configure" | "deploy" => Ok(LifecycleMode::CreateConfigure),
            "bootstrap" | "e2e" => Ok(LifecycleMode::Bootstrap),
            "configure-only" | "configure_only" | "setup" => Ok(LifecycleMode::ConfigureOnly),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

//! Check command logic
//!
//! Replays every platform module's saved library instances, collects the
//! platform token registry and reports what is left to resolve, without
//! changing the platform.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::core::ids::ModuleKey;
use crate::core::platform::Platform;
use crate::core::registry::TokenRegistry;
use crate::core::resolver::{Diagnostic, ResolutionSession};
use crate::core::workspace::Workspace;

/// Resolution state of one platform module
#[derive(Debug, Clone, Serialize)]
pub struct ModuleCheck {
    pub module: ModuleKey,
    pub name: String,
    /// Instances bound after replay
    pub library_instances: Vec<ModuleKey>,
    /// Outstanding classes with their candidates
    pub outstanding: BTreeMap<String, Vec<ModuleKey>>,
    pub diagnostics: Vec<Diagnostic>,
    /// Library build order, module last
    pub build_order: Vec<ModuleKey>,
}

/// Result of the check operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub platform: String,
    pub modules: Vec<ModuleCheck>,
    /// Number of tokens in the platform registry
    pub token_count: usize,
    /// Problems that make the platform unbuildable
    pub errors: Vec<String>,
    /// Problems that need attention
    pub warnings: Vec<String>,
}

impl CheckResult {
    /// Create an empty result for a platform
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            ..Default::default()
        }
    }

    /// Check if all validations passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a platform against the loaded workspace
///
/// A class no module can satisfy is an error. A class with candidates that
/// is still unbound is a warning, or an error when `strict` is set.
pub fn check(workspace: &Workspace, platform: &Platform, strict: bool) -> CheckResult {
    let mut result = CheckResult::new(platform.name.clone());

    if let Err(e) = platform.verify(workspace) {
        result.errors.push(e.to_string());
        return result;
    }

    for entry in &platform.modules {
        let name = workspace.module_name(&entry.key);
        debug!("Checking module '{}'", name);

        let mut session = match ResolutionSession::open(workspace, &entry.key) {
            Ok(session) => session,
            Err(e) => {
                result.errors.push(format!("{name}: {e}"));
                continue;
            }
        };
        if let Err(e) = session.restore(&entry.library_instances) {
            result.errors.push(format!("{name}: {e}"));
        }

        for diagnostic in session.diagnostics() {
            match diagnostic {
                Diagnostic::NoApplicableInstance { .. } => {
                    result.errors.push(format!("{name}: {diagnostic}"));
                }
                Diagnostic::StaleInstance { .. } => {
                    result.warnings.push(format!("{name}: {diagnostic}"));
                }
            }
        }

        let outstanding: BTreeMap<String, Vec<ModuleKey>> = session
            .class_instance_map()
            .iter()
            .map(|(class, candidates)| (class.clone(), candidates.clone()))
            .collect();
        for (class, candidates) in &outstanding {
            if candidates.is_empty() {
                continue;
            }
            let message = format!(
                "{name}: library class '{class}' is unbound ({} candidate(s))",
                candidates.len()
            );
            if strict {
                result.errors.push(message);
            } else {
                result.warnings.push(message);
            }
        }

        let build_order = match session.build_order() {
            Ok(order) => order,
            Err(e) => {
                result.errors.push(format!("{name}: {e}"));
                Vec::new()
            }
        };

        result.modules.push(ModuleCheck {
            module: entry.key.clone(),
            name,
            library_instances: session.library_instances(),
            outstanding,
            diagnostics: session.diagnostics().to_vec(),
            build_order,
        });
    }

    match TokenRegistry::collect(workspace, platform) {
        Ok(registry) => result.token_count = registry.len(),
        Err(e) => result.errors.push(e.to_string()),
    }

    result
}

//! Library class resolution
//!
//! A [`ResolutionSession`] tracks, for one module under edit, which library
//! classes are already produced, which classes are still consumed and by
//! whom, and which modules of the dependency packages can satisfy each
//! outstanding class. Candidate lists are recomputed from scratch after every
//! open, bind and unbind.
//!
//! A module is a candidate for class `C` when it produces `C` and none of
//! the classes it produces is already produced in the session. Binding an
//! instance that produces several classes therefore disqualifies every other
//! module that overlaps with it, for all classes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::ids::{guid_text, ModuleKey};
use crate::core::platform::PcdBuildDefinition;
use crate::core::types::Usage;
use crate::core::workspace::Workspace;
use crate::error::{ResolverError, TokenError};

/// Recoverable problem found while resolving
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No module can satisfy a consumed class; the build will fail
    NoApplicableInstance { class: String },
    /// A saved library instance could not be bound
    StaleInstance { instance: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoApplicableInstance { class } => write!(
                f,
                "No applicable library instance for class '{class}'; the build will fail"
            ),
            Self::StaleInstance { instance } => {
                write!(f, "Saved library instance '{instance}' no longer applies")
            }
        }
    }
}

/// One PCD build definition and the modules that contributed it
#[derive(Debug, Clone)]
struct PcdRow {
    definition: PcdBuildDefinition,
    contributors: BTreeSet<ModuleKey>,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub module: ModuleKey,
    pub module_name: String,
    pub class_produced: BTreeSet<String>,
    pub class_consumed: BTreeMap<String, Vec<ModuleKey>>,
    pub candidates: BTreeMap<String, Vec<ModuleKey>>,
    pub library_instances: Vec<ModuleKey>,
    pub pcds: Vec<PcdBuildDefinition>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Library class resolution state for one module under edit
#[derive(Debug, Clone)]
pub struct ResolutionSession<'w> {
    workspace: &'w Workspace,
    module: ModuleKey,
    class_produced: BTreeSet<String>,
    class_consumed: BTreeMap<String, BTreeSet<ModuleKey>>,
    class_instance_map: BTreeMap<String, Vec<ModuleKey>>,
    /// Bound instances in bind order, with the class each was bound for
    bound: Vec<(ModuleKey, String)>,
    pcd_rows: Vec<PcdRow>,
    stale: Vec<ModuleKey>,
    diagnostics: Vec<Diagnostic>,
}

impl<'w> ResolutionSession<'w> {
    /// Open a session for `module`
    pub fn open(workspace: &'w Workspace, module: &ModuleKey) -> Result<Self, ResolverError> {
        if workspace.module(module).is_none() {
            return Err(ResolverError::UnknownModule {
                key: module.to_string(),
            });
        }

        let mut session = Self {
            workspace,
            module: module.clone(),
            class_produced: BTreeSet::new(),
            class_consumed: BTreeMap::new(),
            class_instance_map: BTreeMap::new(),
            bound: Vec::new(),
            pcd_rows: Vec::new(),
            stale: Vec::new(),
            diagnostics: Vec::new(),
        };

        let rows = session.pcd_rows_of(module)?;
        session.merge_pcd_rows(module, rows);
        session.seed(module);
        info!(
            "Opened resolution session for '{}'",
            workspace.module_name(module)
        );
        session.refresh();
        Ok(session)
    }

    /// Merge a module's consumed and produced classes into the session
    fn seed(&mut self, key: &ModuleKey) {
        for class in self.workspace.library_classes(key, Usage::AlwaysConsumed) {
            self.class_consumed
                .entry(class)
                .or_default()
                .insert(key.clone());
        }
        self.class_produced
            .extend(self.workspace.library_classes(key, Usage::AlwaysProduced));
    }

    /// Recompute candidates for every outstanding class
    fn refresh(&mut self) {
        self.class_instance_map.clear();
        self.diagnostics
            .retain(|d| matches!(d, Diagnostic::StaleInstance { .. }));

        for class in self.outstanding_classes() {
            let candidates = self.find_candidates(&class);
            if candidates.is_empty() {
                warn!(
                    "No applicable library instance for class '{}' in '{}'",
                    class,
                    self.workspace.module_name(&self.module)
                );
                self.diagnostics
                    .push(Diagnostic::NoApplicableInstance { class: class.clone() });
            }
            self.class_instance_map.insert(class, candidates);
        }
    }

    fn find_candidates(&self, class: &str) -> Vec<ModuleKey> {
        let mut packages = Vec::new();
        for consumer in self.class_consumed.get(class).into_iter().flatten() {
            for package in self.workspace.dependency_packages(consumer) {
                if !packages.contains(&package) {
                    packages.push(package);
                }
            }
        }

        let mut candidates = BTreeSet::new();
        for package in &packages {
            for key in self.workspace.modules_in(package) {
                let Some(info) = self.workspace.module(key) else {
                    continue;
                };
                if !info.produces(class) {
                    continue;
                }
                if let Some(overlap) = info
                    .produced_classes()
                    .find(|c| self.class_produced.contains(*c))
                {
                    debug!(
                        "'{}' is not a candidate for '{}': '{}' is already produced",
                        info.id.name, class, overlap
                    );
                    continue;
                }
                candidates.insert(key.clone());
            }
        }
        candidates.into_iter().collect()
    }

    /// Build definitions for the PCDs a module lists
    fn pcd_rows_of(&self, key: &ModuleKey) -> Result<Vec<PcdBuildDefinition>, ResolverError> {
        let Some(info) = self.workspace.module(key) else {
            return Ok(Vec::new());
        };
        let preferred = self.workspace.dependency_packages(&self.module);

        info.pcds
            .iter()
            .map(|pcd| {
                let (_, decl) = self
                    .workspace
                    .find_pcd_declaration(&pcd.c_name, &pcd.token_space_guid, &preferred)
                    .ok_or_else(|| ResolverError::Pcd {
                        instance: info.id.name.clone(),
                        source: TokenError::Undeclared {
                            c_name: pcd.c_name.clone(),
                            token_space: guid_text(&pcd.token_space_guid),
                        },
                    })?;
                Ok(PcdBuildDefinition {
                    c_name: pcd.c_name.clone(),
                    token_space_guid: pcd.token_space_guid,
                    item_type: pcd.item_type,
                    datum_type: decl.datum_type,
                    token: decl.token_number,
                    value: decl.default_value.clone(),
                })
            })
            .collect()
    }

    fn merge_pcd_rows(&mut self, contributor: &ModuleKey, rows: Vec<PcdBuildDefinition>) {
        for definition in rows {
            let existing = self
                .pcd_rows
                .iter_mut()
                .find(|row| row.definition.is_for(&definition.c_name, &definition.token_space_guid));
            match existing {
                Some(row) => {
                    row.contributors.insert(contributor.clone());
                }
                None => self.pcd_rows.push(PcdRow {
                    definition,
                    contributors: BTreeSet::from([contributor.clone()]),
                }),
            }
        }
    }

    /// Bind `instance` to satisfy `class`
    ///
    /// The instance must be a current candidate for the class.
    pub fn bind(&mut self, instance: &ModuleKey, class: &str) -> Result<(), ResolverError> {
        if self.workspace.module(instance).is_none() {
            return Err(ResolverError::UnknownModule {
                key: instance.to_string(),
            });
        }
        if self.is_bound(instance) {
            return Err(ResolverError::AlreadyBound {
                instance: instance.to_string(),
            });
        }
        if !self.candidates(class).contains(instance) {
            return Err(ResolverError::NotACandidate {
                instance: instance.to_string(),
                class: class.to_string(),
            });
        }

        let rows = self.pcd_rows_of(instance)?;
        self.merge_pcd_rows(instance, rows);
        self.seed(instance);
        self.bound.push((instance.clone(), class.to_string()));
        info!(
            "Bound '{}' for library class '{}'",
            self.workspace.module_name(instance),
            class
        );
        self.refresh();
        Ok(())
    }

    /// Remove a bound instance and everything it contributed
    pub fn unbind(&mut self, instance: &ModuleKey) -> Result<(), ResolverError> {
        let Some(position) = self.bound.iter().position(|(key, _)| key == instance) else {
            return Err(ResolverError::NotBound {
                instance: instance.to_string(),
            });
        };
        self.bound.remove(position);

        for class in self.workspace.library_classes(instance, Usage::AlwaysProduced) {
            self.class_produced.remove(&class);
        }
        self.class_consumed.retain(|_, consumers| {
            consumers.remove(instance);
            !consumers.is_empty()
        });
        self.pcd_rows.retain_mut(|row| {
            row.contributors.remove(instance);
            !row.contributors.is_empty()
        });

        info!("Unbound '{}'", self.workspace.module_name(instance));
        self.refresh();
        Ok(())
    }

    /// Replay a saved library instance list
    ///
    /// Each saved instance is bound for the first outstanding class it is a
    /// candidate for, repeating until no more progress is made. Instances
    /// left over are reported as stale.
    pub fn restore(&mut self, saved: &[ModuleKey]) -> Result<(), ResolverError> {
        let mut pending: Vec<ModuleKey> = saved
            .iter()
            .filter(|key| !self.is_bound(key))
            .cloned()
            .collect();

        loop {
            let mut progress = false;
            let mut remaining = Vec::new();

            for instance in pending {
                let class = self
                    .class_instance_map
                    .iter()
                    .find(|(_, candidates)| candidates.contains(&instance))
                    .map(|(class, _)| class.clone());
                match class {
                    Some(class) => {
                        self.bind(&instance, &class)?;
                        progress = true;
                    }
                    None => remaining.push(instance),
                }
            }

            pending = remaining;
            if !progress || pending.is_empty() {
                break;
            }
        }

        for instance in pending {
            warn!("Saved library instance '{}' no longer applies", instance);
            self.diagnostics.push(Diagnostic::StaleInstance {
                instance: instance.to_string(),
            });
            self.stale.push(instance);
        }
        Ok(())
    }

    /// Module under edit
    pub fn module(&self) -> &ModuleKey {
        &self.module
    }

    /// Whether `instance` is bound in this session
    pub fn is_bound(&self, instance: &ModuleKey) -> bool {
        self.bound.iter().any(|(key, _)| key == instance)
    }

    /// Candidates for `class` in candidate order, empty when none or unknown
    pub fn candidates(&self, class: &str) -> &[ModuleKey] {
        self.class_instance_map
            .get(class)
            .map_or(&[], Vec::as_slice)
    }

    /// Consumed classes not yet produced
    pub fn outstanding_classes(&self) -> Vec<String> {
        self.class_consumed
            .keys()
            .filter(|class| !self.class_produced.contains(*class))
            .cloned()
            .collect()
    }

    /// Whether every consumed class is produced
    pub fn is_complete(&self) -> bool {
        self.outstanding_classes().is_empty()
    }

    /// Classes produced by the module and its bound instances
    pub fn class_produced(&self) -> &BTreeSet<String> {
        &self.class_produced
    }

    /// Consumed classes with the modules consuming them
    pub fn class_consumed(&self) -> &BTreeMap<String, BTreeSet<ModuleKey>> {
        &self.class_consumed
    }

    /// Candidate lists of the outstanding classes
    pub fn class_instance_map(&self) -> &BTreeMap<String, Vec<ModuleKey>> {
        &self.class_instance_map
    }

    /// Bound instances in bind order
    pub fn library_instances(&self) -> Vec<ModuleKey> {
        self.bound.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Merged PCD build definitions of the module and its instances
    pub fn pcd_build_definitions(&self) -> Vec<PcdBuildDefinition> {
        self.pcd_rows
            .iter()
            .map(|row| row.definition.clone())
            .collect()
    }

    /// Modules that contributed the build definition of a PCD
    pub fn pcd_contributors(&self, c_name: &str, token_space_guid: &uguid::Guid) -> Vec<ModuleKey> {
        self.pcd_rows
            .iter()
            .find(|row| row.definition.is_for(c_name, token_space_guid))
            .map(|row| row.contributors.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Current diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Saved instances that could not be restored
    pub fn stale_instances(&self) -> &[ModuleKey] {
        &self.stale
    }

    /// Serializable view for presentation
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            module: self.module.clone(),
            module_name: self.workspace.module_name(&self.module),
            class_produced: self.class_produced.clone(),
            class_consumed: self
                .class_consumed
                .iter()
                .map(|(class, consumers)| (class.clone(), consumers.iter().cloned().collect()))
                .collect(),
            candidates: self.class_instance_map.clone(),
            library_instances: self.library_instances(),
            pcds: self.pcd_build_definitions(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Bound instances ordered so producers precede consumers
    ///
    /// The module under edit comes last. Independent instances keep candidate
    /// order.
    pub fn build_order(&self) -> Result<Vec<ModuleKey>, ResolverError> {
        let members = self
            .bound
            .iter()
            .map(|(key, _)| key)
            .chain(std::iter::once(&self.module));

        let mut edges: BTreeMap<&ModuleKey, Vec<&ModuleKey>> = BTreeMap::new();
        for key in members {
            let mut deps = Vec::new();
            for class in self.workspace.library_classes(key, Usage::AlwaysConsumed) {
                for (producer, _) in &self.bound {
                    let produces = self
                        .workspace
                        .module(producer)
                        .is_some_and(|info| info.produces(&class));
                    if producer != key && produces && !deps.contains(&producer) {
                        deps.push(producer);
                    }
                }
            }
            edges.insert(key, deps);
        }

        let mut visited = BTreeSet::new();
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(edges.len());
        for node in edges.keys().copied() {
            self.visit(node, &edges, &mut visited, &mut path, &mut order)?;
        }

        let mut result: Vec<ModuleKey> = order
            .into_iter()
            .filter(|key| **key != self.module)
            .cloned()
            .collect();
        result.push(self.module.clone());
        Ok(result)
    }

    fn visit<'a>(
        &'a self,
        node: &'a ModuleKey,
        edges: &BTreeMap<&'a ModuleKey, Vec<&'a ModuleKey>>,
        visited: &mut BTreeSet<&'a ModuleKey>,
        path: &mut Vec<&'a ModuleKey>,
        order: &mut Vec<&'a ModuleKey>,
    ) -> Result<(), ResolverError> {
        if let Some(start) = path.iter().position(|key| *key == node) {
            let cycle = path[start..]
                .iter()
                .chain(std::iter::once(&node))
                .map(|key| self.workspace.module_name(key))
                .collect();
            return Err(ResolverError::CircularDependency { cycle });
        }
        if !visited.insert(node) {
            return Ok(());
        }

        path.push(node);
        for dep in edges.get(node).into_iter().flatten().copied() {
            self.visit(dep, edges, visited, path, order)?;
        }
        path.pop();
        order.push(node);
        Ok(())
    }
}

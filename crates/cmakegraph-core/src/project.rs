use crate::{
    Config, DependencyKind, DerivedDependencies, ProjectError, Target, TargetIndex,
    split_cmake_list,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All targets of a build description together with the configs they were generated for.
///
/// Dependencies are stored as `TargetIndex` values into `targets`, so the target list must not be
/// reordered after `derive_data` has run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    configs: Vec<String>,
    targets: Vec<Target>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configs(&self) -> &[String] {
        &self.configs
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut [Target] {
        &mut self.targets
    }

    pub fn target(&self, index: TargetIndex) -> Option<&Target> {
        self.targets.get(index.0)
    }

    pub fn target_mut(&mut self, index: TargetIndex) -> Option<&mut Target> {
        self.targets.get_mut(index.0)
    }

    pub fn find_target(&self, name: &str) -> Option<TargetIndex> {
        self.targets
            .iter()
            .position(|t| t.name == name)
            .map(TargetIndex)
    }

    pub fn target_indices(&self) -> impl Iterator<Item = TargetIndex> {
        (0..self.targets.len()).map(TargetIndex)
    }

    /// Adds a target, merging it into an existing one of the same name.
    ///
    /// A target is dumped once per config, so a second definition with the same name carries the
    /// configs missing so far. Merging is rejected when the types differ or a config would be
    /// duplicated; in that case nothing is changed.
    pub fn add_target(&mut self, target: Target) -> Result<TargetIndex, ProjectError> {
        let config_names: Vec<String> = target.configs.iter().map(|c| c.name.clone()).collect();

        let Some(index) = self.find_target(&target.name) else {
            self.targets.push(target);
            self.add_configs(config_names);
            return Ok(TargetIndex(self.targets.len() - 1));
        };

        let existing = &mut self.targets[index.0];
        if existing.kind != target.kind {
            tracing::warn!(
                "Refusing to merge target {}: type {} differs from {}",
                target.name,
                target.kind,
                existing.kind
            );
            return Err(ProjectError::TargetTypeMismatch {
                name: target.name,
                existing: existing.kind,
                incoming: target.kind,
            });
        }

        if let Some(duplicate) = target
            .configs
            .iter()
            .find(|c| existing.config(&c.name).is_some())
        {
            tracing::warn!(
                "Refusing to merge target {}: config {} already present",
                target.name,
                duplicate.name
            );
            return Err(ProjectError::DuplicateConfig {
                target: target.name.clone(),
                config: duplicate.name.clone(),
            });
        }

        existing.configs.extend(target.configs);
        self.add_configs(config_names);
        Ok(index)
    }

    /// Stores a position computed outside of the project. Unknown names are ignored.
    pub fn set_target_position(&mut self, name: &str, x: f32, y: f32) {
        if let Some(index) = self.find_target(name) {
            let graphical = &mut self.targets[index.0].graphical;
            graphical.x = x;
            graphical.y = y;
        }
    }

    pub fn set_hide_connections(&mut self, name: &str, hide: bool) -> Result<(), ProjectError> {
        let index = self
            .find_target(name)
            .ok_or_else(|| ProjectError::UnknownTarget(name.to_string()))?;
        self.targets[index.0].graphical.hide_connections = hide;
        Ok(())
    }

    fn add_configs(&mut self, names: Vec<String>) {
        for name in names {
            if !self.configs.contains(&name) {
                self.configs.push(name);
            }
        }
    }

    /// Resolves dependency properties into target references and computes derived flags.
    ///
    /// Safe to call repeatedly; every derived field is rebuilt from the properties.
    pub fn derive_data(&mut self) {
        let lookup: HashMap<String, TargetIndex> = self
            .targets
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), TargetIndex(i)))
            .collect();

        let mut referenced = vec![false; self.targets.len()];
        for (i, target) in self.targets.iter_mut().enumerate() {
            let own_index = TargetIndex(i);
            for config in &mut target.configs {
                config.derived = resolve_dependencies(config, own_index, &lookup);
                for dependency in &config.derived.all {
                    referenced[dependency.0] = true;
                }
                if !config.derived.unmatched.is_empty() {
                    tracing::debug!(
                        "Target {} ({}) has unresolved dependencies: {:?}",
                        target.name,
                        config.name,
                        config.derived.unmatched
                    );
                }
            }
            derive_property_consistency(&mut target.configs);
        }

        for (target, is_referenced) in self.targets.iter_mut().zip(referenced) {
            target.derived.is_referenced = is_referenced;
        }
    }
}

fn resolve_dependencies(
    config: &Config,
    own_index: TargetIndex,
    lookup: &HashMap<String, TargetIndex>,
) -> DerivedDependencies {
    let mut derived = DerivedDependencies::default();

    for kind in DependencyKind::ALL {
        let Some(property) = config.find_property(kind.property_name()) else {
            continue;
        };

        let mut resolved = Vec::new();
        for name in split_cmake_list(&property.value) {
            if name.is_empty() {
                continue;
            }
            match lookup.get(name) {
                Some(&index) if index == own_index => {}
                Some(&index) => resolved.push(index),
                None => derived.unmatched.push(name.to_string()),
            }
        }

        for &index in &resolved {
            if !derived.all.contains(&index) {
                derived.all.push(index);
            }
        }

        match kind {
            DependencyKind::Build => derived.build = resolved,
            DependencyKind::Interface => derived.interface = resolved,
            DependencyKind::Manual => derived.manual = resolved,
        }
    }

    derived
}

fn derive_property_consistency(configs: &mut [Config]) {
    for config in configs.iter_mut() {
        for property in &mut config.properties {
            property.is_consistent = true;
        }
    }

    let Some((first, others)) = configs.split_first_mut() else {
        return;
    };

    for property in &mut first.properties {
        let mut is_consistent = true;
        for other in others.iter() {
            match other.find_property(&property.name) {
                Some(counterpart) if counterpart.value == property.value => {}
                _ => is_consistent = false,
            }
        }

        property.is_consistent = is_consistent;
        for other in others.iter_mut() {
            if let Some(counterpart) = other.find_property_mut(&property.name) {
                counterpart.is_consistent = is_consistent;
            }
        }
    }
}

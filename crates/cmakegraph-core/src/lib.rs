use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod dependency;
pub mod error;
pub mod list;
pub mod project;

pub use dependency::{DependencyKind, DependencyKinds};
pub use error::ProjectError;
pub use list::{remove_link_only_entries, split_cmake_list, strip_directory_ids};
pub use project::Project;

/// Property holding the targets linked with `target_link_libraries()`.
pub const LINK_LIBRARIES: &str = "LINK_LIBRARIES";
/// Property holding the link interface propagated to consumers.
pub const INTERFACE_LINK_LIBRARIES: &str = "INTERFACE_LINK_LIBRARIES";
/// Property holding dependencies added with `add_dependencies()`.
pub const MANUALLY_ADDED_DEPENDENCIES: &str = "MANUALLY_ADDED_DEPENDENCIES";

/// Stable position of a target inside `Project::targets()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetIndex(pub usize);

impl fmt::Display for TargetIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum TargetType {
    StaticLibrary,
    ModuleLibrary,
    SharedLibrary,
    ObjectLibrary,
    InterfaceLibrary,
    UnknownLibrary,
    UnknownTarget,
    Executable,
    Utility,
}

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone)]
pub enum EnumConversionError {
    #[error("Invalid TargetType value: {0}")]
    InvalidTargetType(i32),
}

impl TargetType {
    pub const COUNT: usize = 9;

    pub const ALL: [TargetType; Self::COUNT] = [
        TargetType::StaticLibrary,
        TargetType::ModuleLibrary,
        TargetType::SharedLibrary,
        TargetType::ObjectLibrary,
        TargetType::InterfaceLibrary,
        TargetType::UnknownLibrary,
        TargetType::UnknownTarget,
        TargetType::Executable,
        TargetType::Utility,
    ];

    /// Position of this type in `ALL`, usable for enum-indexed tables.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            TargetType::StaticLibrary => "static library",
            TargetType::ModuleLibrary => "module library",
            TargetType::SharedLibrary => "shared library",
            TargetType::ObjectLibrary => "object library",
            TargetType::InterfaceLibrary => "interface library",
            TargetType::UnknownLibrary => "unknown library",
            TargetType::UnknownTarget => "unknown target",
            TargetType::Executable => "executable",
            TargetType::Utility => "utility target",
        }
    }
}

impl TryFrom<i32> for TargetType {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(EnumConversionError::InvalidTargetType(value))
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
    /// True when every config of the owning target carries the same value.
    #[serde(skip, default = "default_consistent")]
    pub is_consistent: bool,
}

fn default_consistent() -> bool {
    true
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_consistent: true,
        }
    }
}

/// Dependency lists resolved by `Project::derive_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedDependencies {
    pub build: Vec<TargetIndex>,
    pub interface: Vec<TargetIndex>,
    pub manual: Vec<TargetIndex>,
    /// Union of the three lists above, in build, interface, manual order without duplicates.
    pub all: Vec<TargetIndex>,
    /// Names that did not resolve to any target of the project.
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    pub properties: Vec<Property>,
    #[serde(skip)]
    pub derived: DerivedDependencies,
}

impl Config {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            derived: DerivedDependencies::default(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::new(name, value));
        self
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn find_property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    pub fn dependencies(&self, kind: DependencyKind) -> &[TargetIndex] {
        match kind {
            DependencyKind::Build => &self.derived.build,
            DependencyKind::Interface => &self.derived.interface,
            DependencyKind::Manual => &self.derived.manual,
        }
    }

    /// Repairs list properties using their non-evaluated form.
    ///
    /// Only `LINK_LIBRARIES` and `INTERFACE_LINK_LIBRARIES` are touched. Directory-id wrappers are
    /// stripped from both values, then every entry wrapped in `$<LINK_ONLY:...>` in the raw value
    /// is removed from the evaluated one.
    pub fn fixup_with_non_evaluated(&mut self, property_name: &str, raw_value: &str) {
        if property_name != LINK_LIBRARIES && property_name != INTERFACE_LINK_LIBRARIES {
            return;
        }

        let Some(property) = self.find_property_mut(property_name) else {
            tracing::debug!(
                "Config {} has no {} property to fix up",
                self.name,
                property_name
            );
            return;
        };

        strip_directory_ids(&mut property.value);

        let mut raw_value = raw_value.to_string();
        strip_directory_ids(&mut raw_value);
        remove_link_only_entries(&mut property.value, &raw_value);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphicalData {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub hide_connections: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetDerived {
    /// Some other target depends on this one, in any config, through any dependency kind.
    pub is_referenced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub kind: TargetType,
    pub configs: Vec<Config>,
    #[serde(default)]
    pub graphical: GraphicalData,
    #[serde(skip)]
    pub derived: TargetDerived,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetType) -> Self {
        Self {
            name: name.into(),
            kind,
            configs: Vec::new(),
            graphical: GraphicalData::default(),
            derived: TargetDerived::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.configs.push(config);
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.graphical.x = x;
        self.graphical.y = y;
        self
    }

    pub fn config(&self, name: &str) -> Option<&Config> {
        self.configs.iter().find(|c| c.name == name)
    }

    pub fn config_mut(&mut self, name: &str) -> Option<&mut Config> {
        self.configs.iter_mut().find(|c| c.name == name)
    }

    pub fn get_or_create_config(&mut self, name: &str) -> &mut Config {
        let index = match self.configs.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.configs.push(Config::new(name));
                self.configs.len() - 1
            }
        };
        &mut self.configs[index]
    }

    /// Reads a property from the first config. Callers should check `is_consistent`.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.configs.first().and_then(|c| c.find_property(name))
    }

    pub fn position(&self) -> (f32, f32) {
        (self.graphical.x, self.graphical.y)
    }
}

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// The three independently tracked dependency relations between targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// Based on `LINK_LIBRARIES`.
    Build,
    /// Based on `INTERFACE_LINK_LIBRARIES`.
    Interface,
    /// Based on `MANUALLY_ADDED_DEPENDENCIES`.
    Manual,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 3] = [
        DependencyKind::Build,
        DependencyKind::Interface,
        DependencyKind::Manual,
    ];

    pub fn flag(self) -> DependencyKinds {
        match self {
            DependencyKind::Build => DependencyKinds::BUILD,
            DependencyKind::Interface => DependencyKinds::INTERFACE,
            DependencyKind::Manual => DependencyKinds::MANUAL,
        }
    }

    pub fn property_name(self) -> &'static str {
        match self {
            DependencyKind::Build => crate::LINK_LIBRARIES,
            DependencyKind::Interface => crate::INTERFACE_LINK_LIBRARIES,
            DependencyKind::Manual => crate::MANUALLY_ADDED_DEPENDENCIES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DependencyKind::Build => "build",
            DependencyKind::Interface => "interface",
            DependencyKind::Manual => "additional",
        }
    }
}

bitflags! {
    /// Filter selecting which dependency kinds are displayed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DependencyKinds: u8 {
        const BUILD = 1 << 0;
        const INTERFACE = 1 << 1;
        const MANUAL = 1 << 2;
    }
}

impl Default for DependencyKinds {
    fn default() -> Self {
        DependencyKinds::BUILD
    }
}

impl DependencyKinds {
    pub fn includes(self, kind: DependencyKind) -> bool {
        self.contains(kind.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_includes_only_selected_kinds() {
        let filter = DependencyKinds::BUILD | DependencyKinds::INTERFACE;
        assert!(filter.includes(DependencyKind::Build));
        assert!(filter.includes(DependencyKind::Interface));
        assert!(!filter.includes(DependencyKind::Manual));
        assert!(!DependencyKinds::empty().includes(DependencyKind::Build));
    }

    #[test]
    fn test_default_filter_is_build() {
        assert_eq!(DependencyKinds::default(), DependencyKinds::BUILD);
    }
}

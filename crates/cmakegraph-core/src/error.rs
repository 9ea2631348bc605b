use crate::TargetType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    #[error("Target {name} is a {existing} but was added again as a {incoming}")]
    TargetTypeMismatch {
        name: String,
        existing: TargetType,
        incoming: TargetType,
    },
    #[error("Target {target} already has a config named {config}")]
    DuplicateConfig { target: String, config: String },
    #[error("Unknown target: {0}")]
    UnknownTarget(String),
}

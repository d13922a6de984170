use thiserror::Error;

/// Failure to produce a computed style for a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("cannot compute a style for {node_name}: not an element")]
    NotAnElement { node_name: String },
    #[error("invalid value for `{property}`: `{value}` ({reason})")]
    InvalidValue {
        property: String,
        value: String,
        reason: String,
    },
}

//! Paint-order classification of a cloned document.

mod classifier;
mod node;

pub use classifier::{DEBUG_ATTRIBUTE, classify};
pub use node::{RenderFlags, RenderNode, RenderNodeKind, TextRun};

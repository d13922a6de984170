//! Typed computed styles for snapshot rendering.
//!
//! The [`StyleResolver`] trait is the boundary between the snapshot pipeline and whatever
//! produces computed styles. [`InlineStyleResolver`] is the built-in implementation: it
//! applies user-agent defaults and the element's `style` attribute, with inheritance of
//! the few inherited properties the pipeline reads.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod declarations;
mod error;
pub mod model;
pub mod parsers;
mod resolver;
pub mod transform;
mod ua;

pub use error::StyleError;
pub use model::{ComputedStyle, Display, Float, Position, Rgba, TextTransform, Visibility};
pub use parsers::text::apply_text_transform;
pub use resolver::{InlineStyleResolver, StyleResolver, build_computed_from_inline, compute_with_ancestors};
pub use transform::{Transform, parse_transform};
pub use ua::default_display;

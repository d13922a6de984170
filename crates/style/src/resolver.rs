//! Turning elements into computed style snapshots.

use std::collections::HashMap;

use dom::{Document, NodeId};
use log::{debug, warn};

use crate::declarations::parse_style_attribute_into_map;
use crate::error::StyleError;
use crate::model::{ComputedStyle, Display};
use crate::parsers::{self, invalid};
use crate::transform::parse_transform;
use crate::ua::default_display;

/// Computes the style of one element given its parent's computed style.
///
/// Implementations must be pure with respect to the document: the same element and
/// parent style always produce the same result.
pub trait StyleResolver {
    /// # Errors
    /// Returns a [`StyleError`] when the node is not an element or its style cannot be
    /// computed.
    fn compute(
        &self,
        document: &Document,
        node: NodeId,
        parent: Option<&ComputedStyle>,
    ) -> Result<ComputedStyle, StyleError>;
}

/// Resolves styles from user-agent defaults plus the element's `style` attribute.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineStyleResolver {
    /// Reject invalid declarations instead of dropping them.
    pub strict: bool,
}

impl InlineStyleResolver {
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }
}

impl StyleResolver for InlineStyleResolver {
    fn compute(
        &self,
        document: &Document,
        node: NodeId,
        parent: Option<&ComputedStyle>,
    ) -> Result<ComputedStyle, StyleError> {
        let element = document
            .element(node)
            .ok_or_else(|| StyleError::NotAnElement {
                node_name: document.node_name(node),
            })?;

        let decls = element
            .attr("style")
            .map(parse_style_attribute_into_map)
            .unwrap_or_default();
        let mut rejected = Vec::new();
        let mut computed = build_computed_from_inline(&decls, parent, &mut rejected);

        // UA display applies only when the author didn't set one.
        if !decls.contains_key("display") || rejected.iter().any(is_display_error) {
            computed.display = default_display(&element.tag);
        }
        if element.has_attr("hidden") && !decls.contains_key("display") {
            computed.display = Display::None;
        }
        if element.freeze.animations || element.freeze.transitions {
            computed.freeze_animations();
        }

        if let Some(first) = rejected.first()
            && self.strict
        {
            return Err(first.clone());
        }
        for error in &rejected {
            warn!(target: "style", "<{}> dropped declaration: {error}", element.tag);
        }
        Ok(computed)
    }
}

fn is_display_error(error: &StyleError) -> bool {
    matches!(error, StyleError::InvalidValue { property, .. } if property == "display")
}

/// Build a computed style from inline declarations, inheriting `color`, `visibility` and
/// `text-transform` from `parent_style`.
pub fn build_computed_from_inline(
    decls: &HashMap<String, String>,
    parent_style: Option<&ComputedStyle>,
    rejected: &mut Vec<StyleError>,
) -> ComputedStyle {
    let mut computed = ComputedStyle::default();
    if let Some(parent) = parent_style {
        computed.color = parent.color;
        computed.visibility = parent.visibility;
        computed.text_transform = parent.text_transform;
    }

    parsers::layout::apply_layout_keywords(&mut computed, decls, rejected);
    parsers::colors::apply_colors(&mut computed, decls, rejected);
    parsers::colors::apply_effects(&mut computed, decls, rejected);
    parsers::animation::apply_animation(&mut computed, decls, rejected);
    parsers::text::apply_text(&mut computed, decls, rejected);
    if let Some(value) = decls.get("transform") {
        match parse_transform(value) {
            Ok(transform) => computed.transform = transform,
            Err(reason) => rejected.push(invalid("transform", value, reason)),
        }
    }
    computed
}

/// Compute the style of `node` by resolving every ancestor element first.
///
/// # Errors
/// Propagates the first resolver error on the ancestor chain.
pub fn compute_with_ancestors(
    resolver: &dyn StyleResolver,
    document: &Document,
    node: NodeId,
) -> Result<ComputedStyle, StyleError> {
    let mut chain = vec![node];
    let mut current = node;
    while let Some(parent) = document
        .parent(current)
        .or_else(|| document.shadow_host(current))
    {
        if document.element(parent).is_some() {
            chain.push(parent);
        }
        current = parent;
    }
    let mut style: Option<ComputedStyle> = None;
    for element in chain.into_iter().rev() {
        style = Some(resolver.compute(document, element, style.as_ref())?);
    }
    debug!(target: "style", "resolved {} through its ancestors", document.node_name(node));
    style.ok_or_else(|| StyleError::NotAnElement {
        node_name: document.node_name(node),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Float, Position, Rgba, TextTransform, Visibility};
    use anyhow::{Result, anyhow};
    use dom::{Freeze, parse_html};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn first(document: &Document, tag: &str) -> Result<NodeId> {
        document
            .elements_by_tag_name(tag)
            .first()
            .copied()
            .ok_or_else(|| anyhow!("no <{tag}>"))
    }

    #[test]
    fn inline_declarations_override_ua_defaults() -> Result<()> {
        init_logging();
        let document = parse_html(
            "<body><div style=\"position: absolute; z-index: 4; opacity: 50%; float: left; background: red url(x.png)\"></div></body>",
        );
        let div = first(&document, "div")?;
        let style = InlineStyleResolver::default().compute(&document, div, None)?;
        assert_eq!(style.display, Display::Block);
        assert_eq!(style.position, Position::Absolute);
        assert_eq!(style.z_index, Some(4));
        assert_eq!(style.opacity, Some(0.5));
        assert_eq!(style.float, Float::Left);
        assert_eq!(
            style.background_color,
            Rgba {
                red: 255,
                green: 0,
                blue: 0,
                alpha: 255
            }
        );
        Ok(())
    }

    #[test]
    fn inherited_properties_flow_from_parent() -> Result<()> {
        init_logging();
        let document = parse_html(
            "<body style=\"color: #00ff00; visibility: hidden; text-transform: uppercase\"><span>x</span></body>",
        );
        let span = first(&document, "span")?;
        let style = compute_with_ancestors(&InlineStyleResolver::default(), &document, span)?;
        assert_eq!(style.color.green, 255);
        assert_eq!(style.visibility, Visibility::Hidden);
        assert_eq!(style.text_transform, TextTransform::Uppercase);
        assert_eq!(style.display, Display::Inline);
        Ok(())
    }

    #[test]
    fn hidden_elements_and_attribute() -> Result<()> {
        init_logging();
        let document = parse_html("<head><style></style></head><body><p hidden>gone</p></body>");
        let resolver = InlineStyleResolver::default();
        for tag in ["head", "style", "p"] {
            let node = first(&document, tag)?;
            let style = resolver.compute(&document, node, None)?;
            assert_eq!(style.display, Display::None, "<{tag}>");
        }
        Ok(())
    }

    #[test]
    fn invalid_values_are_dropped_unless_strict() -> Result<()> {
        init_logging();
        let document = parse_html("<body><div style=\"opacity: lots; transform: warp(3)\"></div></body>");
        let div = first(&document, "div")?;

        let lenient = InlineStyleResolver::default().compute(&document, div, None)?;
        assert_eq!(lenient.opacity, None);
        assert!(!lenient.is_transformed());

        let strict = InlineStyleResolver::strict().compute(&document, div, None);
        assert!(matches!(
            strict,
            Err(StyleError::InvalidValue { ref property, .. }) if property == "opacity"
        ));
        Ok(())
    }

    #[test]
    fn frozen_elements_report_settled_animations() -> Result<()> {
        init_logging();
        let mut document = parse_html(
            "<body><div style=\"animation-duration: 2s, 300ms; transition: opacity 1s\"></div></body>",
        );
        let div = first(&document, "div")?;
        let resolver = InlineStyleResolver::default();

        let live = resolver.compute(&document, div, None)?;
        assert_eq!(live.animation_duration, vec![2.0, 0.3]);
        assert_eq!(live.transition_property, vec!["opacity".to_owned()]);

        if let Some(data) = document.element_mut(div) {
            data.freeze = Freeze::ALL;
        }
        let frozen = resolver.compute(&document, div, None)?;
        assert_eq!(frozen.animation_duration, vec![0.0, 0.0]);
        assert!(frozen.transition_property.is_empty());
        Ok(())
    }

    #[test]
    fn text_nodes_have_no_style() -> Result<()> {
        init_logging();
        let document = parse_html("<body>text</body>");
        let body = first(&document, "body")?;
        let text = document
            .children(body)
            .first()
            .copied()
            .ok_or_else(|| anyhow!("no text"))?;
        let result = InlineStyleResolver::default().compute(&document, text, None);
        assert!(matches!(result, Err(StyleError::NotAnElement { .. })));
        Ok(())
    }
}

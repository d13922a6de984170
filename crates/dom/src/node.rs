use crate::doctype::Doctype;
use crate::geometry::Bounds;
use crate::resources::ImageRequest;
use indextree::NodeId;
use smallvec::SmallVec;
use std::rc::Rc;

/// Namespace of an element. Only HTML and SVG elements are paintable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
    Other,
}

impl Namespace {
    /// Map a namespace URL from the parser onto the namespaces we care about.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        match url {
            "http://www.w3.org/1999/xhtml" | "" => Self::Html,
            "http://www.w3.org/2000/svg" => Self::Svg,
            "http://www.w3.org/1998/Math/MathML" => Self::MathMl,
            _ => Self::Other,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_paintable(self) -> bool {
        matches!(self, Self::Html | Self::Svg)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowRootMode {
    Open,
    Closed,
}

/// Overrides stamped onto a cloned element so that it paints in a settled state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Freeze {
    /// Animation durations forced to zero.
    pub animations: bool,
    /// `transition-property: none`.
    pub transitions: bool,
    /// Transform ignored while measuring bounds.
    pub transform: bool,
}

impl Freeze {
    /// Every override applied.
    pub const ALL: Self = Self {
        animations: true,
        transitions: true,
        transform: true,
    };
}

#[derive(Clone, Debug, Default)]
pub struct ElementData {
    /// Lowercase local name.
    pub tag: String,
    pub namespace: Namespace,
    pub attrs: SmallVec<(String, String), 4>,
    /// Attached shadow root, if any. Points at a `NodeData::ShadowRoot` node.
    pub shadow_root: Option<NodeId>,
    /// Border box in viewport coordinates, as reported by layout.
    pub client_rect: Bounds,
    /// Shared request for `img` elements.
    pub image: Option<Rc<ImageRequest>>,
    pub freeze: Freeze,
}

impl ElementData {
    #[must_use]
    pub fn new(tag: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            namespace,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[inline]
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set or replace an attribute, keeping the original insertion order.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            slot.1 = value;
        } else {
            self.attrs.push((name.to_ascii_lowercase(), value));
        }
    }

    #[inline]
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Shallow copy: same name, namespace, attributes, geometry and image request.
    /// The shadow root link and freeze record are not carried over.
    #[must_use]
    pub fn shallow_clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            namespace: self.namespace,
            attrs: self.attrs.clone(),
            shadow_root: None,
            client_rect: self.client_rect,
            image: self.image.clone(),
            freeze: Freeze::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum NodeData {
    Document,
    Doctype(Doctype),
    Element(ElementData),
    Text(String),
    Comment(String),
    ShadowRoot { host: NodeId, mode: ShadowRootMode },
}

impl NodeData {
    #[inline]
    #[must_use]
    pub const fn as_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(data) => Some(data),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            Self::Element(data) => Some(data),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    /// `Node.nodeName`, as reported in error messages.
    #[must_use]
    pub fn node_name(&self) -> String {
        match self {
            Self::Document => "#document".to_owned(),
            Self::Doctype(doctype) => doctype.name.clone(),
            Self::Element(data) => data.tag.to_ascii_uppercase(),
            Self::Text(_) => "#text".to_owned(),
            Self::Comment(_) => "#comment".to_owned(),
            Self::ShadowRoot { .. } => "#document-fragment".to_owned(),
        }
    }
}

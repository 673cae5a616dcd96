//! selectors-crate integration for the arena document.
//!
//! [`ElementRef`] implements `selectors::Element` over the arena so that
//! locator selector strings can be matched with the real CSS matching engine,
//! and [`query_selector`]/[`query_selector_all`] provide the
//! `document.querySelector` surface the resolution engine is written against.

use std::fmt;

use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::ElementSelectorFlags;
use selectors::parser::SelectorParseErrorKind;
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{Document, NodeData, NodeId};
use crate::error::{Error, Result};

/// Selector implementation for the selectors crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocusSelectors;

/// A parsed selector, reusable across queries.
pub type Selector = selectors::parser::Selector<LocusSelectors>;

/// Identifier string type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        let mut h: u32 = 0;
        for byte in self.0.bytes() {
            h = h.wrapping_mul(31).wrapping_add(byte as u32);
        }
        h
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'a> From<&'a str> for IdentStr {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Wrapper type for LocalName that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssLocalName {
    fn from(s: String) -> Self {
        Self(LocalName::from(s))
    }
}

impl<'a> From<&'a str> for CssLocalName {
    fn from(s: &'a str) -> Self {
        Self(LocalName::from(s))
    }
}

impl AsRef<str> for CssLocalName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

/// Wrapper type for Namespace that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssNamespace {
    fn from(s: String) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'a> From<&'a str> for CssNamespace {
    fn from(s: &'a str) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'i> selectors::parser::Parser<'i> for LocusSelectors {
    type Impl = LocusSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

/// Pseudo-element type (unused but required by the trait).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = LocusSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }

    fn valid_after_slotted(&self) -> bool {
        false
    }
}

/// Non-TS pseudo-class type. Only `:link` is meaningful in a static resource
/// document; the rest parse but never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {
    Link,
    Visited,
    Hover,
    Active,
    Focus,
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = LocusSelectors;

    fn is_active_or_hover(&self) -> bool {
        matches!(self, Self::Hover | Self::Active)
    }

    fn is_user_action_state(&self) -> bool {
        matches!(self, Self::Hover | Self::Active | Self::Focus)
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::Link => dest.write_str(":link"),
            Self::Visited => dest.write_str(":visited"),
            Self::Hover => dest.write_str(":hover"),
            Self::Active => dest.write_str(":active"),
            Self::Focus => dest.write_str(":focus"),
        }
    }
}

impl SelectorImpl for LocusSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// Reference to an element in the document for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub doc: &'a Document,
    pub id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.doc.element_name(self.id))
            .finish()
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = LocusSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        let node = self.doc.get(self.id)?;
        if node.parent.is_none() {
            return None;
        }
        if self.doc.is_element(node.parent) {
            Some(Self::new(self.doc, node.parent))
        } else {
            None
        }
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let node = self.doc.get(self.id)?;
        let mut current = node.prev_sibling;
        while current.is_some() {
            if self.doc.is_element(current) {
                return Some(Self::new(self.doc, current));
            }
            current = self.doc.get(current)?.prev_sibling;
        }
        None
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let node = self.doc.get(self.id)?;
        let mut current = node.next_sibling;
        while current.is_some() {
            if self.doc.is_element(current) {
                return Some(Self::new(self.doc, current));
            }
            current = self.doc.get(current)?.next_sibling;
        }
        None
    }

    fn first_element_child(&self) -> Option<Self> {
        self.doc
            .element_children(self.id)
            .next()
            .map(|c| Self::new(self.doc, c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.doc.element_name(self.id).is_some_and(|n| n == &name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.doc
            .element_namespace(self.id)
            .is_some_and(|n| n == &ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.doc.element_name(self.id) == other.doc.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        let node = match self.doc.get(self.id) {
            Some(n) => n,
            None => return false,
        };

        let attrs = match &node.data {
            NodeData::Element { attrs, .. } => attrs,
            _ => return false,
        };

        for attr in attrs {
            let ns_match = match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            };
            if !ns_match || attr.name.local != local_name.0 {
                continue;
            }
            return operation.eval_str(&attr.value);
        }
        false
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match pc {
            NonTSPseudoClass::Link => self.is_link(),
            _ => false,
        }
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn is_link(&self) -> bool {
        self.doc.tag_is(self.id, "a") && self.doc.attr(self.id, "href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        match self.doc.element_id(self.id) {
            Some(elem_id) => case_sensitivity.eq(elem_id.as_bytes(), id.0.as_bytes()),
            None => false,
        }
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .element_classes(self.id)
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        for child in self.doc.children(self.id) {
            match self.doc.get(child).map(|n| &n.data) {
                Some(NodeData::Element { .. }) => return false,
                Some(NodeData::Text(t)) if !t.trim().is_empty() => return false,
                _ => {}
            }
        }
        true
    }

    fn is_root(&self) -> bool {
        let parent = self.doc.get(self.id).map(|n| n.parent);
        if let Some(parent) = parent
            && let Some(parent_node) = self.doc.get(parent)
        {
            return matches!(parent_node.data, NodeData::Document);
        }
        false
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

/// Parse a selector string, reporting the failing selector on error.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    let mut parser_input = cssparser::ParserInput::new(selector);
    let mut parser = cssparser::Parser::new(&mut parser_input);
    selectors::parser::Selector::parse(&LocusSelectors, &mut parser).map_err(|_| {
        Error::SelectorParse {
            selector: selector.to_string(),
        }
    })
}

fn matches(doc: &Document, id: NodeId, selector: &Selector) -> bool {
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        selectors::matching::MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        selectors::matching::NeedsSelectorFlags::No,
        selectors::matching::MatchingForInvalidation::No,
    );
    selectors::matching::matches_selector(
        selector,
        0,
        None,
        &ElementRef::new(doc, id),
        &mut context,
    )
}

/// First element matching the selector, in document order.
///
/// The failing selector string is carried in the error so callers can log it.
pub fn query_selector(doc: &Document, selector: &str) -> Result<NodeId> {
    let parsed = parse_selector(selector)?;
    let mut stack = vec![doc.document()];
    while let Some(id) = stack.pop() {
        if doc.is_element(id) && matches(doc, id, &parsed) {
            return Ok(id);
        }
        let mut children: Vec<_> = doc.children(id).collect();
        children.reverse();
        stack.extend(children);
    }
    Err(Error::SelectorNotFound {
        selector: selector.to_string(),
    })
}

/// All elements matching the selector, in document order.
pub fn query_selector_all(doc: &Document, selector: &str) -> Result<Vec<NodeId>> {
    let parsed = parse_selector(selector)?;
    let mut out = Vec::new();
    let mut stack = vec![doc.document()];
    while let Some(id) = stack.pop() {
        if doc.is_element(id) && matches(doc, id, &parsed) {
            out.push(id);
        }
        let mut children: Vec<_> = doc.children(id).collect();
        children.reverse();
        stack.extend(children);
    }
    Ok(out)
}

/// First matching descendant of `scope` (DOM `element.querySelector`).
pub fn query_selector_within(doc: &Document, scope: NodeId, selector: &str) -> Result<NodeId> {
    let parsed = parse_selector(selector)?;
    let mut stack: Vec<_> = {
        let mut children: Vec<_> = doc.children(scope).collect();
        children.reverse();
        children
    };
    while let Some(id) = stack.pop() {
        if doc.is_element(id) && matches(doc, id, &parsed) {
            return Ok(id);
        }
        let mut children: Vec<_> = doc.children(id).collect();
        children.reverse();
        stack.extend(children);
    }
    Err(Error::SelectorNotFound {
        selector: selector.to_string(),
    })
}

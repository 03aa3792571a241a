//! Document style surface
//!
//! The document root carries the theme markers (classes, a data attribute)
//! and the style variables downstream stylesheets consume. Root changes are
//! described by a [`RootPatch`] and applied in a single call, so no reader
//! can observe a half-applied patch.

use crate::error::{PlatformError, Result};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

/// Index of an element inside a document surface
pub type ElementId = usize;

/// Callback run once after the next paint
pub type PaintCallback = Box<dyn FnOnce() + Send>;

/// A batch of root-level changes.
///
/// Applied in order: class removals, class additions, attributes, variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootPatch {
    pub remove_classes: Vec<String>,
    pub add_classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub variables: Vec<(String, String)>,
}

impl RootPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_class(mut self, class: impl Into<String>) -> Self {
        self.remove_classes.push(class.into());
        self
    }

    pub fn add_class(mut self, class: impl Into<String>) -> Self {
        self.add_classes.push(class.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.remove_classes.is_empty()
            && self.add_classes.is_empty()
            && self.attributes.is_empty()
            && self.variables.is_empty()
    }
}

/// Observable state of the document root
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootSnapshot {
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub variables: BTreeMap<String, String>,
}

impl RootSnapshot {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Apply a patch, returning whether anything changed
    fn apply(&mut self, patch: &RootPatch) -> bool {
        let before = self.clone();
        for class in &patch.remove_classes {
            self.classes.remove(class);
        }
        for class in &patch.add_classes {
            self.classes.insert(class.clone());
        }
        for (name, value) in &patch.attributes {
            self.attributes.insert(name.clone(), value.clone());
        }
        for (name, value) in &patch.variables {
            self.variables.insert(name.clone(), value.clone());
        }
        *self != before
    }
}

/// A `<link>` resource hint in the document head
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkHint {
    pub rel: String,
    pub href: String,
    pub as_type: Option<String>,
}

impl LinkHint {
    pub fn preload(href: impl Into<String>, as_type: impl Into<String>) -> Self {
        Self {
            rel: "preload".to_string(),
            href: href.into(),
            as_type: Some(as_type.into()),
        }
    }
}

/// The document as seen by the runtime core
pub trait DocumentSurface: Send + Sync {
    /// Apply every change in `patch` as one unit
    fn apply_root(&self, patch: &RootPatch);

    fn root_snapshot(&self) -> RootSnapshot;

    /// Elements matching a simple selector, in document order
    fn select(&self, selector: &str) -> Result<Vec<ElementId>>;

    /// Current inline value of `property`, if set
    fn style(&self, element: ElementId, property: &str) -> Option<String>;

    /// Set an inline style property. Returns `true` if the value changed.
    fn set_style(&self, element: ElementId, property: &str, value: &str) -> bool;

    /// Remove an inline style property. Returns `true` if it was present.
    fn remove_style(&self, element: ElementId, property: &str) -> bool;

    /// Insert a head link. Returns `false` if one with the same href exists.
    fn insert_link(&self, link: LinkHint) -> bool;

    fn remove_link(&self, href: &str) -> bool;

    /// Run `callback` once, right after the next paint
    fn after_next_paint(&self, callback: PaintCallback);
}

/// Simple selector: `tag`, `.class`, `#id` or `tag.class`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
    TagClass(String, String),
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let invalid = || PlatformError::InvalidSelector(input.to_string());
        let valid_ident =
            |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if let Some(id) = input.strip_prefix('#') {
            return valid_ident(id).then(|| Selector::Id(id.to_string())).ok_or_else(invalid);
        }
        if let Some(class) = input.strip_prefix('.') {
            return valid_ident(class)
                .then(|| Selector::Class(class.to_string()))
                .ok_or_else(invalid);
        }
        match input.split_once('.') {
            Some((tag, class)) if valid_ident(tag) && valid_ident(class) => {
                Ok(Selector::TagClass(tag.to_string(), class.to_string()))
            }
            Some(_) => Err(invalid()),
            None if valid_ident(input) => Ok(Selector::Tag(input.to_string())),
            None => Err(invalid()),
        }
    }

    pub fn matches(&self, element: &VirtualElement) -> bool {
        match self {
            Selector::Tag(tag) => element.tag == *tag,
            Selector::Class(class) => element.classes.contains(class),
            Selector::Id(id) => element.id.as_deref() == Some(id.as_str()),
            Selector::TagClass(tag, class) => {
                element.tag == *tag && element.classes.contains(class)
            }
        }
    }
}

/// An element of a [`VirtualDocument`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: BTreeSet<String>,
    pub style: BTreeMap<String, String>,
}

impl VirtualElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }
}

/// Root state captured at paint time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaintFrame {
    pub index: usize,
    pub root: RootSnapshot,
}

#[derive(Default)]
struct DocumentInner {
    root: RootSnapshot,
    elements: Vec<VirtualElement>,
    links: Vec<LinkHint>,
    frames: Vec<PaintFrame>,
    after_paint: Vec<PaintCallback>,
    invalidations: usize,
}

/// In-memory document.
///
/// Paints happen only when [`VirtualDocument::paint`] is called, which makes
/// "what did the first paint look like" an assertable fact.
#[derive(Default)]
pub struct VirtualDocument {
    inner: Mutex<DocumentInner>,
}

impl VirtualDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_element(&self, element: VirtualElement) -> ElementId {
        let mut inner = self.inner.lock();
        inner.elements.push(element);
        inner.elements.len() - 1
    }

    pub fn element(&self, id: ElementId) -> Option<VirtualElement> {
        self.inner.lock().elements.get(id).cloned()
    }

    /// Paint the current state, then run callbacks waiting on this paint
    pub fn paint(&self) -> PaintFrame {
        let (frame, callbacks) = {
            let mut inner = self.inner.lock();
            let frame = PaintFrame {
                index: inner.frames.len(),
                root: inner.root.clone(),
            };
            inner.frames.push(frame.clone());
            (frame, std::mem::take(&mut inner.after_paint))
        };

        for callback in callbacks {
            callback();
        }
        frame
    }

    pub fn frames(&self) -> Vec<PaintFrame> {
        self.inner.lock().frames.clone()
    }

    pub fn links(&self) -> Vec<LinkHint> {
        self.inner.lock().links.clone()
    }

    /// Number of mutations that changed computed style
    pub fn invalidations(&self) -> usize {
        self.inner.lock().invalidations
    }

    pub fn pending_paint_callbacks(&self) -> usize {
        self.inner.lock().after_paint.len()
    }
}

impl DocumentSurface for VirtualDocument {
    fn apply_root(&self, patch: &RootPatch) {
        let mut inner = self.inner.lock();
        if inner.root.apply(patch) {
            inner.invalidations += 1;
        }
    }

    fn root_snapshot(&self) -> RootSnapshot {
        self.inner.lock().root.clone()
    }

    fn select(&self, selector: &str) -> Result<Vec<ElementId>> {
        let selector = Selector::parse(selector)?;
        let inner = self.inner.lock();
        Ok(inner
            .elements
            .iter()
            .enumerate()
            .filter(|(_, element)| selector.matches(element))
            .map(|(id, _)| id)
            .collect())
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.inner.lock().elements.get(element)?.style.get(property).cloned()
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) -> bool {
        let mut inner = self.inner.lock();
        let Some(el) = inner.elements.get_mut(element) else {
            return false;
        };
        if el.style.get(property).map(String::as_str) == Some(value) {
            return false;
        }
        el.style.insert(property.to_string(), value.to_string());
        inner.invalidations += 1;
        true
    }

    fn remove_style(&self, element: ElementId, property: &str) -> bool {
        let mut inner = self.inner.lock();
        let Some(el) = inner.elements.get_mut(element) else {
            return false;
        };
        if el.style.remove(property).is_none() {
            return false;
        }
        inner.invalidations += 1;
        true
    }

    fn insert_link(&self, link: LinkHint) -> bool {
        let mut inner = self.inner.lock();
        if inner.links.iter().any(|l| l.href == link.href) {
            return false;
        }
        inner.links.push(link);
        true
    }

    fn remove_link(&self, href: &str) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.links.len();
        inner.links.retain(|l| l.href != href);
        inner.links.len() != before
    }

    fn after_next_paint(&self, callback: PaintCallback) {
        self.inner.lock().after_paint.push(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_selector_parsing() {
        assert_eq!(Selector::parse("div").unwrap(), Selector::Tag("div".into()));
        assert_eq!(
            Selector::parse(".animate").unwrap(),
            Selector::Class("animate".into())
        );
        assert_eq!(Selector::parse("#hero").unwrap(), Selector::Id("hero".into()));
        assert_eq!(
            Selector::parse("section.card").unwrap(),
            Selector::TagClass("section".into(), "card".into())
        );
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse(".").is_err());
        assert!(Selector::parse("div > p").is_err());
    }

    #[test]
    fn test_apply_root_counts_one_invalidation_per_effective_patch() {
        let doc = VirtualDocument::new();
        let patch = RootPatch::new()
            .add_class("dark")
            .attribute("data-theme", "dark")
            .variable("--text-primary", "#fff");

        doc.apply_root(&patch);
        doc.apply_root(&patch);
        assert_eq!(doc.invalidations(), 1);

        let root = doc.root_snapshot();
        assert!(root.has_class("dark"));
        assert_eq!(root.attribute("data-theme"), Some("dark"));
        assert_eq!(root.variable("--text-primary"), Some("#fff"));
    }

    #[test]
    fn test_select_in_document_order() {
        let doc = VirtualDocument::new();
        let a = doc.push_element(VirtualElement::new("div").with_class("animate"));
        doc.push_element(VirtualElement::new("p"));
        let c = doc.push_element(VirtualElement::new("section").with_class("animate"));

        assert_eq!(doc.select(".animate").unwrap(), vec![a, c]);
        assert_eq!(doc.select("section.animate").unwrap(), vec![c]);
    }

    #[test]
    fn test_style_changes_are_reported() {
        let doc = VirtualDocument::new();
        let el = doc.push_element(VirtualElement::new("div"));

        assert!(doc.set_style(el, "opacity", "1"));
        assert!(!doc.set_style(el, "opacity", "1"));
        assert_eq!(doc.style(el, "opacity").as_deref(), Some("1"));
        assert_eq!(doc.style(99, "opacity"), None);
        assert!(doc.remove_style(el, "opacity"));
        assert!(!doc.remove_style(el, "opacity"));
        assert_eq!(doc.style(el, "opacity"), None);
        assert!(!doc.set_style(99, "opacity", "1"));
    }

    #[test]
    fn test_after_paint_callbacks_run_once() {
        let doc = Arc::new(VirtualDocument::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        doc.after_next_paint(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        doc.paint();
        doc.paint();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(doc.frames().len(), 2);
    }

    #[test]
    fn test_links_dedup_by_href() {
        let doc = VirtualDocument::new();
        assert!(doc.insert_link(LinkHint::preload("/app.css", "style")));
        assert!(!doc.insert_link(LinkHint::preload("/app.css", "style")));
        assert_eq!(doc.links().len(), 1);
        assert!(doc.remove_link("/app.css"));
        assert!(!doc.remove_link("/app.css"));
    }
}

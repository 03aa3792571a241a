//! GPU compositing hints

use halo_platform::{DisposeFlag, Disposable, DocumentSurface, ElementId};
use parking_lot::Mutex;
use std::sync::Arc;

/// Style properties that promote an element to its own compositing layer
pub const COMPOSITING_PROPERTIES: [(&str, &str); 3] = [
    ("will-change", "transform, opacity"),
    ("transform", "translateZ(0)"),
    ("backface-visibility", "hidden"),
];

/// Compositing hints on a set of animated elements.
///
/// Tracks exactly which properties it wrote along with the value each one
/// replaced. Disposal puts replaced values back and removes the rest, leaving
/// every element as it was before marking.
pub struct CompositingHints {
    surface: Arc<dyn DocumentSurface>,
    written: Mutex<Vec<(ElementId, &'static str, Option<String>)>>,
    disposed: DisposeFlag,
}

impl CompositingHints {
    pub fn new(surface: Arc<dyn DocumentSurface>) -> Self {
        Self {
            surface,
            written: Mutex::new(Vec::new()),
            disposed: DisposeFlag::new(),
        }
    }

    /// Create the hints and mark every element matching `selector`
    pub fn apply(
        surface: Arc<dyn DocumentSurface>,
        selector: &str,
    ) -> halo_platform::Result<Self> {
        let hints = Self::new(surface);
        hints.mark(selector)?;
        Ok(hints)
    }

    /// Mark every element matching `selector`.
    ///
    /// Returns the number of properties that actually changed; re-marking
    /// the same elements returns 0 and causes no invalidation.
    pub fn mark(&self, selector: &str) -> halo_platform::Result<usize> {
        if self.disposed.is_set() {
            return Ok(0);
        }

        let elements = self.surface.select(selector)?;
        let mut written = self.written.lock();
        let before = written.len();
        for &element in &elements {
            for (property, value) in COMPOSITING_PROPERTIES {
                let previous = self.surface.style(element, property);
                if self.surface.set_style(element, property, value) {
                    written.push((element, property, previous));
                }
            }
        }

        let changed = written.len() - before;
        tracing::debug!(selector, elements = elements.len(), changed, "compositing hints");
        Ok(changed)
    }

    /// Properties currently owned by these hints
    pub fn written(&self) -> usize {
        self.written.lock().len()
    }
}

impl Disposable for CompositingHints {
    fn dispose(&self) {
        if !self.disposed.trip() {
            return;
        }
        let written = std::mem::take(&mut *self.written.lock());
        for (element, property, previous) in written.into_iter().rev() {
            match previous {
                Some(value) => self.surface.set_style(element, property, &value),
                None => self.surface.remove_style(element, property),
            };
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_platform::{VirtualDocument, VirtualElement};

    fn document() -> (Arc<VirtualDocument>, ElementId, ElementId) {
        let doc = Arc::new(VirtualDocument::new());
        let spinner = doc.push_element(VirtualElement::new("div").with_class("animate"));
        doc.push_element(VirtualElement::new("p"));
        let banner = doc.push_element(VirtualElement::new("section").with_class("animate"));
        (doc, spinner, banner)
    }

    #[test]
    fn test_marks_every_match() {
        let (doc, spinner, banner) = document();
        let hints = CompositingHints::apply(doc.clone(), ".animate").unwrap();

        assert_eq!(hints.written(), 6);
        for id in [spinner, banner] {
            let style = doc.element(id).unwrap().style;
            assert_eq!(style.get("transform").map(String::as_str), Some("translateZ(0)"));
            assert_eq!(style.len(), 3);
        }
        assert!(doc.element(1).unwrap().style.is_empty());
    }

    #[test]
    fn test_remark_is_free() {
        let (doc, _, _) = document();
        let hints = CompositingHints::apply(doc.clone(), ".animate").unwrap();
        let invalidations = doc.invalidations();

        assert_eq!(hints.mark(".animate").unwrap(), 0);
        assert_eq!(doc.invalidations(), invalidations);
        assert_eq!(hints.written(), 6);
    }

    #[test]
    fn test_dispose_removes_only_own_properties() {
        let (doc, spinner, _) = document();
        doc.set_style(spinner, "backface-visibility", "hidden");
        doc.set_style(spinner, "color", "red");

        let hints = CompositingHints::apply(doc.clone(), ".animate").unwrap();
        hints.dispose();
        hints.dispose();

        let style = doc.element(spinner).unwrap().style;
        assert_eq!(style.get("backface-visibility").map(String::as_str), Some("hidden"));
        assert_eq!(style.get("color").map(String::as_str), Some("red"));
        assert!(style.get("will-change").is_none());

        assert_eq!(hints.mark(".animate").unwrap(), 0);
    }

    #[test]
    fn test_dispose_restores_overwritten_style() {
        let (doc, spinner, banner) = document();
        doc.set_style(spinner, "transform", "rotate(45deg)");

        let hints = CompositingHints::apply(doc.clone(), ".animate").unwrap();
        assert_eq!(doc.style(spinner, "transform").as_deref(), Some("translateZ(0)"));
        assert_eq!(hints.written(), 6);

        hints.dispose();
        let style = doc.element(spinner).unwrap().style;
        assert_eq!(style.get("transform").map(String::as_str), Some("rotate(45deg)"));
        assert_eq!(style.len(), 1);
        assert!(doc.element(banner).unwrap().style.is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        let (doc, _, _) = document();
        assert!(CompositingHints::apply(doc, "div > .animate").is_err());
    }
}

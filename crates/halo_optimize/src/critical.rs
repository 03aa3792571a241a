//! Critical-resource tagging

use halo_platform::{DisposeFlag, Disposable, DocumentSurface, LinkHint};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A resource the first view needs, e.g. the main stylesheet or a font
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalResource {
    pub href: String,
    #[serde(rename = "as")]
    pub as_type: String,
}

impl CriticalResource {
    pub fn new(href: impl Into<String>, as_type: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            as_type: as_type.into(),
        }
    }

    /// Guess the preload destination from the file extension
    pub fn infer(href: impl Into<String>) -> Self {
        let href = href.into();
        let path = href.split(['?', '#']).next().unwrap_or_default();
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let as_type = match extension.as_str() {
            "css" => "style",
            "js" | "mjs" => "script",
            "woff" | "woff2" | "ttf" | "otf" => "font",
            "png" | "jpg" | "jpeg" | "webp" | "avif" | "gif" | "svg" => "image",
            _ => "fetch",
        };
        Self::new(href, as_type)
    }
}

/// Preload links inserted for a set of critical resources
pub struct CriticalResources {
    surface: Arc<dyn DocumentSurface>,
    inserted: Mutex<Vec<String>>,
    disposed: DisposeFlag,
}

impl CriticalResources {
    /// Insert one preload link per resource. Hrefs already present in the
    /// document are left alone and not owned by the returned handle.
    pub fn tag(
        surface: Arc<dyn DocumentSurface>,
        resources: impl IntoIterator<Item = CriticalResource>,
    ) -> Self {
        let inserted: Vec<String> = resources
            .into_iter()
            .filter_map(|resource| {
                let href = resource.href.clone();
                surface
                    .insert_link(LinkHint::preload(resource.href, resource.as_type))
                    .then_some(href)
            })
            .collect();

        tracing::debug!(count = inserted.len(), "critical resources tagged");
        Self {
            surface,
            inserted: Mutex::new(inserted),
            disposed: DisposeFlag::new(),
        }
    }

    pub fn hrefs(&self) -> Vec<String> {
        self.inserted.lock().clone()
    }
}

impl Disposable for CriticalResources {
    fn dispose(&self) {
        if !self.disposed.trip() {
            return;
        }
        for href in std::mem::take(&mut *self.inserted.lock()) {
            self.surface.remove_link(&href);
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.is_set()
    }
}

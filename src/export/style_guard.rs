//! Scoped mutation of the layout styles that keep a container from being
//! captured in full.
//!
//! The body stops scrolling and the dashboard is pinned to the top so its
//! whole height is reachable. [`StyleGuard`] restores the recorded values
//! exactly once, either through [`StyleGuard::release`] or on drop.

use crate::dom::{DashboardHost, Dom, Element};
use crate::export::types::ExportError;

/// Where a recorded property lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleTarget {
    Body,
    Element(String),
}

/// One recorded property and the value it had before the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub target: StyleTarget,
    pub property: &'static str,
    /// `None` when the property was not set inline.
    pub original: Option<String>,
}

/// Original values of every property the export mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSnapshot {
    entries: Vec<StyleEntry>,
}

/// Properties mutated for capture, with the value forced during the export.
const CAPTURE_STYLES: [(bool, &str, &str); 3] = [
    (true, "overflow", "hidden"),
    (false, "position", "absolute"),
    (false, "top", "0"),
];

impl StyleSnapshot {
    /// Records the current values and applies the capture styles.
    pub fn take(dom: &mut Dom, root_id: &str) -> Result<Self, ExportError> {
        if dom.get_element_by_id(root_id).is_none() {
            return Err(ExportError::RootNotFound(root_id.to_string()));
        }

        let mut entries = Vec::with_capacity(CAPTURE_STYLES.len());
        for (on_body, property, value) in CAPTURE_STYLES {
            let target = if on_body {
                StyleTarget::Body
            } else {
                StyleTarget::Element(root_id.to_string())
            };
            let Some(element) = resolve(dom, &target) else {
                continue;
            };
            let original = element.style_value(property).map(str::to_string);
            element.set_style(property, value);
            entries.push(StyleEntry {
                target,
                property,
                original,
            });
        }

        log::debug!("Applied capture styles to '{}'", root_id);
        Ok(Self { entries })
    }

    /// Puts every recorded value back; properties that were unset are removed.
    pub fn restore(self, dom: &mut Dom) {
        for entry in self.entries.into_iter().rev() {
            let Some(element) = resolve(dom, &entry.target) else {
                log::warn!(
                    "Cannot restore '{}': {:?} no longer exists",
                    entry.property,
                    entry.target
                );
                continue;
            };
            match entry.original {
                Some(value) => element.set_style(entry.property, value),
                None => {
                    element.remove_style(entry.property);
                }
            }
        }
    }

    pub fn entries(&self) -> &[StyleEntry] {
        &self.entries
    }
}

fn resolve<'a>(dom: &'a mut Dom, target: &StyleTarget) -> Option<&'a mut Element> {
    match target {
        StyleTarget::Body => Some(&mut dom.body),
        StyleTarget::Element(id) => dom.element_by_id_mut(id),
    }
}

/// Holds the capture styles for the lifetime of one export call.
#[must_use = "dropping the guard restores the styles immediately"]
pub struct StyleGuard {
    host: DashboardHost,
    snapshot: Option<StyleSnapshot>,
}

impl StyleGuard {
    pub fn acquire(host: &DashboardHost, root_id: &str) -> Result<Self, ExportError> {
        let snapshot = host.write(|dom| StyleSnapshot::take(dom, root_id))?;
        Ok(Self {
            host: host.clone(),
            snapshot: Some(snapshot),
        })
    }

    pub fn snapshot(&self) -> Option<&StyleSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn release(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.host.write(|dom| snapshot.restore(dom));
            log::debug!("Restored dashboard styles");
        }
    }
}

impl Drop for StyleGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

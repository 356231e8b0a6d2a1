//! Attribute store
//!
//! Attributes attach to elements (types, methods, fields) at definition
//! time. The store answers by-element and by-kind lookups; whether the
//! element itself exists is the provider's concern, so an element with no
//! recorded attributes simply answers empty.

use rustc_hash::FxHashMap;

use kagami_sdk::{AttributeInfo, ElementRef};

/// Attributes keyed by the element they are attached to
#[derive(Debug, Default)]
pub struct AttributeStore {
    targets: FxHashMap<ElementRef, Vec<AttributeInfo>>,
}

impl AttributeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an attribute to an element
    pub fn define(&mut self, element: ElementRef, attribute: AttributeInfo) {
        self.targets.entry(element).or_default().push(attribute);
    }

    /// All attributes on an element, in attachment order
    pub fn all(&self, element: ElementRef) -> Vec<AttributeInfo> {
        self.targets.get(&element).cloned().unwrap_or_default()
    }

    /// Attributes of one kind on an element
    pub fn of_kind(&self, element: ElementRef, kind: &str) -> Vec<AttributeInfo> {
        self.targets
            .get(&element)
            .map(|attrs| attrs.iter().filter(|a| a.kind == kind).cloned().collect())
            .unwrap_or_default()
    }

    /// Whether an element carries an attribute of the given kind
    pub fn has(&self, element: ElementRef, kind: &str) -> bool {
        self.targets
            .get(&element)
            .is_some_and(|attrs| attrs.iter().any(|a| a.kind == kind))
    }

    /// The distinct attribute kinds on an element
    pub fn kinds(&self, element: ElementRef) -> Vec<String> {
        let Some(attrs) = self.targets.get(&element) else {
            return Vec::new();
        };
        let mut kinds: Vec<String> = Vec::new();
        for a in attrs {
            if !kinds.iter().any(|k| k == &a.kind) {
                kinds.push(a.kind.clone());
            }
        }
        kinds
    }

    /// Remove all attributes of a kind from an element
    ///
    /// Returns true if anything was removed.
    pub fn remove(&mut self, element: ElementRef, kind: &str) -> bool {
        let Some(attrs) = self.targets.get_mut(&element) else {
            return false;
        };
        let before = attrs.len();
        attrs.retain(|a| a.kind != kind);
        attrs.len() != before
    }

    /// Number of elements carrying at least one attribute
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

//! Computed-style caching.
//!
//! A computed entry is valid while the document's mutation generation still
//! equals the generation it was computed at. Local (inline-only) entries do
//! not depend on the rest of the tree and are keyed by the inline text.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use wren_dom::NodeId;

use crate::cascade::{CascadeResolver, CollectedRule};
use crate::computed::ComputedStyleMap;

/// One cached result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Document generation when the result was computed.
    pub generation_at_compute: u64,
    /// Hash of the inline `style` text the result was computed from.
    pub fingerprint: u64,
    /// The computed map, shared with callers.
    pub result: Rc<ComputedStyleMap>,
}

impl CacheEntry {
    fn new(generation_at_compute: u64, fingerprint: u64, result: &Rc<ComputedStyleMap>) -> Self {
        Self {
            generation_at_compute,
            fingerprint,
            result: Rc::clone(result),
        }
    }
}

/// Hit and miss counters, mostly for tests and the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Elements whose style had to be cascaded.
    pub misses: u64,
}

/// Per-document computed and local style cache.
#[derive(Debug, Default)]
pub struct ComputedStyleCache {
    computed: HashMap<NodeId, CacheEntry>,
    local: HashMap<NodeId, CacheEntry>,
    stats: CacheStats,
}

impl ComputedStyleCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached style of `element`, computing it on a miss.
    ///
    /// For computed styles every ancestor cascaded on the way is cached as
    /// well, and a valid cached ancestor ends the walk up the tree.
    pub fn get_or_compute(
        &mut self,
        resolver: &CascadeResolver<'_>,
        element: NodeId,
        computed: bool,
    ) -> Rc<ComputedStyleMap> {
        let tree = resolver.tree();
        let fingerprint = inline_fingerprint(tree.get_attribute(element, "style"));

        if !computed {
            if let Some(entry) = self.local.get(&element)
                && entry.fingerprint == fingerprint
            {
                self.stats.hits += 1;
                return Rc::clone(&entry.result);
            }
            self.stats.misses += 1;
            let result = Rc::new(resolver.local_style(element));
            let _ = self.local.insert(
                element,
                CacheEntry::new(tree.generation(), fingerprint, &result),
            );
            return result;
        }

        let generation = tree.generation();
        if let Some(result) = self.valid_computed(element, generation) {
            self.stats.hits += 1;
            return result;
        }

        if tree.as_element(element).is_none() || !tree.is_connected(element) {
            self.stats.misses += 1;
            let result = Rc::new(resolver.resolve(element, true));
            self.store_computed(element, generation, fingerprint, &result);
            return result;
        }

        // Walk up until an ancestor with a valid entry, then cascade down.
        let mut pending = vec![element];
        let mut parent_style: Option<Rc<ComputedStyleMap>> = None;
        let mut current = element;
        while let Some(parent) = tree.parent_element_composed(current) {
            if let Some(cached) = self.valid_computed(parent, generation) {
                parent_style = Some(cached);
                break;
            }
            pending.push(parent);
            current = parent;
        }

        for &id in pending.iter().rev() {
            self.stats.misses += 1;
            let style = Rc::new(resolver.cascade_element(id, parent_style.as_deref()));
            let id_fingerprint = inline_fingerprint(tree.get_attribute(id, "style"));
            self.store_computed(id, generation, id_fingerprint, &style);
            parent_style = Some(style);
        }
        parent_style.unwrap_or_default()
    }

    fn valid_computed(&self, element: NodeId, generation: u64) -> Option<Rc<ComputedStyleMap>> {
        self.computed
            .get(&element)
            .filter(|entry| entry.generation_at_compute == generation)
            .map(|entry| Rc::clone(&entry.result))
    }

    fn store_computed(
        &mut self,
        element: NodeId,
        generation: u64,
        fingerprint: u64,
        result: &Rc<ComputedStyleMap>,
    ) {
        let _ = self
            .computed
            .insert(element, CacheEntry::new(generation, fingerprint, result));
    }

    /// The stored computed entry for `element`, valid or not.
    #[must_use]
    pub fn computed_entry(&self, element: NodeId) -> Option<&CacheEntry> {
        self.computed.get(&element)
    }

    /// Hit and miss counts since creation or the last [`Self::clear`].
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.computed.clear();
        self.local.clear();
        self.stats = CacheStats::default();
    }
}

fn inline_fingerprint(text: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Collected rules per scope, valid for one generation.
///
/// Uses interior mutability so a shared [`CascadeResolver`] can fill it
/// while cascading.
#[derive(Debug, Default)]
pub struct RuleCache {
    generation: Cell<Option<u64>>,
    scopes: RefCell<HashMap<NodeId, Rc<Vec<CollectedRule>>>>,
}

impl RuleCache {
    /// Create an empty rule cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every list if the document moved past the generation they
    /// were collected at.
    pub fn validate(&self, generation: u64) {
        if self.generation.get() != Some(generation) {
            self.scopes.borrow_mut().clear();
            self.generation.set(Some(generation));
        }
    }

    /// The rules of `scope`, running `collect` on a miss.
    pub fn rules_for(
        &self,
        scope: NodeId,
        collect: impl FnOnce() -> Vec<CollectedRule>,
    ) -> Rc<Vec<CollectedRule>> {
        if let Some(rules) = self.scopes.borrow().get(&scope) {
            return Rc::clone(rules);
        }
        let rules = Rc::new(collect());
        let _ = self
            .scopes
            .borrow_mut()
            .insert(scope, Rc::clone(&rules));
        rules
    }

    /// Number of scopes with collected rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.borrow().len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.borrow().is_empty()
    }

    /// Drop every list.
    pub fn clear(&self) {
        self.scopes.borrow_mut().clear();
        self.generation.set(None);
    }
}

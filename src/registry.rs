//! String-keyed Instance Registry
//!
//! Lazily creates one instance per id and hands out shared references.
//! The registry only synchronizes lookup and creation; the instances
//! themselves are used without any registry lock held.
//!
//! An unbounded registry never evicts on its own. With dynamic ids (user
//! ids, request paths) it grows without limit unless entries are removed
//! explicitly, so either keep ids to a fixed set or use
//! [`Registry::bounded`], which evicts the least recently used entry.
//!
//! The process-wide functions ([`compile`], [`tune`], [`flatten`] and
//! friends) keep one instance per id in unbounded registries.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::compiler::Compiler;
use crate::config::{CompilerConfig, SizerConfig};
use crate::node::{render_to_vec, Node};
use crate::strategy::{Flattener, Tuner};

enum Store<V> {
    Unbounded(DashMap<String, Arc<V>>),
    Bounded(Mutex<LruCache<String, Arc<V>>>),
}

/// Concurrent map from id to lazily created instance
pub struct Registry<V> {
    store: Store<V>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Registry<V> {
    /// Registry with no eviction
    pub fn new() -> Self {
        Registry {
            store: Store::Unbounded(DashMap::new()),
        }
    }

    /// Registry holding at most `capacity` entries (LRU eviction)
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Registry {
            store: Store::Bounded(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Look up `id`, creating the instance with `create` if absent
    ///
    /// When two callers race on a missing id, exactly one instance is
    /// stored and both receive it. A bounded registry runs `create` without
    /// holding its lock, so a racing caller may create an instance that is
    /// then discarded.
    pub fn get_or_insert_with<F>(&self, id: &str, create: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        match &self.store {
            Store::Unbounded(map) => {
                // Plain lookup first: entry() needs an owned key
                if let Some(found) = map.get(id) {
                    return Arc::clone(found.value());
                }
                Arc::clone(
                    map.entry(id.to_owned())
                        .or_insert_with(|| Arc::new(create()))
                        .value(),
                )
            }
            Store::Bounded(cache) => {
                if let Some(found) = cache.lock().get(id) {
                    return Arc::clone(found);
                }

                // Create outside the lock; `create` may be slow or use the registry
                let value = Arc::new(create());

                let mut cache = cache.lock();
                if let Some(found) = cache.get(id) {
                    // Lost the race: keep the instance stored first
                    return Arc::clone(found);
                }
                if let Some((evicted, _)) = cache.push(id.to_owned(), Arc::clone(&value)) {
                    if evicted != id {
                        debug!(id = %evicted, "registry entry evicted");
                    }
                }
                value
            }
        }
    }

    /// Look up `id` without creating
    pub fn get(&self, id: &str) -> Option<Arc<V>> {
        match &self.store {
            Store::Unbounded(map) => map.get(id).map(|v| Arc::clone(v.value())),
            Store::Bounded(cache) => cache.lock().get(id).cloned(),
        }
    }

    /// Store `value` under `id`, replacing any existing instance
    pub fn insert(&self, id: &str, value: V) -> Arc<V> {
        let value = Arc::new(value);
        match &self.store {
            Store::Unbounded(map) => {
                map.insert(id.to_owned(), Arc::clone(&value));
            }
            Store::Bounded(cache) => {
                cache.lock().put(id.to_owned(), Arc::clone(&value));
            }
        }
        value
    }

    /// Remove the given ids; remove everything when `ids` is empty
    pub fn reset(&self, ids: &[&str]) {
        if ids.is_empty() {
            self.clear();
            return;
        }
        for id in ids {
            self.remove(id);
        }
    }

    pub fn remove(&self, id: &str) -> Option<Arc<V>> {
        match &self.store {
            Store::Unbounded(map) => map.remove(id).map(|(_, v)| v),
            Store::Bounded(cache) => cache.lock().pop(id),
        }
    }

    pub fn clear(&self) {
        match &self.store {
            Store::Unbounded(map) => map.clear(),
            Store::Bounded(cache) => cache.lock().clear(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        match &self.store {
            Store::Unbounded(map) => map.contains_key(id),
            Store::Bounded(cache) => cache.lock().contains(id),
        }
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Unbounded(map) => map.len(),
            Store::Bounded(cache) => cache.lock().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Process-wide registries
// ============================================================================

static COMPILERS: LazyLock<Registry<Compiler>> = LazyLock::new(Registry::new);
static TUNERS: LazyLock<Registry<Tuner>> = LazyLock::new(Registry::new);
static FLATTENERS: LazyLock<Registry<Flattener>> = LazyLock::new(Registry::new);

/// The compiler registered under `id`, created on first use
pub fn compiler(id: &str) -> Arc<Compiler> {
    COMPILERS.get_or_insert_with(id, Compiler::new)
}

/// Render `root` with the compiler registered under `id`
pub fn compile(id: &str, root: &dyn Node) -> Vec<u8> {
    compiler(id).render(root)
}

pub fn compile_to<W: Write + ?Sized>(id: &str, root: &dyn Node, w: &mut W) -> io::Result<()> {
    compiler(id).render_to(root, w)
}

/// Register a fresh compiler with `config` under `id`
///
/// Replaces any existing compiler, so the next render under `id` builds a
/// new plan. Call before the first render when the shape is fixed.
pub fn compile_config(id: &str, config: CompilerConfig) -> Arc<Compiler> {
    COMPILERS.insert(id, Compiler::with_config(config))
}

/// Drop the given compilers (all of them when `ids` is empty)
///
/// The next render under a dropped id builds a fresh plan.
pub fn reset_compile(ids: &[&str]) {
    COMPILERS.reset(ids);
}

/// The tuner registered under `id`, created on first use
pub fn tuner(id: &str) -> Arc<Tuner> {
    TUNERS.get_or_insert_with(id, Tuner::new)
}

pub fn tune(id: &str, root: &dyn Node) -> Vec<u8> {
    tuner(id).render(root)
}

pub fn tune_to<W: Write + ?Sized>(id: &str, root: &dyn Node, w: &mut W) -> io::Result<()> {
    tuner(id).render_to(root, w)
}

/// Register a fresh tuner with `config` under `id`, replacing any existing one
pub fn tune_config(id: &str, config: SizerConfig) -> Arc<Tuner> {
    TUNERS.insert(id, Tuner::with_config(config))
}

pub fn reset_tune(ids: &[&str]) {
    TUNERS.reset(ids);
}

/// Serve the pre-rendered bytes registered under `id`
///
/// The first call flattens `root`. A tree containing dynamic nodes cannot
/// be flattened: it is rendered directly and nothing is registered.
pub fn flatten(id: &str, root: &dyn Node) -> Vec<u8> {
    match flattener(id, root) {
        Some(flat) => flat.render().to_vec(),
        None => render_to_vec(root),
    }
}

pub fn flatten_to<W: Write + ?Sized>(id: &str, root: &dyn Node, w: &mut W) -> io::Result<()> {
    match flattener(id, root) {
        Some(flat) => flat.render_to(w),
        None => w.write_all(&render_to_vec(root)),
    }
}

pub fn reset_flatten(ids: &[&str]) {
    FLATTENERS.reset(ids);
}

fn flattener(id: &str, root: &dyn Node) -> Option<Arc<Flattener>> {
    if let Some(flat) = FLATTENERS.get(id) {
        return Some(flat);
    }
    match Flattener::new(root) {
        Ok(flat) => Some(FLATTENERS.get_or_insert_with(id, || flat)),
        Err(err) => {
            debug!(id, %err, "tree not flattenable, rendering directly");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{dynamic_text, element, static_text, NodeBox};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    fn greeting(name: &str) -> NodeBox {
        element("div", vec![static_text("Hello "), dynamic_text(name)])
    }

    #[test]
    fn test_create_if_absent() {
        let registry: Registry<String> = Registry::new();
        let a = registry.get_or_insert_with("header", || "first".to_string());
        let b = registry.get_or_insert_with("header", || "second".to_string());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "first");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let registry: Registry<u32> = Registry::new();
        registry.get_or_insert_with("x", || 1);
        registry.insert("x", 2);
        assert_eq!(registry.get("x").as_deref(), Some(&2));
    }

    #[test]
    fn test_reset_specific_and_all() {
        let registry: Registry<u32> = Registry::new();
        for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
            registry.insert(id, i as u32);
        }

        registry.reset(&["a", "missing"]);
        assert!(!registry.contains("a"));
        assert!(registry.contains("b"));

        registry.reset(&[]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bounded_evicts_least_recently_used() {
        let registry: Registry<u32> = Registry::bounded(NonZeroUsize::new(2).unwrap());
        registry.get_or_insert_with("a", || 1);
        registry.get_or_insert_with("b", || 2);
        // Touch "a" so "b" becomes least recently used
        registry.get_or_insert_with("a", || 99);
        registry.get_or_insert_with("c", || 3);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(!registry.contains("b"));
        assert!(registry.contains("c"));

        assert_eq!(registry.remove("a").as_deref(), Some(&1));
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bounded_create_may_use_registry() {
        let registry: Registry<u32> = Registry::bounded(NonZeroUsize::new(4).unwrap());
        let outer = registry.get_or_insert_with("outer", || {
            let inner = registry.get_or_insert_with("inner", || 1);
            *inner + 1
        });
        assert_eq!(*outer, 2);
        assert_eq!(registry.get("inner").as_deref(), Some(&1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_bounded_keeps_first_stored_instance() {
        let registry: Registry<u32> = Registry::bounded(NonZeroUsize::new(4).unwrap());
        // A value stored while `create` runs wins over the created one
        let got = registry.get_or_insert_with("race", || {
            registry.insert("race", 7);
            9
        });
        assert_eq!(*got, 7);
        assert_eq!(registry.get("race").as_deref(), Some(&7));
    }

    #[test]
    fn test_concurrent_creation_single_instance() {
        const THREADS: usize = 8;
        let registry: Arc<Registry<usize>> = Arc::new(Registry::new());
        let created = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let created = Arc::clone(&created);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_or_insert_with("shared", || created.fetch_add(1, Ordering::SeqCst))
                })
            })
            .collect();

        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
    }

    // Process-wide registries are shared by every test: ids are unique per test

    #[test]
    fn test_compile_shares_plan_per_id() {
        assert_eq!(
            compile("registry-compile", greeting("Alice").as_ref()),
            b"<div>Hello Alice</div>"
        );
        assert_eq!(
            compile("registry-compile", greeting("Bob").as_ref()),
            b"<div>Hello Bob</div>"
        );
        assert!(compiler("registry-compile").is_compiled());

        // A different id compiles its own shape
        let other = element("p", vec![dynamic_text("x")]);
        assert_eq!(compile("registry-compile-other", other.as_ref()), b"<p>x</p>");

        let mut out = Vec::new();
        compile_to("registry-compile", greeting("Carol").as_ref(), &mut out).unwrap();
        assert_eq!(out, b"<div>Hello Carol</div>");
    }

    #[test]
    fn test_reset_compile_rebuilds_plan() {
        let first = element("div", vec![static_text("v1"), dynamic_text("x")]);
        let second = element("div", vec![static_text("v2"), dynamic_text("x")]);

        compile("registry-reset", first.as_ref());
        // Static bytes are frozen until the compiler is dropped
        assert_eq!(compile("registry-reset", second.as_ref()), b"<div>v1x</div>");

        reset_compile(&["registry-reset"]);
        assert_eq!(compile("registry-reset", second.as_ref()), b"<div>v2x</div>");
    }

    #[test]
    fn test_compile_config() {
        let config = CompilerConfig::new(5, 3, 10, 100);
        let configured = compile_config("registry-config", config);
        assert_eq!(configured.config(), config);
        assert!(Arc::ptr_eq(&configured, &compiler("registry-config")));

        // Reconfiguring an existing compiler applies the new settings
        compile_config("registry-config", CompilerConfig::default());
        assert_eq!(compiler("registry-config").config(), CompilerConfig::default());
    }

    #[test]
    fn test_compile_config_replaces_compiled_plan() {
        let first = element("div", vec![static_text("v1"), dynamic_text("x")]);
        let second = element("div", vec![static_text("v2"), dynamic_text("x")]);

        compile("registry-config-replace", first.as_ref());
        let before = compiler("registry-config-replace");
        assert!(before.is_compiled());

        let fresh = compile_config("registry-config-replace", CompilerConfig::default());
        assert!(!Arc::ptr_eq(&before, &fresh));
        assert!(!fresh.is_compiled());
        assert_eq!(
            compile("registry-config-replace", second.as_ref()),
            b"<div>v2x</div>"
        );
    }

    #[test]
    fn test_tune_registry() {
        let tree = element("div", vec![static_text("tuned")]);
        assert_eq!(tune("registry-tune", tree.as_ref()), b"<div>tuned</div>");
        assert_eq!(tuner("registry-tune").sizer().sample_count(), 1);

        let mut out = Vec::new();
        tune_to("registry-tune", tree.as_ref(), &mut out).unwrap();
        assert_eq!(out, b"<div>tuned</div>");

        let before = tuner("registry-tune");
        let fresh = tune_config("registry-tune", SizerConfig::new(2, 10, 100));
        assert!(!Arc::ptr_eq(&before, &fresh));
        assert_eq!(tuner("registry-tune").sizer().config(), SizerConfig::new(2, 10, 100));
        assert_eq!(tuner("registry-tune").sizer().sample_count(), 0);

        reset_tune(&["registry-tune"]);
        assert_eq!(tuner("registry-tune").sizer().sample_count(), 0);
    }

    #[test]
    fn test_flatten_registry() {
        let first = element("nav", vec![static_text("menu")]);
        let changed = element("nav", vec![static_text("other")]);

        assert_eq!(flatten("registry-flatten", first.as_ref()), b"<nav>menu</nav>");
        // Frozen: later trees are ignored
        assert_eq!(flatten("registry-flatten", changed.as_ref()), b"<nav>menu</nav>");

        let mut out = Vec::new();
        flatten_to("registry-flatten", changed.as_ref(), &mut out).unwrap();
        assert_eq!(out, b"<nav>menu</nav>");

        reset_flatten(&["registry-flatten"]);
        assert_eq!(flatten("registry-flatten", changed.as_ref()), b"<nav>other</nav>");
    }

    #[test]
    fn test_flatten_dynamic_falls_back() {
        assert_eq!(
            flatten("registry-flatten-dynamic", greeting("Alice").as_ref()),
            b"<div>Hello Alice</div>"
        );
        assert_eq!(
            flatten("registry-flatten-dynamic", greeting("Bob").as_ref()),
            b"<div>Hello Bob</div>"
        );
        assert!(!FLATTENERS.contains("registry-flatten-dynamic"));
    }
}

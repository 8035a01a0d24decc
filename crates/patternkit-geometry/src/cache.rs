//! Content-addressed memo cache for derived geometry.
//!
//! Entries are keyed by figure id, operation and the figure's source
//! signature, so an edited figure never hits a stale entry. Old entries stay
//! until [`GeometryCache::invalidate_figure`] or [`GeometryCache::clear`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use patternkit_core::Result;
use tracing::{debug, trace};

use crate::bounds::{bounds, BoundingBox};
use crate::measures::{compute_measures_with, FigureMeasures, MeasureOptions};
use crate::model::Figure;
use crate::offset::{offset_figure_with, OffsetOptions};
use crate::signature::signature_hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Measures,
    Bounds,
    /// Seam offset; the distance is stored as raw `f64` bits.
    Offset(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub figure_id: String,
    pub operation: OperationKind,
    pub signature: u64,
}

impl CacheKey {
    pub fn new(figure: &Figure, operation: OperationKind) -> Self {
        Self {
            figure_id: figure.id.clone(),
            operation,
            signature: signature_hash(figure),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CachedValue {
    Measures(FigureMeasures),
    Bounds(BoundingBox),
    Offset(Box<Figure>),
}

/// Snapshot of the hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe memo of engine results. All methods take `&self`.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: RwLock<HashMap<CacheKey, CachedValue>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedValue> {
        let found = self.entries.read().get(key).cloned();
        match found {
            Some(v) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!("Cache hit for {} {:?}", key.figure_id, key.operation);
                Some(v)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn store(&self, key: CacheKey, value: CachedValue) {
        self.entries.write().insert(key, value);
    }

    pub fn measures(&self, figure: &Figure, options: &MeasureOptions) -> FigureMeasures {
        let key = CacheKey::new(figure, OperationKind::Measures);
        if let Some(CachedValue::Measures(m)) = self.lookup(&key) {
            return m;
        }
        let m = compute_measures_with(figure, options);
        self.store(key, CachedValue::Measures(m.clone()));
        m
    }

    pub fn bounds(&self, figure: &Figure) -> BoundingBox {
        let key = CacheKey::new(figure, OperationKind::Bounds);
        if let Some(CachedValue::Bounds(b)) = self.lookup(&key) {
            return b;
        }
        let b = bounds(figure);
        self.store(key, CachedValue::Bounds(b));
        b
    }

    /// Cached seam offset. Failures are returned but never cached.
    ///
    /// `options` are not part of the key; keep one cache per option set.
    pub fn offset(&self, parent: &Figure, offset_cm: f64, options: &OffsetOptions) -> Result<Figure> {
        let key = CacheKey::new(parent, OperationKind::Offset(offset_cm.to_bits()));
        if let Some(CachedValue::Offset(f)) = self.lookup(&key) {
            return Ok(*f);
        }
        let seam = offset_figure_with(parent, offset_cm, options)?;
        self.store(key, CachedValue::Offset(Box::new(seam.clone())));
        Ok(seam)
    }

    /// Drops every entry of `figure_id`, whatever its signature.
    pub fn invalidate_figure(&self, figure_id: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|k, _| k.figure_id != figure_id);
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Invalidated {} cache entries for {}", removed, figure_id);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

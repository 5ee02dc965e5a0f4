//! Bounded TTL + LRU cache.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use crate::metrics::CacheMetrics;

/// TTL por defecto (1 hora).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Capacidad por defecto.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

// Tope para TTLs que desbordarian Instant.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Configuracion del cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL aplicado por `insert`.
    pub ttl: Duration,
    /// Numero maximo de entries. Cero se trata como uno.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Snapshot de estadisticas del cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Cache acotado con expiracion por entry y eviction LRU.
///
/// - Una entry es visible solo mientras `now < expires_at`.
/// - Las entries expiradas se remueven al accederlas o al necesitar espacio.
/// - Al insertar una key nueva con el cache lleno se purgan primero las
///   expiradas y, si sigue lleno, se descarta la menos usada.
/// - Un hit promueve la entry a "mas recientemente usada".
///
/// Todas las operaciones son sincronas; el lock nunca se mantiene a traves
/// de un `.await`.
pub struct TtlCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, CacheEntry<V>>>,
    default_ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    metrics: CacheMetrics,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Display,
    V: Clone,
{
    /// Crea un cache que usa el reloj del sistema.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Crea un cache con un reloj inyectado.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);

        debug!(
            max_entries = capacity.get(),
            ttl_secs = config.ttl.as_secs(),
            "Cache initialized"
        );

        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            default_ttl: config.ttl,
            max_entries: capacity.get(),
            clock,
            metrics: CacheMetrics::new(),
        }
    }

    /// Busca una entry usando el reloj del cache.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, self.clock.now())
    }

    /// Busca una entry viva en el instante `now`.
    ///
    /// Una entry expirada se remueve y cuenta como miss.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock();

        let live = match entries.peek(key) {
            Some(entry) => entry.is_live(now),
            None => {
                self.metrics.record_miss();
                trace!(key = %key, "Cache miss");
                return None;
            },
        };

        if !live {
            entries.pop(key);
            self.metrics.record_miss();
            self.metrics.record_eviction("expired");
            self.metrics.update_entry_count(entries.len());
            debug!(key = %key, "Cache entry expired");
            return None;
        }

        // `get` promueve la entry en el orden LRU.
        let value = entries.get(key).map(|entry| entry.value.clone());
        self.metrics.record_hit();
        trace!(key = %key, "Cache hit");
        value
    }

    /// Inserta con el TTL por defecto.
    pub fn insert(&self, key: K, value: V) {
        self.put_at(key, value, self.clock.now(), self.default_ttl);
    }

    /// Inserta con un TTL explicito.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.put_at(key, value, self.clock.now(), ttl);
    }

    /// Inserta o reemplaza una entry que expira en `now + ttl`.
    ///
    /// Reemplazar una key existente nunca provoca eviction y la promueve a
    /// mas recientemente usada.
    pub fn put_at(&self, key: K, value: V, now: Instant, ttl: Duration) {
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);

        let mut entries = self.entries.lock();

        if !entries.contains(&key) && entries.len() >= self.max_entries {
            let purged = Self::purge_locked(&mut entries, now);
            for _ in 0..purged {
                self.metrics.record_eviction("expired");
            }

            if entries.len() >= self.max_entries
                && let Some((evicted, _)) = entries.pop_lru()
            {
                self.metrics.record_eviction("capacity");
                debug!(key = %evicted, "Evicted least recently used cache entry");
            }
        }

        trace!(key = %key, ttl_secs = ttl.as_secs(), "Cache insert");
        entries.put(key, CacheEntry { value, expires_at });
        self.metrics.update_entry_count(entries.len());
    }

    /// Remueve una entry. Retorna true si existia.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut entries = self.entries.lock();
        let removed = entries.pop(key).is_some();
        if removed {
            self.metrics.record_eviction("invalidated");
            self.metrics.update_entry_count(entries.len());
            debug!(key = %key, "Cache entry invalidated");
        }
        removed
    }

    /// Remueve todas las entries. Retorna cuantas habia.
    pub fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        self.metrics.update_entry_count(0);
        debug!(count, "Cache cleared");
        count
    }

    /// Remueve las entries cuya key cumple el predicado.
    pub(crate) fn invalidate_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&K) -> bool,
    {
        let mut entries = self.entries.lock();
        let matching: Vec<K> = entries
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matching {
            entries.pop(key);
            self.metrics.record_eviction("invalidated");
        }
        self.metrics.update_entry_count(entries.len());
        matching.len()
    }

    /// Remueve todas las entries expiradas. Retorna cuantas se removieron.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let purged = Self::purge_locked(&mut entries, now);
        for _ in 0..purged {
            self.metrics.record_eviction("expired");
        }
        self.metrics.update_entry_count(entries.len());
        purged
    }

    fn purge_locked(entries: &mut LruCache<K, CacheEntry<V>>, now: Instant) -> usize {
        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// True si hay una entry viva para la key. No afecta el orden LRU ni
    /// las metricas.
    pub fn contains(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.entries
            .lock()
            .peek(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// Numero de entries almacenadas, incluyendo expiradas no purgadas.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True si no hay entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// TTL por defecto.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Capacidad maxima.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Acceso al recorder de metricas.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Estadisticas actuales.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            max_entries: self.max_entries,
            hits: self.metrics.hits(),
            misses: self.metrics.misses(),
            evictions: self.metrics.evictions(),
            hit_rate: self.metrics.hit_rate(),
        }
    }
}

impl<K: Hash + Eq, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.lock().len())
            .field("max_entries", &self.max_entries)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

//! Cache and gateway metrics recording.
//!
//! Metrics go through the `metrics` facade; install any recorder in the
//! host application to export them.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las descripciones de las metricas del client.
/// Llamar una vez al inicio, despues de instalar el recorder.
pub fn register_metrics() {
    metrics::describe_counter!("loadenv_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("loadenv_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "loadenv_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_gauge!("loadenv_cache_entries", "Current number of entries in cache");
    metrics::describe_counter!(
        "loadenv_gateway_requests_total",
        "Total number of requests sent to the secret service"
    );
    metrics::describe_histogram!(
        "loadenv_gateway_request_seconds",
        "Time spent waiting on the secret service"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para reportar stats sin depender del recorder.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("loadenv_cache_hits_total").increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("loadenv_cache_misses_total").increment(1);
    }

    /// Registra una eviction (`expired`, `capacity` o `invalidated`)
    pub fn record_eviction(&self, reason: &'static str) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        counter!("loadenv_cache_evictions_total", "reason" => reason).increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: usize) {
        gauge!("loadenv_cache_entries").set(count as f64);
    }

    /// Registra una llamada al servicio remoto y su duracion
    pub fn record_gateway_call(&self, operation: &'static str, success: bool, duration: Duration) {
        let outcome = if success { "success" } else { "error" };
        counter!(
            "loadenv_gateway_requests_total",
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
        histogram!("loadenv_gateway_request_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let misses = self.misses() as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Retorna el numero de evictions
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_metrics_hit_rate() {
        let metrics = CacheMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        let rate = metrics.hit_rate();
        assert!((rate - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_hit_rate_without_traffic_is_zero() {
        assert_eq!(CacheMetrics::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheMetrics::new();
        let clone = metrics.clone();

        clone.record_eviction("capacity");
        clone.record_miss();

        assert_eq!(metrics.evictions(), 1);
        assert_eq!(metrics.misses(), 1);
    }

    #[test]
    fn test_register_metrics_without_recorder() {
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_gateway_call_recording_without_recorder() {
        // Sin recorder instalado las macros son no-ops.
        let metrics = CacheMetrics::new();
        metrics.record_gateway_call("fetch_secret", true, Duration::from_millis(3));
        metrics.update_entry_count(4);
    }
}

//! Cache invalidation by scope and glob pattern.

use glob::Pattern;
use tracing::{debug, info};

use super::keys::CacheKey;
use super::ttl_cache::TtlCache;

/// Resultado de una operacion de invalidacion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationResult {
    /// Numero de entries invalidadas.
    pub count: usize,
    /// Patrones aplicados.
    pub patterns: Vec<String>,
}

impl<V: Clone> TtlCache<CacheKey, V> {
    /// Invalida todas las entries de un scope: los secrets individuales y
    /// el snapshot completo.
    ///
    /// Compara coordenadas exactas, asi que nombres con caracteres de glob
    /// no afectan el resultado.
    ///
    /// # Examples
    ///
    /// ```
    /// use loadenv_client::cache::{CacheConfig, CacheKey, SecretSelector, TtlCache};
    ///
    /// let cache = TtlCache::new(CacheConfig::default());
    /// cache.insert(CacheKey::derive("p", "dev", "/", SecretSelector::Name("A".into())), 1);
    /// cache.insert(CacheKey::derive("p", "dev", "/", SecretSelector::All), 2);
    /// cache.insert(CacheKey::derive("p", "prod", "/", SecretSelector::All), 3);
    ///
    /// let result = cache.invalidate_scope("p", "dev", "/");
    /// assert_eq!(result.count, 2);
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn invalidate_scope(&self, project: &str, environment: &str, path: &str) -> InvalidationResult {
        let count = self.invalidate_where(|key| key.in_scope(project, environment, path));

        info!(
            project = %project,
            environment = %environment,
            path = %path,
            count,
            "Cache scope invalidated"
        );

        InvalidationResult {
            count,
            patterns: vec![format!("{}:{}:{}:*", project, environment, path)],
        }
    }

    /// Invalida entries usando un patron glob sobre la forma
    /// `project:environment:path:name` de la key (`*` como name para el
    /// snapshot completo).
    ///
    /// - `*`: coincide con cualquier secuencia de caracteres
    /// - `?`: coincide con un caracter
    ///
    /// Un patron invalido no invalida nada.
    ///
    /// # Examples
    ///
    /// ```
    /// use loadenv_client::cache::{CacheConfig, CacheKey, SecretSelector, TtlCache};
    ///
    /// let cache = TtlCache::new(CacheConfig::default());
    /// cache.insert(CacheKey::derive("p", "prod", "/", SecretSelector::Name("DB_URL".into())), 1);
    /// cache.insert(CacheKey::derive("p", "dev", "/", SecretSelector::Name("DB_URL".into())), 2);
    ///
    /// // Invalida todos los secrets de produccion
    /// let result = cache.invalidate_by_pattern("*:prod:*");
    /// assert_eq!(result.count, 1);
    /// ```
    pub fn invalidate_by_pattern(&self, pattern_str: &str) -> InvalidationResult {
        let pattern = match Pattern::new(pattern_str) {
            Ok(p) => p,
            Err(e) => {
                debug!(pattern = %pattern_str, error = %e, "Invalid glob pattern");
                return InvalidationResult {
                    count: 0,
                    patterns: vec![pattern_str.to_string()],
                };
            },
        };

        let count = self.invalidate_where(|key| pattern.matches(&key.to_string()));

        info!(pattern = %pattern_str, count, "Cache entries invalidated by pattern");

        InvalidationResult {
            count,
            patterns: vec![pattern_str.to_string()],
        }
    }

    /// Invalida entries que coincidan con cualquiera de los patrones.
    pub fn invalidate_by_patterns(&self, patterns: &[&str]) -> InvalidationResult {
        let mut total = 0;
        let mut applied = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let result = self.invalidate_by_pattern(pattern);
            total += result.count;
            applied.extend(result.patterns);
        }

        InvalidationResult {
            count: total,
            patterns: applied,
        }
    }
}

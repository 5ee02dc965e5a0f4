//! Cache key derivation.

use std::fmt;

use loadenv_core::SecretScope;

/// Que parte de un scope representa una entrada del cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecretSelector {
    /// Snapshot completo del scope (resultado de `get_all`).
    All,
    /// Un secret individual por nombre.
    Name(String),
}

impl fmt::Display for SecretSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Key unica para el cache de secrets.
///
/// Es estructural: dos keys son iguales solo si project, environment, path
/// y selector son iguales. No normaliza nada; el client resuelve defaults
/// y normaliza el path antes de derivarla.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    project: String,
    environment: String,
    path: String,
    selector: SecretSelector,
}

impl CacheKey {
    /// Deriva una key a partir de sus coordenadas.
    ///
    /// # Examples
    ///
    /// ```
    /// use loadenv_client::cache::{CacheKey, SecretSelector};
    ///
    /// let key = CacheKey::derive("proj", "dev", "/", SecretSelector::Name("DB_URL".into()));
    /// assert_eq!(key.to_string(), "proj:dev:/:DB_URL");
    ///
    /// let all = CacheKey::derive("proj", "dev", "/", SecretSelector::All);
    /// assert_eq!(all.to_string(), "proj:dev:/:*");
    /// ```
    pub fn derive(
        project: impl Into<String>,
        environment: impl Into<String>,
        path: impl Into<String>,
        selector: SecretSelector,
    ) -> Self {
        Self {
            project: project.into(),
            environment: environment.into(),
            path: path.into(),
            selector,
        }
    }

    /// Key de un secret individual dentro de un scope.
    pub fn secret(scope: &SecretScope, name: impl Into<String>) -> Self {
        Self::derive(
            scope.project(),
            scope.environment(),
            scope.path(),
            SecretSelector::Name(name.into()),
        )
    }

    /// Key del snapshot completo de un scope.
    pub fn all(scope: &SecretScope) -> Self {
        Self::derive(
            scope.project(),
            scope.environment(),
            scope.path(),
            SecretSelector::All,
        )
    }

    /// Retorna el project.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Retorna el environment.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Retorna el path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Retorna el selector.
    pub fn selector(&self) -> &SecretSelector {
        &self.selector
    }

    /// True si la key pertenece al scope (project, environment, path).
    pub fn in_scope(&self, project: &str, environment: &str, path: &str) -> bool {
        self.project == project && self.environment == environment && self.path == path
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.project, self.environment, self.path, self.selector
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn name(n: &str) -> SecretSelector {
        SecretSelector::Name(n.to_string())
    }

    #[test]
    fn test_derive_is_deterministic() {
        let key1 = CacheKey::derive("p", "dev", "/", name("A"));
        let key2 = CacheKey::derive("p", "dev", "/", name("A"));

        assert_eq!(key1, key2);
        assert_eq!(key1.to_string(), key2.to_string());
    }

    #[test]
    fn test_any_differing_coordinate_changes_key() {
        let base = CacheKey::derive("p", "dev", "/", name("A"));

        assert_ne!(base, CacheKey::derive("q", "dev", "/", name("A")));
        assert_ne!(base, CacheKey::derive("p", "prod", "/", name("A")));
        assert_ne!(base, CacheKey::derive("p", "dev", "/x", name("A")));
        assert_ne!(base, CacheKey::derive("p", "dev", "/", name("B")));
        assert_ne!(base, CacheKey::derive("p", "dev", "/", SecretSelector::All));
    }

    #[test]
    fn test_key_is_case_sensitive() {
        assert_ne!(
            CacheKey::derive("p", "dev", "/", name("api_key")),
            CacheKey::derive("p", "dev", "/", name("API_KEY"))
        );
    }

    #[test]
    fn test_colons_in_coordinates_do_not_collide() {
        // Mismo Display, keys distintas.
        let a = CacheKey::derive("p:dev", "x", "/", name("A"));
        let b = CacheKey::derive("p", "dev:x", "/", name("A"));

        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn test_scope_constructors() {
        let scope = SecretScope::new("p", "dev", "api");

        let key = CacheKey::secret(&scope, "TOKEN");
        assert_eq!(key.path(), "/api");
        assert_eq!(key.selector(), &name("TOKEN"));
        assert!(key.in_scope("p", "dev", "/api"));
        assert!(!key.in_scope("p", "dev", "/"));

        assert_eq!(CacheKey::all(&scope).selector(), &SecretSelector::All);
    }

    #[test]
    fn test_cache_key_hash() {
        let mut set = HashSet::new();
        set.insert(CacheKey::derive("p", "dev", "/", name("A")));

        assert!(set.contains(&CacheKey::derive("p", "dev", "/", name("A"))));
        assert!(!set.contains(&CacheKey::derive("p", "dev", "/", SecretSelector::All)));
    }
}

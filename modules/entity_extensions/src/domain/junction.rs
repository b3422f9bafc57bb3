//! Junction key resolution for locale and shop scoped tables
//!
//! Wire payloads address locale rows by locale code (`fr-FR`) and shop rows by
//! stringified scope id (`"1"`); storage rows carry numeric ids.

use crate::config::Config;
use crate::contract::Scope;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Maps external junction keys to stored ids and back
pub trait JunctionResolver: Send + Sync {
    /// Canonical positive id for a raw wire key
    fn resolve(&self, raw: &str) -> Option<i64>;

    /// External wire key for a stored id
    fn external_key(&self, id: i64) -> Option<String>;
}

/// Locale resolver backed by an in-memory code/id table
#[derive(Clone, Default)]
pub struct StaticLocaleResolver {
    /// code -> id
    by_code: Arc<RwLock<HashMap<String, i64>>>,
    /// id -> code
    by_id: Arc<RwLock<HashMap<i64, String>>>,
}

impl StaticLocaleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_locales<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let resolver = Self::new();
        for (code, id) in locales {
            resolver.add_locale(code, id);
        }
        resolver
    }

    /// Register a locale; non-positive ids are ignored
    pub fn add_locale(&self, code: impl Into<String>, id: i64) {
        if id <= 0 {
            return;
        }
        let code = code.into();
        self.by_id.write().insert(id, code.clone());
        self.by_code.write().insert(code, id);
    }
}

impl JunctionResolver for StaticLocaleResolver {
    fn resolve(&self, raw: &str) -> Option<i64> {
        if let Some(&id) = self.by_code.read().get(raw) {
            return Some(id);
        }
        // Numeric keys are accepted when they name a known locale id
        raw.parse::<i64>()
            .ok()
            .filter(|id| self.by_id.read().contains_key(id))
    }

    fn external_key(&self, id: i64) -> Option<String> {
        self.by_id.read().get(&id).cloned()
    }
}

/// Shop-like scope resolver: keys are the stringified ids themselves
#[derive(Clone, Default)]
pub struct ScopeIdResolver {
    /// Known ids; empty means any positive id
    known: Arc<RwLock<BTreeSet<i64>>>,
}

impl ScopeIdResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        let resolver = Self::new();
        resolver.known.write().extend(ids.into_iter().filter(|id| *id > 0));
        resolver
    }

    fn accepts(&self, id: i64) -> bool {
        if id <= 0 {
            return false;
        }
        let known = self.known.read();
        known.is_empty() || known.contains(&id)
    }
}

impl JunctionResolver for ScopeIdResolver {
    fn resolve(&self, raw: &str) -> Option<i64> {
        raw.trim().parse::<i64>().ok().filter(|id| self.accepts(*id))
    }

    fn external_key(&self, id: i64) -> Option<String> {
        self.accepts(id).then(|| id.to_string())
    }
}

/// Resolver per junction scope
#[derive(Clone)]
pub struct JunctionResolvers {
    pub locale: Arc<dyn JunctionResolver>,
    pub shop: Arc<dyn JunctionResolver>,
}

impl JunctionResolvers {
    pub fn new(locale: Arc<dyn JunctionResolver>, shop: Arc<dyn JunctionResolver>) -> Self {
        Self { locale, shop }
    }

    /// Static resolvers seeded from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(StaticLocaleResolver::from_locales(
                config.locales.iter().map(|(code, id)| (code.clone(), *id)),
            )),
            Arc::new(ScopeIdResolver::with_known_ids(config.scope_ids.iter().copied())),
        )
    }

    /// Resolver for a scope; entity scope has no junction
    pub fn for_scope(&self, scope: Scope) -> Option<&dyn JunctionResolver> {
        match scope {
            Scope::Entity => None,
            Scope::Locale => Some(self.locale.as_ref()),
            Scope::Shop => Some(self.shop.as_ref()),
        }
    }
}

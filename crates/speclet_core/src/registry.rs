//! Named top-level suite registrations.
//!
//! [`describe`](crate::decl::describe) registers every suite it declares here. A registry is an
//! explicit value owned by the caller, so nothing in the core relies on global state.

use core::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::metadata::DeclSite;
use crate::tree::Suite;

/// A generated registration name: `"{scope}::describe_{n}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiteName(String);

impl SuiteName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One suite registered by `describe`.
#[derive(Debug, Clone)]
pub struct Registration {
    name: SuiteName,
    site: DeclSite,
    suite: Suite,
}

impl Registration {
    pub fn name(&self) -> &SuiteName {
        &self.name
    }

    pub fn site(&self) -> &DeclSite {
        &self.site
    }

    pub fn scope(&self) -> &'static str {
        self.site.scope()
    }

    pub fn suite(&self) -> &Suite {
        &self.suite
    }

    /// Keyword match on the registration name or the doc string of the realized suite.
    ///
    /// A suite that fails to realize, by error or by panic, is matched by name only.
    pub fn matches(&self, keyword: &str) -> bool {
        if self.name.as_str().contains(keyword) {
            return true;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| self.suite.realize())) {
            Ok(Ok(sequence)) => sequence.metadata().doc().is_some_and(|doc| doc.contains(keyword)),
            Ok(Err(_)) | Err(_) => false,
        }
    }
}

/// Registrations in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    registrations: Vec<Registration>,
    next_id: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `suite` under a fresh name scoped to the declaring scope of `site`.
    pub fn register(&mut self, site: DeclSite, suite: Suite) -> SuiteName {
        self.next_id += 1;
        let name = SuiteName(format!("{}::describe_{}", site.scope(), self.next_id));
        tracing::debug!(name = %name, site = %site, "registered suite");
        self.registrations.push(Registration {
            name: name.clone(),
            site,
            suite,
        });
        name
    }

    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.registrations.iter().find(|r| r.name.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }

    /// Registrations declared in exactly `scope`.
    pub fn in_scope<'a>(&'a self, scope: &'a str) -> impl Iterator<Item = &'a Registration> {
        self.registrations.iter().filter(move |r| r.scope() == scope)
    }

    /// Registrations matching `keyword`, or all of them when there is no keyword.
    pub fn select(&self, keyword: Option<&str>) -> Vec<&Registration> {
        match keyword {
            Some(keyword) => self.registrations.iter().filter(|r| r.matches(keyword)).collect(),
            None => self.registrations.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

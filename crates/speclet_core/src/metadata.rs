//! Metadata records attached to suites and test cases.
//!
//! Every declaration produces exactly one [`Metadata`] record. The record is built by
//! [`Metadata::merge`] from four sources, highest precedence first:
//!
//! 1. the explicit attribute map passed to the declaration,
//! 2. form-level metadata carried by the [`DeclSite`],
//! 3. structural defaults (`doc`, `declaration_site`, `declaring_scope`),
//! 4. the `pending` default derived from the body length.
//!
//! ## Notes
//!
//! - Records are immutable once merged. Runners read them, they never re-merge.
//! - Attribute values are plain JSON values so reporters can serialize them without conversion.

use core::fmt;

use serde_json::{Map, Value, json};

/// Key holding the (optional) doc string.
pub const DOC: &str = "doc";
/// Key holding the pending flag.
pub const PENDING: &str = "pending";
/// Key holding the `{ file, line, column }` provenance object.
pub const DECLARATION_SITE: &str = "declaration_site";
/// Key holding the module path of the declaring scope.
pub const DECLARING_SCOPE: &str = "declaring_scope";

/// A declaration name, printed verbatim in front of the doc string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Shorthand for [`Symbol::new`].
pub fn sym(name: impl Into<String>) -> Symbol {
    Symbol::new(name)
}

/// Caller-supplied attributes (arbitrary key/value pairs).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Any key of the record, recognized or caller-supplied.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The ambient declaration context: where a declaration was written and in which scope.
///
/// Usually captured with the `site!()` macro of the `speclet` crate. Form-level metadata can be
/// attached with [`DeclSite::with_meta`]; it is merged above the structural defaults and below the
/// explicit attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclSite {
    file: &'static str,
    line: u32,
    column: u32,
    scope: &'static str,
    meta: Attributes,
}

impl DeclSite {
    pub fn new(file: &'static str, line: u32, column: u32, scope: &'static str) -> Self {
        Self {
            file,
            line,
            column,
            scope,
            meta: Attributes::new(),
        }
    }

    /// Attach form-level metadata to this declaration.
    pub fn with_meta(mut self, meta: Attributes) -> Self {
        self.meta = meta;
        self
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Module path of the declaring scope.
    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn meta(&self) -> &Attributes {
        &self.meta
    }

    fn provenance(&self) -> Value {
        json!({
            "file": self.file,
            "line": self.line,
            "column": self.column,
        })
    }
}

impl fmt::Display for DeclSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Join a declaration symbol and a doc string with a single space, skipping absent parts.
///
/// ## Returns
/// - `None` when both parts are absent.
///
/// ## Examples
/// ```rust
/// use speclet_core::metadata::{join_doc, sym};
///
/// assert_eq!(join_doc(Some(&sym("inc")), Some("adds one")), Some("inc adds one".to_string()));
/// assert_eq!(join_doc(None, Some("adds one")), Some("adds one".to_string()));
/// assert_eq!(join_doc(None, None), None);
/// ```
pub fn join_doc(symbol: Option<&Symbol>, doc: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [symbol.map(Symbol::as_str), doc].into_iter().flatten().collect();
    if parts.is_empty() { None } else { Some(parts.join(" ")) }
}

/// The merged metadata record of a suite or test case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Merge the metadata of one declaration.
    ///
    /// ## Parameters
    /// - `body`: the declaration body with absent placeholders already removed. Only its emptiness is read.
    /// - `form`: the declaration site, providing provenance and form-level metadata.
    /// - `doc`: the joined doc string (see [`join_doc`]).
    /// - `attributes`: the explicit attribute map, if any.
    ///
    /// ## Notes
    /// - Explicit attributes win over everything, provenance keys included.
    pub fn merge<T>(body: &[T], form: &DeclSite, doc: Option<String>, attributes: Option<&Attributes>) -> Self {
        let mut map = Map::new();
        map.insert(PENDING.to_string(), Value::Bool(body.is_empty()));

        if let Some(doc) = doc {
            map.insert(DOC.to_string(), Value::String(doc));
        }
        map.insert(DECLARATION_SITE.to_string(), form.provenance());
        map.insert(DECLARING_SCOPE.to_string(), Value::String(form.scope().to_string()));

        for (key, value) in form.meta().iter() {
            map.insert(key.clone(), value.clone());
        }
        if let Some(attributes) = attributes {
            for (key, value) in attributes.iter() {
                map.insert(key.clone(), value.clone());
            }
        }

        Self(map)
    }

    pub fn doc(&self) -> Option<&str> {
        self.0.get(DOC).and_then(Value::as_str)
    }

    /// True when the node must be reported as pending instead of executed.
    ///
    /// Any JSON value other than `null` and `false` counts, so `"pending": "waiting on #12"` works
    /// as an explicit attribute.
    pub fn pending(&self) -> bool {
        self.0.get(PENDING).is_some_and(json_truthy)
    }

    pub fn declaration_site(&self) -> Option<&Value> {
        self.0.get(DECLARATION_SITE)
    }

    pub fn declaring_scope(&self) -> Option<&str> {
        self.0.get(DECLARING_SCOPE).and_then(Value::as_str)
    }

    /// `file:line` of the declaration, when the provenance object is intact.
    pub fn location(&self) -> Option<String> {
        let site = self.declaration_site()?;
        let file = site.get("file")?.as_str()?;
        let line = site.get("line")?.as_u64()?;
        Some(format!("{file}:{line}"))
    }

    /// Any key of the record, recognized or caller-supplied.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

pub(crate) fn json_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> DeclSite {
        DeclSite::new("tests/math.rs", 12, 5, "math::tests")
    }

    #[test]
    fn test_pending_follows_body_length() {
        let empty: [u8; 0] = [];
        assert!(Metadata::merge(&empty, &site(), None, None).pending());
        assert!(!Metadata::merge(&[1], &site(), None, None).pending());
    }

    #[test]
    fn test_structural_keys_always_present() {
        let meta = Metadata::merge(&[1], &site(), Some("adds".into()), None);
        assert_eq!(meta.doc(), Some("adds"));
        assert_eq!(meta.declaring_scope(), Some("math::tests"));
        assert_eq!(meta.location().as_deref(), Some("tests/math.rs:12"));
        assert_eq!(
            meta.declaration_site(),
            Some(&json!({ "file": "tests/math.rs", "line": 12, "column": 5 }))
        );
    }

    #[test]
    fn test_absent_doc_is_not_stored() {
        let meta = Metadata::merge(&[1], &site(), None, None);
        assert_eq!(meta.doc(), None);
        assert!(meta.attribute(DOC).is_none());
    }

    #[test]
    fn test_precedence_attributes_over_form_over_structure() {
        let form = site().with_meta(Attributes::new().with("doc", "from form").with("tag", "form"));
        let attrs = Attributes::new().with("tag", "explicit").with(DECLARING_SCOPE, "elsewhere");

        let meta = Metadata::merge(&[1], &form, Some("structural".into()), Some(&attrs));

        assert_eq!(meta.doc(), Some("from form"));
        assert_eq!(meta.attribute("tag"), Some(&json!("explicit")));
        assert_eq!(meta.declaring_scope(), Some("elsewhere"));
    }

    #[test]
    fn test_explicit_pending_attribute_overrides_body() {
        let attrs = Attributes::new().with(PENDING, "waiting on fixtures");
        let meta = Metadata::merge(&[1], &site(), None, Some(&attrs));
        assert!(meta.pending());

        let attrs = Attributes::new().with(PENDING, false);
        let empty: [u8; 0] = [];
        assert!(!Metadata::merge(&empty, &site(), None, Some(&attrs)).pending());
    }

    #[test]
    fn test_join_doc_skips_absent_parts() {
        assert_eq!(join_doc(Some(&sym("inc")), None), Some("inc".to_string()));
        assert_eq!(join_doc(Some(&sym("inc")), Some("")), Some("inc ".to_string()));
    }
}

use crate::named_node::NamedNode;
use std::collections::BTreeMap;
use std::collections::btree_map::Iter;
use std::fmt;

/// A `prefix:local` shorthand for an IRI.
///
/// The local part is stored unescaped (`ex:a\.b` has local part `a.b`).
///
/// ```
/// use rdfterm::{Namespaces, PrefixedName};
///
/// let mut namespaces = Namespaces::default();
/// namespaces.bind("ex", "http://example.com/");
/// assert_eq!(
///     PrefixedName::new("ex", "foo").resolve(&namespaces)?.as_str(),
///     "http://example.com/foo"
/// );
/// assert!(PrefixedName::new("other", "foo").resolve(&namespaces).is_err());
/// # Result::<_, rdfterm::UnresolvedPrefixError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct PrefixedName {
    prefix: String,
    local: String,
}

impl PrefixedName {
    #[inline]
    pub fn new(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[inline]
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Concatenates the IRI bound to the prefix with the local part.
    pub fn resolve(&self, namespaces: &Namespaces) -> Result<NamedNode, UnresolvedPrefixError> {
        let namespace = namespaces
            .get(&self.prefix)
            .ok_or_else(|| UnresolvedPrefixError {
                prefix: self.prefix.clone(),
            })?;
        let mut iri = String::with_capacity(namespace.len() + self.local.len());
        iri.push_str(namespace);
        iri.push_str(&self.local);
        Ok(NamedNode::new_unchecked(iri))
    }
}

impl fmt::Display for PrefixedName {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

/// The prefix to namespace IRI bindings in effect at some point of a document.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Namespaces {
    bindings: BTreeMap<String, String>,
}

impl Namespaces {
    /// Binds `prefix` to `iri`, replacing any previous binding.
    #[inline]
    pub fn bind(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.bindings.insert(prefix.into(), iri.into());
    }

    #[inline]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over the bindings ordered by prefix.
    #[inline]
    pub fn iter(&self) -> NamespacesIter<'_> {
        NamespacesIter {
            inner: self.bindings.iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Namespaces {
    type Item = (&'a str, &'a str);
    type IntoIter = NamespacesIter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct NamespacesIter<'a> {
    inner: Iter<'a, String, String>,
}

impl<'a> Iterator for NamespacesIter<'a> {
    type Item = (&'a str, &'a str);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (prefix, iri) = self.inner.next()?;
        Some((prefix, iri))
    }
}

/// A prefixed name used a prefix that has not been declared.
#[derive(Debug, Clone, thiserror::Error)]
#[error("The prefix {prefix}: has not been declared")]
pub struct UnresolvedPrefixError {
    prefix: String,
}

impl UnresolvedPrefixError {
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

use rand::random;
use std::collections::HashMap;
use std::fmt;

/// An owned RDF [blank node](https://www.w3.org/TR/rdf12-concepts/#dfn-blank-node).
///
/// Blank nodes are only created through a [`BlankNodeScope`], one scope per parsed document.
/// Two blank nodes are equal if and only if they come from the same scope and are
/// either the same anonymous node or share the same label.
///
/// The default string formatter is returning an N-Triples and Turtle compatible representation:
/// ```
/// use rdfterm::BlankNodeScope;
///
/// let mut scope = BlankNodeScope::new();
/// assert_eq!("_:a122", scope.labelled("a122").to_string());
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct BlankNode(BlankNodeContent);

#[derive(PartialEq, Eq, Debug, Clone, Hash)]
enum BlankNodeContent {
    Anonymous { scope: u64, id: u64 },
    Labelled { scope: u64, label: String },
}

impl BlankNode {
    /// The label written in the document, if this blank node has one.
    #[inline]
    pub fn label(&self) -> Option<&str> {
        match &self.0 {
            BlankNodeContent::Anonymous { .. } => None,
            BlankNodeContent::Labelled { label, .. } => Some(label),
        }
    }

    /// Checks if this blank node was created from `[]`, `[ ... ]`, a collection or a reifier
    /// instead of a `_:label`.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        matches!(self.0, BlankNodeContent::Anonymous { .. })
    }
}

impl fmt::Display for BlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            BlankNodeContent::Anonymous { scope, id } => write!(f, "_:b{scope:x}x{id}"),
            BlankNodeContent::Labelled { label, .. } => write!(f, "_:{label}"),
        }
    }
}

/// The blank node namespace of a single parse run.
///
/// It mints fresh anonymous nodes and keeps the label table used to give the same identity
/// to every `_:label` occurrence of a document.
/// The table is filled lazily and freed with the scope.
///
/// ```
/// use rdfterm::BlankNodeScope;
///
/// let mut scope = BlankNodeScope::new();
/// assert_eq!(scope.labelled("a"), scope.labelled("a"));
/// assert_ne!(scope.fresh(), scope.fresh());
///
/// // Another run never shares identities with this one
/// let mut other = BlankNodeScope::new();
/// assert_ne!(scope.labelled("a"), other.labelled("a"));
/// ```
#[derive(Debug)]
pub struct BlankNodeScope {
    scope: u64,
    next_id: u64,
    labels: HashMap<String, BlankNode>,
}

impl BlankNodeScope {
    /// Opens a new scope with a random identifier.
    pub fn new() -> Self {
        Self {
            scope: random(),
            next_id: 0,
            labels: HashMap::new(),
        }
    }

    /// A new anonymous blank node, distinct from every other node.
    pub fn fresh(&mut self) -> BlankNode {
        let id = self.next_id;
        self.next_id += 1;
        BlankNode(BlankNodeContent::Anonymous {
            scope: self.scope,
            id,
        })
    }

    /// The blank node bound to `label` in this scope, created on first reference.
    pub fn labelled(&mut self, label: &str) -> BlankNode {
        if let Some(node) = self.labels.get(label) {
            return node.clone();
        }
        let node = BlankNode(BlankNodeContent::Labelled {
            scope: self.scope,
            label: label.to_owned(),
        });
        self.labels.insert(label.to_owned(), node.clone());
        node
    }

    /// Number of distinct labels seen so far.
    #[inline]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

impl Default for BlankNodeScope {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labelled_nodes_are_shared_inside_a_scope() {
        let mut scope = BlankNodeScope::new();
        let a = scope.labelled("a");
        assert_eq!(a, scope.labelled("a"));
        assert_ne!(a, scope.labelled("b"));
        assert_eq!(scope.label_count(), 2);
        assert_eq!(a.label(), Some("a"));
        assert!(!a.is_anonymous());
    }

    #[test]
    fn anonymous_nodes_are_never_shared() {
        let mut scope = BlankNodeScope::new();
        let first = scope.fresh();
        let second = scope.fresh();
        assert_ne!(first, second);
        assert!(first.is_anonymous());
        assert_eq!(first.label(), None);
        assert_ne!(first.to_string(), second.to_string());
    }

    #[test]
    fn scopes_do_not_leak() {
        let mut first = BlankNodeScope::new();
        let mut second = BlankNodeScope::new();
        assert_ne!(first.labelled("x"), second.labelled("x"));
        assert_ne!(first.fresh(), second.fresh());
    }
}

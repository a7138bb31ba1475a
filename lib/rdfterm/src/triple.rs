use crate::blank_node::BlankNode;
use crate::literal::Literal;
use crate::named_node::{NamedNode, NamedNodeRef};
use std::fmt;

/// The owned union of [IRIs](https://www.w3.org/TR/rdf12-concepts/#dfn-iri) and [blank nodes](https://www.w3.org/TR/rdf12-concepts/#dfn-blank-node).
///
/// It is the type of subjects, reifiers and graph names.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum NamedOrBlankNode {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
}

impl NamedOrBlankNode {
    #[inline]
    pub fn is_named_node(&self) -> bool {
        matches!(self, Self::NamedNode(_))
    }

    #[inline]
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Self::BlankNode(_))
    }
}

impl fmt::Display for NamedOrBlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(node) => node.fmt(f),
            Self::BlankNode(node) => node.fmt(f),
        }
    }
}

impl From<NamedNode> for NamedOrBlankNode {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

impl From<NamedNodeRef<'_>> for NamedOrBlankNode {
    #[inline]
    fn from(node: NamedNodeRef<'_>) -> Self {
        node.into_owned().into()
    }
}

impl From<BlankNode> for NamedOrBlankNode {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

/// An owned RDF [term](https://www.w3.org/TR/rdf12-concepts/#dfn-rdf-term).
///
/// It is the union of [IRIs](https://www.w3.org/TR/rdf12-concepts/#dfn-iri), [blank nodes](https://www.w3.org/TR/rdf12-concepts/#dfn-blank-node), [literals](https://www.w3.org/TR/rdf12-concepts/#dfn-literal) and [triple terms](https://www.w3.org/TR/rdf12-concepts/#dfn-triple-term).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    Triple(Box<Triple>),
}

impl Term {
    #[inline]
    pub fn is_named_node(&self) -> bool {
        matches!(self, Self::NamedNode(_))
    }

    #[inline]
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Self::BlankNode(_))
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    #[inline]
    pub fn is_triple(&self) -> bool {
        matches!(self, Self::Triple(_))
    }
}

impl fmt::Display for Term {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(node) => node.fmt(f),
            Self::BlankNode(node) => node.fmt(f),
            Self::Literal(literal) => literal.fmt(f),
            Self::Triple(triple) => write!(f, "<<( {triple} )>>"),
        }
    }
}

impl From<NamedNode> for Term {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

impl From<NamedNodeRef<'_>> for Term {
    #[inline]
    fn from(node: NamedNodeRef<'_>) -> Self {
        node.into_owned().into()
    }
}

impl From<BlankNode> for Term {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

impl From<Literal> for Term {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<Triple> for Term {
    #[inline]
    fn from(triple: Triple) -> Self {
        Self::Triple(Box::new(triple))
    }
}

impl From<NamedOrBlankNode> for Term {
    #[inline]
    fn from(node: NamedOrBlankNode) -> Self {
        match node {
            NamedOrBlankNode::NamedNode(node) => node.into(),
            NamedOrBlankNode::BlankNode(node) => node.into(),
        }
    }
}

impl TryFrom<Term> for NamedOrBlankNode {
    type Error = Term;

    /// Gives back the term if it is neither an IRI nor a blank node.
    #[inline]
    fn try_from(term: Term) -> Result<Self, Term> {
        match term {
            Term::NamedNode(node) => Ok(node.into()),
            Term::BlankNode(node) => Ok(node.into()),
            term @ (Term::Literal(_) | Term::Triple(_)) => Err(term),
        }
    }
}

/// An owned [RDF triple](https://www.w3.org/TR/rdf12-concepts/#dfn-rdf-triple), used as the value of a triple term.
///
/// The default string formatter is returning an N-Triples compatible representation:
/// ```
/// use rdfterm::{NamedNode, Triple};
///
/// assert_eq!(
///     "<http://example.com/s> <http://example.com/p> <http://example.com/o>",
///     Triple::new(
///         NamedNode::new("http://example.com/s")?,
///         NamedNode::new("http://example.com/p")?,
///         NamedNode::new("http://example.com/o")?,
///     )
///     .to_string()
/// );
/// # Result::<_, rdfterm::IriParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Triple {
    /// The [subject](https://www.w3.org/TR/rdf12-concepts/#dfn-subject) of this triple.
    pub subject: NamedOrBlankNode,
    /// The [predicate](https://www.w3.org/TR/rdf12-concepts/#dfn-predicate) of this triple.
    pub predicate: NamedNode,
    /// The [object](https://www.w3.org/TR/rdf12-concepts/#dfn-object) of this triple.
    pub object: Term,
}

impl Triple {
    #[inline]
    pub fn new(
        subject: impl Into<NamedOrBlankNode>,
        predicate: impl Into<NamedNode>,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A statement emitted by the parser: a triple with an optional [graph name](https://www.w3.org/TR/rdf12-concepts/#dfn-graph-name).
///
/// `context` is `None` for statements of the default graph.
///
/// ```
/// use rdfterm::{NamedNode, Statement};
///
/// let statement = Statement::new(
///     NamedNode::new("http://example.com/s")?,
///     NamedNode::new("http://example.com/p")?,
///     NamedNode::new("http://example.com/o")?,
///     Some(NamedNode::new("http://example.com/g")?.into()),
/// );
/// assert_eq!(
///     "<http://example.com/s> <http://example.com/p> <http://example.com/o> <http://example.com/g> .",
///     statement.to_string()
/// );
/// # Result::<_, rdfterm::IriParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Statement {
    pub subject: NamedOrBlankNode,
    pub predicate: NamedNode,
    pub object: Term,
    pub context: Option<NamedOrBlankNode>,
}

impl Statement {
    #[inline]
    pub fn new(
        subject: impl Into<NamedOrBlankNode>,
        predicate: impl Into<NamedNode>,
        object: impl Into<Term>,
        context: Option<NamedOrBlankNode>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            context,
        }
    }

    /// The statement without its graph name.
    #[inline]
    pub fn into_triple(self) -> Triple {
        Triple {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
        }
    }
}

impl fmt::Display for Statement {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(context) = &self.context {
            write!(f, " {context}")?;
        }
        f.write_str(" .")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlankNodeScope;
    use crate::vocab::rdf;

    #[test]
    fn triple_term_display() {
        let triple = Triple::new(
            NamedNode::new_unchecked("http://example.com/s"),
            rdf::TYPE,
            Literal::new_simple_literal("o"),
        );
        let statement = Statement::new(
            NamedNode::new_unchecked("http://example.com/r"),
            rdf::REIFIES,
            triple,
            None,
        );
        assert_eq!(
            statement.to_string(),
            "<http://example.com/r> <http://www.w3.org/1999/02/22-rdf-syntax-ns#reifies> <<( <http://example.com/s> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \"o\" )>> ."
        );
        assert!(statement.object.is_triple());
    }

    #[test]
    fn subjects_from_terms() {
        let mut scope = BlankNodeScope::new();
        let node = scope.fresh();
        assert_eq!(
            NamedOrBlankNode::try_from(Term::from(node.clone())),
            Ok(NamedOrBlankNode::BlankNode(node))
        );
        let literal = Term::from(Literal::from("a"));
        assert_eq!(NamedOrBlankNode::try_from(literal.clone()), Err(literal));
    }

    #[test]
    fn into_triple_drops_context() {
        let statement = Statement::new(
            NamedNode::new_unchecked("http://example.com/s"),
            rdf::TYPE,
            rdf::NIL,
            Some(NamedNode::new_unchecked("http://example.com/g").into()),
        );
        let triple = statement.clone().into_triple();
        assert_eq!(triple.subject, statement.subject);
        assert_eq!(triple.to_string().matches(' ').count(), 2);
    }
}

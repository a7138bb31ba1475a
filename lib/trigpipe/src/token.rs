use crate::error::TextPosition;
use std::fmt;
use std::ops::Range;

/// The shape of a numeric literal.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub enum NumberKind {
    Integer,
    Decimal,
    Double,
}

/// A terminal of the TriG grammar.
///
/// Payloads are already unescaped.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Token {
    /// `<iri>`
    Iri(String),
    /// `"..."`, `'...'`, `"""..."""` or `'''...'''`
    String(String),
    /// `prefix:`
    PNameNs { prefix: String },
    /// `prefix:local`
    PNameLn { prefix: String, local: String },
    /// `_:label`
    BlankNodeLabel(String),
    Number { lexical: String, kind: NumberKind },
    /// `@lang` or `@lang--dir`
    LangTag {
        language: String,
        direction: Option<String>,
    },
    Boolean(bool),
    /// `a`
    A,
    /// `@prefix`
    PrefixDirective,
    /// `@base`
    BaseDirective,
    /// `PREFIX`
    SparqlPrefix,
    /// `BASE`
    SparqlBase,
    /// `GRAPH`
    Graph,
    Dot,
    SemiColumn,
    Coma,
    /// `[`
    BlankNodeOpening,
    /// `]`
    BlankNodeClosing,
    /// `[]`
    BlankNodeAnonymous,
    /// `(`
    CollectionOpening,
    /// `)`
    CollectionClosing,
    /// `()`
    EmptyCollection,
    /// `{`
    GraphOpening,
    /// `}`
    GraphClosing,
    /// `<<`
    ReifiedTripleOpening,
    /// `>>`
    ReifiedTripleClosing,
    /// `<<(`
    TripleTermOpening,
    /// `)>>`
    TripleTermClosing,
    /// `{|`
    AnnotationOpening,
    /// `|}`
    AnnotationClosing,
    /// `^^`
    DatatypeMarker,
    /// `~`
    Reifier,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::PNameNs { prefix } => write!(f, "{prefix}:"),
            Self::PNameLn { prefix, local } => write!(f, "{prefix}:{local}"),
            Self::BlankNodeLabel(label) => write!(f, "_:{label}"),
            Self::Number { lexical, .. } => f.write_str(lexical),
            Self::LangTag {
                language,
                direction,
            } => {
                write!(f, "@{language}")?;
                if let Some(direction) = direction {
                    write!(f, "--{direction}")?;
                }
                Ok(())
            }
            Self::Boolean(value) => write!(f, "{value}"),
            Self::A => f.write_str("a"),
            Self::PrefixDirective => f.write_str("@prefix"),
            Self::BaseDirective => f.write_str("@base"),
            Self::SparqlPrefix => f.write_str("PREFIX"),
            Self::SparqlBase => f.write_str("BASE"),
            Self::Graph => f.write_str("GRAPH"),
            Self::Dot => f.write_str("."),
            Self::SemiColumn => f.write_str(";"),
            Self::Coma => f.write_str(","),
            Self::BlankNodeOpening => f.write_str("["),
            Self::BlankNodeClosing => f.write_str("]"),
            Self::BlankNodeAnonymous => f.write_str("[]"),
            Self::CollectionOpening => f.write_str("("),
            Self::CollectionClosing => f.write_str(")"),
            Self::EmptyCollection => f.write_str("()"),
            Self::GraphOpening => f.write_str("{"),
            Self::GraphClosing => f.write_str("}"),
            Self::ReifiedTripleOpening => f.write_str("<<"),
            Self::ReifiedTripleClosing => f.write_str(">>"),
            Self::TripleTermOpening => f.write_str("<<("),
            Self::TripleTermClosing => f.write_str(")>>"),
            Self::AnnotationOpening => f.write_str("{|"),
            Self::AnnotationClosing => f.write_str("|}"),
            Self::DatatypeMarker => f.write_str("^^"),
            Self::Reifier => f.write_str("~"),
        }
    }
}

/// A token and the range of the input it was read from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TokenWithPosition {
    pub token: Token,
    pub location: Range<TextPosition>,
}

use crate::named_node::{NamedNode, NamedNodeRef};
use crate::vocab::{rdf, xsd};
use std::fmt::{self, Write};

/// An owned RDF [literal](https://www.w3.org/TR/rdf12-concepts/#dfn-literal).
///
/// Values are kept in their lexical form: numbers are not canonicalized,
/// language tags and directions are kept as they were written.
///
/// The default string formatter is returning an N-Triples and Turtle compatible representation:
/// ```
/// use rdfterm::Literal;
/// use rdfterm::vocab::xsd;
///
/// assert_eq!(
///     "\"foo\\nbar\"",
///     Literal::new_simple_literal("foo\nbar").to_string()
/// );
///
/// assert_eq!(
///     r#""1"^^<http://www.w3.org/2001/XMLSchema#integer>"#,
///     Literal::new_typed_literal("1", xsd::INTEGER).to_string()
/// );
///
/// assert_eq!(
///     r#""foo"@en--ltr"#,
///     Literal::new_directional_language_tagged_literal("foo", "en", "ltr").to_string()
/// );
/// ```
#[derive(PartialEq, Eq, Debug, Clone, Hash)]
pub struct Literal(LiteralContent);

#[derive(PartialEq, Eq, Debug, Clone, Hash)]
enum LiteralContent {
    String(String),
    LanguageTaggedString {
        value: String,
        language: String,
        direction: Option<String>,
    },
    TypedLiteral {
        value: String,
        datatype: NamedNode,
    },
}

impl Literal {
    /// Builds an RDF [simple literal](https://www.w3.org/TR/rdf12-concepts/#dfn-simple-literal).
    #[inline]
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(LiteralContent::String(value.into()))
    }

    /// Builds an RDF [literal](https://www.w3.org/TR/rdf12-concepts/#dfn-literal) with a [datatype](https://www.w3.org/TR/rdf12-concepts/#dfn-datatype-iri).
    ///
    /// A `xsd:string` datatype gives a simple literal.
    #[inline]
    pub fn new_typed_literal(value: impl Into<String>, datatype: impl Into<NamedNode>) -> Self {
        let value = value.into();
        let datatype = datatype.into();
        Self(if datatype == xsd::STRING {
            LiteralContent::String(value)
        } else {
            LiteralContent::TypedLiteral { value, datatype }
        })
    }

    /// Builds an RDF [language-tagged string](https://www.w3.org/TR/rdf12-concepts/#dfn-language-tagged-string).
    ///
    /// The tag is not validated nor normalized.
    #[inline]
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self(LiteralContent::LanguageTaggedString {
            value: value.into(),
            language: language.into(),
            direction: None,
        })
    }

    /// Builds an RDF [directional language-tagged string](https://www.w3.org/TR/rdf12-concepts/#dfn-dir-lang-string).
    #[inline]
    pub fn new_directional_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
        direction: impl Into<String>,
    ) -> Self {
        Self(LiteralContent::LanguageTaggedString {
            value: value.into(),
            language: language.into(),
            direction: Some(direction.into()),
        })
    }

    /// The literal [lexical form](https://www.w3.org/TR/rdf12-concepts/#dfn-lexical-form).
    #[inline]
    pub fn value(&self) -> &str {
        match &self.0 {
            LiteralContent::String(value)
            | LiteralContent::LanguageTaggedString { value, .. }
            | LiteralContent::TypedLiteral { value, .. } => value,
        }
    }

    /// The literal [language tag](https://www.w3.org/TR/rdf12-concepts/#dfn-language-tag) if it is a [language-tagged string](https://www.w3.org/TR/rdf12-concepts/#dfn-language-tagged-string).
    #[inline]
    pub fn language(&self) -> Option<&str> {
        match &self.0 {
            LiteralContent::LanguageTaggedString { language, .. } => Some(language),
            _ => None,
        }
    }

    /// The literal [base direction](https://www.w3.org/TR/rdf12-concepts/#dfn-base-direction) if it has one.
    #[inline]
    pub fn direction(&self) -> Option<&str> {
        match &self.0 {
            LiteralContent::LanguageTaggedString { direction, .. } => direction.as_deref(),
            _ => None,
        }
    }

    /// The literal [datatype](https://www.w3.org/TR/rdf12-concepts/#dfn-datatype-iri).
    ///
    /// The datatype of [language-tagged string](https://www.w3.org/TR/rdf12-concepts/#dfn-language-tagged-string) is always [rdf:langString](https://www.w3.org/TR/rdf12-concepts/#dfn-language-tagged-string),
    /// [rdf:dirLangString](https://www.w3.org/TR/rdf12-concepts/#dfn-dir-lang-string) when a direction is set.
    /// The datatype of [simple literals](https://www.w3.org/TR/rdf12-concepts/#dfn-simple-literal) is [xsd:string](https://www.w3.org/TR/xmlschema11-2/#string).
    #[inline]
    pub fn datatype(&self) -> NamedNodeRef<'_> {
        match &self.0 {
            LiteralContent::String(_) => xsd::STRING,
            LiteralContent::LanguageTaggedString {
                direction: None, ..
            } => rdf::LANG_STRING,
            LiteralContent::LanguageTaggedString {
                direction: Some(_),
                ..
            } => rdf::DIR_LANG_STRING,
            LiteralContent::TypedLiteral { datatype, .. } => datatype.as_ref(),
        }
    }

    /// Checks if this literal could be seen as an RDF 1.0 [plain literal](https://www.w3.org/TR/2004/REC-rdf-concepts-20040210/#dfn-plain-literal).
    #[inline]
    pub fn is_plain(&self) -> bool {
        matches!(
            self.0,
            LiteralContent::String(_) | LiteralContent::LanguageTaggedString { .. }
        )
    }
}

impl fmt::Display for Literal {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            LiteralContent::String(value) => print_quoted_str(value, f),
            LiteralContent::LanguageTaggedString {
                value,
                language,
                direction,
            } => {
                print_quoted_str(value, f)?;
                write!(f, "@{language}")?;
                if let Some(direction) = direction {
                    write!(f, "--{direction}")?;
                }
                Ok(())
            }
            LiteralContent::TypedLiteral { value, datatype } => {
                print_quoted_str(value, f)?;
                write!(f, "^^{datatype}")
            }
        }
    }
}

impl From<&str> for Literal {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new_simple_literal(value)
    }
}

impl From<String> for Literal {
    #[inline]
    fn from(value: String) -> Self {
        Self::new_simple_literal(value)
    }
}

impl From<bool> for Literal {
    #[inline]
    fn from(value: bool) -> Self {
        Self::new_typed_literal(if value { "true" } else { "false" }, xsd::BOOLEAN)
    }
}

#[inline]
pub(crate) fn print_quoted_str(string: &str, f: &mut impl Write) -> fmt::Result {
    f.write_char('"')?;
    for c in string.chars() {
        match c {
            '\u{08}' => f.write_str("\\b"),
            '\t' => f.write_str("\\t"),
            '\n' => f.write_str("\\n"),
            '\u{0c}' => f.write_str("\\f"),
            '\r' => f.write_str("\\r"),
            '"' => f.write_str("\\\""),
            '\\' => f.write_str("\\\\"),
            '\0'..='\u{1f}' | '\u{7f}' => write!(f, "\\u{:04X}", u32::from(c)),
            c => f.write_char(c),
        }?;
    }
    f.write_char('"')
}

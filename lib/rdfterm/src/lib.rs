//! RDFTerm is a small library providing the data structures emitted by the [trigpipe](https://crates.io/crates/trigpipe) streaming parser.
//!
//! It follows [RDF 1.2 concepts](https://www.w3.org/TR/rdf12-concepts/): terms are IRIs, blank nodes,
//! literals or triple terms, and statements are quads with an optional graph context.
//!
//! Blank nodes are minted by a [`BlankNodeScope`] that lives as long as one parse run:
//! labelled blank nodes with the same label inside a scope are equal,
//! anonymous blank nodes never are, and nodes of two different scopes never collide.
//!
//! Usage example:
//! ```
//! use rdfterm::vocab::rdf;
//! use rdfterm::{BlankNodeScope, Literal, Namespaces, PrefixedName, Statement};
//!
//! let mut namespaces = Namespaces::default();
//! namespaces.bind("ex", "http://example.com/");
//! let subject = PrefixedName::new("ex", "s").resolve(&namespaces)?;
//!
//! let mut scope = BlankNodeScope::new();
//! let node = scope.fresh();
//! let statements = [
//!     Statement::new(subject, rdf::FIRST, node.clone(), None),
//!     Statement::new(node, rdf::FIRST, Literal::new_simple_literal("v"), None),
//! ];
//! assert_eq!(statements[0].object, statements[1].subject.clone().into());
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod blank_node;
mod literal;
mod named_node;
mod prefixed_name;
mod triple;
pub mod vocab;

pub use crate::blank_node::{BlankNode, BlankNodeScope};
pub use crate::literal::Literal;
pub use crate::named_node::{NamedNode, NamedNodeRef};
pub use crate::prefixed_name::{Namespaces, NamespacesIter, PrefixedName, UnresolvedPrefixError};
pub use crate::triple::{NamedOrBlankNode, Statement, Term, Triple};
pub use oxiri::IriParseError;

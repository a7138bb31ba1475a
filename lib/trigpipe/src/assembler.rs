//! The third stage: tokens to statements.

use crate::error::{SyntaxErrorKind, TextPosition, TriGParseError, TriGSyntaxError};
use crate::token::{NumberKind, Token, TokenWithPosition};
use rdfterm::vocab::{rdf, xsd};
use rdfterm::{
    BlankNode, BlankNodeScope, Literal, NamedNode, NamedOrBlankNode, Namespaces, PrefixedName,
    Statement, Term, Triple,
};
use std::collections::VecDeque;
use std::mem::{replace, take};
use std::ops::Range;
use tracing::trace;

/// Turns a sequence of [`TokenWithPosition`] into a sequence of [`Statement`].
///
/// Each bracket of the grammar opens a frame with its own subject, predicate and object slots.
/// A statement is emitted when the token following its object is read,
/// so the statements about a nested blank node come before the statement using it as object.
///
/// Errors of the input are forwarded as they are.
/// The iterator is fused after it returned an error.
pub struct Assembler<I> {
    input: I,
    namespaces: Namespaces,
    base_iri: Option<String>,
    blank_nodes: BlankNodeScope,
    current: Frame,
    parents: Vec<Frame>,
    graph: Option<NamedOrBlankNode>,
    mode: Mode,
    output: VecDeque<Statement>,
    error: Option<TriGParseError>,
    last_position: TextPosition,
    is_ending: bool,
}

type AssemblerResult<T> = Result<T, TriGParseError>;

/// What the next token is expected to be, when it is not a regular term or punctuation.
#[derive(Default)]
enum Mode {
    #[default]
    Normal,
    PrefixExpectName {
        sparql: bool,
    },
    PrefixExpectIri {
        sparql: bool,
        prefix: String,
    },
    BaseExpectIri {
        sparql: bool,
    },
    DirectiveExpectDot,
    GraphExpectLabel,
    GraphExpectOpening {
        label: NamedOrBlankNode,
    },
    ReifierExpectId,
    LiteralSuffix {
        value: String,
        location: Range<TextPosition>,
    },
    LiteralDatatype {
        value: String,
    },
}

struct Frame {
    kind: FrameKind,
    slots: Slots,
}

enum FrameKind {
    Document,
    GraphBlock,
    PropertyList {
        node: BlankNode,
    },
    Collection {
        head: Option<BlankNode>,
        last: Option<BlankNode>,
    },
    Annotation,
    ReifiedTriple {
        reifier: Option<NamedOrBlankNode>,
    },
    TripleTerm,
}

impl FrameKind {
    fn description(&self) -> &'static str {
        match self {
            Self::Document => "at the top level",
            Self::GraphBlock => "inside a graph block",
            Self::PropertyList { .. } => "inside a blank node property list",
            Self::Collection { .. } => "inside a collection",
            Self::Annotation => "inside an annotation",
            Self::ReifiedTriple { .. } => "inside a reified triple",
            Self::TripleTerm => "inside a triple term",
        }
    }

    fn closing(&self) -> &'static str {
        match self {
            Self::Document => "'.'",
            Self::GraphBlock => "'}'",
            Self::PropertyList { .. } => "']'",
            Self::Collection { .. } => "')'",
            Self::Annotation => "'|}'",
            Self::ReifiedTriple { .. } => "'>>'",
            Self::TripleTerm => "')>>'",
        }
    }

    fn allows_separators(&self) -> bool {
        matches!(
            self,
            Self::Document | Self::GraphBlock | Self::PropertyList { .. } | Self::Annotation
        )
    }
}

#[derive(Default, Eq, PartialEq, Clone, Copy)]
enum SubjectShape {
    /// An IRI or a blank node, it may also be a graph label.
    #[default]
    Simple,
    /// A collection, a predicate must follow.
    Compound,
    /// `[ p o ]`, `<< s p o >>` or a subject followed by `;`: the triples block may end here.
    Standalone,
}

#[derive(Default)]
struct Slots {
    subject: Option<NamedOrBlankNode>,
    subject_shape: SubjectShape,
    predicate: Option<NamedNode>,
    object: Option<Term>,
    object_emitted: bool,
    reifier: Option<NamedOrBlankNode>,
}

impl Slots {
    fn with_subject(subject: impl Into<NamedOrBlankNode>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.subject.is_none() && self.predicate.is_none() && self.object.is_none()
    }

    fn triple(&self) -> Option<Triple> {
        Some(Triple::new(
            self.subject.clone()?,
            self.predicate.clone()?,
            self.object.clone()?,
        ))
    }

    fn clear_object(&mut self) {
        self.object = None;
        self.object_emitted = false;
        self.reifier = None;
    }
}

#[derive(Eq, PartialEq, Clone, Copy)]
enum Compound {
    PropertyList,
    Collection,
    ReifiedTriple,
    TripleTerm,
}

enum NextSlot {
    Subject,
    Predicate,
    Object,
    Item,
    Full,
}

impl<I: Iterator<Item = Result<TokenWithPosition, TriGParseError>>> Assembler<I> {
    pub fn new(input: I, namespaces: Namespaces, base_iri: Option<String>) -> Self {
        Self {
            input,
            namespaces,
            base_iri,
            blank_nodes: BlankNodeScope::new(),
            current: Frame {
                kind: FrameKind::Document,
                slots: Slots::default(),
            },
            parents: Vec::new(),
            graph: None,
            mode: Mode::Normal,
            output: VecDeque::new(),
            error: None,
            last_position: TextPosition::default(),
            is_ending: false,
        }
    }

    /// The prefixes declared so far, including the initial ones.
    #[inline]
    pub fn prefixes(&self) -> &Namespaces {
        &self.namespaces
    }

    /// The last base IRI declared, or the initial one.
    #[inline]
    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_deref()
    }

    fn process(&mut self, token: TokenWithPosition) -> AssemblerResult<()> {
        let TokenWithPosition { token, location } = token;
        match take(&mut self.mode) {
            Mode::Normal => self.process_normal(token, &location),
            Mode::PrefixExpectName { sparql } => {
                let Token::PNameNs { prefix } = token else {
                    return Err(structural(
                        &location,
                        format!("Expecting a prefix name like 'ex:' after the prefix keyword, found {token}"),
                    ));
                };
                self.mode = Mode::PrefixExpectIri { sparql, prefix };
                Ok(())
            }
            Mode::PrefixExpectIri { sparql, prefix } => {
                let Token::Iri(iri) = token else {
                    return Err(structural(
                        &location,
                        format!("Expecting an IRI after the prefix {prefix}:, found {token}"),
                    ));
                };
                trace!(%prefix, %iri, "prefix declared");
                self.namespaces.bind(prefix, iri);
                self.mode = if sparql {
                    Mode::Normal
                } else {
                    Mode::DirectiveExpectDot
                };
                Ok(())
            }
            Mode::BaseExpectIri { sparql } => {
                let Token::Iri(iri) = token else {
                    return Err(structural(
                        &location,
                        format!("Expecting an IRI after the base keyword, found {token}"),
                    ));
                };
                trace!(%iri, "base IRI declared");
                self.base_iri = Some(iri);
                self.mode = if sparql {
                    Mode::Normal
                } else {
                    Mode::DirectiveExpectDot
                };
                Ok(())
            }
            Mode::DirectiveExpectDot => {
                if token == Token::Dot {
                    Ok(())
                } else {
                    Err(structural(
                        &location,
                        format!("Expecting '.' at the end of the directive, found {token}"),
                    ))
                }
            }
            Mode::GraphExpectLabel => {
                let label = match token {
                    Token::Iri(_) | Token::PNameNs { .. } | Token::PNameLn { .. } => {
                        self.named_node(token, &location)?.into()
                    }
                    Token::BlankNodeLabel(label) => self.blank_nodes.labelled(&label).into(),
                    Token::BlankNodeAnonymous => self.blank_nodes.fresh().into(),
                    token => {
                        return Err(structural(
                            &location,
                            format!("Expecting an IRI or a blank node after GRAPH, found {token}"),
                        ));
                    }
                };
                self.mode = Mode::GraphExpectOpening { label };
                Ok(())
            }
            Mode::GraphExpectOpening { label } => {
                if token != Token::GraphOpening {
                    return Err(structural(
                        &location,
                        format!("Expecting '{{' after the graph name {label}, found {token}"),
                    ));
                }
                self.open_graph(Some(label));
                Ok(())
            }
            Mode::ReifierExpectId => {
                let reifier = match token {
                    Token::Iri(_) | Token::PNameNs { .. } | Token::PNameLn { .. } => {
                        self.named_node(token, &location)?.into()
                    }
                    Token::BlankNodeLabel(label) => self.blank_nodes.labelled(&label).into(),
                    Token::BlankNodeAnonymous => self.blank_nodes.fresh().into(),
                    token => {
                        let reifier = self.blank_nodes.fresh().into();
                        self.apply_reifier(reifier, &location)?;
                        return self.process_normal(token, &location);
                    }
                };
                self.apply_reifier(reifier, &location)
            }
            Mode::LiteralSuffix {
                value,
                location: literal_location,
            } => match token {
                Token::LangTag {
                    language,
                    direction,
                } => {
                    let literal = match direction {
                        Some(direction) => Literal::new_directional_language_tagged_literal(
                            value, language, direction,
                        ),
                        None => Literal::new_language_tagged_literal(value, language),
                    };
                    self.place(literal.into(), SubjectShape::Simple, &literal_location)
                }
                Token::DatatypeMarker => {
                    self.mode = Mode::LiteralDatatype { value };
                    Ok(())
                }
                token => {
                    self.place(
                        Literal::new_simple_literal(value).into(),
                        SubjectShape::Simple,
                        &literal_location,
                    )?;
                    self.process_normal(token, &location)
                }
            },
            Mode::LiteralDatatype { value } => match token {
                Token::Iri(_) | Token::PNameNs { .. } | Token::PNameLn { .. } => {
                    let datatype = self.named_node(token, &location)?;
                    self.place(
                        Literal::new_typed_literal(value, datatype).into(),
                        SubjectShape::Simple,
                        &location,
                    )
                }
                token => Err(structural(
                    &location,
                    format!("Expecting a datatype IRI after '^^', found {token}"),
                )),
            },
        }
    }

    fn process_normal(
        &mut self,
        token: Token,
        location: &Range<TextPosition>,
    ) -> AssemblerResult<()> {
        match token {
            Token::Iri(_) | Token::PNameNs { .. } | Token::PNameLn { .. } => {
                let node = self.named_node(token, location)?;
                self.place(node.into(), SubjectShape::Simple, location)
            }
            Token::BlankNodeLabel(label) => {
                let node = self.blank_nodes.labelled(&label);
                self.place(node.into(), SubjectShape::Simple, location)
            }
            Token::BlankNodeAnonymous => {
                let node = self.blank_nodes.fresh();
                self.place(node.into(), SubjectShape::Simple, location)
            }
            Token::String(value) => {
                self.mode = Mode::LiteralSuffix {
                    value,
                    location: location.clone(),
                };
                Ok(())
            }
            Token::Number { lexical, kind } => {
                let datatype = match kind {
                    NumberKind::Integer => xsd::INTEGER,
                    NumberKind::Decimal => xsd::DECIMAL,
                    NumberKind::Double => xsd::DOUBLE,
                };
                self.place(
                    Literal::new_typed_literal(lexical, datatype).into(),
                    SubjectShape::Simple,
                    location,
                )
            }
            Token::Boolean(value) => {
                self.place(Literal::from(value).into(), SubjectShape::Simple, location)
            }
            Token::A => {
                if matches!(self.next_slot(), NextSlot::Predicate) {
                    self.current.slots.predicate = Some(rdf::TYPE.into());
                    Ok(())
                } else {
                    Err(self.unexpected(&Token::A, location))
                }
            }
            Token::PrefixDirective | Token::SparqlPrefix => {
                self.check_directive(&token, location)?;
                self.mode = Mode::PrefixExpectName {
                    sparql: token == Token::SparqlPrefix,
                };
                Ok(())
            }
            Token::BaseDirective | Token::SparqlBase => {
                self.check_directive(&token, location)?;
                self.mode = Mode::BaseExpectIri {
                    sparql: token == Token::SparqlBase,
                };
                Ok(())
            }
            Token::Graph => {
                if !matches!(self.current.kind, FrameKind::Document)
                    || !self.current.slots.is_empty()
                {
                    return Err(self.unexpected(&token, location));
                }
                self.mode = Mode::GraphExpectLabel;
                Ok(())
            }
            Token::GraphOpening => self.process_graph_opening(location),
            Token::GraphClosing => {
                if !matches!(self.current.kind, FrameKind::GraphBlock) {
                    return Err(self.unexpected(&token, location));
                }
                self.finish_statement(&token, location, true)?;
                self.close_frame(location)?;
                self.graph = None;
                Ok(())
            }
            Token::Dot => {
                if !matches!(self.current.kind, FrameKind::Document | FrameKind::GraphBlock) {
                    return Err(self.unexpected(&token, location));
                }
                self.finish_statement(&token, location, false)?;
                self.current.slots = Slots::default();
                Ok(())
            }
            Token::SemiColumn => {
                if !self.current.kind.allows_separators() {
                    return Err(self.unexpected(&token, location));
                }
                let slots = &self.current.slots;
                if slots.object.is_some() {
                    self.emit_pending_object();
                } else if slots.subject.is_none()
                    || slots.predicate.is_some()
                    || slots.subject_shape != SubjectShape::Standalone
                {
                    return Err(self.unexpected(&token, location));
                }
                let slots = &mut self.current.slots;
                slots.predicate = None;
                slots.clear_object();
                slots.subject_shape = SubjectShape::Standalone;
                Ok(())
            }
            Token::Coma => {
                if !self.current.kind.allows_separators() || self.current.slots.object.is_none() {
                    return Err(self.unexpected(&token, location));
                }
                self.emit_pending_object();
                self.current.slots.clear_object();
                Ok(())
            }
            Token::BlankNodeOpening => {
                self.check_compound(Compound::PropertyList, &token, location)?;
                let node = self.blank_nodes.fresh();
                self.open_frame(
                    FrameKind::PropertyList { node: node.clone() },
                    Slots::with_subject(node),
                );
                Ok(())
            }
            Token::BlankNodeClosing => {
                if !matches!(self.current.kind, FrameKind::PropertyList { .. }) {
                    return Err(self.unexpected(&token, location));
                }
                self.finish_statement(&token, location, false)?;
                let FrameKind::PropertyList { node } = self.close_frame(location)?.kind else {
                    return Err(self.unexpected(&token, location));
                };
                self.place(node.into(), SubjectShape::Standalone, location)
            }
            Token::CollectionOpening => {
                self.check_compound(Compound::Collection, &token, location)?;
                self.open_frame(
                    FrameKind::Collection {
                        head: None,
                        last: None,
                    },
                    Slots::default(),
                );
                Ok(())
            }
            Token::EmptyCollection => {
                self.check_compound(Compound::Collection, &token, location)?;
                self.place(rdf::NIL.into(), SubjectShape::Compound, location)
            }
            Token::CollectionClosing => {
                let (head, last) = match &mut self.current.kind {
                    FrameKind::Collection { head, last } => (head.take(), last.take()),
                    _ => return Err(self.unexpected(&token, location)),
                };
                if let Some(last) = last {
                    self.emit(last, rdf::REST, rdf::NIL);
                }
                self.close_frame(location)?;
                let list = head.map_or_else(|| rdf::NIL.into(), Term::from);
                self.place(list, SubjectShape::Compound, location)
            }
            Token::ReifiedTripleOpening => {
                self.check_compound(Compound::ReifiedTriple, &token, location)?;
                self.open_frame(
                    FrameKind::ReifiedTriple { reifier: None },
                    Slots::default(),
                );
                Ok(())
            }
            Token::ReifiedTripleClosing => {
                if !matches!(self.current.kind, FrameKind::ReifiedTriple { .. }) {
                    return Err(self.unexpected(&token, location));
                }
                let Some(triple) = self.current.slots.triple() else {
                    return Err(structural(
                        location,
                        "A reified triple must contain a subject, a predicate and an object",
                    ));
                };
                let FrameKind::ReifiedTriple { reifier } = self.close_frame(location)?.kind else {
                    return Err(self.unexpected(&token, location));
                };
                let reifier = reifier.unwrap_or_else(|| self.blank_nodes.fresh().into());
                self.emit(reifier.clone(), rdf::REIFIES, triple);
                self.place(reifier.into(), SubjectShape::Standalone, location)
            }
            Token::TripleTermOpening => {
                self.check_compound(Compound::TripleTerm, &token, location)?;
                self.open_frame(FrameKind::TripleTerm, Slots::default());
                Ok(())
            }
            Token::TripleTermClosing => {
                if !matches!(self.current.kind, FrameKind::TripleTerm) {
                    return Err(self.unexpected(&token, location));
                }
                let Some(triple) = self.current.slots.triple() else {
                    return Err(structural(
                        location,
                        "A triple term must contain a subject, a predicate and an object",
                    ));
                };
                self.close_frame(location)?;
                self.place(triple.into(), SubjectShape::Simple, location)
            }
            Token::Reifier => {
                if !(self.current.kind.allows_separators()
                    || matches!(self.current.kind, FrameKind::ReifiedTriple { .. }))
                    || self.current.slots.object.is_none()
                {
                    return Err(self.unexpected(&token, location));
                }
                if !matches!(self.current.kind, FrameKind::ReifiedTriple { .. }) {
                    self.emit_pending_object();
                }
                self.mode = Mode::ReifierExpectId;
                Ok(())
            }
            Token::AnnotationOpening => {
                if !self.current.kind.allows_separators() {
                    return Err(self.unexpected(&token, location));
                }
                self.emit_pending_object();
                let reifier = match self.current.slots.reifier.take() {
                    Some(reifier) => reifier,
                    None => {
                        let reifier = NamedOrBlankNode::from(self.blank_nodes.fresh());
                        self.reify_current_triple(reifier.clone(), location)?;
                        reifier
                    }
                };
                self.open_frame(FrameKind::Annotation, Slots::with_subject(reifier));
                Ok(())
            }
            Token::AnnotationClosing => {
                if !matches!(self.current.kind, FrameKind::Annotation) {
                    return Err(self.unexpected(&token, location));
                }
                self.finish_statement(&token, location, false)?;
                self.close_frame(location)?;
                Ok(())
            }
            Token::LangTag { .. } | Token::DatatypeMarker => Err(self.unexpected(&token, location)),
        }
    }

    fn process_graph_opening(&mut self, location: &Range<TextPosition>) -> AssemblerResult<()> {
        if !matches!(self.current.kind, FrameKind::Document) {
            return Err(structural(
                location,
                format!(
                    "Unexpected '{{' {}, graph blocks can not be nested",
                    self.current.kind.description()
                ),
            ));
        }
        let slots = &mut self.current.slots;
        if slots.is_empty() {
            self.open_graph(None);
            return Ok(());
        }
        if slots.predicate.is_none() && slots.subject_shape == SubjectShape::Simple {
            if let Some(label) = slots.subject.take() {
                self.open_graph(Some(label));
                return Ok(());
            }
        }
        Err(self.unexpected(&Token::GraphOpening, location))
    }

    fn open_graph(&mut self, label: Option<NamedOrBlankNode>) {
        trace!(graph = ?label.as_ref().map(ToString::to_string), "graph block opened");
        self.graph = label;
        self.open_frame(FrameKind::GraphBlock, Slots::default());
    }

    fn open_frame(&mut self, kind: FrameKind, slots: Slots) {
        let parent = replace(&mut self.current, Frame { kind, slots });
        self.parents.push(parent);
    }

    fn close_frame(&mut self, location: &Range<TextPosition>) -> AssemblerResult<Frame> {
        let Some(parent) = self.parents.pop() else {
            return Err(structural(location, "Unexpected closing bracket at the top level"));
        };
        Ok(replace(&mut self.current, parent))
    }

    /// Checks that the slot trio can end with `closing`.
    fn finish_statement(
        &mut self,
        closing: &Token,
        location: &Range<TextPosition>,
        allow_empty: bool,
    ) -> AssemblerResult<()> {
        let slots = &self.current.slots;
        if slots.object.is_some() {
            self.emit_pending_object();
            Ok(())
        } else if (slots.subject.is_some()
            && slots.predicate.is_none()
            && slots.subject_shape == SubjectShape::Standalone)
            || (allow_empty && slots.is_empty())
        {
            Ok(())
        } else {
            Err(structural(
                location,
                format!(
                    "Unexpected '{closing}' {}, the statement is not complete",
                    self.current.kind.description()
                ),
            ))
        }
    }

    fn check_directive(
        &self,
        token: &Token,
        location: &Range<TextPosition>,
    ) -> AssemblerResult<()> {
        if matches!(self.current.kind, FrameKind::Document) && self.current.slots.is_empty() {
            Ok(())
        } else {
            Err(structural(
                location,
                format!("Unexpected '{token}', directives are only allowed between top level statements"),
            ))
        }
    }

    fn check_compound(
        &self,
        compound: Compound,
        token: &Token,
        location: &Range<TextPosition>,
    ) -> AssemblerResult<()> {
        let allowed = match (self.next_slot(), &self.current.kind) {
            (NextSlot::Item, _) => true,
            (NextSlot::Subject, FrameKind::Document | FrameKind::GraphBlock) => {
                compound != Compound::TripleTerm
            }
            (NextSlot::Subject, FrameKind::ReifiedTriple { .. }) => {
                compound == Compound::ReifiedTriple
            }
            (NextSlot::Object, FrameKind::ReifiedTriple { .. }) => {
                matches!(compound, Compound::ReifiedTriple | Compound::TripleTerm)
            }
            (NextSlot::Object, FrameKind::TripleTerm) => compound == Compound::TripleTerm,
            (NextSlot::Object, _) => true,
            _ => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(self.unexpected(token, location))
        }
    }

    fn next_slot(&self) -> NextSlot {
        if matches!(self.current.kind, FrameKind::Collection { .. }) {
            return NextSlot::Item;
        }
        let slots = &self.current.slots;
        if slots.subject.is_none() {
            NextSlot::Subject
        } else if slots.predicate.is_none() {
            NextSlot::Predicate
        } else if slots.object.is_none() {
            NextSlot::Object
        } else {
            NextSlot::Full
        }
    }

    /// Puts a term in the first empty slot of the current frame.
    fn place(
        &mut self,
        term: Term,
        shape: SubjectShape,
        location: &Range<TextPosition>,
    ) -> AssemblerResult<()> {
        if let FrameKind::Collection { head, last } = &mut self.current.kind {
            let cell = self.blank_nodes.fresh();
            match last.replace(cell.clone()) {
                Some(previous) => {
                    self.output.push_back(Statement::new(
                        previous,
                        rdf::REST,
                        cell.clone(),
                        self.graph.clone(),
                    ));
                }
                None => *head = Some(cell.clone()),
            }
            self.output.push_back(Statement::new(
                cell,
                rdf::FIRST,
                term,
                self.graph.clone(),
            ));
            return Ok(());
        }
        match self.next_slot() {
            NextSlot::Subject => {
                let subject = NamedOrBlankNode::try_from(term).map_err(|term| {
                    structural(location, format!("{term} is not allowed as a subject"))
                })?;
                let slots = &mut self.current.slots;
                slots.subject = Some(subject);
                slots.subject_shape = shape;
                Ok(())
            }
            NextSlot::Predicate => {
                let Term::NamedNode(predicate) = term else {
                    return Err(structural(
                        location,
                        format!("{term} is not allowed as a predicate, only IRIs are"),
                    ));
                };
                self.current.slots.predicate = Some(predicate);
                Ok(())
            }
            NextSlot::Object => {
                let slots = &mut self.current.slots;
                slots.object = Some(term);
                slots.object_emitted = false;
                Ok(())
            }
            NextSlot::Item | NextSlot::Full => Err(structural(
                location,
                format!(
                    "Unexpected {term} {}, expecting {}",
                    self.current.kind.description(),
                    if self.current.kind.allows_separators() {
                        "'.', ';' or ','"
                    } else {
                        self.current.kind.closing()
                    }
                ),
            )),
        }
    }

    fn apply_reifier(
        &mut self,
        reifier: NamedOrBlankNode,
        location: &Range<TextPosition>,
    ) -> AssemblerResult<()> {
        if let FrameKind::ReifiedTriple {
            reifier: frame_reifier,
        } = &mut self.current.kind
        {
            if frame_reifier.is_some() {
                return Err(structural(
                    location,
                    "A reified triple can only have a single reifier",
                ));
            }
            *frame_reifier = Some(reifier);
            return Ok(());
        }
        self.reify_current_triple(reifier.clone(), location)?;
        self.current.slots.reifier = Some(reifier);
        Ok(())
    }

    fn reify_current_triple(
        &mut self,
        reifier: NamedOrBlankNode,
        location: &Range<TextPosition>,
    ) -> AssemblerResult<()> {
        let Some(triple) = self.current.slots.triple() else {
            return Err(structural(
                location,
                "Annotations and reifiers must follow a complete triple",
            ));
        };
        self.emit(reifier, rdf::REIFIES, triple);
        Ok(())
    }

    fn emit_pending_object(&mut self) {
        let slots = &mut self.current.slots;
        if slots.object_emitted {
            return;
        }
        if let (Some(subject), Some(predicate), Some(object)) =
            (&slots.subject, &slots.predicate, &slots.object)
        {
            self.output.push_back(Statement::new(
                subject.clone(),
                predicate.clone(),
                object.clone(),
                self.graph.clone(),
            ));
            slots.object_emitted = true;
        }
    }

    fn emit(
        &mut self,
        subject: impl Into<NamedOrBlankNode>,
        predicate: impl Into<NamedNode>,
        object: impl Into<Term>,
    ) {
        self.output.push_back(Statement::new(
            subject,
            predicate,
            object,
            self.graph.clone(),
        ));
    }

    fn named_node(
        &self,
        token: Token,
        location: &Range<TextPosition>,
    ) -> AssemblerResult<NamedNode> {
        let name = match token {
            Token::Iri(iri) => return Ok(NamedNode::new_unchecked(iri)),
            Token::PNameNs { prefix } => PrefixedName::new(prefix, ""),
            Token::PNameLn { prefix, local } => PrefixedName::new(prefix, local),
            token => return Err(self.unexpected(&token, location)),
        };
        name.resolve(&self.namespaces).map_err(|e| {
            TriGSyntaxError::new(SyntaxErrorKind::UnresolvedPrefix, location.clone(), e.to_string())
                .into()
        })
    }

    fn unexpected(&self, token: &Token, location: &Range<TextPosition>) -> TriGParseError {
        structural(
            location,
            format!("Unexpected '{token}' {}", self.current.kind.description()),
        )
    }

    /// Checks that nothing is left open at the end of the input.
    fn finish(&mut self) -> AssemblerResult<()> {
        let location = self.last_position..self.last_position;
        if !matches!(self.mode, Mode::Normal) {
            return Err(structural(
                &location,
                "Premature end of file, a directive, a literal, a graph name or a reifier is not complete",
            ));
        }
        if !self.parents.is_empty() {
            return Err(structural(
                &location,
                format!(
                    "Premature end of file {}, {} is missing",
                    self.current.kind.description(),
                    self.current.kind.closing()
                ),
            ));
        }
        if !self.current.slots.is_empty() {
            return Err(structural(
                &location,
                "Premature end of file, the last statement must end with '.'",
            ));
        }
        Ok(())
    }
}

impl<I: Iterator<Item = Result<TokenWithPosition, TriGParseError>>> Iterator for Assembler<I> {
    type Item = Result<Statement, TriGParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(statement) = self.output.pop_front() {
                return Some(Ok(statement));
            }
            if let Some(error) = self.error.take() {
                return Some(Err(error));
            }
            if self.is_ending {
                return None;
            }
            let result = match self.input.next() {
                Some(Ok(token)) => {
                    self.last_position = token.location.end;
                    self.process(token)
                }
                Some(Err(e)) => Err(e),
                None => {
                    self.is_ending = true;
                    self.finish()
                }
            };
            if let Err(e) = result {
                self.is_ending = true;
                self.error = Some(e);
            }
        }
    }
}

fn structural(location: &Range<TextPosition>, message: impl Into<String>) -> TriGParseError {
    TriGSyntaxError::structural(location.clone(), message).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::RuneDecoder;
    use crate::tokenizer::Tokenizer;

    const EX: &str = "@prefix ex: <http://ex.org/> .\n";

    fn parse(text: &str) -> Result<Vec<Statement>, TriGParseError> {
        Assembler::new(
            Tokenizer::new(RuneDecoder::new(text.as_bytes(), 7)),
            Namespaces::default(),
            None,
        )
        .collect()
    }

    fn parse_ex(text: &str) -> Vec<Statement> {
        parse(&format!("{EX}{text}")).unwrap()
    }

    fn structural_error(text: &str) -> String {
        match parse(&format!("{EX}{text}")) {
            Err(TriGParseError::Syntax(e)) => {
                assert_eq!(e.kind(), SyntaxErrorKind::Structural, "{text}: {e}");
                e.message().to_owned()
            }
            other => panic!("{text} should be a structural error, got {other:?}"),
        }
    }

    fn ex(local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://ex.org/{local}"))
    }

    fn subject_blank(statement: &Statement) -> BlankNode {
        match &statement.subject {
            NamedOrBlankNode::BlankNode(node) => node.clone(),
            NamedOrBlankNode::NamedNode(node) => panic!("{node} is not a blank node"),
        }
    }

    #[test]
    fn simple_statement() {
        assert_eq!(
            parse_ex("ex:s ex:p \"v\" ."),
            [Statement::new(
                ex("s"),
                ex("p"),
                Literal::new_simple_literal("v"),
                None
            )]
        );
    }

    #[test]
    fn separators() {
        let statements = parse_ex("ex:s ex:p ex:o1 , ex:o2 ; ex:q ex:o3 ; a ex:C ; .");
        assert_eq!(
            statements,
            [
                Statement::new(ex("s"), ex("p"), ex("o1"), None),
                Statement::new(ex("s"), ex("p"), ex("o2"), None),
                Statement::new(ex("s"), ex("q"), ex("o3"), None),
                Statement::new(ex("s"), rdf::TYPE, ex("C"), None),
            ]
        );
    }

    #[test]
    fn literals() {
        let statements = parse_ex(
            "ex:s ex:p \"a\"@en , \"b\"@ar--rtl , \"c\"^^ex:dt , \"d\"^^<http://ex.org/dt2> , 1 , 1.5 , 1e1 , true , \"e\" .",
        );
        let objects = statements
            .into_iter()
            .map(|s| s.object)
            .collect::<Vec<_>>();
        let expected: Vec<Term> = vec![
            Literal::new_language_tagged_literal("a", "en").into(),
            Literal::new_directional_language_tagged_literal("b", "ar", "rtl").into(),
            Literal::new_typed_literal("c", ex("dt")).into(),
            Literal::new_typed_literal("d", ex("dt2")).into(),
            Literal::new_typed_literal("1", xsd::INTEGER).into(),
            Literal::new_typed_literal("1.5", xsd::DECIMAL).into(),
            Literal::new_typed_literal("1e1", xsd::DOUBLE).into(),
            Literal::from(true).into(),
            Literal::new_simple_literal("e").into(),
        ];
        assert_eq!(objects, expected);
    }

    #[test]
    fn nested_blank_node_statements_come_first() {
        let statements = parse_ex("ex:s ex:p [ ex:q ex:r ] .");
        assert_eq!(statements.len(), 2);
        let node = subject_blank(&statements[0]);
        assert_eq!(
            statements[0],
            Statement::new(node.clone(), ex("q"), ex("r"), None)
        );
        assert_eq!(statements[1], Statement::new(ex("s"), ex("p"), node, None));
    }

    #[test]
    fn blank_node_property_list_as_subject() {
        let statements = parse_ex("[ ex:p ex:o ] ex:q ex:r . [ ex:a ex:b ; ] .");
        assert_eq!(statements.len(), 3);
        let first = subject_blank(&statements[0]);
        assert_eq!(statements[1].subject, first.into());
        assert_eq!(statements[1].predicate, ex("q"));
        assert_ne!(statements[2].subject, statements[0].subject);
    }

    #[test]
    fn labelled_and_anonymous_blank_nodes() {
        let statements = parse_ex("_:a ex:p [] . _:a ex:p [] .");
        assert_eq!(statements[0].subject, statements[1].subject);
        assert_ne!(statements[0].object, statements[1].object);
    }

    #[test]
    fn collections() {
        let statements = parse_ex("ex:s ex:p ( ex:a ex:b ) .");
        assert_eq!(statements.len(), 5);
        let first = subject_blank(&statements[0]);
        let second = subject_blank(&statements[2]);
        assert_eq!(
            statements,
            [
                Statement::new(first.clone(), rdf::FIRST, ex("a"), None),
                Statement::new(first.clone(), rdf::REST, second.clone(), None),
                Statement::new(second.clone(), rdf::FIRST, ex("b"), None),
                Statement::new(second, rdf::REST, rdf::NIL, None),
                Statement::new(ex("s"), ex("p"), first, None),
            ]
        );
    }

    #[test]
    fn collection_counts() {
        let statements = parse_ex("( 1 2 3 ( ) [ ex:p ex:o ] ( ex:x ) ) ex:p ex:o .");
        let firsts = statements
            .iter()
            .filter(|s| s.predicate == rdf::FIRST)
            .count();
        let rests = statements
            .iter()
            .filter(|s| s.predicate == rdf::REST)
            .count();
        let nils = statements
            .iter()
            .filter(|s| s.predicate == rdf::REST && s.object == rdf::NIL.into())
            .count();
        assert_eq!(firsts, 7);
        assert_eq!(rests, 7);
        assert_eq!(nils, 2);
        let fourth = statements
            .iter()
            .filter(|s| s.predicate == rdf::FIRST)
            .nth(3)
            .map(|s| s.object.clone());
        assert_eq!(fourth, Some(rdf::NIL.into()));
    }

    #[test]
    fn empty_collection() {
        assert_eq!(
            parse_ex("ex:s ex:p () ."),
            [Statement::new(ex("s"), ex("p"), rdf::NIL, None)]
        );
        assert_eq!(
            parse_ex("() ex:p ex:o ."),
            [Statement::new(rdf::NIL, ex("p"), ex("o"), None)]
        );
    }

    #[test]
    fn graphs() {
        let statements = parse_ex(
            "ex:g { ex:s ex:p ex:o } GRAPH ex:h { ex:s ex:p ex:o . } { ex:s ex:p ex:o } _:g { ex:s ex:p [ ex:q ex:r ] }",
        );
        let contexts = statements
            .iter()
            .map(|s| s.context.clone())
            .collect::<Vec<_>>();
        assert_eq!(contexts[0], Some(ex("g").into()));
        assert_eq!(contexts[1], Some(ex("h").into()));
        assert_eq!(contexts[2], None);
        assert!(matches!(contexts[3], Some(NamedOrBlankNode::BlankNode(_))));
        assert_eq!(contexts[3], contexts[4]);
        assert_eq!(statements.len(), 5);
    }

    #[test]
    fn directives() {
        let mut assembler = Assembler::new(
            Tokenizer::new(RuneDecoder::new(
                "PREFIX a: <http://a/> BASE <http://base/> @prefix b: <http://b/> . @base <http://base2/> . a:x b:y <rel> .".as_bytes(),
                4096,
            )),
            Namespaces::default(),
            Some("http://initial/".into()),
        );
        assert_eq!(assembler.base_iri(), Some("http://initial/"));
        let statement = assembler.next().unwrap().unwrap();
        assert_eq!(statement.subject, NamedNode::new_unchecked("http://a/x").into());
        assert_eq!(statement.predicate, NamedNode::new_unchecked("http://b/y"));
        assert_eq!(statement.object, NamedNode::new_unchecked("rel").into());
        assert_eq!(assembler.base_iri(), Some("http://base2/"));
        assert_eq!(assembler.prefixes().len(), 2);
        assert!(assembler.next().is_none());
    }

    #[test]
    fn directives_are_forward_only() {
        let result = parse("ex:s ex:p ex:o . @prefix ex: <http://ex.org/> .");
        let Err(TriGParseError::Syntax(error)) = result else {
            panic!("the prefix must not apply backward")
        };
        assert_eq!(error.kind(), SyntaxErrorKind::UnresolvedPrefix);
        assert_eq!(error.location().start.column, 0);
    }

    #[test]
    fn reified_triples_and_annotations() {
        let statements = parse_ex("<< ex:s ex:p ex:o ~ex:r >> ex:q ex:v . ex:a ex:b ex:c ~ex:r2 {| ex:d ex:e |} .");
        let triple = |s: &str, p: &str, o: &str| Term::from(Triple::new(ex(s), ex(p), ex(o)));
        assert_eq!(
            statements,
            [
                Statement::new(ex("r"), rdf::REIFIES, triple("s", "p", "o"), None),
                Statement::new(ex("r"), ex("q"), ex("v"), None),
                Statement::new(ex("a"), ex("b"), ex("c"), None),
                Statement::new(ex("r2"), rdf::REIFIES, triple("a", "b", "c"), None),
                Statement::new(ex("r2"), ex("d"), ex("e"), None),
            ]
        );
    }

    #[test]
    fn anonymous_reifiers() {
        let statements = parse_ex("ex:a ex:b ex:c {| ex:d ex:e |} . ex:s ex:p << ex:x ex:y ex:z >> . << ex:x ex:y ex:z >> .");
        assert_eq!(statements.len(), 6);
        let annotation_reifier = subject_blank(&statements[1]);
        assert_eq!(statements[2].subject, annotation_reifier.into());
        let reifier = subject_blank(&statements[3]);
        assert_eq!(statements[4].object, reifier.into());
        assert_eq!(statements[5].predicate, rdf::REIFIES);
        assert!(statements[3].object.is_triple());
    }

    #[test]
    fn reifier_then_separator() {
        let statements = parse_ex("ex:a ex:b ex:c ~ , ex:d .");
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[1].predicate, rdf::REIFIES);
        assert_eq!(statements[2].object, ex("d").into());
    }

    #[test]
    fn triple_terms() {
        let statements = parse_ex("ex:r ex:p <<( ex:s ex:q <<( _:b ex:q \"v\" )>> )>> .");
        assert_eq!(statements.len(), 1);
        let Term::Triple(triple) = &statements[0].object else {
            panic!("expecting a triple term")
        };
        assert!(triple.object.is_triple());
        assert_eq!(
            structural_error("<<( ex:s ex:p ex:o )>> ex:q ex:r ."),
            "Unexpected '<<(' at the top level"
        );
        assert!(structural_error("ex:s ex:p <<( ex:s ex:p [ ex:q ex:r ] )>> .")
            .contains("inside a triple term"));
    }

    #[test]
    fn slot_errors() {
        assert!(structural_error("\"lit\" ex:p ex:o .").contains("not allowed as a subject"));
        assert!(structural_error("ex:s \"lit\" ex:o .").contains("not allowed as a predicate"));
        assert!(structural_error("ex:s [] ex:o .").contains("not allowed as a predicate"));
        assert!(structural_error("ex:s ex:p ex:o ex:o2 .").contains("expecting '.', ';' or ','"));
        assert!(structural_error("ex:s a a .").contains("Unexpected 'a'"));
        assert!(structural_error("ex:s [ ex:p ex:o ] ex:o .").contains("Unexpected '['"));
        assert!(structural_error("ex:s ex:p ex:o ]").contains("Unexpected ']'"));
        assert!(structural_error("ex:s ex:p .").contains("not complete"));
        assert!(structural_error("ex:s ex:p ex:o , .").contains("not complete"));
        assert!(structural_error("ex:s ex:p ex:o . .").contains("not complete"));
        assert!(structural_error("ex:g { ex:g2 { } }").contains("can not be nested"));
        assert!(structural_error("ex:g { @prefix a: <http://a/> . }").contains("directives"));
        assert!(structural_error("ex:s ex:p ex:o . @prefix a: <http://a/>").contains("Premature end"));
        assert!(structural_error("@prefix a <http://a/> .").contains("Expecting a prefix name"));
        assert!(structural_error("@prefix a: \"x\" .").contains("Expecting an IRI"));
    }

    #[test]
    fn premature_end() {
        assert!(structural_error("ex:s ex:p ex:o").contains("must end with '.'"));
        assert!(structural_error("ex:s ex:p [ ex:q ex:r").contains("']' is missing"));
        assert!(structural_error("ex:s ex:p ( ex:a").contains("')' is missing"));
        assert!(structural_error("ex:g { ex:s ex:p ex:o .").contains("'}' is missing"));
        assert!(structural_error("ex:s ex:p \"v\"^^").contains("Premature end"));
    }

    #[test]
    fn unresolved_prefix() {
        let Err(TriGParseError::Syntax(error)) = parse("foo:s foo:p foo:o .") else {
            panic!("foo: is not declared")
        };
        assert_eq!(error.kind(), SyntaxErrorKind::UnresolvedPrefix);
        assert_eq!(error.message(), "The prefix foo: has not been declared");
    }

    #[test]
    fn statements_before_an_error_are_kept() {
        let mut assembler = Assembler::new(
            Tokenizer::new(RuneDecoder::new(
                "<http://s> <http://p> <http://o> . <http://s> .".as_bytes(),
                4096,
            )),
            Namespaces::default(),
            None,
        );
        assert!(matches!(assembler.next(), Some(Ok(_))));
        assert!(matches!(assembler.next(), Some(Err(_))));
        assert!(assembler.next().is_none());
    }

    #[test]
    fn lexical_errors_are_forwarded() {
        let Err(error) = parse("<http://s> <http://p> \"unterminated") else {
            panic!("the string is not terminated")
        };
        assert_eq!(error.stage(), crate::Stage::Tokenizer);
    }
}

use crate::assembler::Assembler;
use crate::decoder::RuneDecoder;
use crate::error::{Stage, TriGParseError};
use crate::pipeline::{QueueSource, run_stage};
use crate::tokenizer::Tokenizer;
use crossbeam_channel::{Sender, bounded};
use oxiri::{Iri, IriParseError};
use rdfterm::{Namespaces, Statement};
use std::io::{self, Read};
use std::thread;

const DEFAULT_READ_BUFFER_SIZE: usize = 4096;
const DEFAULT_RUNE_QUEUE_CAPACITY: usize = 1024;
const DEFAULT_TOKEN_QUEUE_CAPACITY: usize = 256;
const DEFAULT_STATEMENT_QUEUE_CAPACITY: usize = 256;

/// A [TriG](https://www.w3.org/TR/rdf12-trig/) streaming parser, also accepting [Turtle](https://www.w3.org/TR/rdf12-turtle/).
///
/// Triple terms, reified triples and annotations of RDF 1.2 are always enabled.
///
/// Count the number of people:
/// ```
/// use rdfterm::vocab::rdf;
/// use rdfterm::NamedNode;
/// use trigpipe::TriGParser;
///
/// let file = br#"@base <http://example.com/> .
/// @prefix schema: <http://schema.org/> .
/// <foo> a schema:Person ;
///     schema:name "Foo" .
/// <g> { <bar> a schema:Person ;
///     schema:name "Bar" . }"#;
///
/// let schema_person = NamedNode::new("http://schema.org/Person")?;
/// let mut count = 0;
/// for statement in TriGParser::new().parse_read(file.as_slice())? {
///     let statement = statement?;
///     if statement.predicate == rdf::TYPE && statement.object == schema_person.clone().into() {
///         count += 1;
///     }
/// }
/// assert_eq!(2, count);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone)]
#[must_use]
pub struct TriGParser {
    base: Option<String>,
    prefixes: Namespaces,
    read_buffer_size: usize,
    rune_queue_capacity: usize,
    token_queue_capacity: usize,
    statement_queue_capacity: usize,
}

impl Default for TriGParser {
    fn default() -> Self {
        Self {
            base: None,
            prefixes: Namespaces::default(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            rune_queue_capacity: DEFAULT_RUNE_QUEUE_CAPACITY,
            token_queue_capacity: DEFAULT_TOKEN_QUEUE_CAPACITY,
            statement_queue_capacity: DEFAULT_STATEMENT_QUEUE_CAPACITY,
        }
    }
}

impl TriGParser {
    /// Builds a new [`TriGParser`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base IRI in use before the first `@base` directive.
    ///
    /// Relative IRIs are emitted as written, the base is only recorded.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.base = Some(Iri::parse(base_iri.into())?.into_inner());
        Ok(self)
    }

    /// Declares a prefix available from the start of the file, as if it was declared by a `@prefix` directive.
    ///
    /// ```
    /// use trigpipe::TriGParser;
    ///
    /// let parser = TriGParser::new().with_prefix("ex", "http://example.com/")?;
    /// let statements = parser
    ///     .parse_slice(b"ex:s ex:p ex:o .")
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(statements[0].subject.to_string(), "<http://example.com/s>");
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        self.prefixes
            .bind(prefix_name, Iri::parse(prefix_iri.into())?.into_inner());
        Ok(self)
    }

    /// Size of the chunks read from the byte source.
    #[inline]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Capacity of the queue between the rune decoder and the tokenizer.
    #[inline]
    pub fn with_rune_queue_capacity(mut self, capacity: usize) -> Self {
        self.rune_queue_capacity = capacity.max(1);
        self
    }

    /// Capacity of the queue between the tokenizer and the statement assembler.
    #[inline]
    pub fn with_token_queue_capacity(mut self, capacity: usize) -> Self {
        self.token_queue_capacity = capacity.max(1);
        self
    }

    /// Capacity of the queue of statements not read yet by the caller.
    #[inline]
    pub fn with_statement_queue_capacity(mut self, capacity: usize) -> Self {
        self.statement_queue_capacity = capacity.max(1);
        self
    }

    /// Parses a TriG file from a [`Read`] implementation.
    ///
    /// The three stages run on their own threads.
    /// A stage blocks when its output queue is full, so reading the statements slowly
    /// slows down the reading of `read`.
    ///
    /// Fails only if a thread can not be spawned.
    pub fn parse_read<R: Read + Send + 'static>(&self, read: R) -> io::Result<ReaderTriGParser> {
        let (cancel, cancelled) = bounded::<()>(0);
        let (rune_sender, rune_receiver) = bounded(self.rune_queue_capacity);
        let (token_sender, token_receiver) = bounded(self.token_queue_capacity);
        let (statement_sender, statement_receiver) = bounded(self.statement_queue_capacity);

        let read_buffer_size = self.read_buffer_size;
        let decoder_cancelled = cancelled.clone();
        thread::Builder::new()
            .name("trigpipe-decoder".into())
            .spawn(move || {
                run_stage(
                    Stage::Decoder,
                    RuneDecoder::new(read, read_buffer_size),
                    &rune_sender,
                    &decoder_cancelled,
                );
            })?;

        let tokenizer_cancelled = cancelled.clone();
        thread::Builder::new()
            .name("trigpipe-tokenizer".into())
            .spawn(move || {
                run_stage(
                    Stage::Tokenizer,
                    Tokenizer::new(QueueSource::new(rune_receiver, Stage::Decoder)),
                    &token_sender,
                    &tokenizer_cancelled,
                );
            })?;

        let prefixes = self.prefixes.clone();
        let base = self.base.clone();
        thread::Builder::new()
            .name("trigpipe-assembler".into())
            .spawn(move || {
                run_stage(
                    Stage::Assembler,
                    Assembler::new(
                        QueueSource::new(token_receiver, Stage::Tokenizer),
                        prefixes,
                        base,
                    ),
                    &statement_sender,
                    &cancelled,
                );
            })?;

        Ok(ReaderTriGParser {
            statements: QueueSource::new(statement_receiver, Stage::Assembler),
            cancel: Some(cancel),
        })
    }

    /// Parses a TriG file from a byte slice, in the calling thread.
    ///
    /// ```
    /// use trigpipe::TriGParser;
    ///
    /// let file = b"@prefix ex: <http://example.com/> .
    /// ex:s ex:p ( 1 2 ) .";
    ///
    /// let mut parser = TriGParser::new().parse_slice(file);
    /// assert_eq!(parser.by_ref().count(), 5);
    /// assert_eq!(parser.prefixes().get("ex"), Some("http://example.com/"));
    /// ```
    pub fn parse_slice<'a>(&self, slice: &'a [u8]) -> SliceTriGParser<'a> {
        SliceTriGParser {
            inner: Assembler::new(
                Tokenizer::new(RuneDecoder::new(slice, self.read_buffer_size)),
                self.prefixes.clone(),
                self.base.clone(),
            ),
        }
    }
}

/// Parses a TriG file from a [`Read`] implementation on background threads.
///
/// Can be built using [`TriGParser::parse_read`].
///
/// Dropping it cancels the run.
/// A stage blocked inside [`Read::read`] only notices it once the call returns.
#[must_use]
pub struct ReaderTriGParser {
    statements: QueueSource<Statement>,
    cancel: Option<Sender<()>>,
}

impl ReaderTriGParser {
    /// Asks all the stages to stop. The iterator yields nothing afterwards.
    pub fn cancel(&mut self) {
        self.cancel = None;
        self.statements.close();
    }
}

impl Iterator for ReaderTriGParser {
    type Item = Result<Statement, TriGParseError>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.statements.next()
    }
}

impl Drop for ReaderTriGParser {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Parses a TriG file from a byte slice.
///
/// Can be built using [`TriGParser::parse_slice`].
#[must_use]
pub struct SliceTriGParser<'a> {
    inner: Assembler<Tokenizer<RuneDecoder<&'a [u8]>>>,
}

impl SliceTriGParser<'_> {
    /// The prefixes declared so far, including the ones given to [`TriGParser::with_prefix`].
    ///
    /// ```
    /// use trigpipe::TriGParser;
    ///
    /// let file = b"@prefix schema: <http://schema.org/> .
    /// <http://example.com/foo> a schema:Person .";
    ///
    /// let mut parser = TriGParser::new().parse_slice(file);
    /// assert!(parser.prefixes().is_empty());
    /// parser.next().transpose()?;
    /// assert_eq!(parser.prefixes().get("schema"), Some("http://schema.org/"));
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn prefixes(&self) -> &Namespaces {
        self.inner.prefixes()
    }

    /// The base IRI in use, if any.
    #[inline]
    pub fn base_iri(&self) -> Option<&str> {
        self.inner.base_iri()
    }
}

impl Iterator for SliceTriGParser<'_> {
    type Item = Result<Statement, TriGParseError>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacities_are_at_least_one() {
        let parser = TriGParser::new()
            .with_read_buffer_size(0)
            .with_rune_queue_capacity(0)
            .with_token_queue_capacity(0)
            .with_statement_queue_capacity(0);
        assert_eq!(parser.read_buffer_size, 1);
        assert_eq!(parser.rune_queue_capacity, 1);
        assert_eq!(parser.token_queue_capacity, 1);
        assert_eq!(parser.statement_queue_capacity, 1);
        let statements = parser
            .parse_read(b"<http://s> <http://p> <http://o> .".as_slice())
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn invalid_iris_are_rejected() {
        assert!(TriGParser::new().with_base_iri("not an iri").is_err());
        assert!(TriGParser::new().with_prefix("ex", "foo bar").is_err());
        assert!(TriGParser::new().with_prefix("ex", "http://ex.org/").is_ok());
    }

    #[test]
    fn initial_state_is_visible() {
        let parser = TriGParser::new()
            .with_base_iri("http://base/")
            .unwrap()
            .with_prefix("ex", "http://ex.org/")
            .unwrap()
            .parse_slice(b"ex:s ex:p <o> .");
        assert_eq!(parser.base_iri(), Some("http://base/"));
        assert_eq!(parser.prefixes().len(), 1);
        assert_eq!(parser.count(), 1);
    }

    #[test]
    fn cancel_stops_the_iteration() {
        let mut parser = TriGParser::new()
            .parse_read(b"<http://s> <http://p> <http://o> .".as_slice())
            .unwrap();
        parser.cancel();
        assert!(parser.next().is_none());
    }
}

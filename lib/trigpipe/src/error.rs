use std::ops::Range;
use std::{fmt, io};

/// A position in a text i.e. a `line` number starting from 0, a `column` number starting from 0 (in number of code points) and a global file `offset` starting from 0 (in number of bytes).
#[derive(Eq, PartialEq, Debug, Copy, Clone, Default)]
pub struct TextPosition {
    pub line: u64,
    pub column: u64,
    pub offset: u64,
}

/// The pipeline stage that produced an error.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub enum Stage {
    /// Bytes to code points.
    Decoder,
    /// Code points to tokens.
    Tokenizer,
    /// Tokens to statements.
    Assembler,
}

impl fmt::Display for Stage {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decoder => "rune decoder",
            Self::Tokenizer => "tokenizer",
            Self::Assembler => "statement assembler",
        })
    }
}

/// A malformed or truncated UTF-8 byte sequence.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "Invalid UTF-8 byte sequence {bytes:02X?} at line {} column {} (byte {})",
    .position.line + 1,
    .position.column + 1,
    .position.offset
)]
pub struct EncodingError {
    position: TextPosition,
    bytes: Vec<u8>,
}

impl EncodingError {
    pub(crate) fn new(position: TextPosition, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            position,
            bytes: bytes.into(),
        }
    }

    /// The position of the first byte of the faulty sequence.
    #[inline]
    pub fn position(&self) -> TextPosition {
        self.position
    }

    /// The bytes that could not be decoded.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// The family of a [`TriGSyntaxError`].
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub enum SyntaxErrorKind {
    /// Some text does not match any terminal: bad escape, unterminated string, invalid name...
    Lexical,
    /// The tokens are not in an order allowed by the grammar.
    Structural,
    /// A prefixed name uses a prefix that has not been declared.
    UnresolvedPrefix,
}

/// An error in the syntax of the parsed file.
///
/// It is composed of a kind, a message and a range in the input.
#[derive(Debug, Clone, thiserror::Error)]
pub struct TriGSyntaxError {
    kind: SyntaxErrorKind,
    location: Range<TextPosition>,
    message: String,
}

impl TriGSyntaxError {
    pub(crate) fn new(
        kind: SyntaxErrorKind,
        location: Range<TextPosition>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }

    pub(crate) fn lexical(location: Range<TextPosition>, message: impl Into<String>) -> Self {
        Self::new(SyntaxErrorKind::Lexical, location, message)
    }

    pub(crate) fn structural(location: Range<TextPosition>, message: impl Into<String>) -> Self {
        Self::new(SyntaxErrorKind::Structural, location, message)
    }

    #[inline]
    pub fn kind(&self) -> SyntaxErrorKind {
        self.kind
    }

    /// The location of the error inside of the file.
    #[inline]
    pub fn location(&self) -> Range<TextPosition> {
        self.location.clone()
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TriGSyntaxError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.start.offset + 1 >= self.location.end.offset {
            write!(
                f,
                "Parser error at line {} column {}: {}",
                self.location.start.line + 1,
                self.location.start.column + 1,
                self.message
            )
        } else if self.location.start.line == self.location.end.line {
            write!(
                f,
                "Parser error at line {} between columns {} and {}: {}",
                self.location.start.line + 1,
                self.location.start.column + 1,
                self.location.end.column + 1,
                self.message
            )
        } else {
            write!(
                f,
                "Parser error between line {} column {} and line {} column {}: {}",
                self.location.start.line + 1,
                self.location.start.column + 1,
                self.location.end.line + 1,
                self.location.end.column + 1,
                self.message
            )
        }
    }
}

impl From<TriGSyntaxError> for io::Error {
    #[inline]
    fn from(error: TriGSyntaxError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}

/// A parsing error.
///
/// Every variant is terminal: once it is returned the run is over.
#[derive(Debug, thiserror::Error)]
pub enum TriGParseError {
    /// I/O error while reading the input.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The input is not valid UTF-8.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// An error in the file syntax.
    #[error(transparent)]
    Syntax(#[from] TriGSyntaxError),
    /// A stage stopped without reporting an end of input nor an error.
    #[error("The {0} stopped unexpectedly")]
    Interrupted(Stage),
}

impl TriGParseError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Io(_) | Self::Encoding(_) => Stage::Decoder,
            Self::Syntax(e) => match e.kind() {
                SyntaxErrorKind::Lexical => Stage::Tokenizer,
                SyntaxErrorKind::Structural | SyntaxErrorKind::UnresolvedPrefix => {
                    Stage::Assembler
                }
            },
            Self::Interrupted(stage) => *stage,
        }
    }
}

impl From<TriGParseError> for io::Error {
    #[inline]
    fn from(error: TriGParseError) -> Self {
        match error {
            TriGParseError::Io(e) => e,
            TriGParseError::Encoding(e) => Self::new(io::ErrorKind::InvalidData, e),
            TriGParseError::Syntax(e) => e.into(),
            TriGParseError::Interrupted(_) => Self::other(error),
        }
    }
}

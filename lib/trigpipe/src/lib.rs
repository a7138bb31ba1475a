#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod assembler;
mod chars;
mod decoder;
mod error;
mod parser;
mod pipeline;
mod token;
mod tokenizer;

pub use crate::error::{
    EncodingError, Stage, SyntaxErrorKind, TextPosition, TriGParseError, TriGSyntaxError,
};
pub use crate::parser::{ReaderTriGParser, SliceTriGParser, TriGParser};

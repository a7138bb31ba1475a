use clap::{Parser, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "trigpipe")]
/// Streams the statements of a Turtle or TriG file as N-Quads
pub struct Args {
    /// File to parse
    ///
    /// The standard input is read if it is not present or if it is `-`.
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
    /// Base IRI in use before the first base directive
    #[arg(long, value_hint = ValueHint::Url)]
    pub base: Option<String>,
    /// Prefix available from the start of the file, like `ex=http://example.com/`
    #[arg(long, value_parser = parse_prefix)]
    pub prefix: Vec<(String, String)>,
    /// Only prints the number of statements
    #[arg(long)]
    pub count: bool,
    /// Size of the chunks read from the input
    #[arg(long)]
    pub read_buffer: Option<usize>,
    /// Capacity of the queue between the rune decoder and the tokenizer
    #[arg(long)]
    pub rune_queue: Option<usize>,
    /// Capacity of the queue between the tokenizer and the statement assembler
    #[arg(long)]
    pub token_queue: Option<usize>,
    /// Capacity of the queue of statements waiting to be printed
    #[arg(long)]
    pub statement_queue: Option<usize>,
}

fn parse_prefix(value: &str) -> Result<(String, String), String> {
    let (name, iri) = value
        .split_once('=')
        .ok_or_else(|| format!("'{value}' is not of the form NAME=IRI"))?;
    Ok((name.to_owned(), iri.to_owned()))
}

use crate::cli::Args;
use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write, stdin, stdout};
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use trigpipe::TriGParser;

mod cli;

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut parser = TriGParser::new();
    if let Some(base) = &args.base {
        parser = parser
            .with_base_iri(base)
            .with_context(|| format!("The base IRI {base} is invalid"))?;
    }
    for (name, iri) in &args.prefix {
        parser = parser
            .with_prefix(name, iri)
            .with_context(|| format!("The IRI {iri} of the prefix {name}: is invalid"))?;
    }
    if let Some(size) = args.read_buffer {
        parser = parser.with_read_buffer_size(size);
    }
    if let Some(capacity) = args.rune_queue {
        parser = parser.with_rune_queue_capacity(capacity);
    }
    if let Some(capacity) = args.token_queue {
        parser = parser.with_token_queue_capacity(capacity);
    }
    if let Some(capacity) = args.statement_queue {
        parser = parser.with_statement_queue_capacity(capacity);
    }

    let (read, source): (Box<dyn Read + Send>, String) = match &args.file {
        Some(file) if file != Path::new("-") => (
            Box::new(
                File::open(file)
                    .with_context(|| format!("Failed to open {}", file.display()))?,
            ),
            file.display().to_string(),
        ),
        _ => (Box::new(stdin()), "the standard input".to_owned()),
    };

    let mut output = BufWriter::new(stdout().lock());
    let result = print_statements(&parser, read, &mut output, args.count);
    output.flush()?;
    let count = result.with_context(|| format!("Failed to parse {source}"))?;
    debug!(count, "parsing done");
    if args.count {
        writeln!(output, "{count}")?;
        output.flush()?;
    }
    Ok(())
}

fn print_statements(
    parser: &TriGParser,
    read: Box<dyn Read + Send>,
    output: &mut impl Write,
    count_only: bool,
) -> anyhow::Result<u64> {
    let mut count = 0;
    for statement in parser.parse_read(read)? {
        let statement = statement?;
        if !count_only {
            writeln!(output, "{statement}")?;
        }
        count += 1;
    }
    Ok(count)
}

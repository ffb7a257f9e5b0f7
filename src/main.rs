// src/main.rs
//
// htmlfmt: command-line wrapper around `htmlfmt::format`
//
// - Reads the input file (or stdin for "-"), formats it, and writes the result
//   back over the input, to an explicit output path, or to stdout.
// - --check only reports whether the file is already formatted.
//
// CLI flags:
//   --indent <N>  : spaces per nesting level (default 2)
//   --tabs        : indent with one tab per level
//   --width <N>   : soft column budget (default 80)
//   --check       : exit non-zero if formatting would change the input
//   --strict      : fail on input that needs the lexer's fallback paths
// Logging goes to stderr; RUST_LOG=debug shows wrap and mode decisions.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use htmlfmt::{format, FormatOptions};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Spaces per nesting level
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Indent with tabs instead of spaces
    #[arg(long, action = ArgAction::SetTrue)]
    tabs: bool,

    /// Soft line width
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Check formatting without writing anything
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,

    /// Fail on stray '<' and unparseable attribute text
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Input file ("-" for stdin)
    input: PathBuf,

    /// Output file (default: overwrite input, or stdout when reading stdin)
    output: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> FormatOptions {
        let indent = if self.tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent)
        };
        FormatOptions::new()
            .indent(indent)
            .width(self.width)
            .strict(self.strict)
    }

    fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let src = if cli.reads_stdin() {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(&cli.input)
            .with_context(|| format!("failed to read {}", cli.input.display()))?
    };

    let out = format(&src, &cli.options())
        .with_context(|| format!("failed to format {}", cli.input.display()))?;

    if cli.check {
        if out == src {
            return Ok(ExitCode::SUCCESS);
        }
        log::warn!("{} is not formatted", cli.input.display());
        return Ok(ExitCode::FAILURE);
    }

    match (&cli.output, cli.reads_stdin()) {
        (Some(path), _) => fs::write(path, out)
            .with_context(|| format!("failed to write {}", path.display()))?,
        (None, true) => io::stdout()
            .write_all(out.as_bytes())
            .context("failed to write stdout")?,
        (None, false) => fs::write(&cli.input, out)
            .with_context(|| format!("failed to write {}", cli.input.display()))?,
    }
    Ok(ExitCode::SUCCESS)
}

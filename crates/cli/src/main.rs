//! `urlt`: parse, check, highlight, and expand URL template files.

mod render;

use std::borrow::Cow;
use std::fs;
use std::io::{self, Read, Write};
use std::process;

use anyhow::{Context, Result};
use ariadne::{Color, Fmt};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};
use url_template_core::expand::PlaceholderKind;
use url_template_core::highlight::{Capture, highlight_line};
use url_template_core::{
    Bindings, Expansion, ParseOptions, Span, expand_line, parse_bytes, to_pretty_json,
};
use url_template_diagnostics::{self as diag, Diagnostic, Severity};

use crate::render::{Format, print_summary, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "urlt",
    version,
    about = "URL template toolchain: parse, check, highlight, and expand URL template lines"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Parser options JSON file (`double_brace_variables`, `extra_schemes`).
    #[arg(long, global = true)]
    options: Option<String>,

    /// Log parser activity to stderr (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse a template file and print its tree. Use `-` for stdin.
    Parse { file: String },

    /// Report diagnostics for a template file. Use `-` for stdin.
    Check {
        file: String,
        /// Exit 1 on warnings as well as errors.
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Print the highlight capture of every token. Use `-` for stdin.
    Highlight { file: String },

    /// Substitute variables and path parameters. Use `-` for stdin.
    Expand {
        file: String,
        /// Bindings JSON file with `variables` and `path_params` maps.
        #[arg(long)]
        bindings: Option<String>,
        /// Bind a variable (`NAME=VALUE`); overrides the bindings file.
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
        vars: Vec<(String, String)>,
        /// Bind a path parameter (`NAME=VALUE`); overrides the bindings file.
        #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_binding)]
        params: Vec<(String, String)>,
        /// Exit 1 if any placeholder is left unbound.
        #[arg(long)]
        strict: bool,
    },

    /// Explain a diagnostic ID (e.g. URLT1001).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match run(cli, format) {
        Ok(code) => process::exit(code),
        Err(err) => {
            match format {
                Format::Json => {
                    let out = serde_json::json!({
                        "success": false,
                        "error": "command_failed",
                        "message": format!("{err:#}"),
                    });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&out)
                            .expect("error envelope serialization cannot fail")
                    );
                }
                Format::Pretty => eprintln!("{} {err:#}", "error:".fg(Color::Red)),
            }
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Run the selected command and return the process exit code.
fn run(cli: Cli, format: Format) -> Result<i32> {
    let options = load_options(cli.options.as_deref())?;
    match cli.cmd {
        Cmd::Parse { file } => cmd_parse(&file, &options, format),
        Cmd::Check {
            file,
            deny_warnings,
        } => cmd_check(&file, &options, deny_warnings, format),
        Cmd::Highlight { file } => cmd_highlight(&file, &options, format),
        Cmd::Expand {
            file,
            bindings,
            vars,
            params,
            strict,
        } => {
            let bindings = load_bindings(bindings.as_deref(), vars, params)?;
            cmd_expand(&file, &options, &bindings, strict, format)
        }
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(file: &str, options: &ParseOptions, format: Format) -> Result<i32> {
    let input = read_input(file)?;
    let res = parse_bytes(&input, options);

    match format {
        Format::Json => {
            // Single valid JSON object to stdout.
            let out = serde_json::json!({
                "file": res.file,
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Tree to stdout, diagnostics to stderr.
            println!("{}", to_pretty_json(&res.file));
            render_diagnostics_pretty(&input, file, &res.diagnostics);
            print_summary(&res.diagnostics);
        }
    }

    Ok(exit_code(&res.diagnostics, false))
}

fn cmd_check(file: &str, options: &ParseOptions, deny_warnings: bool, format: Format) -> Result<i32> {
    let input = read_input(file)?;
    let res = parse_bytes(&input, options);
    let code = exit_code(&res.diagnostics, deny_warnings);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": code == 0,
                "lines": res.file.lines.len(),
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics_pretty(&input, file, &res.diagnostics);
            print_summary(&res.diagnostics);
            if res.diagnostics.is_empty() {
                eprintln!("check ok: {} line(s)", res.file.lines.len());
            }
        }
    }

    Ok(code)
}

/// One highlighted token in JSON output.
#[derive(Debug, Serialize)]
struct HighlightToken<'a> {
    /// 1-based line number.
    line: usize,
    span: Span,
    capture: Capture,
    text: Cow<'a, str>,
}

fn cmd_highlight(file: &str, options: &ParseOptions, format: Format) -> Result<i32> {
    let input = read_input(file)?;
    let res = parse_bytes(&input, options);

    match format {
        Format::Json => {
            let tokens: Vec<HighlightToken<'_>> = res
                .file
                .lines
                .iter()
                .enumerate()
                .flat_map(|(idx, line)| {
                    let input = &input;
                    highlight_line(line).into_iter().map(move |h| HighlightToken {
                        line: idx + 1,
                        span: h.span,
                        capture: h.capture,
                        text: String::from_utf8_lossy(&input[h.span.start..h.span.end]),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
        Format::Pretty => {
            let mut stdout = io::stdout().lock();
            for line in &res.file.lines {
                let mut pos = line.span.start;
                for h in highlight_line(line) {
                    stdout.write_all(&input[pos..h.span.start])?;
                    let text = String::from_utf8_lossy(&input[h.span.start..h.span.end]);
                    write!(stdout, "{}", text.fg(capture_color(h.capture)))?;
                    pos = h.span.end;
                }
                stdout.write_all(&input[pos..line.span.end])?;
            }
            stdout.flush()?;
            render_diagnostics_pretty(&input, file, &res.diagnostics);
        }
    }

    Ok(exit_code(&res.diagnostics, false))
}

fn capture_color(capture: Capture) -> Color {
    match capture {
        Capture::Keyword => Color::Magenta,
        Capture::Url | Capture::String => Color::Green,
        Capture::Number => Color::Cyan,
        Capture::Variable | Capture::Parameter | Capture::Bracket => Color::Yellow,
        Capture::Property => Color::Blue,
        Capture::Delimiter => Color::White,
        Capture::Error => Color::Red,
    }
}

/// One expanded line in JSON output.
#[derive(Debug, Serialize)]
struct ExpandedLine {
    /// 1-based line number.
    line: usize,
    #[serde(flatten)]
    expansion: Expansion,
}

fn cmd_expand(
    file: &str,
    options: &ParseOptions,
    bindings: &Bindings,
    strict: bool,
    format: Format,
) -> Result<i32> {
    let input = read_input(file)?;
    let res = parse_bytes(&input, options);
    let expanded: Vec<ExpandedLine> = res
        .file
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.components.is_some())
        .map(|(idx, line)| ExpandedLine {
            line: idx + 1,
            expansion: expand_line(line, bindings),
        })
        .collect();
    let unresolved = expanded
        .iter()
        .map(|e| e.expansion.unresolved.len())
        .sum::<usize>();
    tracing::debug!(lines = expanded.len(), unresolved, "expanded file");

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "lines": expanded,
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics_pretty(&input, file, &res.diagnostics);
            for e in &expanded {
                println!("{}", e.expansion.url);
                for u in &e.expansion.unresolved {
                    let kind = match u.kind {
                        PlaceholderKind::Variable => "variable",
                        PlaceholderKind::PathParam => "path parameter",
                    };
                    eprintln!(
                        "{} line {}: unbound {kind} `{}`",
                        "warning:".fg(Color::Yellow),
                        e.line,
                        u.name
                    );
                }
            }
        }
    }

    let mut code = exit_code(&res.diagnostics, false);
    if strict && unresolved > 0 {
        code = 1;
    }
    Ok(code)
}

fn cmd_explain(id: &str, format: Format) -> Result<i32> {
    let text = diag::explain(id);
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "severity": diag::default_severity(id),
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation is the expected output; write to stdout, not stderr.
            match text {
                Some(text) => println!("{}: {}", id.fg(Color::Cyan), text),
                None => println!("{id}: (no explanation available)"),
            }
        }
    }
    Ok(0)
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read a file, or stdin when the path is `-`.
fn read_input(file: &str) -> Result<Vec<u8>> {
    let bytes = if file == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read(file).with_context(|| format!("failed to read '{file}'"))?
    };
    tracing::debug!(file, bytes = bytes.len(), "read input");
    Ok(bytes)
}

fn load_options(path: Option<&str>) -> Result<ParseOptions> {
    let Some(path) = path else {
        return Ok(ParseOptions::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read options file '{path}'"))?;
    ParseOptions::from_json(&text).with_context(|| format!("invalid options file '{path}'"))
}

fn load_bindings(
    path: Option<&str>,
    vars: Vec<(String, String)>,
    params: Vec<(String, String)>,
) -> Result<Bindings> {
    let mut bindings = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read bindings file '{path}'"))?;
            Bindings::from_json(&text).with_context(|| format!("invalid bindings file '{path}'"))?
        }
        None => Bindings::default(),
    };
    for (name, value) in vars {
        bindings.set_variable(name, value);
    }
    for (name, value) in params {
        bindings.set_path_param(name, value);
    }
    bindings.validate().context("invalid --var/--param binding")?;
    Ok(bindings)
}

/// `NAME=VALUE`; the value may itself contain `=`.
fn parse_binding(s: &str) -> Result<(String, String), String> {
    let Some((name, value)) = s.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got `{s}`"));
    };
    Ok((name.to_string(), value.to_string()))
}

/// 1 if any diagnostic is an error (or any at all with `deny_warnings`).
fn exit_code(diagnostics: &[Diagnostic], deny_warnings: bool) -> i32 {
    let failed = diagnostics
        .iter()
        .any(|d| deny_warnings || matches!(d.severity, Severity::Error));
    i32::from(failed)
}

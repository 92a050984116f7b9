//! PDF Combine CLI tool
//!
//! Collect PDFs, put them in order and merge them into one file, either in one
//! shot or from an interactive session fed with drag-and-drop payloads.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use glob::glob;
use tracing_subscriber::EnvFilter;

use pdf_combine::pdf::verify_page_count;
use pdf_combine::{Error, FileEntry, ListChange, MergeOutcome, Notice, Notifier, PathStyle, Session};

/// PDF Combine - Merge PDFs in the order you choose
#[derive(Parser)]
#[command(name = "pdf-combine")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge PDFs in argument order
    pdf-combine merge -o combined.pdf cover.pdf body.pdf appendix.pdf

    # Merge numbered PDFs, expanding the pattern in sorted order
    pdf-combine merge -o handout.pdf \"[0-9]*.pdf\"

    # Paste drag-and-drop payloads and reorder interactively
    pdf-combine shell")]
struct Cli {
    /// Path rules used to normalize inputs
    #[arg(long, value_enum, default_value_t = StyleArg::Native, global = true)]
    path_style: StyleArg,

    /// More diagnostics (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDF files into one, in the given order
    Merge {
        /// Input PDF files or file:// URLs (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path (".pdf" is added when there is no extension)
        #[arg(short, long)]
        output: PathBuf,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Build the file list interactively, then merge it
    Shell,
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Native,
    Posix,
    Windows,
}

impl From<StyleArg> for PathStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Native => PathStyle::native(),
            StyleArg::Posix => PathStyle::Posix,
            StyleArg::Windows => PathStyle::Windows,
        }
    }
}

/// Prints notices to stderr
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notice: Notice) {
        eprintln!("{}", format_notice(&notice));
    }
}

/// `<Title>: <message>`
fn format_notice(notice: &Notice) -> String {
    format!("{}: {}", notice.title, notice.message)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let style = PathStyle::from(cli.path_style);
    let result = match cli.command {
        Commands::Merge { inputs, output, open } => cmd_merge(inputs, output, open, style),
        Commands::Shell => cmd_shell(style),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Rejected items already reach the user as notices, so `warn` needs `-v`
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Expand glob patterns in input items, keeping argument order
fn expand_globs(items: Vec<String>) -> Result<Vec<String>, Error> {
    let mut expanded = Vec::new();

    for item in items {
        // URLs, plain paths and files whose names look like patterns pass through
        let is_pattern = item.contains('*') || item.contains('?') || item.contains('[');
        if !is_pattern || item.starts_with("file://") || Path::new(&item).exists() {
            expanded.push(item);
            continue;
        }

        let entries = glob(&item).map_err(|e| Error::InvalidGlob(format!("{}: {}", item, e)))?;
        let mut matched: Vec<PathBuf> = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => matched.push(path),
                Err(e) => tracing::warn!(pattern = %item, error = %e, "glob error"),
            }
        }
        if matched.is_empty() {
            return Err(Error::NoFilesMatched(item));
        }

        // Sort matches for consistent ordering within one pattern
        matched.sort();
        expanded.extend(matched.iter().map(|p| p.to_string_lossy().into_owned()));
    }

    Ok(expanded)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Merge the given inputs in one shot
fn cmd_merge(
    inputs: Vec<String>,
    output: PathBuf,
    open: bool,
    style: PathStyle,
) -> anyhow::Result<ExitCode> {
    let items = expand_globs(inputs)?;

    let mut session = Session::new(style, TerminalNotifier);
    let added = session.add_items(items);

    eprintln!("Merging {} PDF files...", added.accepted.len());

    match session.merge(|| Some(output)) {
        MergeOutcome::Merged(report) => {
            let pages = verify_page_count(&report)?;
            eprintln!("{} pages written", pages);
            if open {
                open_file(&report.output_path)
                    .with_context(|| format!("Failed to open {}", report.output_path.display()))?;
            }
            Ok(ExitCode::SUCCESS)
        }
        // Already reported through the notifier
        MergeOutcome::NoFiles | MergeOutcome::Cancelled | MergeOutcome::Failed(_) => {
            Ok(ExitCode::FAILURE)
        }
    }
}

const SHELL_HELP: &str = "Commands:
    add <payload>   add files; items with spaces go in {braces}, file:// URLs allowed
    list            show the list
    select <n>      select entry n (1-based)
    up | down       move the selected entry
    remove          remove the selected entry
    merge [path]    merge the list (asks for a path when none is given)
    help            show this text
    quit            leave";

/// Interactive session over stdin
fn cmd_shell(style: PathStyle) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(style, TerminalNotifier);
    session.list_mut().subscribe(|change, entries| {
        let marked = match change {
            ListChange::Moved { to, .. } => Some(*to),
            _ => None,
        };
        print_entries(entries, marked);
    });

    eprintln!("{}", SHELL_HELP);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        prompt("> ")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => {}
            "add" => {
                session.drop_payload(rest);
            }
            "list" => print_entries(session.list().entries(), session.list().selected()),
            "select" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 && session.select(n - 1) => {
                    print_entries(session.list().entries(), session.list().selected())
                }
                _ => eprintln!("No entry {:?}", rest),
            },
            "up" => {
                session.move_up();
            }
            "down" => {
                session.move_down();
            }
            "remove" => {
                session.remove();
            }
            "merge" => {
                if rest.is_empty() {
                    session.merge(|| ask_output_path(&mut lines));
                } else {
                    session.merge(|| Some(PathBuf::from(rest)));
                }
            }
            "help" => eprintln!("{}", SHELL_HELP),
            "quit" | "exit" => break,
            other => eprintln!("Unknown command: {} (try \"help\")", other),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn prompt(text: &str) -> io::Result<()> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", text)?;
    stderr.flush()
}

/// An empty answer, or end of input, cancels
fn ask_output_path(lines: &mut impl Iterator<Item = io::Result<String>>) -> Option<PathBuf> {
    prompt("Save merged PDF as: ").ok()?;
    let answer = lines.next()?.ok()?;
    let answer = answer.trim();
    if answer.is_empty() {
        None
    } else {
        Some(PathBuf::from(answer))
    }
}

fn print_entries(entries: &[FileEntry], selected: Option<usize>) {
    if entries.is_empty() {
        println!("  (empty)");
        return;
    }
    for (i, entry) in entries.iter().enumerate() {
        let marker = if selected == Some(i) { '>' } else { ' ' };
        println!("{} {:>3}. {}", marker, i + 1, entry);
    }
}

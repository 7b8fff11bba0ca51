mod logging;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use codegen::{CompileError, CompileReport, Compiler, CompilerConfig};
use scenario::Scenario;
use scenario::parser::SourceFormat;
use scenario::registry::registry;

const SUBCOMMANDS: &[&str] = &["compile", "check", "templates", "test", "help"];

/// Options whose next argument is their value, not a positional.
const VALUE_OPTIONS: &[&str] = &["-o", "--output", "--config", "-c", "--category"];

#[derive(Parser)]
#[command(
    name = "scenc",
    version,
    about = "Compile given/when/then scenarios into Cypress test scripts"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log more (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a scenario file into a test script
    Compile(CompileArgs),

    /// Validate a scenario file without generating code
    Check(CheckArgs),

    /// List every placeholder template, grouped by family
    Templates,

    /// Run .test.md golden files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct CompileArgs {
    /// Scenario file (.toml or .md)
    file: String,

    /// Write the script here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compiler configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dump the when/then forests instead of compiling
    #[arg(long)]
    tree: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Scenario file (.toml or .md)
    file: String,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let cli = Cli::parse_from(with_implied_compile(std::env::args().collect()));
    logging::init(cli.verbose, cli.no_color);

    let reporter = Reporter::new(cli.no_color);
    let exit_code = match cli.command {
        Command::Compile(compile_args) => do_compile(compile_args, reporter),
        Command::Check(check_args) => do_check(check_args, reporter),
        Command::Templates => {
            print_templates();
            0
        }
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            test_runner::run_tests(path, cli.no_color, &test_args.category)
        }
    };
    process::exit(exit_code);
}

/// `scenc file.md` is shorthand for `scenc compile file.md`. The first
/// positional decides; option values (`-o out.js`) are skipped over. The
/// subcommand goes right after the program name so that compile's own
/// options parse wherever they were written.
fn with_implied_compile(mut args: Vec<String>) -> Vec<String> {
    let mut pos = 1;
    while pos < args.len() {
        let arg = args[pos].as_str();
        if VALUE_OPTIONS.contains(&arg) {
            pos += 2;
        } else if arg.starts_with('-') {
            pos += 1;
        } else {
            if !SUBCOMMANDS.contains(&arg) {
                args.insert(1, "compile".to_string());
            }
            break;
        }
    }
    args
}

/// Owns the codespan file database and the stderr writer for diagnostics.
struct Reporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl Reporter {
    fn new(no_color: bool) -> Self {
        let color_choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Reporter {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(color_choice),
            config: term::Config::default(),
        }
    }

    fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit_to_write_style(
            &mut self.writer.lock(),
            &self.config,
            &self.files,
            diagnostic,
        );
    }

    fn emit_warnings(&self, report: &CompileReport, file_id: usize) {
        for warning in &report.warnings {
            self.emit(&warning.to_diagnostic(registry(), file_id));
        }
    }

    fn emit_compile_error(&self, error: &CompileError, file_id: usize) {
        match error {
            CompileError::Syntax(syntax) => self.emit(&syntax.to_diagnostic(file_id)),
            other => eprintln!("error: {}", other),
        }
    }

    /// Read, parse and structurally check a scenario file. Errors are reported here.
    fn load(&mut self, file: &str) -> Option<(Scenario, usize)> {
        let path = Path::new(file);
        let Some(format) = SourceFormat::from_path(path) else {
            eprintln!("error: '{}' is not a .toml or .md scenario", file);
            return None;
        };

        tracing::debug!(file, ?format, "reading scenario");
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", file, e);
                return None;
            }
        };

        let file_id = self.files.add(file.to_string(), source.clone());
        let default_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let parser =
            scenario::parser::Parser::new(source, file_id, format).with_default_name(default_name);
        let input = match parser.parse() {
            Ok(input) => input,
            Err(errors) => {
                for error in &errors {
                    self.emit(&error.to_diagnostic());
                }
                return None;
            }
        };

        match Scenario::try_from(input) {
            Ok(scenario) => Some((scenario, file_id)),
            Err(e) => {
                eprintln!("error: {}: {}", file, e);
                None
            }
        }
    }
}

fn do_compile(args: CompileArgs, mut reporter: Reporter) -> i32 {
    let config = match &args.config {
        Some(path) => match CompilerConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                return 1;
            }
        },
        None => CompilerConfig::default(),
    };

    let Some((scenario, file_id)) = reporter.load(&args.file) else {
        return 1;
    };

    // --tree: dump the forests after validation
    if args.tree {
        if let Err(e) = scenario.validate(registry()) {
            reporter.emit(&e.to_diagnostic(file_id));
            return 1;
        }
        println!("{:#?}", scenario.build_tree());
        return 0;
    }

    let compiler = Compiler::new(config);
    let result = match &args.output {
        Some(path) => compiler.write_spec_file(&scenario, path),
        None => compiler.compile(&scenario),
    };

    match result {
        Ok(report) => {
            reporter.emit_warnings(&report, file_id);
            match &args.output {
                Some(path) => eprintln!("wrote {}", path.display()),
                None => print!("{}", report.script),
            }
            0
        }
        Err(error) => {
            reporter.emit_compile_error(&error, file_id);
            1
        }
    }
}

fn do_check(args: CheckArgs, mut reporter: Reporter) -> i32 {
    let Some((scenario, file_id)) = reporter.load(&args.file) else {
        return 1;
    };
    match scenario.validate(registry()) {
        Ok(()) => {
            eprintln!("ok: {} is valid", args.file);
            0
        }
        Err(e) => {
            reporter.emit(&e.to_diagnostic(file_id));
            1
        }
    }
}

fn print_templates() {
    for family in registry().families() {
        println!("{}", family.tag());
        for pattern in family.patterns() {
            println!("  {}", pattern.template());
        }
    }
}

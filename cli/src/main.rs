mod manifest;
mod test_runner;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::manifest::Manifest;

const SUBCOMMANDS: &[&str] = &["generate", "test", "help"];

#[derive(Parser)]
#[command(name = "ego", version, about = "Template to Go source compiler")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate Go source from a package manifest
    Generate(GenerateArgs),

    /// Run .test.toml fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// TOML package manifest
    manifest: String,

    /// Write the generated source here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Emit //line markers mapping generated code to template lines
    #[arg(long)]
    line_markers: bool,

    /// Keep adjacent text blocks separate
    #[arg(long)]
    no_normalize: bool,

    /// Generate without writing anything (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the package model
    #[arg(long)]
    dump: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ego=warn,generator=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // `ego pkg.toml` works like `ego generate pkg.toml`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().skip(1).position(|a| !a.starts_with('-')) {
        if !SUBCOMMANDS.contains(&args[pos + 1].as_str()) {
            args.insert(pos + 1, "generate".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Generate(generate_args) => do_generate(generate_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn do_generate(args: GenerateArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let source = match std::fs::read_to_string(&args.manifest) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.manifest, e);
            process::exit(1);
        }
    };

    let mut manifest = match Manifest::from_toml(&source) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {}: {}", args.manifest, e);
            process::exit(1);
        }
    };
    if args.no_normalize {
        manifest.options.normalize = false;
    }

    let package = match manifest.to_package() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    if args.dump {
        println!("{:#?}", package);
        return;
    }

    let mut options = manifest.render_options();
    if args.line_markers {
        options = options.with_line_markers(true);
    }

    // Render fully before touching the destination.
    let mut output = Vec::new();
    if let Err(error) = generator::write_package(&package, &mut output, &options) {
        emit_error(&error, color_choice);
        process::exit(1);
    }

    if args.check {
        eprintln!("ok: {} generated successfully", args.manifest);
        return;
    }

    let written = match &args.output {
        Some(path) => std::fs::write(path, &output).map(|()| {
            info!(path = %path, bytes = output.len(), "wrote generated source");
        }),
        None => io::stdout().lock().write_all(&output),
    };
    if let Err(e) = written {
        eprintln!("error: cannot write output: {}", e);
        process::exit(1);
    }
}

fn emit_error(error: &generator::Error, color_choice: ColorChoice) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let mut files = SimpleFiles::new();
    if let Some(text) = error.header_text() {
        // Header parse diagnostics point into the merged header (file id 0).
        files.add("<merged header>".to_string(), text.to_string());
    }
    let diagnostic = error.to_diagnostic();
    if term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic).is_err() {
        eprintln!("error: {}", error);
    }
}

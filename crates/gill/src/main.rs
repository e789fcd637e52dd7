use clap::builder::styling::{AnsiColor, Styles};
use clap::{ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::{Path, PathBuf};

use gill::commands;
use gill::commands::fmt::FmtArgs;
use gill::commands::lint::LintArgs;
use gill::config::GillConfig;
use gill::output::{ColorMode, OutputFormat};
use gill::serve::{self, ServeArgs};

#[derive(Parser)]
#[command(name = "gill")]
#[command(about = "Lint and format fish shell scripts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Human-friendly output with colors and formatting
    #[arg(long, global = true, conflicts_with = "compact")]
    pretty: bool,

    /// Compact output without colors (overrides TTY detection)
    #[arg(long, global = true, conflicts_with = "pretty")]
    compact: bool,

    /// Root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Log tool invocations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check fish scripts for syntax errors
    Lint(LintArgs),

    /// Format fish scripts with fish_indent
    Fmt(FmtArgs),

    /// Show the fish tools gill uses and whether they are installed
    Tools,

    /// Create .gill/config.toml in the root directory
    Init,

    /// Start the language server
    Serve(ServeArgs),
}

/// Help output styling.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().bold())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::Cyan.on_default().bold())
    .placeholder(AnsiColor::Cyan.on_default());

/// Determine color choice for help output.
/// Checks args, config, and NO_COLOR before parsing since --help may exit early.
fn help_color_choice() -> ColorChoice {
    if std::env::var("NO_COLOR").is_ok() {
        return ColorChoice::Never;
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--compact") {
        return ColorChoice::Never;
    }
    if args.iter().any(|a| a == "--pretty") {
        return ColorChoice::Always;
    }

    let config = GillConfig::load(Path::new("."));
    match config.pretty.colors {
        Some(ColorMode::Always) => ColorChoice::Always,
        Some(ColorMode::Never) => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn main() {
    let matches = Cli::command()
        .styles(HELP_STYLES)
        .color(help_color_choice())
        .get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    gill::logging::init_logging(cli.verbose);

    let root = cli.root.as_deref();
    let config = GillConfig::load(root.unwrap_or_else(|| Path::new(".")));
    let format = OutputFormat::from_cli(cli.json, cli.pretty, cli.compact, &config.pretty);

    let exit_code = match cli.command {
        Commands::Lint(args) => commands::lint::run(args, root, format),
        Commands::Fmt(args) => commands::fmt::run(args, root, format),
        Commands::Tools => commands::tools::run(root, format),
        Commands::Init => commands::init::run(root),
        Commands::Serve(args) => serve::run(args, root),
    };

    std::process::exit(exit_code);
}

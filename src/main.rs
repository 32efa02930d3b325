use anyhow::Result;
use ast_callgraph::app::engine::CallGraphEngine;
use ast_callgraph::cli;
use ast_callgraph::domain::options::{DEFAULT_INLINE_PREFIX, GraphOptions};
use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cgtool",
    about = "Build a conservative call graph from parsed translation units"
)]
struct Cli {
    /// Path to a translation unit JSON file (one unit or an array of units)
    #[arg(value_name = "UNITS")]
    units: PathBuf,

    /// Log level for tracing output (RUST_LOG takes precedence)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Identifier prefix of inline helpers excluded from the graph
    #[arg(long, default_value = DEFAULT_INLINE_PREFIX)]
    inline_prefix: String,

    /// Disable the `x(&f)` => `x calls f` heuristic
    #[arg(long, default_value_t = false)]
    no_fn_ptr_heuristic: bool,

    /// Skip the override sweep
    #[arg(long, default_value_t = false)]
    no_overrides: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Text dump in reverse postorder
    Dump,
    /// Graphviz output
    Dot,
    /// JSON export
    Json,
    /// Node/edge counts and edge-discovery statistics
    Stats,
    /// Callees, callers and override relations of one function
    Callees {
        /// Qualified name, e.g. `ns::Class::method`
        name: String,
    },
    /// Stable cross-unit keys of every node
    Keys,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let options = GraphOptions {
        inline_prefix: cli.inline_prefix,
        function_pointer_heuristic: !cli.no_fn_ptr_heuristic,
        link_overrides: !cli.no_overrides,
    };
    let engine = CallGraphEngine::load_from_json(&cli.units, options)?;

    match cli.command {
        Command::Dump => cli::display_dump(&engine),
        Command::Dot => cli::display_dot(&engine),
        Command::Json => cli::display_graph_json(&engine),
        Command::Stats => cli::display_stats(&engine),
        Command::Callees { name } => cli::display_callees(&engine, &name),
        Command::Keys => cli::display_keys(&engine),
    }
}

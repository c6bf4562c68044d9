use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "mcpbench")]
#[command(about = "Compare token usage of MCP tool-exposure strategies", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short = 'v', long = "verbose", global = true, help = "Verbose logging to stderr")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the configured MCP servers and snapshot their tools to disk
    BuildRegistry {
        #[arg(
            long = "code-wrappers",
            help = "Also generate callable wrapper stubs for code mode"
        )]
        code_wrappers: bool,
    },

    /// Run a single agent strategy against the configured servers
    Run {
        #[arg(value_enum)]
        mode: Mode,

        #[arg(help = "Query to send to the agent", default_value = DEFAULT_QUERY)]
        query: String,

        #[arg(long = "max-turns", help = "Override the per-mode turn budget")]
        max_turns: Option<u32>,
    },

    /// Run traditional and code mode back to back and compare token usage
    Compare {
        #[arg(help = "Query to send to both agents", default_value = DEFAULT_QUERY)]
        query: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every tool from every connected server offered every turn
    Traditional,
    /// Two-stage registry exploration collapsing to a single tool
    Discovery,
    /// One run_script tool; the model explores the registry itself
    Code,
}

pub const DEFAULT_QUERY: &str = "What time is it in Amsterdam right now?";

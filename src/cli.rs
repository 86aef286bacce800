use clap::Parser;

use crate::dialogs::DialogKind;

#[derive(Parser, Debug)]
#[command(name = "lazyforum", version, about = "TUI for forum accounts")]
pub struct Args {
    /// Dialog to open at startup
    #[arg(short, long, value_enum)]
    pub dialog: Option<DialogKind>,

    /// Theme name (e.g., "Catppuccin Latte"), overrides the config file
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Simulated forum round-trip time in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,
}

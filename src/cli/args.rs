use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "keylock",
    version,
    about = "Exercise keyed, reference-counted in-process locks",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (repeat for more detail)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short = 'q', long, conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    /// Structured JSON output
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hammer one key from many threads and verify mutual exclusion
    Stress {
        /// Key to contend on
        #[arg(short, long, default_value = "shared")]
        key: String,

        /// Number of worker threads
        #[arg(short, long, default_value_t = 50)]
        threads: usize,

        /// Acquire/release cycles per thread
        #[arg(short, long, default_value_t = 100)]
        iterations: usize,

        /// Upper bound of the random time each holder keeps the lock (e.g. "2ms")
        #[arg(long, value_name = "DURATION", default_value = "0ms")]
        hold: String,
    },

    /// Hold a key with an expiration and show a second caller getting it
    Expire {
        /// Key to lock
        #[arg(short, long, default_value = "x")]
        key: String,

        /// Expiration of the first holder (e.g. "1s", "inf")
        #[arg(short, long, value_name = "DURATION", default_value = "1s")]
        expiration: String,

        /// How long the second caller waits (e.g. "3s", "inf")
        #[arg(short, long, value_name = "DURATION", default_value = "3s")]
        timeout: String,
    },
}

mod args;
mod expire_command;
mod report;
mod stress_command;

use keylock::Result;
pub use args::{Args, Command};

/// How much the commands print to stdout
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub quiet: bool,
    pub json: bool,
}

pub fn run(args: Args) -> Result<()> {
    let output = Output {
        quiet: args.quiet,
        json: args.json,
    };

    match args.command {
        cmd @ Command::Stress { .. } => stress_command::execute_stress(cmd, output),
        cmd @ Command::Expire { .. } => expire_command::execute_expire(cmd, output),
    }
}

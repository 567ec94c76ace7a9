use clap::Args;
use std::path::PathBuf;

use crate::api_generator::check_definition;
use crate::cli::run_cli;
use crate::emitter::Target;
use crate::error::GenerateError;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// JSON API definition to validate
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
    /// Code generation target
    #[arg(long, value_enum, default_value_t = Target::Angular)]
    pub target: Target,
}

pub fn run(args: CheckArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_inner(args: CheckArgs) -> Result<(), GenerateError> {
    let summary = check_definition(&args.input, args.target)?;
    println!(
        "'{}' is valid: {} entities, {} services",
        summary.api, summary.entities, summary.services
    );
    for file_name in &summary.file_names {
        println!("  {file_name}");
    }
    Ok(())
}

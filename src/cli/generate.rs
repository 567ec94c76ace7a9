use clap::Args;
use std::path::PathBuf;

use crate::api_generator::generate_client;
use crate::cli::run_cli;
use crate::emitter::Target;
use crate::error::GenerateError;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// JSON API definition to compile
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
    /// Directory receiving the generated files (created if missing)
    #[arg(short, long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,
    /// Code generation target
    #[arg(long, value_enum, default_value_t = Target::Angular)]
    pub target: Target,
}

pub fn run(args: GenerateArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_inner(args: GenerateArgs) -> Result<(), GenerateError> {
    let summary = generate_client(&args.input, &args.output_dir, args.target)?;
    println!(
        "Generated {} file(s) for '{}' in {}",
        summary.files.len(),
        summary.api,
        args.output_dir.display()
    );
    Ok(())
}

pub mod check;
pub mod generate;

use crate::error::GenerateError;

/// Run a command body and turn its outcome into a process exit code.
pub fn run_cli<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), GenerateError>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

//! Dev server: `cargo run` compiles the backdrop to `static/pkg` and serves
//! the demo page.
//!
//! Environment:
//! - `BACKDROP_PORT` listen port (default 8000)
//! - `BACKDROP_SKIP_WASM` set to anything to reuse the existing bundle

use std::env;
use std::process::{Command, ExitCode};

const SITE_DIR: &str = "static";
const PKG_DIR: &str = "static/pkg";

/// Why a dev step did not complete.
enum StepError {
    /// The tool is not on `PATH`.
    Missing(&'static str),
    /// The tool ran and exited unsuccessfully.
    Failed(&'static str),
}

fn step(tool: &'static str, args: &[&str]) -> Result<(), StepError> {
    let status = Command::new(tool)
        .args(args)
        .status()
        .map_err(|_| StepError::Missing(tool))?;
    if status.success() {
        Ok(())
    } else {
        Err(StepError::Failed(tool))
    }
}

fn compile_bundle() -> Result<(), StepError> {
    step(
        "wasm-pack",
        &["build", "--release", "--target", "web", "--out-dir", PKG_DIR],
    )
}

fn main() -> ExitCode {
    let port = env::var("BACKDROP_PORT").unwrap_or_else(|_| "8000".to_owned());

    if env::var_os("BACKDROP_SKIP_WASM").is_some() {
        println!("reusing {PKG_DIR}");
    } else {
        println!("compiling backdrop into {PKG_DIR}");
        match compile_bundle() {
            Ok(()) => {}
            Err(StepError::Missing(tool)) => {
                eprintln!("{tool} is not installed; serving whatever is already in {PKG_DIR}");
            }
            Err(StepError::Failed(tool)) => {
                eprintln!("{tool} exited with an error, not serving a broken bundle");
                return ExitCode::FAILURE;
            }
        }
    }

    println!("demo at http://127.0.0.1:{port}/");
    match step("python3", &["-m", "http.server", &port, "--directory", SITE_DIR]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(StepError::Missing(tool)) => {
            eprintln!("{tool} is needed to serve {SITE_DIR}/");
            ExitCode::FAILURE
        }
        Err(StepError::Failed(_)) => ExitCode::FAILURE,
    }
}

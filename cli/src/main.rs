#![deny(clippy::all)]

use anyhow::Context;
use mjc::driver::CompileOptions;
use mjc::{check, compile_to_units, emitter};
use std::{fs, path::PathBuf, process};
use structopt::StructOpt;

/// The sub-command to execute.
#[derive(Debug, StructOpt)]
enum Command {
    /// Compile a MiniJava source file to a C project.
    #[structopt(name = "compile")]
    Compile {
        /// Path to the MiniJava source file.
        #[structopt(parse(from_os_str), long = "source", short = "s")]
        source_path: PathBuf,
        /// Directory to write the generated C project into.
        #[structopt(parse(from_os_str), long = "out", short = "o")]
        out_dir: PathBuf,
        /// Name given to the generated CMake project/executable target.
        #[structopt(long = "project-name", default_value = "mjc_program")]
        project_name: String,
        /// Report failures as a JSON diagnostic instead of human-readable
        /// text.
        #[structopt(long = "json-errors")]
        json_errors: bool,
    },

    /// Parse and type-check a MiniJava source file without generating C.
    #[structopt(name = "check")]
    Check {
        /// Path to the MiniJava source file.
        #[structopt(parse(from_os_str), long = "source", short = "s")]
        source_path: PathBuf,
        /// Report failures as a JSON diagnostic instead of human-readable
        /// text.
        #[structopt(long = "json-errors")]
        json_errors: bool,
    },
}

/// mjc — compiles MiniJava source to portable C.
#[derive(Debug, StructOpt)]
#[structopt(name = "mjc")]
struct Opt {
    #[structopt(subcommand)]
    cmd: Command,
}

fn read_file(path: &PathBuf) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Prints a compile failure either as a human-readable message or, with
/// `--json-errors`, as a `serde_json`-serialized diagnostic.
fn report_error(err: &mjc::CompileError, json_errors: bool) {
    if json_errors {
        let diagnostic = err.diagnostic();
        eprintln!("{}", serde_json::to_string(&diagnostic).unwrap());
    } else {
        eprintln!("{}", err);
    }
}

fn run(opt: Opt) -> anyhow::Result<bool> {
    match opt.cmd {
        Command::Compile {
            source_path,
            out_dir,
            project_name,
            json_errors,
        } => {
            let source = read_file(&source_path)?;
            let options = CompileOptions { project_name };
            match compile_to_units(&source, &options) {
                Ok(files) => {
                    emitter::write_project(&out_dir, &files)?;
                    log::debug!("wrote {} files to {:?}", files.len(), out_dir);
                    Ok(true)
                }
                Err(err) => {
                    report_error(&err, json_errors);
                    Ok(false)
                }
            }
        }

        Command::Check {
            source_path,
            json_errors,
        } => {
            let source = read_file(&source_path)?;
            match check(&source) {
                Ok(()) => {
                    println!("ok");
                    Ok(true)
                }
                Err(err) => {
                    report_error(&err, json_errors);
                    Ok(false)
                }
            }
        }
    }
}

fn main() {
    env_logger::init();
    let exit_code = match run(Opt::from_args()) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };
    process::exit(exit_code);
}

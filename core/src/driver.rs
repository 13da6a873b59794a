//! Wires the pipeline stages together: lex → parse → analyze → generate,
//! mirroring the staged `Compiler<T>` shape the teacher uses to move a
//! program through its own pipeline, generalized here to MiniJava's three
//! analysis/codegen stages.

use crate::ast::Project;
use crate::codegen::{self, GeneratedFile};
use crate::error::CompileError;
use crate::parser::Parser;
use crate::semantic;
use crate::symbol::AnalysisContext;

/// Options threaded through a single compile. The only configurable
/// surface is "what should the emitted build manifest be named" — there's
/// no layered config format to parse, just this struct.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// The name given to the CMake project/executable target.
    pub project_name: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            project_name: "mjc_program".to_string(),
        }
    }
}

/// Runs the full pipeline over `src` and returns the in-memory files a
/// compile produces, without writing anything to disk (see
/// [`crate::emitter::write_project`] for that).
pub fn compile_to_units(
    src: &str,
    options: &CompileOptions,
) -> Result<Vec<GeneratedFile>, CompileError> {
    let mut project = parse(src)?;
    let _ctx = analyze(&mut project)?;
    let files = codegen::generate(&project, &options.project_name)?;
    log::debug!("generated {} files", files.len());
    Ok(files)
}

/// Runs parse + analyze only, without generating or writing anything —
/// the `mjc check` subcommand's workhorse.
pub fn check(src: &str) -> Result<(), CompileError> {
    let mut project = parse(src)?;
    analyze(&mut project)?;
    Ok(())
}

fn parse(src: &str) -> Result<Project, CompileError> {
    let project = Parser::parse_source(src)?;
    log::debug!("parsed {} classes", project.classes.len());
    Ok(project)
}

fn analyze(project: &mut Project) -> Result<AnalysisContext, CompileError> {
    let ctx = semantic::analyze(project)?;
    Ok(ctx)
}

//! Lowers a type-checked [`Project`] to a tree of portable C99 files:
//! one `.h`/`.c` pair per class, the fixed `int[]` runtime pair, `main.c`,
//! and a CMake build manifest — spec.md §4.

pub mod emit;
pub mod layout;
pub mod lower;

pub use emit::GeneratedFile;

use crate::ast::Project;
use crate::error::CodegenError;

/// Generates every file a compiled MiniJava program needs to build as a
/// standalone C project. `project_name` becomes the CMake project/target
/// name.
pub fn generate(project: &Project, project_name: &str) -> Result<Vec<GeneratedFile>, CodegenError> {
    log::debug!("generate: {} classes, project_name={}", project.classes.len(), project_name);
    let main_class = project
        .classes
        .iter()
        .find(|c| c.methods.iter().any(|m| m.is_main))
        .ok_or_else(|| CodegenError::new("no class declares a main method"))?;

    let mut files = Vec::new();

    let (int_array_h, int_array_c) = emit::int_array_runtime();
    log::debug!("emitted {}", int_array_h.path.display());
    log::debug!("emitted {}", int_array_c.path.display());
    files.push(int_array_h);
    files.push(int_array_c);

    for class in &project.classes {
        let (header, source) = emit::emit_class(project, class);
        log::debug!("emitted {}", header.path.display());
        log::debug!("emitted {}", source.path.display());
        files.push(header);
        files.push(source);
    }

    let main_c = emit::emit_main(&main_class.name);
    log::debug!("emitted {}", main_c.path.display());
    files.push(main_c);

    let manifest = emit::emit_build_manifest(project_name);
    log::debug!("emitted {}", manifest.path.display());
    files.push(manifest);

    log::debug!("generate: done, {} files total", files.len());
    Ok(files)
}

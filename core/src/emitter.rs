//! Writes generated files to disk. spec.md §5: "Generated C source is
//! buffered per-file then written atomically." Kept as a thin boundary —
//! nothing upstream of this module touches the filesystem, so the parser,
//! analyzer, and generator all stay pure string-in/string-out and are
//! testable without a temp directory.

use crate::codegen::GeneratedFile;

use std::fs;
use std::io;
use std::path::Path;

/// Writes every generated file under `out_dir`, creating it (and any
/// missing parent components) if necessary. Each file is written via a
/// temp-file-then-rename so a crash mid-write never leaves a truncated
/// `.c`/`.h` file behind.
pub fn write_project(out_dir: &Path, files: &[GeneratedFile]) -> io::Result<()> {
    fs::create_dir_all(out_dir)?;
    for file in files {
        let dest = out_dir.join(&file.path);
        write_atomic(&dest, &file.contents)?;
        log::debug!("wrote {}", dest.display());
    }
    Ok(())
}

fn write_atomic(dest: &Path, contents: &str) -> io::Result<()> {
    let tmp = dest.with_extension(format!(
        "{}.tmp",
        dest.extension().and_then(|e| e.to_str()).unwrap_or("")
    ));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GeneratedFile;
    use std::path::PathBuf;

    #[test]
    fn writes_every_file_under_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            GeneratedFile {
                path: PathBuf::from("Foo.h"),
                contents: "// foo header".to_string(),
            },
            GeneratedFile {
                path: PathBuf::from("Foo.c"),
                contents: "// foo source".to_string(),
            },
        ];

        write_project(dir.path(), &files).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("Foo.h")).unwrap(),
            "// foo header"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("Foo.c")).unwrap(),
            "// foo source"
        );
    }

    #[test]
    fn creates_a_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("out");
        let files = vec![GeneratedFile {
            path: PathBuf::from("main.c"),
            contents: "int main(void) { return 0; }".to_string(),
        }];

        write_project(&nested, &files).unwrap();

        assert!(nested.join("main.c").exists());
    }
}

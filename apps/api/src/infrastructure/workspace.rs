// Compiled crew files
//
// The compiler stage replies with files wrapped as
//     ### path/to/file ###
//     ...
//     ### END path/to/file ###
// This module extracts those sections and writes them under the project
// folder.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Placeholder the compiler uses for the project's own directory
pub const PROJECT_DIRECTORY: &str = "PROJECT_DIRECTORY";

/// One file extracted from a compiler reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFile {
    pub path: String,
    pub contents: String,
}

/// Extract every closed file section from a compiler reply
///
/// Text outside sections and sections without a matching END marker are
/// ignored.
pub fn parse_compiled_files(payload: &str) -> Vec<CompiledFile> {
    let mut files = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in payload.lines() {
        let marker = line
            .trim()
            .strip_prefix("### ")
            .and_then(|rest| rest.strip_suffix(" ###"))
            .map(str::trim);

        match (marker, current.take()) {
            (Some(marker), Some((path, lines))) if marker.strip_prefix("END ") == Some(path.as_str()) => {
                let mut contents = lines.join("\n");
                contents.push('\n');
                files.push(CompiledFile { path, contents });
            }
            (Some(marker), previous) if !marker.starts_with("END ") => {
                if let Some((path, _)) = previous {
                    tracing::warn!(%path, "Compiled file section was never closed");
                }
                current = Some((marker.to_string(), Vec::new()));
            }
            (_, Some((path, mut lines))) => {
                lines.push(line);
                current = Some((path, lines));
            }
            (_, None) => {}
        }
    }

    if let Some((path, _)) = current {
        tracing::warn!(%path, "Compiled file section was never closed");
    }

    files
}

/// A project name usable as one directory component
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Resolve a section path under `root`
///
/// A leading `PROJECT_DIRECTORY` component is replaced by `project_name`
/// when it is a plain directory name, and kept literally otherwise.
/// Absolute paths and `..` are rejected.
fn resolve(root: &Path, path: &str, project_name: Option<&str>) -> io::Result<PathBuf> {
    let project_name = project_name.filter(|name| is_plain_name(name));
    let relative = match (project_name, path.strip_prefix(PROJECT_DIRECTORY)) {
        (Some(name), Some(rest)) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{}", name, rest)
        }
        _ => path.to_string(),
    };

    let mut resolved = root.to_path_buf();
    let mut depth = 0;
    for component in Path::new(&relative).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("refusing to write outside the project folder: {}", path),
                ))
            }
        }
    }

    if depth == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("empty file path in compiled output: {:?}", path),
        ));
    }

    Ok(resolved)
}

/// Write every file section of `payload` under `root`
///
/// All paths are validated before anything is written.
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - Paths written, in payload order (empty when the
///   payload has no sections)
/// * `Err(io::Error)` - Unsafe path or filesystem failure
pub async fn write_compiled_files(
    root: &Path,
    payload: &str,
    project_name: Option<&str>,
) -> io::Result<Vec<PathBuf>> {
    let files = parse_compiled_files(payload);
    let targets = files
        .iter()
        .map(|file| resolve(root, &file.path, project_name))
        .collect::<io::Result<Vec<_>>>()?;

    for (file, target) in files.iter().zip(&targets) {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, &file.contents).await?;
        tracing::info!(path = %target.display(), "Wrote compiled file");
    }

    Ok(targets)
}

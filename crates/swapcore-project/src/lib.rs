use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProjectError {
    #[error("{0} does not name a file")]
    NoFileName(PathBuf),
    #[error("file name of {0} is not valid UTF-8")]
    NonUtf8FileName(PathBuf),
}

/// The selected source file, split into the parts every projected name is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    path: PathBuf,
    stem: String,
    extension: String,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let path = path.into();
        let Some(file_name) = path.file_name() else {
            return Err(ProjectError::NoFileName(path));
        };
        if file_name.to_str().is_none() {
            return Err(ProjectError::NonUtf8FileName(path));
        }

        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        Ok(Self {
            path,
            stem,
            extension,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Extension including its leading dot, or empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn project(&self, name: &str) -> String {
        format!("{} {}{}", self.stem, name, self.extension)
    }
}

/// One name per line. Blank lines are kept; a trailing `\r` is dropped so CRLF input matches LF.
pub fn split_names(raw: &str) -> Vec<&str> {
    raw.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

pub fn project_names(input: &InputFile, names: &[&str]) -> Vec<String> {
    names.iter().map(|name| input.project(name)).collect()
}

pub fn project_text(input: &InputFile, raw: &str) -> Vec<String> {
    project_names(input, &split_names(raw))
}

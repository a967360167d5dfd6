use std::path::{Path, PathBuf};

use super::{Template, parse_template};
use crate::{Error, Result, builtin};

/// A template together with the raw content it was parsed from.
///
/// Built-in templates use a `builtin:<name>` pseudo path so diagnostics can
/// still name their source.
pub struct TemplateFile {
    path: PathBuf,
    content: String,
    template: Template,
}

impl TemplateFile {
    /// Open and parse a template file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let template = parse_template(&content, &path.display().to_string())?;

        Ok(Self {
            path,
            content,
            template,
        })
    }

    /// Load one of the templates embedded in the binary.
    pub fn builtin(name: &str) -> Result<Self> {
        let builtin = builtin::find(name).ok_or_else(|| {
            Box::new(Error::UnknownBuiltin {
                name: name.to_string(),
                available: builtin::names().join(", "),
            })
        })?;
        let path = PathBuf::from(format!("builtin:{}", builtin.name));
        let template = parse_template(builtin.source, &path.display().to_string())?;

        Ok(Self {
            path,
            content: builtin.source.to_string(),
            template,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn into_template(self) -> Template {
        self.template
    }
}

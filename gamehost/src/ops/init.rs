//! Init operation - parameter file skeletons.

use std::path::Path;

use eyre::{Context, Result, bail};
use gamehost_template::{ParameterFile, Template};

use crate::reports::InitReport;

/// Execute the init operation.
///
/// Writes a commented parameter file for `template` to `path`. An existing
/// file is only replaced when `force` is set.
pub fn init(template: &Template, path: &Path, force: bool) -> Result<InitReport> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let skeleton = ParameterFile::skeleton(template);
    std::fs::write(path, &skeleton)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    Ok(InitReport {
        path: path.to_path_buf(),
        template: template.meta.name.clone(),
        required: template
            .required_parameters()
            .filter(|p| !p.secure)
            .map(|p| p.name.clone())
            .collect(),
        secrets: template.secure_parameters().map(|p| p.name.clone()).collect(),
    })
}

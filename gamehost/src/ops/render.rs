//! Render operation - serialize a resolution.

use std::path::Path;

use eyre::{Context, Result};
use gamehost_ir::Resolution;

use crate::reports::{OutputSummary, RenderReport};

/// Execute the render operation.
///
/// Serializes the resolution as pretty JSON and writes it to `output`, or
/// keeps it in the report for stdout.
pub fn render(resolution: &Resolution, output: Option<&Path>) -> Result<RenderReport> {
    let json =
        serde_json::to_string_pretty(resolution).wrap_err("Failed to serialize resolution")?;

    let outputs = resolution
        .outputs
        .iter()
        .map(|(name, output)| OutputSummary {
            name: name.clone(),
            value: match output.value.as_str() {
                Some(text) => text.to_string(),
                None => output.value.to_string(),
            },
        })
        .collect();

    let json = match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            None
        }
        None => Some(json),
    };

    Ok(RenderReport {
        template: resolution.graph.template.name.clone(),
        output: output.map(Path::to_path_buf),
        json,
        resource_count: resolution.graph.len(),
        excluded: resolution.graph.excluded.clone(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use gamehost_core::SecretString;
    use gamehost_resolve::{ParameterSet, resolve};
    use gamehost_template::TemplateFile;

    use super::*;

    fn pixelmon() -> Resolution {
        let file = TemplateFile::builtin("pixelmon").unwrap();
        let mut params = ParameterSet::new();
        params
            .insert("containerGroupName", "Pixelmon-Server")
            .insert_secure(
                "curseForgeApiKey",
                SecretString::new("cf-secret".to_string()),
            );
        resolve(file.template(), &params).unwrap()
    }

    #[test]
    fn test_render_to_stdout() {
        let report = render(&pixelmon(), None).unwrap();
        let json = report.json.as_deref().unwrap();

        assert!(!json.contains("cf-secret"));
        assert!(json.contains("[secure('curseForgeApiKey')]"));
        assert_eq!(report.resource_count, 4);
        assert!(report.excluded.is_empty());
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixelmon.json");

        let report = render(&pixelmon(), Some(&path)).unwrap();
        assert!(report.json.is_none());

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["template"]["name"], "pixelmon");
        assert_eq!(parsed["resources"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_render_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = render(&pixelmon(), Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to write"));
    }
}

//! Init command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from writing a parameter file skeleton.
#[derive(Debug)]
pub struct InitReport {
    pub path: PathBuf,
    pub template: String,
    /// Non-secure parameters without a default.
    pub required: Vec<String>,
    /// Secure parameters, which stay out of the file.
    pub secrets: Vec<String>,
}

impl Report for InitReport {
    fn render(&self, out: &mut dyn Output) {
        out.preformatted(&format!("Parameters for '{}':", self.template));
        out.added_item(&self.path.display().to_string());

        if !self.required.is_empty() {
            out.newline();
            out.section("Fill in");
            for name in &self.required {
                out.list_item(name);
            }
        }

        if !self.secrets.is_empty() {
            out.newline();
            out.section("Set in the environment (or pass --prompt-secrets)");
            for name in &self.secrets {
                out.list_item(&format!("{} via {}", name, gamehost_template::secret_env_var(name)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::Recorder;

    #[test]
    fn test_render() {
        let report = InitReport {
            path: PathBuf::from("parameters.toml"),
            template: "multi-game".to_string(),
            required: vec!["dockerHubUsername".to_string()],
            secrets: vec!["curseForgeApiKey".to_string()],
        };

        insta::assert_snapshot!(Recorder::render(&report), @r"
        Parameters for 'multi-game':
          + parameters.toml

        Fill in:
          - dockerHubUsername

        Set in the environment (or pass --prompt-secrets):
          - curseForgeApiKey via GAMEHOST_CURSE_FORGE_API_KEY
        ");
    }
}

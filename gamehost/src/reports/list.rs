//! List command report data structures.

use super::output::{Output, Report};

#[derive(Debug)]
pub struct ListReport {
    pub builtins: Vec<BuiltinInfo>,
}

#[derive(Debug)]
pub struct BuiltinInfo {
    pub name: String,
    pub summary: String,
}

impl Report for ListReport {
    fn render(&self, out: &mut dyn Output) {
        out.section("Built-in templates");
        let width = self.builtins.iter().map(|b| b.name.len()).max().unwrap_or(0);
        for builtin in &self.builtins {
            out.list_item(&format!("{:width$}  {}", builtin.name, builtin.summary));
        }
        out.newline();
        out.preformatted("Use one with `gamehost render --builtin <name>`.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ops, reports::Recorder};

    #[test]
    fn test_render_builtins() {
        insta::assert_snapshot!(Recorder::render(&ops::list()), @r"
        Built-in templates:
          - pixelmon            Pixelmon server with its world on an Azure Files share
          - pixelmon-logging    pixelmon plus optional Log Analytics diagnostics
          - pixelmon-spot       pixelmon-logging on spot capacity
          - pixelmon-whitelist  pixelmon-spot with whitelist, operators and extra mods
          - multi-game          Pixelmon and Terraria in one container group

        Use one with `gamehost render --builtin <name>`.
        ");
    }
}

//! Pipeline orchestrator.

use gamehost_template::Template;

use super::{
    Phase, PhaseInfo, ResolveContext,
    phases::{BindPhase, EvaluatePhase, ExpandPhase, LinkPhase, OutputsPhase, ValidatePhase},
};
use crate::{ParameterSet, Result};

/// The resolution pipeline.
///
/// Runs the built-in phases (validate, bind, evaluate, expand, link,
/// outputs) followed by any user phases.
///
/// # Example
///
/// ```ignore
/// let ctx = Pipeline::new()
///     .phase(MyAuditPhase)
///     .run(&template, &params)?;
/// ```
pub struct Pipeline {
    builtin: Vec<Box<dyn Phase>>,
    phases: Vec<Box<dyn Phase>>,
}

impl Pipeline {
    /// Create a pipeline with the built-in phases.
    pub fn new() -> Self {
        Self::with_validate(ValidatePhase::new())
    }

    /// Create a pipeline with a custom validate phase, e.g. with extra lints.
    pub fn with_validate(validate: ValidatePhase) -> Self {
        Self {
            builtin: vec![
                Box::new(validate),
                Box::new(BindPhase),
                Box::new(EvaluatePhase),
                Box::new(ExpandPhase),
                Box::new(LinkPhase),
                Box::new(OutputsPhase),
            ],
            phases: Vec::new(),
        }
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Names and descriptions of every phase, in execution order.
    pub fn phase_info(&self) -> Vec<PhaseInfo> {
        self.builtin
            .iter()
            .chain(self.phases.iter())
            .map(|p| p.info())
            .collect()
    }

    /// Run every phase over a template and parameter set.
    ///
    /// # Errors
    ///
    /// Returns the first error any phase reports. No partial result is
    /// returned.
    pub fn run<'a>(
        &self,
        template: &'a Template,
        parameters: &'a ParameterSet,
    ) -> Result<ResolveContext<'a>> {
        let mut ctx = ResolveContext::new(template, parameters);

        for phase in self.builtin.iter().chain(self.phases.iter()) {
            let _span = tracing::debug_span!("phase", name = phase.name()).entered();
            tracing::trace!("running phase");
            phase.run(&mut ctx)?;
        }

        Ok(ctx)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use gamehost_template::parse_template;

    use super::*;

    struct CountingPhase {
        runs: Arc<AtomicUsize>,
        resources_seen: Arc<AtomicUsize>,
    }

    impl Phase for CountingPhase {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn description(&self) -> &'static str {
            "Count resolved resources"
        }

        fn run(&self, ctx: &mut ResolveContext<'_>) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.resources_seen.store(ctx.graph.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    fn template() -> Template {
        parse_template(
            r#"
[template]
name = "test"
version = "1.0.0"

[resources.storage]
type = "Microsoft.Storage/storageAccounts"
api_version = "2023-01-01"
name = "mcdata"
"#,
            "test.toml",
        )
        .unwrap()
    }

    #[test]
    fn test_pipeline_phase_order() {
        let names: Vec<&str> = Pipeline::new().phase_info().iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            ["validate", "bind", "evaluate", "expand", "link", "outputs"]
        );
    }

    #[test]
    fn test_user_phases_run_last() {
        let runs = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new().phase(CountingPhase {
            runs: runs.clone(),
            resources_seen: seen.clone(),
        });

        let template = template();
        let params = ParameterSet::new();
        let ctx = pipeline.run(&template, &params).unwrap();

        assert_eq!(ctx.graph.len(), 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.phase_info().last().map(|p| p.name), Some("counting"));
    }
}

//! Scripted command runner for exercising pipelines without real tools

use super::{CommandRunner, ToolCommand};
use crate::error::ProcessError;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Script = Box<dyn Fn(&ToolCommand) -> Result<(), String> + Send + Sync>;

struct Rule {
    needle: String,
    script: Script,
}

/// Runner that matches command lines against scripted rules
///
/// The first rule whose needle occurs in the command line runs; it may
/// create files to simulate the tool's output, or return `Err` to simulate
/// a non-zero exit. Commands without a matching rule succeed without effect.
/// Every invocation is recorded.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    invocations: Mutex<Vec<ToolCommand>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for command lines containing `needle`
    pub fn on<F>(mut self, needle: impl Into<String>, script: F) -> Self
    where
        F: Fn(&ToolCommand) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            needle: needle.into(),
            script: Box::new(script),
        });
        self
    }

    /// Adds a rule that always fails for command lines containing `needle`
    pub fn fail_on(self, needle: impl Into<String>) -> Self {
        self.on(needle, |_| Err("scripted failure".to_string()))
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<ToolCommand>> {
        self.invocations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Commands run so far, in order
    pub fn invocations(&self) -> Vec<ToolCommand> {
        self.recorded().clone()
    }

    /// Number of recorded command lines containing `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.recorded()
            .iter()
            .filter(|c| c.line.contains(needle))
            .count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &ToolCommand) -> Result<(), ProcessError> {
        self.recorded().push(command.clone());

        let Some(rule) = self.rules.iter().find(|r| command.line.contains(&r.needle)) else {
            return Ok(());
        };

        (rule.script)(command).map_err(|message| {
            tracing::debug!(tool = %command.tool, %message, "Scripted command failed");
            ProcessError::Exit {
                tool: command.tool.clone(),
                command: command.line.clone(),
                working_dir: command.working_dir.clone(),
                code: Some(1),
            }
        })
    }
}

use crate::active::{fetch_active, ActiveSet};
use crate::command::CommandRunner;
use crate::error::ActionError;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    AlreadyActive(u32),
    Started { id: u32, stopped: Vec<u32> },
}

#[derive(Clone)]
pub struct TaskCommands {
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl TaskCommands {
    pub fn new(program: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    pub fn active(&self) -> Result<ActiveSet, ActionError> {
        Ok(fetch_active(self.runner.as_ref(), &self.program)?)
    }

    pub fn start(&self, id: &str) -> Result<u32, ActionError> {
        let id = parse_task_id(id)?;
        self.invoke(vec![id.to_string(), "start".to_string()])?;
        info!(id, "started task");
        Ok(id)
    }

    pub fn stop(&self, active: &ActiveSet) -> Result<(), ActionError> {
        if active.is_empty() {
            return Ok(());
        }
        self.invoke(vec![active.joined(), "stop".to_string()])?;
        info!(ids = %active.joined(), "stopped tasks");
        Ok(())
    }

    pub fn add(&self, description: &str) -> Result<(), ActionError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ActionError::EmptyDescription);
        }
        self.invoke(vec!["add".to_string(), description.to_string()])?;
        info!(description, "added task");
        Ok(())
    }

    pub fn complete(&self, id: &str) -> Result<u32, ActionError> {
        let id = parse_task_id(id)?;
        self.invoke(vec![id.to_string(), "done".to_string()])?;
        info!(id, "completed task");
        Ok(id)
    }

    pub fn delete(&self, id: &str) -> Result<u32, ActionError> {
        let id = parse_task_id(id)?;
        self.invoke(vec![
            "rc.confirmation:no".to_string(),
            id.to_string(),
            "delete".to_string(),
        ])?;
        info!(id, "deleted task");
        Ok(id)
    }

    /// Makes `id` the only running task. Reselecting the single active task
    /// runs nothing.
    pub fn switch_to(&self, id: &str) -> Result<SwitchOutcome, ActionError> {
        let id = parse_task_id(id)?;
        let active = self.active()?;
        if active.only() == Some(id) {
            return Ok(SwitchOutcome::AlreadyActive(id));
        }

        self.stop(&active)?;
        self.invoke(vec![id.to_string(), "start".to_string()])?;
        info!(id, stopped = %active.joined(), "switched task");
        Ok(SwitchOutcome::Started {
            id,
            stopped: active.iter().collect(),
        })
    }

    fn invoke(&self, args: Vec<String>) -> Result<(), ActionError> {
        let output = self.runner.run(&self.program, &args)?;
        if output.success() {
            return Ok(());
        }
        let mut command = vec![self.program.clone()];
        command.extend(args);
        Err(ActionError::Exit {
            program: command.join(" "),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

pub fn parse_task_id(text: &str) -> Result<u32, ActionError> {
    match text.trim().parse::<u32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ActionError::InvalidTaskId(text.trim().to_string())),
    }
}

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("{program} exited with {}: {stderr}", describe_code(*code))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("report too short: {lines} lines, need at least {required}")]
    ShortOutput { lines: usize, required: usize },
    #[error("report has no column ruler")]
    DegenerateLayout,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("{program} exited with {}: {stderr}", describe_code(*code))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("could not read active tasks: {0}")]
    Fetch(#[from] FetchError),
    #[error("not a task id: '{0}'")]
    InvalidTaskId(String),
    #[error("task description is empty")]
    EmptyDescription,
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

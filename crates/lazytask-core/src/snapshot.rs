use crate::command::CommandRunner;
use crate::error::FetchError;
use crate::layout::{ColumnLayout, Row};
use regex::Regex;
use std::sync::OnceLock;

const TITLE_LINES: usize = 1;
const HEADER_LINE: usize = 1;
const RULER_LINE: usize = 2;
const BODY_START: usize = 3;

pub const TASK_FOOTER_LINES: usize = 3;
pub const INTERVAL_FOOTER_LINES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: String,
    pub fields: Row,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub layout: ColumnLayout,
    pub header: Row,
    pub records: Vec<Record>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn column_count(&self) -> usize {
        self.layout.column_count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sort_by_line(&mut self) {
        self.records.sort_by(|a, b| a.line.cmp(&b.line));
    }
}

pub trait ReportFormat {
    fn parse(&self, text: &str) -> Result<Snapshot, FetchError>;
}

/// Fixed-width report: title line, header, dash ruler, body, then a footer of
/// `footer_lines` lines (the trailing empty line after the last newline counts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnarReport {
    pub footer_lines: usize,
}

impl ColumnarReport {
    pub fn new(footer_lines: usize) -> Self {
        Self { footer_lines }
    }

    pub fn min_lines(&self) -> usize {
        TITLE_LINES + HEADER_LINE + 1 + self.footer_lines
    }
}

impl ReportFormat for ColumnarReport {
    fn parse(&self, text: &str) -> Result<Snapshot, FetchError> {
        if announces_empty(text) {
            return Ok(Snapshot::empty());
        }

        let lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let required = self.min_lines();
        if lines.len() < required {
            return Err(FetchError::ShortOutput {
                lines: lines.len(),
                required,
            });
        }

        let layout = ColumnLayout::from_ruler(lines[RULER_LINE]);
        if layout.is_empty() {
            return Err(FetchError::DegenerateLayout);
        }

        let header = layout.decode(lines[HEADER_LINE]);
        let records = lines[BODY_START..lines.len() - self.footer_lines]
            .iter()
            .map(|line| Record {
                line: (*line).to_string(),
                fields: layout.decode(line),
            })
            .collect();

        Ok(Snapshot {
            layout,
            header,
            records,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub program: String,
    pub args: Vec<String>,
    pub format: ColumnarReport,
}

impl ReportQuery {
    pub fn task_list(program: impl Into<String>, report: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![report.into()],
            format: ColumnarReport::new(TASK_FOOTER_LINES),
        }
    }

    pub fn active_tasks(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["active".to_string()],
            format: ColumnarReport::new(TASK_FOOTER_LINES),
        }
    }

    pub fn intervals(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            format: ColumnarReport::new(INTERVAL_FOOTER_LINES),
        }
    }

    pub fn default_interval_args() -> Vec<String> {
        vec!["summary".to_string(), ":ids".to_string()]
    }

    pub fn describe(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

pub fn fetch_snapshot(
    runner: &dyn CommandRunner,
    query: &ReportQuery,
) -> Result<Snapshot, FetchError> {
    let output = runner.run(&query.program, &query.args)?;
    if announces_empty(&output.stdout) || announces_empty(&output.stderr) {
        return Ok(Snapshot::empty());
    }
    if !output.success() {
        return Err(FetchError::Exit {
            program: query.describe(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }
    query.format.parse(&output.stdout)
}

/// True when the tool replaced its table with a "nothing to show" message.
/// Only lines above the first ruler are considered, so body text can never
/// blank a populated report.
fn announces_empty(text: &str) -> bool {
    static EMPTY_REPORT: OnceLock<Regex> = OnceLock::new();
    let pattern = EMPTY_REPORT.get_or_init(|| {
        Regex::new(r"^\s*(?:No matches\.?|No filtered data found\b.*)\s*$").expect("valid regex")
    });
    text.lines()
        .take_while(|line| !is_ruler(line))
        .any(|line| pattern.is_match(line))
}

fn is_ruler(line: &str) -> bool {
    line.contains('-') && line.trim().chars().all(|ch| ch == '-' || ch == ' ')
}

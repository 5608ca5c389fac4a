use crate::command::CommandRunner;
use crate::error::FetchError;
use crate::snapshot::{fetch_snapshot, ReportQuery, Snapshot};
use std::collections::BTreeSet;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    ids: BTreeSet<u32>,
}

impl ActiveSet {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut ids = BTreeSet::new();
        for record in &snapshot.records {
            let Some(first) = record.fields.first() else {
                continue;
            };
            match first.parse::<u32>() {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(_) => {
                    warn!(line = %record.line, "skipping active task row without numeric id");
                }
            }
        }
        Self { ids }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }

    pub fn joined(&self) -> String {
        self.ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn only(&self) -> Option<u32> {
        if self.ids.len() == 1 {
            self.ids.first().copied()
        } else {
            None
        }
    }
}

impl FromIterator<u32> for ActiveSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

pub fn fetch_active(runner: &dyn CommandRunner, program: &str) -> Result<ActiveSet, FetchError> {
    let snapshot = fetch_snapshot(runner, &ReportQuery::active_tasks(program))?;
    Ok(ActiveSet::from_snapshot(&snapshot))
}

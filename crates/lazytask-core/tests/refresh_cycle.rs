use lazytask_core::{
    CellTone, CommandError, CommandOutput, CommandRunner, PanelId, PanelSource, ReportQuery,
    RefreshEvent, RefreshWorker, SwitchOutcome, TableModel, TaskCommands,
};
use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TASK_NEXT: &str = "
ID Age   Description        Urg
-- ----- ------------------ ----
 2 3d    Buy eggs              1
 1 2w    Buy milk            2.3
 3 1min  Bake cake             0

3 tasks
";

const TIMEW_SUMMARY: &str = "
Wk  Date       Day ID Tags                       Start      End    Time   Total
--- ---------- --- -- ----------------------- -------- -------- ------- -------
W36 2020-09-03 Thu @2 Planning with GL and KS  9:00:00 10:00:00 1:00:00
                   @1 code reviews            10:14:59        - 1:15:01 2:15:01

                                                                        2:15:01

";

fn active_report(ids: &[u32]) -> CommandOutput {
    if ids.is_empty() {
        return CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "No matches.\n".to_string(),
        };
    }
    let mut stdout = "\nID Description\n-- -----------\n".to_string();
    for id in ids {
        stdout.push_str(&format!("{id:>2} running\n"));
    }
    stdout.push_str(&format!("\n{} tasks\n", ids.len()));
    CommandOutput {
        code: Some(0),
        stdout,
        stderr: String::new(),
    }
}

/// Fake Taskwarrior/Timewarrior keeping just enough state for start/stop.
#[derive(Default)]
struct FakeTools {
    active: Mutex<Vec<u32>>,
    log: Mutex<Vec<String>>,
    broken: Mutex<HashMap<String, String>>,
}

impl FakeTools {
    fn break_command(&self, command: &str, stderr: &str) {
        self.broken
            .lock()
            .unwrap()
            .insert(command.to_string(), stderr.to_string());
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let command = format!("{program} {}", args.join(" "));
        self.log.lock().unwrap().push(command.clone());
        if let Some(stderr) = self.broken.lock().unwrap().get(&command) {
            return Ok(CommandOutput {
                code: Some(2),
                stdout: String::new(),
                stderr: stderr.clone(),
            });
        }

        let ok = |stdout: &str| CommandOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        };
        let mut active = self.active.lock().unwrap();
        let reply = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["next"] => ok(TASK_NEXT),
            ["active"] => active_report(&active),
            ["summary", ":ids"] => ok(TIMEW_SUMMARY),
            [ids, "stop"] => {
                let stopped: Vec<u32> = ids.split(',').filter_map(|id| id.parse().ok()).collect();
                active.retain(|id| !stopped.contains(id));
                ok("")
            }
            [id, "start"] => {
                active.push(id.parse().unwrap());
                ok("")
            }
            _ => ok(""),
        };
        Ok(reply)
    }
}

fn recv(rx: &mpsc::Receiver<RefreshEvent>) -> RefreshEvent {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("refresh event within timeout")
}

fn updated_model(event: RefreshEvent) -> TableModel {
    match event {
        RefreshEvent::Updated { model, .. } => model,
        RefreshEvent::Skipped { reason, .. } => panic!("refresh skipped: {reason}"),
    }
}

#[test]
fn startup_refresh_builds_both_panels() {
    let tools = FakeTools::default();
    let tasks = PanelSource::tasks("task", "next");
    let intervals = PanelSource::intervals("timew", ReportQuery::default_interval_args(), 3);

    let mut task_model = TableModel::new();
    tasks.refresh(&tools, &mut task_model).unwrap();
    assert_eq!(task_model.row_count(), 4);
    assert_eq!(task_model.text(0, 2), Some("Description"));
    assert_eq!(task_model.text(1, 2), Some("Buy milk"));
    assert_eq!(task_model.text(3, 3), Some("0"));

    let mut interval_model = TableModel::new();
    intervals.refresh(&tools, &mut interval_model).unwrap();
    assert_eq!(interval_model.column_count(), 9);
    assert_eq!(interval_model.selectable_column(1), Some(3));
    assert_eq!(interval_model.text(2, 6), Some("-"));
    assert_eq!(interval_model.text(2, 8), Some("2:15:01"));
}

#[test]
fn worker_publishes_active_rows_after_switch() {
    let tools = Arc::new(FakeTools::default());
    let runner: Arc<dyn CommandRunner> = tools.clone();
    let (tx, rx) = mpsc::channel();
    let (worker, handle) = RefreshWorker::new(
        PanelSource::tasks("task", "next"),
        runner.clone(),
        Duration::from_secs(3600),
        TableModel::new(),
        tx,
    );
    assert_eq!(handle.panel(), PanelId::Tasks);
    let _join = worker.spawn().unwrap();

    handle.nudge();
    let model = updated_model(recv(&rx));
    assert!(model
        .rows()
        .iter()
        .skip(1)
        .all(|cells| cells.iter().all(|cell| cell.tone == CellTone::Normal)));

    let commands = TaskCommands::new("task", runner);
    let outcome = commands.switch_to("2").unwrap();
    assert_eq!(
        outcome,
        SwitchOutcome::Started {
            id: 2,
            stopped: Vec::new()
        }
    );
    assert_eq!(commands.switch_to("2").unwrap(), SwitchOutcome::AlreadyActive(2));

    handle.nudge();
    let model = updated_model(recv(&rx));
    assert_eq!(model.cell(2, 0).map(|cell| cell.tone), Some(CellTone::Active));
    assert_eq!(model.cell(1, 0).map(|cell| cell.tone), Some(CellTone::Normal));

    let starts = tools
        .log()
        .iter()
        .filter(|command| command.ends_with("start"))
        .count();
    assert_eq!(starts, 1);
}

#[test]
fn background_failure_is_skipped_and_recovers() {
    let tools = Arc::new(FakeTools::default());
    let runner: Arc<dyn CommandRunner> = tools.clone();
    let source = PanelSource::intervals("timew", ReportQuery::default_interval_args(), 3);

    let mut seed = TableModel::new();
    source.refresh(runner.as_ref(), &mut seed).unwrap();

    let (tx, rx) = mpsc::channel();
    let (worker, handle) =
        RefreshWorker::new(source, runner, Duration::from_secs(3600), seed.clone(), tx);
    let _join = worker.spawn().unwrap();

    tools.break_command("timew summary :ids", "database is locked");
    handle.nudge();
    match recv(&rx) {
        RefreshEvent::Skipped { panel, reason } => {
            assert_eq!(panel, PanelId::Intervals);
            assert!(reason.contains("database is locked"));
        }
        other => panic!("expected skip, got {other:?}"),
    }

    tools.broken.lock().unwrap().clear();
    handle.nudge();
    let model = updated_model(recv(&rx));
    assert_eq!(model, seed);
}

#[test]
fn worker_exits_when_handle_is_dropped() {
    let runner: Arc<dyn CommandRunner> = Arc::new(FakeTools::default());
    let (tx, _rx) = mpsc::channel();
    let (worker, handle) = RefreshWorker::new(
        PanelSource::tasks("task", "next"),
        runner,
        Duration::from_millis(10),
        TableModel::new(),
        tx,
    );
    let join = worker.spawn().unwrap();
    drop(handle);
    join.join().unwrap();
}

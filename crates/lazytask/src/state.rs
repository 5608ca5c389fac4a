use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lazytask_core::{
    ActionError, PanelId, RefreshEvent, RefreshHandle, SwitchOutcome, TableModel, TaskCommands,
};
use ratatui::widgets::TableState;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const NOTICE_TTL: Duration = Duration::from_secs(4);
const TASK_ID_COLUMN: usize = 0;
const TASK_DESCRIPTION_HEADER: &str = "Description";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Tasks,
    Intervals,
}

impl Pane {
    pub fn other(self) -> Self {
        match self {
            Pane::Tasks => Pane::Intervals,
            Pane::Intervals => Pane::Tasks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    AddTask {
        input: String,
    },
    ConfirmDelete {
        id: String,
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

/// One panel's table plus its selection and scroll offset. Selection is kept in
/// model rows, where row 0 is the header.
#[derive(Debug, Default)]
pub struct PanelView {
    pub model: TableModel,
    pub state: TableState,
}

impl PanelView {
    pub fn new(model: TableModel) -> Self {
        let mut view = Self {
            model,
            state: TableState::default(),
        };
        view.restore_selection(None);
        view
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.state.selected().map(|idx| idx + 1)
    }

    pub fn selected_text(&self, column: usize) -> Option<&str> {
        let row = self.selected_row()?;
        self.model.text(row, column).filter(|text| !text.is_empty())
    }

    fn select_row(&mut self, row: Option<usize>) {
        self.state.select(row.and_then(|row| row.checked_sub(1)));
    }

    /// Swaps in a freshly reconciled model, keeping the selection on the same
    /// row when it still exists and is selectable.
    pub fn replace(&mut self, model: TableModel) {
        let previous = self.selected_row();
        self.model = model;
        self.restore_selection(previous);
    }

    fn restore_selection(&mut self, previous: Option<usize>) {
        let rows = self.model.row_count();
        if rows <= 1 {
            self.state.select(None);
            *self.state.offset_mut() = 0;
            return;
        }

        let anchor = previous.unwrap_or(1).clamp(1, rows - 1);
        let found = (anchor..rows)
            .find(|row| self.model.is_row_selectable(*row))
            .or_else(|| (1..anchor).rev().find(|row| self.model.is_row_selectable(*row)));
        self.select_row(found);
    }

    pub fn move_selection(&mut self, delta: isize) {
        let rows: Vec<usize> = (1..self.model.row_count())
            .filter(|row| self.model.is_row_selectable(*row))
            .collect();
        if rows.is_empty() {
            return;
        }

        let current = self
            .selected_row()
            .and_then(|selected| rows.iter().position(|row| *row == selected));
        let next = match current {
            Some(idx) => (idx as isize + delta).rem_euclid(rows.len() as isize) as usize,
            None => 0,
        };
        self.select_row(Some(rows[next]));
    }
}

pub struct App {
    pub tasks: PanelView,
    pub intervals: PanelView,
    pub focus: Pane,
    pub overlay: Overlay,
    pub notice: Option<Notice>,
    commands: TaskCommands,
    refreshers: Vec<RefreshHandle>,
    should_quit: bool,
}

impl App {
    pub fn new(
        tasks: TableModel,
        intervals: TableModel,
        commands: TaskCommands,
        refreshers: Vec<RefreshHandle>,
    ) -> Self {
        Self {
            tasks: PanelView::new(tasks),
            intervals: PanelView::new(intervals),
            focus: Pane::Tasks,
            overlay: Overlay::None,
            notice: None,
            commands,
            refreshers,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn focused_mut(&mut self) -> &mut PanelView {
        match self.focus {
            Pane::Tasks => &mut self.tasks,
            Pane::Intervals => &mut self.intervals,
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        let expired = self
            .notice
            .as_ref()
            .is_some_and(|notice| now.duration_since(notice.shown_at) >= NOTICE_TTL);
        if expired {
            self.notice = None;
        }
    }

    pub fn apply(&mut self, event: RefreshEvent) {
        match event {
            RefreshEvent::Updated {
                panel,
                model,
                reset,
            } => {
                debug!(panel = panel.label(), reset, rows = model.row_count(), "panel updated");
                match panel {
                    PanelId::Tasks => self.tasks.replace(model),
                    PanelId::Intervals => self.intervals.replace(model),
                }
            }
            RefreshEvent::Skipped { panel, reason } => {
                self.error_notice(format!("{} refresh skipped: {reason}", panel.label()));
            }
        }
    }

    pub fn request_refresh(&self) {
        for handle in &self.refreshers {
            handle.nudge();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.overlay {
            Overlay::AddTask { .. } => {
                self.handle_add_key(key);
                return;
            }
            Overlay::ConfirmDelete { .. } => {
                self.handle_confirm_key(key);
                return;
            }
            Overlay::None => {}
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Right => {
                self.focus = self.focus.other();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.focused_mut().move_selection(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focused_mut().move_selection(-1);
            }
            KeyCode::Char('r') => {
                self.request_refresh();
                self.info_notice("Refreshing".to_string());
            }
            _ if self.focus == Pane::Tasks => self.handle_tasks_key(key),
            _ => {}
        }
    }

    fn handle_tasks_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.start_selected(),
            KeyCode::Char('a') => {
                self.overlay = Overlay::AddTask {
                    input: String::new(),
                };
            }
            KeyCode::Char('d') => self.complete_selected(),
            KeyCode::Char('s') => self.stop_active(),
            KeyCode::Delete | KeyCode::Backspace => {
                if let Some(id) = self.selected_task_id() {
                    let description = self.selected_description().unwrap_or_default();
                    self.overlay = Overlay::ConfirmDelete { id, description };
                }
            }
            _ => {}
        }
    }

    fn handle_add_key(&mut self, key: KeyEvent) {
        let Overlay::AddTask { input } = &mut self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.overlay = Overlay::None;
            }
            KeyCode::Enter => {
                let description = input.trim().to_string();
                if description.is_empty() {
                    return;
                }
                self.overlay = Overlay::None;
                match self.commands.add(&description) {
                    Ok(()) => self.after_action(format!("Added \"{description}\"")),
                    Err(err) => self.action_failed("add", err),
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(ch)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                input.push(ch);
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let Overlay::ConfirmDelete { id, .. } = &self.overlay else {
            return;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let id = id.clone();
                self.overlay = Overlay::None;
                match self.commands.delete(&id) {
                    Ok(id) => self.after_action(format!("Deleted task {id}")),
                    Err(err) => self.action_failed("delete", err),
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.overlay = Overlay::None;
            }
            _ => {}
        }
    }

    pub fn selected_task_id(&self) -> Option<String> {
        self.tasks
            .selected_text(TASK_ID_COLUMN)
            .map(str::to_string)
    }

    fn selected_description(&self) -> Option<String> {
        let column = self
            .tasks
            .model
            .rows()
            .first()?
            .iter()
            .position(|cell| cell.text == TASK_DESCRIPTION_HEADER)?;
        self.tasks.selected_text(column).map(str::to_string)
    }

    fn start_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.commands.switch_to(&id) {
            Ok(SwitchOutcome::AlreadyActive(id)) => {
                self.info_notice(format!("Task {id} is already running"));
            }
            Ok(SwitchOutcome::Started { id, stopped }) => {
                let message = if stopped.is_empty() {
                    format!("Started task {id}")
                } else {
                    let stopped: Vec<String> = stopped.iter().map(u32::to_string).collect();
                    format!("Started task {id}, stopped {}", stopped.join(","))
                };
                self.after_action(message);
            }
            Err(err) => self.action_failed("start", err),
        }
    }

    fn complete_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.commands.complete(&id) {
            Ok(id) => self.after_action(format!("Completed task {id}")),
            Err(err) => self.action_failed("complete", err),
        }
    }

    fn stop_active(&mut self) {
        let result = self.commands.active().and_then(|active| {
            self.commands.stop(&active)?;
            Ok(active)
        });
        match result {
            Ok(active) if active.is_empty() => self.info_notice("No active tasks".to_string()),
            Ok(active) => self.after_action(format!("Stopped task {}", active.joined())),
            Err(err) => self.action_failed("stop", err),
        }
    }

    fn after_action(&mut self, message: String) {
        self.info_notice(message);
        self.request_refresh();
    }

    fn action_failed(&mut self, action: &str, err: ActionError) {
        warn!(action, error = %err, "task action failed");
        self.error_notice(format!("{action} failed: {err}"));
    }

    fn info_notice(&mut self, text: String) {
        self.notice = Some(Notice {
            text,
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    fn error_notice(&mut self, text: String) {
        self.notice = Some(Notice {
            text,
            is_error: true,
            shown_at: Instant::now(),
        });
    }
}

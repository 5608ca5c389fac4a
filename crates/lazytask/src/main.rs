mod config;
mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use config::Config;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lazytask_core::{
    CommandRunner, PanelSource, RefreshEvent, RefreshHandle, RefreshWorker, SystemRunner,
    TableModel, TaskCommands,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::{self, OpenOptions},
    io,
    path::Path,
    sync::{
        mpsc::{self, Receiver},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config);

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let task_source = PanelSource::tasks(&config.task.program, &config.task.report);
    let interval_source = PanelSource::intervals(
        &config.timew.program,
        config.timew.summary_args.clone(),
        config.timew.selectable_column,
    );

    let mut task_model = TableModel::new();
    task_source
        .refresh(runner.as_ref(), &mut task_model)
        .with_context(|| format!("Failed to load {}", task_source.query.describe()))?;
    let mut interval_model = TableModel::new();
    interval_source
        .refresh(runner.as_ref(), &mut interval_model)
        .with_context(|| format!("Failed to load {}", interval_source.query.describe()))?;
    info!(
        tasks = task_model.row_count(),
        intervals = interval_model.row_count(),
        "initial snapshot loaded"
    );

    let (events_tx, events_rx) = mpsc::channel();
    let (task_worker, task_handle) = RefreshWorker::new(
        task_source,
        runner.clone(),
        config.refresh_interval(),
        task_model.clone(),
        events_tx.clone(),
    );
    let (interval_worker, interval_handle) = RefreshWorker::new(
        interval_source,
        runner.clone(),
        config.refresh_interval(),
        interval_model.clone(),
        events_tx,
    );
    task_worker.spawn().context("Failed to spawn task refresher")?;
    interval_worker
        .spawn()
        .context("Failed to spawn interval refresher")?;

    let (watcher, watch_rx) = match config.watch_dir() {
        Some(dir) => setup_watcher(&dir),
        None => (None, None),
    };

    let commands = TaskCommands::new(&config.task.program, runner);
    let mut app = state::App::new(
        task_model,
        interval_model,
        commands,
        vec![task_handle.clone(), interval_handle],
    );

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, &events_rx, watch_rx, &task_handle);
    restore_terminal(&mut terminal)?;
    drop(watcher);

    if let Err(err) = &result {
        warn!(error = %err, "event loop failed");
    }
    result
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let file = config.log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init(),
    };
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut state::App,
    events_rx: &Receiver<RefreshEvent>,
    watch_rx: Option<Receiver<()>>,
    task_handle: &RefreshHandle,
) -> Result<()> {
    let input_poll = Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(input_poll)? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    app.handle_key(key);
                }
            }
        }

        while let Ok(event) = events_rx.try_recv() {
            app.apply(event);
        }

        if let Some(rx) = &watch_rx {
            let mut changed = false;
            while rx.try_recv().is_ok() {
                changed = true;
            }
            if changed {
                task_handle.nudge();
            }
        }

        app.on_tick(Instant::now());

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

fn setup_watcher(dir: &Path) -> (Option<RecommendedWatcher>, Option<Receiver<()>>) {
    let (tx, rx) = mpsc::sync_channel(1);
    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if res.is_ok() {
                let _ = tx.try_send(());
            }
        },
        notify::Config::default(),
    ) {
        Ok(watcher) => watcher,
        Err(err) => {
            warn!(error = %err, "file watcher unavailable");
            return (None, None);
        }
    };

    if let Err(err) = watcher.watch(dir, RecursiveMode::NonRecursive) {
        warn!(dir = %dir.display(), error = %err, "failed to watch task data");
        return (None, None);
    }
    info!(dir = %dir.display(), "watching task data");
    (Some(watcher), Some(rx))
}

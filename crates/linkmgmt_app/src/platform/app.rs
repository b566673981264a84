use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures_util::StreamExt;
use linkmgmt_core::{update, AppConfig, AppState, Msg};
use linkmgmt_engine::{LinkApi, ScrapeOrchestrator};
use linkmgmt_logging::{lm_debug, lm_error, lm_info};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use super::effects::EffectRunner;
use super::keys::map_key;
use super::ui;

/// Spinner and redraw cadence.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode plus alternate screen, undone on drop.
struct TerminalGuard {
    terminal: Tui,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        install_panic_hook();
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                restore_terminal();
                Err(err)
            }
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
        let _ = self.terminal.show_cursor();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        original(info);
    }));
}

/// Runs the interactive client until the user quits.
pub async fn run_app(
    config: AppConfig,
    api: Arc<dyn LinkApi>,
    orchestrator: ScrapeOrchestrator,
) -> anyhow::Result<()> {
    let (msg_tx, msg_rx) = mpsc::unbounded_channel::<Msg>();
    let mut runner = EffectRunner::new(api, orchestrator, msg_tx);
    let mut guard = TerminalGuard::enter()?;

    lm_info!("Starting interactive session ({:?})", config.launch);
    let result = event_loop(&mut guard.terminal, AppState::new(config), &mut runner, msg_rx).await;
    runner.cancel_all();
    drop(guard);

    if let Err(err) = &result {
        lm_error!("Event loop failed: {err:#}");
    }
    result
}

async fn event_loop(
    terminal: &mut Tui,
    mut state: AppState,
    runner: &mut EffectRunner,
    mut msg_rx: mpsc::UnboundedReceiver<Msg>,
) -> anyhow::Result<()> {
    let size = terminal.size()?;
    state = apply(
        state,
        Msg::Resize {
            width: size.width,
            height: size.height,
        },
        runner,
    );
    let effects = state.init();
    runner.enqueue(effects);

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    draw(terminal, &mut state)?;
    while !state.should_quit() {
        let msg = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => match map_event(event) {
                    Some(msg) => msg,
                    None => continue,
                },
                Some(Err(err)) => return Err(err.into()),
                None => {
                    lm_info!("Terminal event stream closed");
                    break;
                }
            },
            Some(msg) = msg_rx.recv() => msg,
            _ = ticker.tick() => Msg::Tick,
        };

        linkmgmt_logging::begin_message();
        state = apply(state, msg, runner);
        draw(terminal, &mut state)?;
    }

    lm_info!(
        "Event loop finished after {} messages, {} jobs still tracked",
        linkmgmt_logging::messages_seen(),
        runner.active_jobs()
    );
    Ok(())
}

fn apply(state: AppState, msg: Msg, runner: &mut EffectRunner) -> AppState {
    let finished_job = match &msg {
        Msg::ScrapeFinished { job_id, .. } => Some(*job_id),
        Msg::Tick => None,
        other => {
            lm_debug!("Applying {other:?}");
            None
        }
    };
    let (state, effects) = update(state, msg);
    if let Some(job_id) = finished_job {
        runner.forget_job(job_id);
    }
    runner.enqueue(effects);
    state
}

fn draw(terminal: &mut Tui, state: &mut AppState) -> io::Result<()> {
    if state.consume_dirty() {
        terminal.draw(|frame| ui::render::render(frame, state))?;
    }
    Ok(())
}

fn map_event(event: Event) -> Option<Msg> {
    match event {
        Event::Key(key) => map_key(key).map(Msg::Key),
        Event::Resize(width, height) => Some(Msg::Resize { width, height }),
        _ => None,
    }
}

use funkide::app::Workbench;
use funkide::core::event::InputEvent;
use funkide::kernel::services::adapters::storage::default_storage_dir;
use funkide::kernel::services::adapters::{self, AsyncRuntime, LocalStorage};
use funkide::tui::screen::{install_panic_restore, Screen, TerminationSignal};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::sync::mpsc;
use std::time::Duration;

mod logging;

const IDLE_POLL: Duration = Duration::from_millis(50);

fn main() -> io::Result<()> {
    let log_guard = logging::init();

    if let Err(e) = adapters::ensure_settings_file() {
        tracing::warn!(error = %e, "cannot create settings file");
    }
    let settings = adapters::load_settings().unwrap_or_default();

    let configured = settings.storage_dir.clone();
    let storage = match LocalStorage::open_configured(configured, default_storage_dir) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(error = %e, "storage init failed");
            eprintln!("funkide: {e}");
            if let Some(guard) = log_guard.as_ref() {
                eprintln!("logs: {}", guard.log_dir().display());
            }
            drop(log_guard);
            std::process::exit(1);
        }
    };

    let (tx, rx) = mpsc::channel();
    let runtime = AsyncRuntime::new(tx)?;
    let mut workbench = Workbench::new(Box::new(storage), settings, runtime, rx);

    let mut screen = Screen::enter()?;
    install_panic_restore(screen.restore_handle());
    let (signal_tx, signal_rx) = mpsc::channel::<TerminationSignal>();
    #[cfg(unix)]
    funkide::tui::screen::spawn_signal_listener(screen.restore_handle(), signal_tx)?;
    #[cfg(not(unix))]
    drop(signal_tx);

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let exit_signal = run_loop(&mut terminal, &mut screen, &mut workbench, &signal_rx)?;

    drop(terminal);
    drop(screen);

    if let Some(signal) = exit_signal {
        tracing::info!(?signal, "exiting on signal");
        drop(log_guard);
        std::process::exit(signal.exit_code());
    }

    tracing::info!("funkide exited");
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: &mut Screen,
    workbench: &mut Workbench,
    signal_rx: &mpsc::Receiver<TerminationSignal>,
) -> io::Result<Option<TerminationSignal>> {
    let mut dirty = true;
    loop {
        if let Ok(signal) = signal_rx.try_recv() {
            return Ok(Some(signal));
        }

        if dirty {
            if let Err(e) = screen.sync_title(&workbench.title()) {
                tracing::debug!(error = %e, "cannot set terminal title");
            }
            terminal.draw(|frame| {
                let area = frame.area();
                workbench.render(frame, area);
                if let Some((x, y)) = workbench.cursor_position() {
                    frame.set_cursor_position((x, y));
                }
            })?;
            dirty = false;
        }

        if crossterm::event::poll(workbench.poll_timeout(IDLE_POLL))? {
            let event = InputEvent::from(crossterm::event::read()?);
            let result = workbench.handle_input(&event);
            if result.is_quit() || workbench.should_quit() {
                return Ok(None);
            }
            dirty |= result.needs_redraw();
        }

        dirty |= workbench.tick();
        if workbench.should_quit() {
            return Ok(None);
        }
    }
}

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stderr};
use std::time::Duration;
use tokio::sync::mpsc;

/// Cadence of the `Tick` event, which drives the "Thinking..." ellipsis.
pub const TICK_INTERVAL: Duration = Duration::from_millis(300);

// The terminal lives on stderr so stdout stays clean for redirection.
pub type Tui = Terminal<CrosstermBackend<Stderr>>;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// Funnels terminal input and the animation tick into one channel the
/// run loop can await on.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::spawn_input_reader(tx.clone());
        Self::spawn_ticker(tx.clone());
        Self { rx, _tx: tx }
    }

    fn spawn_input_reader(tx: mpsc::UnboundedSender<AppEvent>) {
        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(Ok(evt)) = reader.next().await {
                let app_event = match evt {
                    // Some terminals report key releases too; only presses
                    // should drive the app.
                    Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                    Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
                    _ => None,
                };

                if let Some(event) = app_event {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            }
        });
    }

    fn spawn_ticker(tx: mpsc::UnboundedSender<AppEvent>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Put the terminal into raw mode on the alternate screen and hand back
/// the ratatui handle. Installs a panic hook first so a crash anywhere
/// still lands the user back on a usable terminal.
pub fn enter() -> Result<Tui> {
    install_panic_hook();

    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

/// Undo `enter`. Safe to call from the panic hook as well as the normal
/// shutdown path.
pub fn exit() -> Result<()> {
    execute!(io::stderr(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = exit();
        original_hook(panic_info);
    }));
}

use anyhow::Result;

mod api;
mod app;
mod config;
mod conversation;
mod handler;
mod history;
mod message;
mod theme;
mod tui;
mod ui;

use api::ChatClient;
use app::App;
use config::{resolve_base_url, Environment, Platform};
use theme::ThemeStore;

#[tokio::main]
async fn main() -> Result<()> {
    let base_url = resolve_base_url(Environment::from_env(), Platform::Host);
    let client = ChatClient::new(&base_url);
    let theme_store = ThemeStore::load(config::default_prefs_path()?);
    let mut app = App::new(client, theme_store);

    let mut terminal = tui::enter()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::exit()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    loop {
        // Reap completed sends and fetches before drawing so their
        // outcomes show up in the same frame.
        app.poll_tasks().await;

        terminal.draw(|frame| ui::render(frame, app))?;

        if app.should_quit {
            break;
        }

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

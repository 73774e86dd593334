use anyhow::anyhow;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::api::ChatClient;
use crate::conversation::Conversation;
use crate::history::History;
use crate::message::Message;
use crate::theme::{Theme, ThemeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Explore,
    History,
    Settings,
}

/// Conversation starters shown on the Explore screen; picking one
/// pre-fills the chat draft.
pub const SUGGESTED_PROMPTS: [&str; 5] = [
    "Tell me a fun fact about space!",
    "Can you generate a short story for me?",
    "What's a good productivity hack?",
    "Teach me something new in 30 seconds!",
    "What's an underrated travel destination?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Conversation state
    pub conversation: Conversation,
    pub draft_cursor: usize, // cursor position in the draft, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // height of the transcript area, set during render
    pub total_chat_lines: u32, // wrapped line count; u32 since messages have no length cap

    // Explore state
    pub prompt_state: ListState,

    // History state
    pub history: History,
    pub history_state: ListState,

    // Theme state
    pub theme_store: ThemeStore,
    pub theme_state: ListState,
    pub system_dark: bool,

    // In-flight work, polled for completion by the run loop
    pub send_task: Option<JoinHandle<anyhow::Result<String>>>,
    pub history_task: Option<JoinHandle<anyhow::Result<Vec<Message>>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Network
    pub client: ChatClient,
}

impl App {
    pub fn new(client: ChatClient, theme_store: ThemeStore) -> Self {
        let mut theme_state = ListState::default();
        let selected = Theme::all()
            .iter()
            .position(|t| *t == theme_store.theme())
            .unwrap_or(0);
        theme_state.select(Some(selected));

        Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Editing,

            conversation: Conversation::new(),
            draft_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            total_chat_lines: 0,

            prompt_state: ListState::default().with_selected(Some(0)),

            history: History::new(),
            history_state: ListState::default(),

            theme_store,
            theme_state,
            // Terminals skew dark; used only when the theme is Auto.
            system_dark: true,

            send_task: None,
            history_task: None,

            animation_frame: 0,

            client,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.theme_store.effective_dark(self.system_dark)
    }

    /// Kick off a send for the current draft. No-op when the draft is
    /// blank or a send is already in flight.
    pub fn submit_draft(&mut self) {
        if let Some(text) = self.conversation.begin_send() {
            self.draft_cursor = 0;
            self.scroll_chat_to_bottom();

            let client = self.client.clone();
            self.send_task = Some(tokio::spawn(async move {
                client.send_message(&text).await
            }));
        }
    }

    /// Kick off a history fetch unless one is already running.
    pub fn request_history(&mut self) {
        if !self.history.begin_load() {
            return;
        }

        let client = self.client.clone();
        self.history_task = Some(tokio::spawn(async move {
            client.fetch_history().await
        }));
    }

    pub fn enter_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = match screen {
            Screen::Chat => InputMode::Editing,
            _ => InputMode::Normal,
        };

        // The history screen fetches once on first entry.
        if screen == Screen::History && !self.history.has_loaded() && self.history_task.is_none() {
            self.request_history();
        }
    }

    pub fn next_screen(&mut self) {
        let next = match self.screen {
            Screen::Chat => Screen::Explore,
            Screen::Explore => Screen::History,
            Screen::History => Screen::Settings,
            Screen::Settings => Screen::Chat,
        };
        self.enter_screen(next);
    }

    /// Reap finished background tasks and feed their outcomes back into
    /// the owning state. A panicked task counts as a failure.
    pub async fn poll_tasks(&mut self) {
        if self.send_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.send_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow!("send task failed: {}", e)),
                };
                self.conversation.complete_send(result);
                self.scroll_chat_to_bottom();
            }
        }

        if self.history_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.history_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow!("history task failed: {}", e)),
                };
                self.history.finish_load(result);
                if !self.history.visible().is_empty() && self.history_state.selected().is_none() {
                    self.history_state.select(Some(0));
                }
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        let max = self.total_chat_lines.saturating_sub(u32::from(self.chat_height));
        if u32::from(self.chat_scroll) < max {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = u16::MAX; // clamped against content during render
    }

    // Explore list navigation
    pub fn prompt_nav_down(&mut self) {
        let len = SUGGESTED_PROMPTS.len();
        let i = self.prompt_state.selected().unwrap_or(0);
        self.prompt_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn prompt_nav_up(&mut self) {
        let i = self.prompt_state.selected().unwrap_or(0);
        self.prompt_state.select(Some(i.saturating_sub(1)));
    }

    /// Pre-fill the chat draft with the selected suggestion and jump to
    /// the chat screen ready to edit or send.
    pub fn pick_prompt(&mut self) {
        if let Some(prompt) = self
            .prompt_state
            .selected()
            .and_then(|i| SUGGESTED_PROMPTS.get(i))
        {
            self.conversation.update_draft(*prompt);
            self.draft_cursor = prompt.chars().count();
            self.enter_screen(Screen::Chat);
        }
    }

    // History list navigation
    pub fn history_nav_down(&mut self) {
        let len = self.history.visible().len();
        if len > 0 {
            // Nothing selected yet (fresh load, or private mode just
            // toggled off): land on the first entry, not the second.
            let next = match self.history_state.selected() {
                Some(i) => (i + 1).min(len - 1),
                None => 0,
            };
            self.history_state.select(Some(next));
        }
    }

    pub fn history_nav_up(&mut self) {
        let i = self.history_state.selected().unwrap_or(0);
        self.history_state.select(Some(i.saturating_sub(1)));
    }

    // Settings list navigation
    pub fn theme_nav_down(&mut self) {
        let len = Theme::all().len();
        let i = self.theme_state.selected().unwrap_or(0);
        self.theme_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn theme_nav_up(&mut self) {
        let i = self.theme_state.selected().unwrap_or(0);
        self.theme_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_theme(&mut self) {
        if let Some(i) = self.theme_state.selected() {
            if let Some(theme) = Theme::all().get(i).copied() {
                self.theme_store.set_theme(theme);
            }
        }
    }
}

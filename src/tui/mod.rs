// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod app;
pub mod event;
pub mod ui;
pub mod widgets;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use tokio::sync::mpsc;
use tracing::debug;

use crate::channels::ChannelList;
use crate::config::Config;
use crate::player::{Player, PlayerEvent};

pub use app::{Action, App};
pub use event::{Event, EventHandler};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    pub event_handler: EventHandler,
}

impl Tui {
    pub fn new(tick_rate: u64, player_events: mpsc::UnboundedReceiver<PlayerEvent>) -> Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let event_handler = EventHandler::new(tick_rate, player_events);
        Ok(Self {
            terminal,
            event_handler,
        })
    }

    pub fn init(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw(&mut self, app: &mut App) -> Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, app))?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Open the video window, tune `start` (or the first channel) and run until quit
pub async fn run_tui(config: Config, channels: ChannelList, start: Option<usize>) -> Result<()> {
    let (player_tx, player_rx) = mpsc::unbounded_channel();

    // Launch before taking over the terminal so startup errors print cleanly
    let mut player = Player::new(&config);
    player.launch(player_tx).await?;

    let mut tui = Tui::new(config.ui.tick_rate_ms, player_rx)?;
    tui.init()?;

    let mut app = App::new(config, channels, player);
    if let Some(idx) = start {
        app.cursor = idx;
    }
    app.play_current();

    let res = run_app(&mut tui, &mut app).await;

    // Clean up player resources before exiting
    let _ = app.player.shutdown().await;

    tui.exit()?;

    res
}

async fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    tui.draw(app)?;

    loop {
        let should_redraw = match tui.event_handler.next().await? {
            Event::Key(key_event) => match app.handle_key_event(key_event) {
                Some(Action::Quit) => break,
                None => true,
            },
            Event::Player(player_event) => {
                debug!("Player event: {:?}", player_event);
                match app.handle_player_event(player_event) {
                    Some(Action::Quit) => break,
                    None => true,
                }
            }
            Event::Resize(_, _) => true,
            Event::Tick => app.tick(),
        };

        if should_redraw {
            tui.draw(app)?;
        }
    }

    Ok(())
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::channels::{Channel, ChannelList};
use crate::config::Config;
use crate::keys::Command;
use crate::osd::{self, StatusOverlay};
use crate::player::{Player, PlayerEvent};
use crate::search::ChannelSearch;
use crate::tuning::TuneRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
}

pub struct App {
    pub config: Config,
    pub channels: ChannelList,
    /// Index of the channel on screen; meaningless while `channels` is empty
    pub cursor: usize,
    pub player: Player,
    pub title: String,
    pub fullscreen: bool,
    pub muted: bool,
    pub subtitle_track: Option<i64>,
    pub overlay: Option<StatusOverlay>,
    pub search: Option<ChannelSearch>,
    pub show_help: bool,
    pub logs: Vec<(DateTime<Local>, String)>,
    pub scroll_offset: usize,
    pub visible_height: usize,
}

impl App {
    pub fn new(config: Config, channels: ChannelList, player: Player) -> Self {
        let fullscreen = config.player.fullscreen;
        let mut app = Self {
            config,
            channels,
            cursor: 0,
            player,
            title: osd::window_title(None),
            fullscreen,
            muted: false,
            subtitle_track: None,
            overlay: None,
            search: None,
            show_help: false,
            logs: Vec::new(),
            scroll_offset: 0,
            visible_height: 20, // Updated on first render
        };

        if app.channels.is_empty() {
            app.add_log("No channels in channel file".to_string());
        } else {
            app.add_log(format!("Loaded {} channels", app.channels.len()));
        }
        app
    }

    pub fn update_visible_height(&mut self, height: usize) {
        self.visible_height = height.max(1);
        self.ensure_cursor_visible();
    }

    pub fn current_channel(&self) -> Option<&Channel> {
        if self.channels.is_empty() {
            None
        } else {
            self.channels.get(self.cursor)
        }
    }

    fn overlay_timeout(&self) -> Duration {
        Duration::from_secs(self.config.osd.timeout_secs)
    }

    /// Expire the status overlay. Returns true if the screen needs redrawing.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        if self.overlay.as_ref().is_some_and(|o| o.is_expired(now)) {
            self.overlay = None;
            return true;
        }
        false
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        if self.search.is_some() {
            self.handle_search_key(key);
            return None;
        }

        if self.show_help {
            match key.code {
                KeyCode::Esc
                | KeyCode::Char('?')
                | KeyCode::F(1)
                | KeyCode::Char('q')
                | KeyCode::Char('Q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return None;
        }

        Command::from_key_event(&key).and_then(|command| self.execute(command))
    }

    pub fn handle_player_event(&mut self, event: PlayerEvent) -> Option<Action> {
        match event {
            PlayerEvent::MediaChanged => {
                self.on_media_changed();
                None
            }
            PlayerEvent::Key(name) => {
                Command::from_key_name(&name).and_then(|command| self.execute(command))
            }
            PlayerEvent::PlaybackError(reason) => {
                warn!("Playback failed: {}", reason);
                self.add_log(format!("⚠️ Playback failed: {}", reason));
                self.show_status(format!("No signal ({})", reason));
                None
            }
            PlayerEvent::Exited => {
                info!("Video window closed");
                Some(Action::Quit)
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> Option<Action> {
        match command {
            Command::Select(position) => self.select(position as i64),
            Command::Next => self.select(self.cursor as i64 + 1),
            Command::Previous => self.select(self.cursor as i64 - 1),
            Command::ToggleFullscreen => self.set_fullscreen(!self.fullscreen),
            Command::ToggleMute => self.toggle_mute(),
            Command::ToggleSubtitles => self.toggle_subtitles(),
            Command::Resize => self.resize_to_video(),
            Command::Reload => self.reload(),
            Command::Search => self.start_search(),
            Command::Help => self.show_help = !self.show_help,
            Command::Back => {
                if self.fullscreen {
                    self.set_fullscreen(false);
                } else {
                    return Some(Action::Quit);
                }
            }
            Command::Quit => return Some(Action::Quit),
        }
        None
    }

    /// Select a channel by position, wrapping past either end, and tune it
    pub fn select(&mut self, index: i64) {
        match self.channels.wrap_index(index) {
            Some(idx) => {
                self.cursor = idx;
                self.ensure_cursor_visible();
                self.play_current();
            }
            None => self.add_log("No channels to tune".to_string()),
        }
    }

    pub fn play_current(&mut self) {
        let Some(channel) = self.current_channel() else {
            return;
        };
        let request = TuneRequest::from_channel(channel);

        // Every channel starts with subtitles off
        self.subtitle_track = None;

        match self.player.tune(&request) {
            Ok(()) => self.add_log(format!("Tuning {}", request.name)),
            Err(e) => {
                warn!("Failed to tune {}: {:#}", request.name, e);
                self.add_log(format!("❌ Failed to tune {}: {}", request.name, e));
            }
        }
    }

    fn on_media_changed(&mut self) {
        let name = self.current_channel().map(|c| c.name.clone());
        self.title = osd::window_title(name.as_deref());

        if let Err(e) = self.player.set_title(&self.title) {
            warn!("Failed to set window title: {}", e);
        }

        if let Some(name) = name {
            info!("Now playing {}", name);
            self.add_log(format!("▶ {}", name));
            self.show_status(name);
        }
    }

    /// Show transient status text over the video and in the terminal
    fn show_status(&mut self, text: String) {
        let timeout = self.overlay_timeout();
        if let Err(e) = self.player.show_osd(&text, timeout) {
            warn!("Failed to show OSD: {}", e);
        }
        self.overlay = Some(StatusOverlay::new(text, timeout));
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
        if let Err(e) = self.player.set_fullscreen(fullscreen) {
            self.add_log(format!("❌ Failed to change fullscreen: {}", e));
        }
    }

    fn toggle_mute(&mut self) {
        match self.player.toggle_mute() {
            Ok(muted) => {
                self.muted = muted;
                self.show_status(if muted { "Muted" } else { "Unmuted" }.to_string());
            }
            Err(e) => self.add_log(format!("❌ Failed to toggle mute: {}", e)),
        }
    }

    fn toggle_subtitles(&mut self) {
        let was_on = self.subtitle_track.is_some();
        match self.player.toggle_subtitles() {
            Ok(track) => {
                self.subtitle_track = track;
                let status = match track {
                    Some(id) => format!("Subtitles on (track {})", id),
                    None if was_on => "Subtitles off".to_string(),
                    None => "No subtitles available".to_string(),
                };
                self.show_status(status);
            }
            Err(e) => self.add_log(format!("❌ Failed to toggle subtitles: {}", e)),
        }
    }

    fn resize_to_video(&mut self) {
        if self.fullscreen {
            self.set_fullscreen(false);
        }

        match self.player.resize_to_video() {
            Ok(Some((width, height))) => {
                self.add_log(format!("Window resized to {}x{}", width, height));
            }
            Ok(None) => self.add_log("No video to size the window to".to_string()),
            Err(e) => self.add_log(format!("❌ Failed to resize window: {}", e)),
        }
    }

    /// Re-read the channel file and retune the current position
    fn reload(&mut self) {
        match self.channels.reload() {
            Ok(channels) => {
                self.channels = channels;
                self.add_log(format!("Reloaded {} channels", self.channels.len()));
                self.select(self.cursor as i64);
            }
            Err(e) => {
                warn!("Failed to reload channels: {:#}", e);
                self.add_log(format!("❌ Failed to reload channels: {}", e));
            }
        }
    }

    fn start_search(&mut self) {
        let mut search = ChannelSearch::new();
        search.update(&self.channels);
        self.search = Some(search);
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Some(search) = self.search.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.search = None,
            KeyCode::Enter => {
                let selected = search.selected();
                self.search = None;
                if let Some(idx) = selected {
                    self.select(idx as i64);
                }
            }
            KeyCode::Tab => search.complete(&self.channels),
            KeyCode::Up => search.select_previous(),
            KeyCode::Down => search.select_next(),
            KeyCode::Backspace => search.pop(&self.channels),
            KeyCode::Char(c) => search.push(c, &self.channels),
            _ => {}
        }
    }

    pub fn add_log(&mut self, message: String) {
        self.logs.push((Local::now(), message));
        // Keep only last 100 logs
        if self.logs.len() > 100 {
            self.logs.remove(0);
        }
    }

    fn ensure_cursor_visible(&mut self) {
        let visible_height = self.visible_height.max(1);

        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible_height {
            self.scroll_offset = self.cursor + 1 - visible_height;
        }
    }
}

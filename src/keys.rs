// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Key bindings shared by the terminal and the video window.
//!
//! The video window belongs to mpv, so its keys are bound to
//! `script-message divibly-key <name>` and come back to us as IPC events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Message name mpv broadcasts for forwarded window keys
pub const KEY_MESSAGE: &str = "divibly-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Select a channel by list position
    Select(usize),
    Next,
    Previous,
    ToggleFullscreen,
    ToggleMute,
    ToggleSubtitles,
    Resize,
    Reload,
    Search,
    Help,
    /// Leave fullscreen, or exit when windowed
    Back,
    Quit,
}

/// mpv key name and the name it is forwarded under
const WINDOW_BINDINGS: &[(&str, &str)] = &[
    ("0", "0"),
    ("1", "1"),
    ("2", "2"),
    ("3", "3"),
    ("4", "4"),
    ("5", "5"),
    ("6", "6"),
    ("7", "7"),
    ("8", "8"),
    ("9", "9"),
    ("UP", "up"),
    ("RIGHT", "up"),
    ("DOWN", "down"),
    ("LEFT", "down"),
    ("f", "f"),
    ("F", "f"),
    ("m", "m"),
    ("M", "m"),
    ("s", "s"),
    ("S", "s"),
    ("z", "z"),
    ("Z", "z"),
    ("r", "r"),
    ("R", "r"),
    ("q", "q"),
    ("Q", "q"),
    ("/", "search"),
    ("?", "help"),
    ("F1", "help"),
    ("ESC", "esc"),
    ("CLOSE_WIN", "quit"),
];

/// Position selected by a digit key: `1`..`9` are the first nine channels, `0` the tenth
fn digit_position(c: char) -> Option<usize> {
    match c {
        '0' => Some(9),
        '1'..='9' => c.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    }
}

impl Command {
    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Command::Quit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char(c) => Self::from_char(c),
            KeyCode::Up | KeyCode::Right => Some(Command::Next),
            KeyCode::Down | KeyCode::Left => Some(Command::Previous),
            KeyCode::Esc => Some(Command::Back),
            KeyCode::F(1) => Some(Command::Help),
            _ => None,
        }
    }

    /// Map a key forwarded from the video window
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Command::Next),
            "down" => Some(Command::Previous),
            "esc" => Some(Command::Back),
            "search" => Some(Command::Search),
            "help" => Some(Command::Help),
            "quit" => Some(Command::Quit),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::from_char(c),
                    _ => None,
                }
            }
        }
    }

    fn from_char(c: char) -> Option<Self> {
        if let Some(position) = digit_position(c) {
            return Some(Command::Select(position));
        }

        match c.to_ascii_lowercase() {
            'f' => Some(Command::ToggleFullscreen),
            'm' => Some(Command::ToggleMute),
            's' => Some(Command::ToggleSubtitles),
            'z' => Some(Command::Resize),
            'r' => Some(Command::Reload),
            'q' => Some(Command::Back),
            '/' => Some(Command::Search),
            '?' => Some(Command::Help),
            _ => None,
        }
    }
}

/// mpv input.conf forwarding every bound window key to us
pub fn input_conf() -> String {
    WINDOW_BINDINGS
        .iter()
        .map(|(key, name)| format!("{} script-message {} {}\n", key, KEY_MESSAGE, name))
        .collect()
}

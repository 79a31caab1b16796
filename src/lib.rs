// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod channels;
pub mod config;
pub mod keys;
pub mod osd;
pub mod player;
pub mod search;
pub mod tui;
pub mod tuning;

pub use channels::{Channel, ChannelList};
pub use config::Config;
pub use player::Player;
pub use tui::run_tui;
pub use tuning::TuneRequest;

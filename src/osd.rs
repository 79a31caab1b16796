// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use std::time::{Duration, Instant};

pub const APP_TITLE: &str = "divibly";

/// Window title for the channel currently on screen
pub fn window_title(channel_name: Option<&str>) -> String {
    match channel_name {
        Some(name) => format!("{} ({})", APP_TITLE, name),
        None => APP_TITLE.to_string(),
    }
}

/// Transient status text that dismisses itself after a timeout
#[derive(Debug, Clone)]
pub struct StatusOverlay {
    pub text: String,
    shown_at: Instant,
    timeout: Duration,
}

impl StatusOverlay {
    pub fn new(text: impl Into<String>, timeout: Duration) -> Self {
        Self::shown_at(text, timeout, Instant::now())
    }

    pub fn shown_at(text: impl Into<String>, timeout: Duration, at: Instant) -> Self {
        Self {
            text: text.into(),
            shown_at: at,
            timeout,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.timeout
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.timeout
            .saturating_sub(now.saturating_duration_since(self.shown_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_includes_channel() {
        assert_eq!(window_title(Some("BBC ONE")), "divibly (BBC ONE)");
        assert_eq!(window_title(None), "divibly");
    }

    #[test]
    fn overlay_expires_after_timeout() {
        let start = Instant::now();
        let overlay = StatusOverlay::shown_at("ITV", Duration::from_secs(2), start);

        assert!(!overlay.is_expired(start));
        assert!(!overlay.is_expired(start + Duration::from_millis(1999)));
        assert!(overlay.is_expired(start + Duration::from_secs(2)));
        assert_eq!(
            overlay.remaining(start + Duration::from_millis(500)),
            Duration::from_millis(1500)
        );
        assert_eq!(overlay.remaining(start + Duration::from_secs(9)), Duration::ZERO);
    }
}

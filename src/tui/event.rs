// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::player::PlayerEvent;

#[derive(Debug, Clone)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),
    Player(PlayerEvent),
}

pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Merge terminal input, periodic ticks and player events into one stream
    pub fn new(tick_rate: u64, mut player_events: mpsc::UnboundedReceiver<PlayerEvent>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let input_sender = sender.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(tick_rate));
            loop {
                let event = if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            Some(Event::Key(key))
                        }
                        Ok(CrosstermEvent::Resize(width, height)) => {
                            Some(Event::Resize(width, height))
                        }
                        _ => None,
                    }
                } else {
                    None
                };

                if let Some(event) = event
                    && input_sender.send(event).is_err()
                {
                    break;
                }

                interval.tick().await;
                if input_sender.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(event) = player_events.recv().await {
                if sender.send(Event::Player(event)).is_err() {
                    break;
                }
            }
        });

        Self { receiver }
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Event channel closed"))
    }
}

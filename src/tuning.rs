// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::channels::Channel;

/// Everything the media engine needs to tune one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuneRequest {
    pub name: String,
    pub frequency: u32,
    pub bandwidth: u32,
    pub program: u32,
}

impl TuneRequest {
    pub fn from_channel(channel: &Channel) -> Self {
        Self {
            name: channel.name.clone(),
            frequency: channel.frequency,
            bandwidth: channel.bandwidth,
            program: channel.program,
        }
    }

    /// `dvb://<card>@<name>`; the explicit card keeps an `@` in the name intact
    pub fn location(&self, card: u32) -> String {
        format!("dvb://{}@{}", card, self.name)
    }

    /// A single DVB-T zap line; parameters other than frequency, bandwidth and
    /// service id are left for the frontend to detect.
    pub fn zap_line(&self) -> String {
        format!(
            "{}:{}:INVERSION_AUTO:BANDWIDTH_{}_MHZ:FEC_AUTO:FEC_AUTO:QAM_AUTO:\
             TRANSMISSION_MODE_AUTO:GUARD_INTERVAL_AUTO:HIERARCHY_AUTO:0:0:{}",
            self.name, self.frequency, self.bandwidth, self.program
        )
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(&path, format!("{}\n", self.zap_line())).with_context(|| {
            format!("Failed to write tuning file: {}", path.as_ref().display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn itv() -> TuneRequest {
        TuneRequest::from_channel(&Channel {
            name: "ITV".to_string(),
            frequency: 506_000_000,
            bandwidth: 7,
            program: 8261,
        })
    }

    #[test]
    fn zap_line_parses_back() {
        let request = itv();
        let line = request.zap_line();
        assert_eq!(line.split(':').count(), 13);

        let channel = Channel::parse_line(&line, 8).unwrap();
        assert_eq!(channel.name, request.name);
        assert_eq!(channel.frequency, request.frequency);
        assert_eq!(channel.bandwidth, request.bandwidth);
        assert_eq!(channel.program, request.program);
    }

    #[test]
    fn location_names_card_and_channel() {
        assert_eq!(itv().location(1), "dvb://1@ITV");

        let mut request = itv();
        request.name = "Film4 @ Home".to_string();
        assert_eq!(request.location(2), "dvb://2@Film4 @ Home");
    }

    #[test]
    fn writes_tuning_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tune.conf");
        itv().write_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("ITV:506000000:"));
        assert!(content.ends_with(":8261\n"));
    }
}

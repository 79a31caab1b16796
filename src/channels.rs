// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Channel table loaded from a zap-format `channels.conf`.
//!
//! Each line looks like
//! `NAME:FREQ:INVERSION:BANDWIDTH:FEC_HP:FEC_LP:MODULATION:TRANSMISSION:GUARD:HIERARCHY:VPID:APID:SERVICE_ID`.
//! Only the name, frequency, bandwidth tag and service id are used.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    /// Tuning frequency in Hz
    pub frequency: u32,
    /// Bandwidth in MHz
    pub bandwidth: u32,
    /// Service id within the multiplex
    pub program: u32,
}

impl Channel {
    /// Parse one channel line. Blank lines, comments and malformed lines give `None`.
    pub fn parse_line(line: &str, default_bandwidth: u32) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let fields: Vec<&str> = line.split(':').map(str::trim).collect();
        if fields.len() < 3 {
            return None;
        }

        let name = fields[0];
        if name.is_empty() {
            return None;
        }

        let frequency = fields[1].parse().ok()?;
        let program = fields[fields.len() - 1].parse().ok()?;
        let bandwidth = fields
            .get(3)
            .filter(|_| fields.len() > 4)
            .and_then(|tag| parse_bandwidth_tag(tag))
            .unwrap_or(default_bandwidth);

        Some(Self {
            name: name.to_string(),
            frequency,
            bandwidth,
            program,
        })
    }
}

/// Extract the MHz figure from tags like `BANDWIDTH_8_MHZ`, `8MHz` or `8`
fn parse_bandwidth_tag(tag: &str) -> Option<u32> {
    let digits: String = tag
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok().filter(|&mhz| mhz > 0)
}

#[derive(Debug, Clone, Default)]
pub struct ChannelList {
    channels: Vec<Channel>,
    path: Option<PathBuf>,
    default_bandwidth: u32,
}

impl ChannelList {
    pub fn parse(content: &str, default_bandwidth: u32) -> Self {
        let mut channels = Vec::new();

        for (lineno, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match Channel::parse_line(trimmed, default_bandwidth) {
                Some(channel) => channels.push(channel),
                None => warn!("Skipping malformed channel line {}: {}", lineno + 1, trimmed),
            }
        }

        Self {
            channels,
            path: None,
            default_bandwidth,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, default_bandwidth: u32) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read channel file: {}", path.display()))?;

        let mut list = Self::parse(&content, default_bandwidth);
        list.path = Some(path.to_path_buf());
        debug!("Loaded {} channels from {}", list.len(), path.display());
        Ok(list)
    }

    /// Re-read the file this list was loaded from
    pub fn reload(&self) -> Result<Self> {
        match &self.path {
            Some(path) => Self::load(path, self.default_bandwidth),
            None => Ok(self.clone()),
        }
    }

    /// Map a requested position onto the list: past the end wraps modulo the
    /// length, anything negative lands on the last channel.
    pub fn wrap_index(&self, index: i64) -> Option<usize> {
        let len = self.channels.len();
        if len == 0 {
            return None;
        }

        if index < 0 {
            Some(len - 1)
        } else {
            Some((index as u64 % len as u64) as usize)
        }
    }

    /// Case-insensitive exact name lookup
    pub fn find(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.channels
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BBC_ONE: &str = "BBC ONE:490000000:INVERSION_AUTO:BANDWIDTH_8_MHZ:FEC_3_4:FEC_3_4:QAM_16:TRANSMISSION_MODE_2K:GUARD_INTERVAL_1_32:HIERARCHY_NONE:101:102:4165";
    const SAMPLE: &str = "\
BBC ONE:490000000:INVERSION_AUTO:BANDWIDTH_8_MHZ:FEC_3_4:FEC_3_4:QAM_16:TRANSMISSION_MODE_2K:GUARD_INTERVAL_1_32:HIERARCHY_NONE:101:102:4165
# comment
BBC TWO:490000000:INVERSION_AUTO:BANDWIDTH_8_MHZ:FEC_3_4:FEC_3_4:QAM_16:TRANSMISSION_MODE_2K:GUARD_INTERVAL_1_32:HIERARCHY_NONE:201:202:4287

ITV:506000000:INVERSION_AUTO:BANDWIDTH_7_MHZ:FEC_2_3:FEC_2_3:QAM_64:TRANSMISSION_MODE_8K:GUARD_INTERVAL_1_32:HIERARCHY_NONE:601:602:8261
";

    #[test]
    fn parses_zap_line() {
        let channel = Channel::parse_line(BBC_ONE, 8).unwrap();
        assert_eq!(channel.name, "BBC ONE");
        assert_eq!(channel.frequency, 490_000_000);
        assert_eq!(channel.bandwidth, 8);
        assert_eq!(channel.program, 4165);
    }

    #[test]
    fn bandwidth_tag_variants() {
        assert_eq!(parse_bandwidth_tag("BANDWIDTH_7_MHZ"), Some(7));
        assert_eq!(parse_bandwidth_tag("6MHz"), Some(6));
        assert_eq!(parse_bandwidth_tag("8"), Some(8));
        assert_eq!(parse_bandwidth_tag("BANDWIDTH_AUTO"), None);
        assert_eq!(parse_bandwidth_tag("0"), None);
    }

    #[test]
    fn short_line_uses_default_bandwidth() {
        let channel = Channel::parse_line("Local:522000000:1234", 8).unwrap();
        assert_eq!(channel.bandwidth, 8);
        assert_eq!(channel.program, 1234);

        let auto = BBC_ONE.replace("BANDWIDTH_8_MHZ", "BANDWIDTH_AUTO");
        assert_eq!(Channel::parse_line(&auto, 6).unwrap().bandwidth, 6);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(Channel::parse_line("", 8).is_none());
        assert!(Channel::parse_line("# BBC:1:2", 8).is_none());
        assert!(Channel::parse_line("BBC ONE:490000000", 8).is_none());
        assert!(Channel::parse_line(":490000000:4165", 8).is_none());
        assert!(Channel::parse_line("BBC ONE:abc:4165", 8).is_none());
        assert!(Channel::parse_line("BBC ONE:490000000:x", 8).is_none());
    }

    #[test]
    fn tolerates_crlf() {
        let line = format!("{}\r", BBC_ONE);
        assert_eq!(Channel::parse_line(&line, 8).unwrap().program, 4165);
    }

    #[test]
    fn list_keeps_file_order() {
        let list = ChannelList::parse(SAMPLE, 8);
        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["BBC ONE", "BBC TWO", "ITV"]);
        assert_eq!(list.get(2).unwrap().bandwidth, 7);
    }

    #[test]
    fn wraps_indices() {
        let list = ChannelList::parse(SAMPLE, 8);
        let n = list.len() as i64;

        for i in 0..(n * 4) {
            assert_eq!(list.wrap_index(i), Some((i % n) as usize));
        }
        for i in [-1, -2, -7, i64::MIN] {
            assert_eq!(list.wrap_index(i), Some(2));
        }
        assert_eq!(list.wrap_index(i64::MAX), Some((i64::MAX % n) as usize));
    }

    #[test]
    fn empty_list_selects_nothing() {
        let list = ChannelList::parse("", 8);
        assert!(list.is_empty());
        assert_eq!(list.wrap_index(0), None);
        assert_eq!(list.wrap_index(-1), None);
    }

    #[test]
    fn find_is_case_insensitive() {
        let list = ChannelList::parse(SAMPLE, 8);
        assert_eq!(list.find("itv"), Some(2));
        assert_eq!(list.find(" bbc two "), Some(1));
        assert_eq!(list.find("BBC"), None);
    }

    #[test]
    fn load_and_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channels.conf");
        fs::write(&path, SAMPLE).unwrap();

        let list = ChannelList::load(&path, 8).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.path(), Some(path.as_path()));

        fs::write(&path, BBC_ONE).unwrap();
        let reloaded = list.reload().unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ChannelList::load(dir.path().join("missing.conf"), 8).is_err());
    }
}

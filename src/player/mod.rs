// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod mpv;

use anyhow::{Context, Result};
use mpv::MpvPlayer;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::config::{Config, OsdConfig, PlayerConfig, TuningConfig};
use crate::keys;
use crate::osd;
use crate::tuning::TuneRequest;

/// Asynchronous notifications from the media engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// A new stream was opened
    MediaChanged,
    /// Key pressed in the video window
    Key(String),
    PlaybackError(String),
    /// The engine shut down or its window was closed
    Exited,
}

/// First subtitle track id in an mpv `track-list`
pub fn first_subtitle_track(track_list: &Value) -> Option<i64> {
    track_list
        .as_array()?
        .iter()
        .filter(|track| track.get("type").and_then(Value::as_str) == Some("sub"))
        .find_map(|track| track.get("id").and_then(Value::as_i64))
}

/// Playback controller: tunes channels and drives the video window through mpv
pub struct Player {
    config: PlayerConfig,
    tuning: TuningConfig,
    osd: OsdConfig,
    runtime_dir: PathBuf,
    mpv: Option<MpvPlayer>,
    subtitle_track: Option<i64>,
}

impl Player {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.player.clone(),
            tuning: config.tuning.clone(),
            osd: config.osd.clone(),
            runtime_dir: mpv::runtime_dir(),
            mpv: None,
            subtitle_track: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.mpv.is_some()
    }

    fn mpv(&self) -> Result<&MpvPlayer> {
        self.mpv
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("mpv is not running"))
    }

    fn socket_path(&self) -> PathBuf {
        self.runtime_dir
            .join(format!("mpv-{}.sock", std::process::id()))
    }

    fn tune_path(&self) -> PathBuf {
        self.runtime_dir
            .join(format!("tune-{}.conf", std::process::id()))
    }

    fn input_conf_path(&self) -> PathBuf {
        self.runtime_dir.join("input.conf")
    }

    fn mpv_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.arg("--idle=yes")
            .arg("--force-window=yes")
            .arg("--no-terminal")
            .arg("--osc=no")
            .arg("--sid=no")
            .arg(format!("--title={}", osd::window_title(None)))
            .arg(format!("--geometry={}x{}", self.config.width, self.config.height))
            .arg(format!("--osd-font-size={}", self.osd.font_size))
            .arg(format!("--osd-color={}", self.osd.color))
            .arg("--input-default-bindings=no")
            .arg(format!("--input-conf={}", self.input_conf_path().display()))
            .arg(format!("--dvbin-file={}", self.tune_path().display()))
            .arg(format!("--dvbin-card={}", self.tuning.dvb_card));

        if self.config.fullscreen {
            cmd.arg("--fullscreen");
        }
        if self.config.deinterlace {
            cmd.arg("--deinterlace=yes");
        }

        cmd.args(&self.config.args);
        cmd
    }

    /// Start mpv and relay its events to `events`
    pub async fn launch(&mut self, events: UnboundedSender<PlayerEvent>) -> Result<()> {
        mpv::ensure_runtime_dir(&self.runtime_dir)?;

        fs::write(self.input_conf_path(), keys::input_conf()).with_context(|| {
            format!(
                "Failed to write input config: {}",
                self.input_conf_path().display()
            )
        })?;

        let mut mpv = MpvPlayer::new(self.socket_path());
        mpv.launch(self.mpv_command()).await?;
        mpv.listen(events)?;

        info!("MPV started");
        self.mpv = Some(mpv);
        Ok(())
    }

    /// Tune to a channel, replacing whatever is playing
    pub fn tune(&mut self, request: &TuneRequest) -> Result<()> {
        let mpv = self
            .mpv
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("mpv is not running"))?;

        debug!(
            "Tuning {} ({} Hz, {} MHz, program {})",
            request.name, request.frequency, request.bandwidth, request.program
        );
        request.write_to(self.tune_path())?;

        // A runtime `sid` carries over into the next loadfile
        mpv.set_property("sid", json!("no"))?;
        self.subtitle_track = None;

        let location = request.location(self.tuning.dvb_card);
        mpv.command(json!(["loadfile", location, "replace"]))
            .with_context(|| format!("Failed to tune {}", request.name))?;
        mpv.set_property("pause", json!(false))?;
        Ok(())
    }

    pub fn set_fullscreen(&self, fullscreen: bool) -> Result<()> {
        self.mpv()?.set_property("fullscreen", json!(fullscreen))
    }

    /// Flip mute, returning the new state
    pub fn toggle_mute(&self) -> Result<bool> {
        let mpv = self.mpv()?;
        mpv.command(json!(["cycle", "mute"]))?;
        Ok(mpv.get_property("mute")?.as_bool().unwrap_or(false))
    }

    /// Turn subtitles off if on, otherwise onto the first subtitle track.
    /// Returns the active track, `None` meaning off.
    pub fn toggle_subtitles(&mut self) -> Result<Option<i64>> {
        let mpv = self.mpv()?;

        let track = match self.subtitle_track {
            Some(_) => None,
            None => first_subtitle_track(&mpv.get_property("track-list")?),
        };

        match track {
            Some(id) => mpv.set_property("sid", json!(id))?,
            None => mpv.set_property("sid", json!("no"))?,
        }

        self.subtitle_track = track;
        Ok(track)
    }

    /// Display size of the current video, if any is decoded yet
    pub fn video_size(&self) -> Result<Option<(u32, u32)>> {
        let mpv = self.mpv()?;
        // Unavailable until the first frame is decoded
        let width = mpv.get_property("dwidth").ok().and_then(|v| v.as_u64());
        let height = mpv.get_property("dheight").ok().and_then(|v| v.as_u64());

        Ok(match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w as u32, h as u32)),
            _ => None,
        })
    }

    /// Size the window to the video's native size
    pub fn resize_to_video(&self) -> Result<Option<(u32, u32)>> {
        let size = self.video_size()?;
        if size.is_some() {
            self.mpv()?.set_property("window-scale", json!(1.0))?;
        }
        Ok(size)
    }

    pub fn set_title(&self, title: &str) -> Result<()> {
        self.mpv()?.set_property("title", json!(title))
    }

    pub fn show_osd(&self, text: &str, duration: Duration) -> Result<()> {
        self.mpv()?
            .command(json!(["show-text", text, duration.as_millis() as u64]))?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut mpv) = self.mpv.take() {
            mpv.shutdown().await?;
        }

        let tune_path = self.tune_path();
        if tune_path.exists() {
            let _ = fs::remove_file(tune_path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::Channel;

    #[test]
    fn picks_first_subtitle_track() {
        let tracks = json!([
            {"id": 1, "type": "video"},
            {"id": 1, "type": "audio"},
            {"id": 2, "type": "audio"},
            {"id": 3, "type": "sub", "lang": "eng"},
            {"id": 4, "type": "sub"}
        ]);
        assert_eq!(first_subtitle_track(&tracks), Some(3));
        assert_eq!(first_subtitle_track(&json!([{"id": 1, "type": "video"}])), None);
        assert_eq!(first_subtitle_track(&Value::Null), None);
    }

    #[test]
    fn operations_need_a_running_player() {
        let mut player = Player::new(&Config::default());
        let request = TuneRequest::from_channel(&Channel {
            name: "ITV".to_string(),
            frequency: 506_000_000,
            bandwidth: 8,
            program: 8261,
        });

        assert!(!player.is_running());
        assert!(player.tune(&request).is_err());
        assert!(player.toggle_mute().is_err());
        assert!(player.toggle_subtitles().is_err());
        assert!(player.set_fullscreen(false).is_err());
        assert!(player.video_size().is_err());
    }

    #[test]
    fn command_line_follows_config() {
        let mut config = Config::default();
        config.player.fullscreen = false;
        config.player.args = vec!["--hwdec=auto".to_string()];
        let player = Player::new(&config);

        let cmd = player.mpv_command();
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(args.contains(&"--geometry=1024x576".to_string()));
        assert!(args.contains(&"--deinterlace=yes".to_string()));
        assert!(args.contains(&"--osd-font-size=96".to_string()));
        assert!(!args.contains(&"--fullscreen".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--hwdec=auto"));
        assert!(args.iter().any(|a| a.starts_with("--dvbin-file=")));
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use super::PlayerEvent;
use crate::keys::KEY_MESSAGE;

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Per-user directory for the IPC socket, tuning file and input config
pub(super) fn runtime_dir() -> PathBuf {
    let state_dir = dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("state")));

    match state_dir {
        Some(dir) => dir.join("divibly"),
        None => {
            let uid = unsafe { libc::getuid() };
            std::env::temp_dir().join(format!("divibly-{}", uid))
        }
    }
}

/// Create the runtime directory owner-only
pub(super) fn ensure_runtime_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create runtime directory: {}", dir.display()))?;
        if let Err(e) = fs::set_permissions(dir, fs::Permissions::from_mode(0o700)) {
            warn!("Failed to set permissions on runtime directory: {}", e);
        }
    }
    Ok(())
}

/// Map an mpv IPC event onto what the viewer cares about
pub(super) fn parse_event(message: &Value) -> Option<PlayerEvent> {
    match message.get("event")?.as_str()? {
        "file-loaded" => Some(PlayerEvent::MediaChanged),
        "client-message" => {
            let args = message.get("args")?.as_array()?;
            match (args.first()?.as_str()?, args.get(1)?.as_str()?) {
                (KEY_MESSAGE, key) => Some(PlayerEvent::Key(key.to_string())),
                _ => None,
            }
        }
        "end-file" if message.get("reason").and_then(Value::as_str) == Some("error") => {
            let reason = message
                .get("file_error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            Some(PlayerEvent::PlaybackError(reason.to_string()))
        }
        "shutdown" => Some(PlayerEvent::Exited),
        _ => None,
    }
}

pub(super) struct MpvPlayer {
    socket_path: PathBuf,
    mpv_process: Option<Child>,
    next_request_id: AtomicU64,
}

impl MpvPlayer {
    pub(super) fn new(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            mpv_process: None,
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Send a command and wait for its reply, returning the reply's `data`
    pub(super) fn command(&self, args: Value) -> Result<Value> {
        let socket = UnixStream::connect(&self.socket_path).with_context(|| {
            format!("Failed to connect to MPV socket at {:?}", self.socket_path)
        })?;
        socket.set_read_timeout(Some(REPLY_TIMEOUT))?;

        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let command_str = serde_json::to_string(&json!({
            "command": args,
            "request_id": request_id,
        }))?;
        debug!("Sending MPV command: {}", command_str);

        let mut writer = &socket;
        writer.write_all(command_str.as_bytes())?;
        writer.write_all(b"\n")?;

        // Events are broadcast to every client, so skip lines until our reply
        let mut reader = BufReader::new(&socket);
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(anyhow::anyhow!("MPV closed the connection"));
            }

            let parsed: Value = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse MPV response: {}", line.trim()))?;

            if parsed.get("request_id").and_then(Value::as_u64) != Some(request_id) {
                continue;
            }

            if let Some(error) = parsed.get("error").and_then(Value::as_str)
                && error != "success"
            {
                return Err(anyhow::anyhow!("MPV command failed: {}", error));
            }

            return Ok(parsed.get("data").cloned().unwrap_or(Value::Null));
        }
    }

    pub(super) fn get_property(&self, name: &str) -> Result<Value> {
        self.command(json!(["get_property", name]))
    }

    pub(super) fn set_property(&self, name: &str, value: Value) -> Result<()> {
        self.command(json!(["set_property", name, value]))?;
        Ok(())
    }

    fn is_socket_ready(&self) -> bool {
        self.socket_path.exists() && self.get_property("mpv-version").is_ok()
    }

    /// Spawn mpv and wait until its IPC socket answers
    pub(super) async fn launch(&mut self, mut cmd: Command) -> Result<()> {
        if self.socket_path.exists() {
            let _ = fs::remove_file(&self.socket_path);
        }

        cmd.arg(format!("--input-ipc-server={}", self.socket_path.display()))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());

        debug!("MPV command: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .context("Failed to start MPV. Is MPV installed?")?;

        if let Some(stdout) = child.stdout.take() {
            thread::spawn(move || {
                let reader = BufReader::new(stdout);
                for line in reader.lines().map_while(Result::ok) {
                    debug!("MPV stdout: {}", line);
                }
            });
        }

        if let Some(stderr) = child.stderr.take() {
            thread::spawn(move || {
                let reader = BufReader::new(stderr);
                for line in reader.lines().map_while(Result::ok) {
                    if line.contains("error") || line.contains("ERROR") {
                        warn!("MPV stderr: {}", line);
                    } else {
                        debug!("MPV stderr: {}", line);
                    }
                }
            });
        }

        self.mpv_process = Some(child);

        for i in 0..20 {
            sleep(Duration::from_millis(250)).await;

            let exited = self
                .mpv_process
                .as_mut()
                .and_then(|proc| proc.try_wait().ok().flatten());
            if let Some(status) = exited {
                error!("MPV process exited unexpectedly with status: {:?}", status);
                self.mpv_process = None;
                return Err(anyhow::anyhow!(
                    "MPV process exited unexpectedly with status: {:?}",
                    status
                ));
            }

            if self.is_socket_ready() {
                debug!("MPV IPC socket ready after {} ms", (i + 1) * 250);
                return Ok(());
            }
            debug!("MPV IPC socket not ready yet, attempt {}/20", i + 1);
        }

        error!("MPV IPC socket failed to start after 5 seconds");
        Err(anyhow::anyhow!("MPV IPC socket failed to start after 5 seconds"))
    }

    /// Relay mpv events from a dedicated connection until the socket closes
    pub(super) fn listen(&self, events: UnboundedSender<PlayerEvent>) -> Result<()> {
        let socket = UnixStream::connect(&self.socket_path).with_context(|| {
            format!("Failed to connect to MPV socket at {:?}", self.socket_path)
        })?;

        thread::Builder::new()
            .name("mpv-events".to_string())
            .spawn(move || {
                let reader = BufReader::new(socket);
                for line in reader.lines().map_while(Result::ok) {
                    let Ok(message) = serde_json::from_str::<Value>(&line) else {
                        warn!("Unparsable MPV event: {}", line);
                        continue;
                    };

                    if let Some(event) = parse_event(&message) {
                        debug!("MPV event: {:?}", event);
                        let exited = event == PlayerEvent::Exited;
                        if events.send(event).is_err() || exited {
                            return;
                        }
                    }
                }

                let _ = events.send(PlayerEvent::Exited);
            })
            .context("Failed to spawn MPV event thread")?;

        Ok(())
    }

    /// Ask mpv to quit, then make sure the process is gone
    pub(super) async fn shutdown(&mut self) -> Result<()> {
        debug!("Shutting down MPV player");

        if self.socket_path.exists() {
            let _ = self.command(json!(["quit"]));
        }

        if let Some(mut child) = self.mpv_process.take() {
            for _ in 0..10 {
                if let Ok(Some(_)) = child.try_wait() {
                    break;
                }
                sleep(Duration::from_millis(100)).await;
            }

            if let Ok(None) = child.try_wait() {
                debug!("Killing MPV process");
                let _ = child.kill();
                let _ = child.wait();
            }
        }

        if self.socket_path.exists() {
            let _ = fs::remove_file(&self.socket_path);
        }

        Ok(())
    }
}

impl Drop for MpvPlayer {
    fn drop(&mut self) {
        if let Some(mut child) = self.mpv_process.take() {
            match child.try_wait() {
                Ok(Some(_)) => {
                    debug!("MPV process already exited");
                }
                Ok(None) | Err(_) => {
                    debug!("Terminating MPV process on cleanup");
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }

        if self.socket_path.exists() {
            let _ = fs::remove_file(&self.socket_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_loaded_is_a_media_change() {
        let event = json!({"event": "file-loaded"});
        assert_eq!(parse_event(&event), Some(PlayerEvent::MediaChanged));
    }

    #[test]
    fn forwarded_keys() {
        let event = json!({"event": "client-message", "args": [KEY_MESSAGE, "up"]});
        assert_eq!(parse_event(&event), Some(PlayerEvent::Key("up".to_string())));

        let other = json!({"event": "client-message", "args": ["osc-visibility", "auto"]});
        assert_eq!(parse_event(&other), None);

        let short = json!({"event": "client-message", "args": [KEY_MESSAGE]});
        assert_eq!(parse_event(&short), None);
    }

    #[test]
    fn end_file_only_reports_errors() {
        let failed = json!({"event": "end-file", "reason": "error", "file_error": "no signal"});
        assert_eq!(
            parse_event(&failed),
            Some(PlayerEvent::PlaybackError("no signal".to_string()))
        );

        let replaced = json!({"event": "end-file", "reason": "stop"});
        assert_eq!(parse_event(&replaced), None);
    }

    #[test]
    fn replies_and_unknown_events_are_ignored() {
        assert_eq!(parse_event(&json!({"event": "shutdown"})), Some(PlayerEvent::Exited));
        assert_eq!(parse_event(&json!({"event": "seek"})), None);
        assert_eq!(parse_event(&json!({"error": "success", "request_id": 3})), None);
    }

    #[test]
    fn command_without_mpv_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let mpv = MpvPlayer::new(dir.path().join("mpv.sock"));
        assert!(mpv.get_property("mute").is_err());
        assert!(!mpv.is_socket_ready());
    }

    #[test]
    fn runtime_dir_is_private() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = dir.path().join("divibly");
        ensure_runtime_dir(&runtime).unwrap();

        let mode = fs::metadata(&runtime).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}

//! Write-only clipboard access.
//!
//! `SystemClipboard` pipes the text into the first platform tool that works
//! (`wl-copy`, `xclip`, `xsel`, `pbcopy`, `clip`) and falls back to the OSC 52
//! escape sequence, which most modern terminals forward to the system
//! clipboard (including over SSH).

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard mechanism accepted the text.
    Unavailable,
    Io(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable => write!(f, "no clipboard available"),
            ClipboardError::Io(msg) => write!(f, "clipboard I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

const COPY_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip", &[]),
];

#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if copy_with_command(text) {
            return Ok(());
        }
        debug!("No clipboard command succeeded, falling back to OSC 52");
        copy_with_osc52(text)
    }
}

/// How long a clipboard tool may run before it is killed.
const COMMAND_TIMEOUT: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

fn copy_with_command(text: &str) -> bool {
    for (cmd, args) in COPY_COMMANDS {
        let mut child = match Command::new(cmd)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(_) => continue,
        };
        // stdin is dropped at the end of this block so the tool sees EOF
        if let Some(mut stdin) = child.stdin.take()
            && stdin.write_all(text.as_bytes()).is_err()
        {
            let _ = child.kill();
            continue;
        }
        match wait_with_deadline(&mut child, COMMAND_TIMEOUT) {
            Some(true) => {
                debug!("Copied {} bytes with {}", text.len(), cmd);
                return true;
            }
            Some(false) => {}
            None => warn!("{} did not exit within {:?}", cmd, COMMAND_TIMEOUT),
        }
    }
    false
}

/// Waits for `child` to exit, killing it once `timeout` passes.
///
/// Returns whether it exited successfully, or `None` if it was killed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Option<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status.success()),
            Ok(None) if Instant::now() < deadline => thread::sleep(POLL_INTERVAL),
            Ok(None) => break,
            Err(_) => return Some(false),
        }
    }
    let _ = child.kill();
    let _ = child.wait();
    None
}

/// OSC 52 "set clipboard" sequence for `text`.
fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

fn copy_with_osc52(text: &str) -> Result<(), ClipboardError> {
    let mut out = io::stdout();
    if !out.is_terminal() {
        return Err(ClipboardError::Unavailable);
    }
    out.write_all(osc52_sequence(text).as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| ClipboardError::Io(e.to_string()))
}

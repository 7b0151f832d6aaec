//! Desktop automation behind a single capability trait.
//!
//! [`DesktopAutomation`] synthesizes clicks and key chords through `enigo`
//! and launches platform shell commands for the actions that have no
//! portable key equivalent (volume, lock, screenshot). Every
//! [`CommandSlot`] variant has a decided behavior in the match below.

use std::process::{Command, Stdio};

use enigo::{Enigo, Key, KeyboardControllable, MouseButton, MouseControllable};
use thiserror::Error;

use crate::models::CommandSlot;

/// Failure of one action invocation. Recoverable; the recognition loop logs
/// it and keeps running.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("no built-in action for {0}")]
    Unsupported(CommandSlot),

    #[error("failed to launch {command:?}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Performs the OS-level effect behind a command slot.
#[cfg_attr(test, mockall::automock)]
pub trait AutomationCapability {
    fn invoke(&mut self, slot: CommandSlot) -> Result<(), ActionError>;
}

/// Shell command implementing `slot` on the current platform, if any.
fn shell_command(slot: CommandSlot) -> Option<&'static str> {
    if cfg!(target_os = "windows") {
        match slot {
            CommandSlot::VolumeUp => {
                Some("powershell -c \"(new-object -com wscript.shell).SendKeys([char]175)\"")
            }
            CommandSlot::VolumeDown => {
                Some("powershell -c \"(new-object -com wscript.shell).SendKeys([char]174)\"")
            }
            CommandSlot::Mute => {
                Some("powershell -c \"(new-object -com wscript.shell).SendKeys([char]173)\"")
            }
            CommandSlot::Screenshot => Some("snippingtool /clip"),
            CommandSlot::LockScreen => Some("rundll32.exe user32.dll,LockWorkStation"),
            _ => None,
        }
    } else if cfg!(target_os = "macos") {
        match slot {
            CommandSlot::VolumeUp => Some(
                "osascript -e 'set volume output volume ((output volume of (get volume settings)) + 6)'",
            ),
            CommandSlot::VolumeDown => Some(
                "osascript -e 'set volume output volume ((output volume of (get volume settings)) - 6)'",
            ),
            CommandSlot::Mute => Some("osascript -e 'set volume with output muted'"),
            CommandSlot::Screenshot => Some("screencapture -c"),
            CommandSlot::LockScreen => Some("pmset displaysleepnow"),
            _ => None,
        }
    } else {
        match slot {
            CommandSlot::VolumeUp => Some("pactl set-sink-volume @DEFAULT_SINK@ +5%"),
            CommandSlot::VolumeDown => Some("pactl set-sink-volume @DEFAULT_SINK@ -5%"),
            CommandSlot::Mute => Some("pactl set-sink-mute @DEFAULT_SINK@ toggle"),
            CommandSlot::Screenshot => Some("gnome-screenshot"),
            CommandSlot::LockScreen => Some("loginctl lock-session"),
            _ => None,
        }
    }
}

/// The real automation backend.
///
/// Built-in actions cover a subset of the catalog: `MoveCursor` belongs to
/// continuous pointer control rather than one-shot dispatch, and
/// `ScreenRecord` has no portable trigger; both report
/// [`ActionError::Unsupported`].
pub struct DesktopAutomation {
    enigo: Enigo,
}

impl DesktopAutomation {
    pub fn new() -> Self {
        Self {
            enigo: Enigo::new(),
        }
    }

    fn key_chord(&mut self, modifier: Key, key: char) {
        self.enigo.key_down(modifier);
        self.enigo.key_click(Key::Layout(key));
        self.enigo.key_up(modifier);
    }

    fn run_shell(&self, slot: CommandSlot) -> Result<(), ActionError> {
        let Some(command) = shell_command(slot) else {
            return Err(ActionError::Unsupported(slot));
        };

        let (program, flag) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        // Fire and forget: one-shot system commands, nothing to parse back.
        Command::new(program)
            .args([flag, command])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ActionError::Spawn {
                command: command.to_string(),
                source,
            })?;

        tracing::debug!("launched shell action for {}: {}", slot, command);
        Ok(())
    }
}

impl Default for DesktopAutomation {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomationCapability for DesktopAutomation {
    fn invoke(&mut self, slot: CommandSlot) -> Result<(), ActionError> {
        match slot {
            CommandSlot::LeftClick => {
                self.enigo.mouse_click(MouseButton::Left);
                Ok(())
            }
            CommandSlot::RightClick => {
                self.enigo.mouse_click(MouseButton::Right);
                Ok(())
            }
            CommandSlot::Copy => {
                self.key_chord(Key::Control, 'c');
                Ok(())
            }
            CommandSlot::Paste => {
                self.key_chord(Key::Control, 'v');
                Ok(())
            }
            CommandSlot::Undo => {
                self.key_chord(Key::Control, 'z');
                Ok(())
            }
            CommandSlot::AltTab => {
                self.enigo.key_down(Key::Alt);
                self.enigo.key_click(Key::Tab);
                self.enigo.key_up(Key::Alt);
                Ok(())
            }
            CommandSlot::CloseWindow => {
                self.enigo.key_down(Key::Alt);
                self.enigo.key_click(Key::F4);
                self.enigo.key_up(Key::Alt);
                Ok(())
            }
            CommandSlot::StartMenu => {
                self.enigo.key_click(Key::Meta);
                Ok(())
            }
            CommandSlot::Escape => {
                self.enigo.key_click(Key::Escape);
                Ok(())
            }
            CommandSlot::VolumeUp
            | CommandSlot::VolumeDown
            | CommandSlot::Mute
            | CommandSlot::Screenshot
            | CommandSlot::LockScreen => self.run_shell(slot),
            CommandSlot::MoveCursor | CommandSlot::ScreenRecord => {
                Err(ActionError::Unsupported(slot))
            }
        }
    }
}

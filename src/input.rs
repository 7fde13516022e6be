//! Events delivered by the user input surface.

use crate::effects::EffectChoice;
use std::time::Duration;

/// Keys the slideshow reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    F11,
    Escape,
    Char(char),
}

/// Action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    Prev,
    Next,
    ToggleMute,
    ToggleFullscreen,
    ExitFullscreen,
    ToggleControls,
    ToggleHelp,
    /// Load the configured demo deck; only offered while there is nothing
    /// to show.
    UseDemoContent,
}

/// Key bindings as shown on the help overlay.
pub const HELP: &[(&str, &str)] = &[
    ("Space", "play / pause"),
    ("Left / Right", "previous / next photo"),
    ("M", "mute / unmute music"),
    ("F11", "toggle full-screen"),
    ("Esc", "leave full-screen"),
    ("C", "show / hide controls in full-screen"),
    ("H", "show / hide this help"),
    ("D", "use demo content when no photos were found"),
];

impl Key {
    pub fn command(self) -> Option<Command> {
        match self {
            Key::Space => Some(Command::TogglePlay),
            Key::ArrowLeft => Some(Command::Prev),
            Key::ArrowRight => Some(Command::Next),
            Key::F11 => Some(Command::ToggleFullscreen),
            Key::Escape => Some(Command::ExitFullscreen),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'm' => Some(Command::ToggleMute),
                'c' => Some(Command::ToggleControls),
                'h' | '?' => Some(Command::ToggleHelp),
                'd' => Some(Command::UseDemoContent),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    PointerMoved,
    PointerEnteredControls,
    PointerLeftControls,
    PointerEnteredWindow,
    PointerLeftWindow,
    Click,
    Key(Key),
    /// A control on the overlay was used.
    Command(Command),
    FullscreenChanged(bool),
    SetVolume(f32),
    SetInterval(Duration),
    SelectEffect(EffectChoice),
    SetShuffle(bool),
    Quit,
}

impl UserInput {
    /// Whether this input counts as the user gesture that unlocks audio.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            UserInput::Click | UserInput::Key(_) | UserInput::Command(_) | UserInput::SetVolume(_)
        )
    }

    /// The command carried by a key press or control, if any.
    pub fn command(&self) -> Option<Command> {
        match self {
            UserInput::Key(key) => key.command(),
            UserInput::Command(command) => Some(*command),
            _ => None,
        }
    }

    /// Whether this input should keep the controls awake. The controls
    /// toggle manages visibility itself.
    pub fn is_activity(&self) -> bool {
        if self.command() == Some(Command::ToggleControls) {
            return false;
        }
        !matches!(
            self,
            UserInput::PointerEnteredControls
                | UserInput::PointerLeftControls
                | UserInput::PointerLeftWindow
                | UserInput::FullscreenChanged(_)
                | UserInput::Quit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_map() {
        assert_eq!(Key::Space.command(), Some(Command::TogglePlay));
        assert_eq!(Key::ArrowLeft.command(), Some(Command::Prev));
        assert_eq!(Key::ArrowRight.command(), Some(Command::Next));
        assert_eq!(Key::Char('M').command(), Some(Command::ToggleMute));
        assert_eq!(Key::Char('c').command(), Some(Command::ToggleControls));
        assert_eq!(Key::F11.command(), Some(Command::ToggleFullscreen));
        assert_eq!(Key::Escape.command(), Some(Command::ExitFullscreen));
        assert_eq!(Key::Char('H').command(), Some(Command::ToggleHelp));
        assert_eq!(Key::Char('?').command(), Some(Command::ToggleHelp));
        assert_eq!(Key::Char('d').command(), Some(Command::UseDemoContent));
        assert_eq!(Key::Char('x').command(), None);
    }

    #[test]
    fn gestures() {
        assert!(UserInput::Click.is_gesture());
        assert!(UserInput::Key(Key::Char('x')).is_gesture());
        assert!(!UserInput::PointerMoved.is_gesture());
        assert!(!UserInput::SetShuffle(true).is_gesture());
    }

    #[test]
    fn activity() {
        assert!(UserInput::PointerMoved.is_activity());
        assert!(UserInput::Key(Key::Space).is_activity());
        assert!(!UserInput::Key(Key::Char('c')).is_activity());
        assert!(!UserInput::PointerEnteredControls.is_activity());
        assert_eq!(
            UserInput::Command(Command::Next).command(),
            Some(Command::Next)
        );
        assert_eq!(UserInput::Click.command(), None);
    }
}

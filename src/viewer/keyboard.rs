//! Keyboard shortcuts

/// A viewer action bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    NextPage,
    PrevPage,
    ZoomIn,
    ZoomOut,
    ZoomDigit(u8),
    ToggleFullscreen,
    /// Leave fullscreen, or drop back to unzoomed
    Escape,
}

impl ViewerCommand {
    /// Map a key name (DOM `KeyboardEvent.key` values) to a command
    pub fn from_key(key: &str) -> Option<Self> {
        let command = match key {
            "ArrowRight" => ViewerCommand::NextPage,
            "ArrowLeft" => ViewerCommand::PrevPage,
            "ArrowUp" | "+" | "=" => ViewerCommand::ZoomIn,
            "ArrowDown" | "-" | "_" => ViewerCommand::ZoomOut,
            "f" | "F" => ViewerCommand::ToggleFullscreen,
            "Escape" => ViewerCommand::Escape,
            _ => {
                let mut chars = key.chars();
                let digit = chars.next()?.to_digit(10)?;
                if chars.next().is_some() {
                    return None;
                }
                ViewerCommand::ZoomDigit(digit as u8)
            }
        };
        Some(command)
    }
}

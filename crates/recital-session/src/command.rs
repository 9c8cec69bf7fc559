use recital_core::types::KeyPress;

/// Operator command decoded from a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Record,
    Reload,
    Quit,
    /// Out-of-band cancellation: exit without saving.
    Interrupt,
    Ignored,
}

impl Command {
    /// Map a key press to a command. Letters are matched case-insensitively.
    pub fn from_key(key: KeyPress) -> Self {
        match key {
            KeyPress::Interrupt => Command::Interrupt,
            KeyPress::Char(c) => match c.to_ascii_lowercase() {
                'l' => Command::Next,
                'j' => Command::Prev,
                ' ' => Command::Record,
                'r' => Command::Reload,
                'q' => Command::Quit,
                _ => Command::Ignored,
            },
        }
    }
}

/// Key legend printed before the session starts.
pub const KEY_LEGEND: &str = "  'L' next | 'J' previous | SPACE record | 'R' reload | 'Q' quit";

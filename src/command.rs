//! In-band input dispatch
//!
//! Classifies one line read from an active participant.

/// What an input line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line, just re-prompt
    Empty,
    Help,
    Exit,
    Rename,
    /// Anything else is chat text (trimmed)
    Chat(String),
}

impl Command {
    /// Parse a line. Commands must match exactly after trimming.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Command::Empty,
            "@help" => Command::Help,
            "@exit" => Command::Exit,
            "@rename" => Command::Rename,
            text => Command::Chat(text.to_string()),
        }
    }
}

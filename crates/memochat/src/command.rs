/// A line entered at the prompt.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// `/new`: starts a new conversation.
    New,
    /// `/chats`: lists the conversations.
    Chats,
    /// `/open <id>`: switches to a stored conversation.
    Open(String),
    /// `/delete <id>`: deletes a conversation.
    Delete(String),
    /// `/memories`: shows what the service remembers.
    Memories,
    /// `/quit`: exits.
    Quit,
    /// A command used the wrong way, with its usage.
    Usage(&'static str),
    /// Anything else is sent as a message.
    Send(String),
}

impl Command {
    /// Parses a line. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        let command = match name {
            "/new" => Command::New,
            "/chats" => Command::Chats,
            "/memories" => Command::Memories,
            "/quit" | "/exit" => Command::Quit,
            "/open" if arg.is_empty() => Command::Usage("/open <id>"),
            "/open" => Command::Open(arg.to_owned()),
            "/delete" if arg.is_empty() => Command::Usage("/delete <id>"),
            "/delete" => Command::Delete(arg.to_owned()),
            _ => Command::Send(line.to_owned()),
        };
        Some(command)
    }
}

use serde::{Deserialize, Serialize};

pub const MAX_NAME_CHARS: usize = 64;

/// entry name the credentials file is stored under in a bot package
pub const CREDENTIALS_ENTRY: &str = "zuliprc";

/// entry name of the generated deploy config fragment in a bot package
pub const CONFIG_ENTRY: &str = "config.ini";

/// json body shared by the process, start, and stop routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotRef {
    pub name: String,
}

impl BotRef {
    pub fn new<N>(name: N) -> Self
    where
        N: Into<String>
    {
        BotRef { name: name.into() }
    }
}

/// file name of the package produced for the given bot name
pub fn archive_name(name: &str) -> String {
    format!("{}.zip", name)
}

/// contents of the generated deploy config fragment. names the entry point
/// file of the bot and the credentials entry bundled next to it
pub fn deploy_config(main: &str) -> String {
    format!("bot={}\n{}={}\n", main, CREDENTIALS_ENTRY, CREDENTIALS_ENTRY)
}

/// bot names end up as archive file names and server side identifiers so
/// they cannot be empty or carry control characters or path separators
pub fn name_valid(given: &str) -> bool {
    let mut chars = 0;

    for ch in given.chars() {
        if ch.is_control() || ch == '/' || ch == '\\' {
            return false;
        }

        chars += 1;

        if chars > MAX_NAME_CHARS {
            return false;
        }
    }

    chars != 0
}

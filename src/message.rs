//! Peer protocol text
//!
//! Everything the server writes to a terminal peer: greeting banner,
//! help, prompts, notices and chat lines, coloured with ANSI escapes.

use chrono::Local;

use crate::error::AppError;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const BOLD_GREEN: &str = "\x1b[1;32m";
const BOLD_CYAN: &str = "\x1b[1;36m";
const BOLD_YELLOW: &str = "\x1b[1;33m";

/// Timestamp format used in prompts and chat lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BANNER: &str = r#"         _nnnn_
        dGGGGMMb
       @p~qp~~qMb
       M|@||@) M|
       @,----.JM|
      JS^\__/  qKL
     dZP        qKRb
    dZP          qKKb
   fZP            SMMb
   HZM            MMMM
   FqM            MMMM
__| ".        |\dS"qML
 |    `.       | `' \Zq
_)      \.___.,|     .'
\____   )MMMMMP|   .'
     `-'       `--'
"#;

/// Current local time, formatted for prompts
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Banner sent as soon as a peer connects
pub fn greeting() -> String {
    format!("{BOLD_GREEN}Welcome to TCP-Chat!\n{RESET}{CYAN}{BANNER}{RESET}")
}

/// Response to `@help`
pub fn help() -> String {
    format!(
        "{BOLD_CYAN}\n\nWelcome to the TCP-Chat application!\n{RESET}\
         \tThis is a simple project used to establish a connection \n\
         \tbetween different users in the LAN or on the same machine.\n\n\
         {BOLD_YELLOW}Options:\n{RESET}\
         \t@help    ==> Show this help window\n\
         \t@exit    ==> Disconnect from the chat\n\
         \t@rename  ==> Change your display name\n\n"
    )
}

pub fn name_prompt() -> String {
    format!("{BOLD_GREEN}[ENTER YOUR NAME]:{RESET}")
}

/// `[timestamp][name]:` prompt shown before every read
pub fn prompt(timestamp: &str, name: &str) -> String {
    format!("{CYAN}[{timestamp}]{RESET}{GREEN}[{name}]:{RESET}")
}

/// Chat line as broadcast and transcribed
pub fn chat_line(timestamp: &str, name: &str, text: &str) -> String {
    format!("{}{}\n", prompt(timestamp, name), text)
}

pub fn joined(name: &str) -> String {
    format!("\n{GREEN}{name} has joined our chat...\n{RESET}")
}

pub fn left(name: &str) -> String {
    format!("\n{RED}{name} has left our chat...\n{RESET}")
}

pub fn renamed(old: &str, new: &str) -> String {
    format!("\n{GREEN}{old} changed their name to {new}...\n{RESET}")
}

/// Notice repeated while waiting for a free spot
pub fn room_full() -> String {
    format!("{RED}There is no empty place in this chat room. Please wait until a spot is free.\n{RESET}")
}

/// Explanation of a rejected name
pub fn name_rejected(reason: &AppError) -> String {
    match reason {
        AppError::NameTaken => {
            format!("{RED}You chose a name that is already used. Please try again.\n{RESET}")
        }
        AppError::EmptyName => format!("{RED}You chose an empty name. Please try again.\n{RESET}"),
        _ => format!("{RED}Please try again.\n{RESET}"),
    }
}

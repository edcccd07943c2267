use std::fmt;
use uuid::Uuid;

use app::screens::my_bookings::BookingTab;

/// A course or booking picked either by its position in the last listing
/// (1-based, as printed) or by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRef {
    Index(usize),
    Id(Uuid),
}

impl CardRef {
    fn parse(s: &str) -> Option<Self> {
        if let Ok(n) = s.parse::<usize>() {
            return (n > 0).then_some(Self::Index(n));
        }
        Uuid::parse_str(s).ok().map(Self::Id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Courses,
    Sport(String),
    Refresh,
    Open(CardRef),
    Book,
    Back,
    Bookings(Option<BookingTab>),
    Cancel(CardRef),
    Profile,
    Rules,
    About,
    Agree,
    Login { username: String, password: String },
    Wechat(String),
    Logout,
    Yes,
    No,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    InvalidArgument(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::Unknown(cmd) => write!(f, "unknown command '{cmd}', type 'help'"),
            Self::MissingArgument(usage) => write!(f, "usage: {usage}"),
            Self::InvalidArgument(arg) => write!(f, "invalid argument '{arg}'"),
        }
    }
}

impl std::error::Error for ParseError {}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(ParseError::Empty);
        };
        let args: Vec<&str> = words.collect();

        let command = match head.to_ascii_lowercase().as_str() {
            "courses" | "c" => Self::Courses,
            "sport" | "s" => {
                if args.is_empty() {
                    return Err(ParseError::MissingArgument("sport <name>"));
                }
                Self::Sport(args.join(" "))
            }
            "refresh" | "r" => Self::Refresh,
            "open" | "o" => Self::Open(card_arg(&args, "open <n|id>")?),
            "book" => Self::Book,
            "back" => Self::Back,
            "bookings" | "b" => match args.first() {
                None => Self::Bookings(None),
                Some(key) => Self::Bookings(Some(
                    BookingTab::parse(key)
                        .ok_or_else(|| ParseError::InvalidArgument((*key).to_string()))?,
                )),
            },
            "cancel" => Self::Cancel(card_arg(&args, "cancel <n|id>")?),
            "profile" | "p" => Self::Profile,
            "rules" => Self::Rules,
            "about" => Self::About,
            "agree" => Self::Agree,
            "login" => match args.as_slice() {
                [username, password] => Self::Login {
                    username: (*username).to_string(),
                    password: (*password).to_string(),
                },
                _ => return Err(ParseError::MissingArgument("login <username> <password>")),
            },
            "wechat" => match args.as_slice() {
                [code] => Self::Wechat((*code).to_string()),
                _ => return Err(ParseError::MissingArgument("wechat <code>")),
            },
            "logout" => Self::Logout,
            "y" | "yes" => Self::Yes,
            "n" | "no" => Self::No,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn card_arg(args: &[&str], usage: &'static str) -> Result<CardRef, ParseError> {
    let arg = args.first().ok_or(ParseError::MissingArgument(usage))?;
    CardRef::parse(arg).ok_or_else(|| ParseError::InvalidArgument((*arg).to_string()))
}

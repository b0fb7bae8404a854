use core::fmt;
use core::str::FromStr;

use crate::Error;
use crate::color::{self, Color};
use crate::state::Mode;

/// Commands accepted by the animation supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move smoothly to a static color
    SetStatic(Color),
    /// Start cycling through hues
    SetRainbow,
    /// Stop whatever is running, keeping the current color
    Stop,
}

impl Command {
    /// Static color command from unchecked components
    pub fn set_static_components(r: i32, g: i32, b: i32) -> Result<Self, Error> {
        color::try_from_components(r, g, b).map(Self::SetStatic)
    }

    /// Mode the command switches to, `None` for [`Command::Stop`]
    pub const fn mode(&self) -> Option<Mode> {
        match self {
            Self::SetStatic(_) => Some(Mode::Static),
            Self::SetRainbow => Some(Mode::Rainbow),
            Self::Stop => None,
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    /// Parses `stop`, `rainbow`, `static:<rrggbb>` or `static:<preset>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, argument) = match s.split_once([':', ' ']) {
            Some((verb, argument)) => (verb, Some(argument.trim())),
            None => (s, None),
        };

        match (verb.to_ascii_lowercase().as_str(), argument) {
            ("stop", None) => Ok(Self::Stop),
            ("rainbow", None) => Ok(Self::SetRainbow),
            ("static", Some(value)) => {
                let color = match color::preset(value) {
                    Some(color) => color,
                    None => color::parse_hex(value)?,
                };
                Ok(Self::SetStatic(color))
            }
            ("static", None) => Err(Error::InvalidColor(String::from(
                "static command needs a color",
            ))),
            _ => Err(Error::InvalidCommand(s.to_owned())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetStatic(color) => write!(f, "static:{}", color::encode_hex(*color)),
            Self::SetRainbow => f.write_str("rainbow"),
            Self::Stop => f.write_str("stop"),
        }
    }
}

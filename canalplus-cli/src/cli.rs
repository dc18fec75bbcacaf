use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};

const PLAYER_PREFIX: &str = "player:";
const SEARCH_MARKER: char = '?';

#[derive(Parser, Debug)]
#[command(name = "canalplus", author, version, about = "Browse, download and watch videos from the CANAL+ catalog", long_about = None)]
pub struct Args {
    /// Output directory, or `player:<name>` to watch in a player instead
    pub output: OutputTarget,

    /// Which videos of the selection to process
    #[arg(short, long, value_enum, default_value_t = Mode::Manual)]
    pub mode: Mode,

    /// Program title (case-insensitive), or `?<query>` to search the catalog
    #[arg(short, long)]
    pub program: Option<ProgramSelector>,

    /// Enable debug logging and converter/player output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors, no progress display
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file
    #[arg(long, env = "CANALPLUS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Every video of the selection, in order
    Auto,
    /// Only the most recent video
    Last,
    /// Pick one video from a menu
    #[default]
    Manual,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => write!(f, "auto"),
            Mode::Last => write!(f, "last"),
            Mode::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Directory(PathBuf),
    /// Name or path of the player binary
    Player(String),
}

impl FromStr for OutputTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(PLAYER_PREFIX) {
            Some("") => Err("missing player name after `player:`".to_string()),
            Some(player) => Ok(Self::Player(player.to_string())),
            None if s.is_empty() => Err("output directory cannot be empty".to_string()),
            None => Ok(Self::Directory(PathBuf::from(s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSelector {
    /// Exact program title
    Title(String),
    /// Free-text catalog search
    Search(String),
}

impl FromStr for ProgramSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selector = match s.strip_prefix(SEARCH_MARKER) {
            Some(query) => Self::Search(query.trim().to_string()),
            None => Self::Title(s.trim().to_string()),
        };
        match &selector {
            Self::Title(text) | Self::Search(text) if text.is_empty() => {
                Err("program name or search query cannot be empty".to_string())
            }
            _ => Ok(selector),
        }
    }
}

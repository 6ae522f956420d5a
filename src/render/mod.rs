//! Rendering: text for terminals, RGB frames for recordings.
//!
//! - `Human`: print the board to stdout
//! - `Ansi`: return the board as a string
//! - `RgbArray`: draw through the `Viewer` and return a `Frame`

mod viewer;

pub use viewer::{Frame, Viewer, ViewerConfig};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How `render` should present the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Human,
    Ansi,
    RgbArray,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(RenderMode::Human),
            "ansi" => Ok(RenderMode::Ansi),
            "rgb_array" => Ok(RenderMode::RgbArray),
            other => Err(format!("unknown render mode '{}'", other)),
        }
    }
}

/// What `render` returns for non-human modes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutput {
    Text(String),
    Frame(Frame),
}

impl RenderOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RenderOutput::Text(s) => Some(s),
            RenderOutput::Frame(_) => None,
        }
    }

    pub fn into_frame(self) -> Option<Frame> {
        match self {
            RenderOutput::Frame(f) => Some(f),
            RenderOutput::Text(_) => None,
        }
    }
}

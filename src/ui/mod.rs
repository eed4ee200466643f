//! Terminal presentation of generated content and the playback transport

pub mod render;
pub mod shortcuts;

pub use shortcuts::{help_text, parse_command, Command};

use std::str::FromStr;

/// Views of one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Flowchart,
    AsciiFlow,
    StateTable,
    Logic,
    Animation,
    Narration,
    Output,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Flowchart,
        Tab::AsciiFlow,
        Tab::StateTable,
        Tab::Logic,
        Tab::Animation,
        Tab::Narration,
        Tab::Output,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Flowchart => "Flowchart",
            Tab::AsciiFlow => "ASCII Flow",
            Tab::StateTable => "State Table",
            Tab::Logic => "Logic",
            Tab::Animation => "Animation",
            Tab::Narration => "Narration",
            Tab::Output => "Output",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "flowchart" | "flow" | "mermaid" => Ok(Tab::Flowchart),
            "asciiflow" | "ascii" => Ok(Tab::AsciiFlow),
            "statetable" | "state" | "table" => Ok(Tab::StateTable),
            "logic" => Ok(Tab::Logic),
            "animation" | "anim" => Ok(Tab::Animation),
            "narration" => Ok(Tab::Narration),
            "output" | "out" => Ok(Tab::Output),
            _ => Err(format!("unknown tab {:?}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_names_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(tab.title().parse::<Tab>(), Ok(tab));
        }
        assert_eq!("ascii-flow".parse::<Tab>(), Ok(Tab::AsciiFlow));
        assert_eq!("STATE".parse::<Tab>(), Ok(Tab::StateTable));
        assert!("graph".parse::<Tab>().is_err());
    }
}

use crate::link::LinkMessage;
use crate::notify::{Status, StatusLevel};
use std::str::FromStr;

/// Discrete commands from the operator control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCommand {
    Start,
    SpeedHigh,
    SpeedMedium,
    SpeedLow,
    NextSong,
}

impl OperatorCommand {
    pub const ALL: [OperatorCommand; 5] = [
        OperatorCommand::Start,
        OperatorCommand::SpeedHigh,
        OperatorCommand::SpeedMedium,
        OperatorCommand::SpeedLow,
        OperatorCommand::NextSong,
    ];

    pub fn link_message(&self) -> LinkMessage {
        match self {
            OperatorCommand::Start => LinkMessage::Start,
            OperatorCommand::SpeedHigh => LinkMessage::SpeedHigh,
            OperatorCommand::SpeedMedium => LinkMessage::SpeedMedium,
            OperatorCommand::SpeedLow => LinkMessage::SpeedLow,
            OperatorCommand::NextSong => LinkMessage::NextSong,
        }
    }

    pub fn status(&self) -> Status {
        let text = match self {
            OperatorCommand::Start => "Robot started",
            OperatorCommand::SpeedHigh => "Speed set to HIGH",
            OperatorCommand::SpeedMedium => "Speed set to MEDIUM",
            OperatorCommand::SpeedLow => "Speed set to LOW",
            OperatorCommand::NextSong => "Playing next song",
        };
        Status::new(text, StatusLevel::Success)
    }

    /// Button label on the console help line
    pub fn label(&self) -> &'static str {
        match self {
            OperatorCommand::Start => "start",
            OperatorCommand::SpeedHigh => "high",
            OperatorCommand::SpeedMedium => "medium",
            OperatorCommand::SpeedLow => "low",
            OperatorCommand::NextSong => "next",
        }
    }
}

impl FromStr for OperatorCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "s" => Ok(OperatorCommand::Start),
            "high" | "speed_high" | "h" => Ok(OperatorCommand::SpeedHigh),
            "medium" | "speed_medium" | "m" => Ok(OperatorCommand::SpeedMedium),
            "low" | "speed_low" | "l" => Ok(OperatorCommand::SpeedLow),
            "next" | "next_song" | "n" => Ok(OperatorCommand::NextSong),
            other => Err(format!("unknown command `{}`", other)),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::engine::backend::{EngineBackend, EngineHandle};
use crate::error::SynthError;

use super::Waveform;

/// One control call forwarded to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SynthCommand {
    Play,
    Stop,
    IsPlaying,
    SetFrequency { hz: f32 },
    SetVolume { db: f32 },
    SetWaveform { waveform: Waveform },
}

/// Value produced by a forwarded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutput {
    Done,
    Playing(bool),
}

impl CommandOutput {
    /// Playback flag reported by `IsPlaying`; `false` for every other command.
    pub fn is_playing(self) -> bool {
        matches!(self, CommandOutput::Playing(true))
    }
}

impl SynthCommand {
    /// Engine operation name, used in logs and errors.
    pub fn operation(&self) -> &'static str {
        match self {
            SynthCommand::Play => "play",
            SynthCommand::Stop => "stop",
            SynthCommand::IsPlaying => "is_playing",
            SynthCommand::SetFrequency { .. } => "set_frequency",
            SynthCommand::SetVolume { .. } => "set_volume",
            SynthCommand::SetWaveform { .. } => "set_waveform",
        }
    }

    /// Issue this command against a live handle.
    pub fn apply<B: EngineBackend + ?Sized>(
        self,
        backend: &mut B,
        handle: EngineHandle,
    ) -> Result<CommandOutput, SynthError> {
        match self {
            SynthCommand::Play => backend.play(handle).map(|_| CommandOutput::Done),
            SynthCommand::Stop => backend.stop(handle).map(|_| CommandOutput::Done),
            SynthCommand::IsPlaying => backend.is_playing(handle).map(CommandOutput::Playing),
            SynthCommand::SetFrequency { hz } => backend
                .set_frequency(handle, hz)
                .map(|_| CommandOutput::Done),
            SynthCommand::SetVolume { db } => {
                backend.set_volume(handle, db).map(|_| CommandOutput::Done)
            }
            SynthCommand::SetWaveform { waveform } => backend
                .set_waveform(handle, waveform.ordinal())
                .map(|_| CommandOutput::Done),
        }
    }
}

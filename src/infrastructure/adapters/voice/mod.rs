//! Voice Adapter - 语音通道实现

mod scripted_voice_channel;

pub use scripted_voice_channel::{
    ScriptStep, ScriptedVoiceChannel, ScriptedVoiceConfig, ScriptedVoiceFactory,
};

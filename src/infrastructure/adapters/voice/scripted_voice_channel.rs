//! Scripted Voice Channel - 按脚本回放事件的语音通道
//!
//! 不连接任何供应商，按配置的延迟依次发出事件。用于本地演示和测试

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::application::ports::{
    AssistantConfig, VoiceChannelFactoryPort, VoiceChannelPort, VoiceError, VoiceEvent,
    VoiceEventSender,
};
use crate::domain::session::{SessionId, Utterance};

/// 脚本中的一步
#[derive(Debug, Clone)]
pub struct ScriptStep {
    /// 距上一步的延迟
    pub delay: Duration,
    pub event: VoiceEvent,
}

impl ScriptStep {
    pub fn after_millis(delay_ms: u64, event: VoiceEvent) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            event,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedVoiceConfig {
    pub script: Vec<ScriptStep>,
    /// `start` 完成前的等待时间
    pub start_delay: Duration,
    pub fail_start: bool,
    pub fail_stop: bool,
    /// `stop` 时同步发出 Ended，模拟供应商在主动挂断时回调
    pub emit_ended_on_stop: bool,
}

impl ScriptedVoiceConfig {
    /// 一段完整的面试对话：接通、逐条累积记录、结束
    pub fn conversation(turns: Vec<Utterance>, turn_delay_ms: u64) -> Self {
        let mut script = vec![ScriptStep::after_millis(turn_delay_ms, VoiceEvent::Started)];
        let mut snapshot = Vec::with_capacity(turns.len());
        for utterance in turns {
            snapshot.push(utterance);
            script.push(ScriptStep::after_millis(
                turn_delay_ms,
                VoiceEvent::Transcript(snapshot.clone()),
            ));
        }
        script.push(ScriptStep::after_millis(turn_delay_ms, VoiceEvent::Ended));
        Self {
            script,
            ..Default::default()
        }
    }
}

#[derive(Default)]
struct ChannelState {
    events: Option<VoiceEventSender>,
    playback: Option<JoinHandle<()>>,
    assistant: Option<AssistantConfig>,
}

pub struct ScriptedVoiceChannel {
    config: ScriptedVoiceConfig,
    state: Mutex<ChannelState>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl ScriptedVoiceChannel {
    pub fn new(config: ScriptedVoiceConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ChannelState::default()),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// 最近一次 `start` 收到的面试官配置
    pub fn last_assistant(&self) -> Option<AssistantConfig> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .assistant
            .clone()
    }

    /// 手动发出一个事件，通道未启动时返回 false
    pub fn emit(&self, event: VoiceEvent) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .events
            .as_ref()
            .is_some_and(|events| events.send(event).is_ok())
    }
}

#[async_trait]
impl VoiceChannelPort for ScriptedVoiceChannel {
    async fn start(&self, config: AssistantConfig, events: VoiceEventSender) -> Result<(), VoiceError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            assistant = %config.name,
            steps = self.config.script.len(),
            "ScriptedVoiceChannel: starting playback"
        );
        self.state.lock().unwrap_or_else(|e| e.into_inner()).assistant = Some(config);

        if !self.config.start_delay.is_zero() {
            tokio::time::sleep(self.config.start_delay).await;
        }
        if self.config.fail_start {
            return Err(VoiceError::StartFailed("scripted start failure".to_string()));
        }

        let script = self.config.script.clone();
        let playback_events = events.clone();
        let playback = tokio::spawn(async move {
            for step in script {
                tokio::time::sleep(step.delay).await;
                if playback_events.send(step.event).is_err() {
                    break;
                }
            }
        });

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.events = Some(events);
        state.playback = Some(playback);
        Ok(())
    }

    async fn stop(&self) -> Result<(), VoiceError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);

        let (events, playback) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            (state.events.take(), state.playback.take())
        };
        if let Some(playback) = playback {
            playback.abort();
        }

        if self.config.emit_ended_on_stop {
            if let Some(events) = &events {
                let _ = events.send(VoiceEvent::Ended);
            }
        }

        if self.config.fail_stop {
            return Err(VoiceError::StopFailed("scripted stop failure".to_string()));
        }
        Ok(())
    }
}

/// 为每个会话创建独立的脚本通道
pub struct ScriptedVoiceFactory {
    config: ScriptedVoiceConfig,
    channels: DashMap<String, Arc<ScriptedVoiceChannel>>,
}

impl ScriptedVoiceFactory {
    pub fn new(config: ScriptedVoiceConfig) -> Self {
        Self {
            config,
            channels: DashMap::new(),
        }
    }

    /// 已为该会话创建的通道
    pub fn channel(&self, session_id: &str) -> Option<Arc<ScriptedVoiceChannel>> {
        self.channels.get(session_id).map(|c| c.clone())
    }
}

impl VoiceChannelFactoryPort for ScriptedVoiceFactory {
    fn create(&self, session_id: &SessionId) -> Arc<dyn VoiceChannelPort> {
        let channel = Arc::new(ScriptedVoiceChannel::new(self.config.clone()));
        self.channels
            .insert(session_id.as_str().to_string(), channel.clone());
        channel
    }
}

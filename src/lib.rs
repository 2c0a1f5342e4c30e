//! Viva - 实时 AI 面试会话编排
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Session Context: 会话上下文、阶段、对话记录
//! - Attention Context: 单帧注意力判定
//! - Focus: 页面可见性违规计数
//! - Feedback Context: 模型输出解析与评分报告
//!
//! 应用层 (application/):
//! - Ports: 端口定义（VoiceChannel, Camera, PresenceClassifier, FeedbackSynthesis, SessionStore, Notifier, Registry）
//! - Session: 编排器、语音句柄、帧分析循环、计时器、反馈流水线
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: 脚本语音通道、合成摄像头、固定检测模型、HTTP/Fake 反馈合成客户端
//! - Memory: 会话登记表、内存反馈存储
//! - Persistence: SQLite 反馈存储
//! - Events: 会话事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

//! Feedback Pipeline - 对话记录转为反馈记录
//!
//! 每个会话最多执行一次；`dispatched` 在发起异步调用之前置位

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::ports::{
    FeedbackRecord, FeedbackSynthesisPort, Notice, SessionNotifierPort, SessionStorePort,
    SynthesisRequest,
};
use crate::domain::session::{SessionContext, Transcript};

/// 一次 dispatch 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// 已合成并写入
    Saved,
    /// 之前已经 dispatch 过
    AlreadyDispatched,
    /// 没有对话内容
    EmptyTranscript,
    /// 合成失败
    SynthesisFailed(String),
    /// 写入失败
    StoreFailed(String),
}

pub struct FeedbackPipeline {
    synthesis: Arc<dyn FeedbackSynthesisPort>,
    store: Arc<dyn SessionStorePort>,
    notifier: Arc<dyn SessionNotifierPort>,
    dispatched: AtomicBool,
}

impl FeedbackPipeline {
    pub fn new(
        synthesis: Arc<dyn FeedbackSynthesisPort>,
        store: Arc<dyn SessionStorePort>,
        notifier: Arc<dyn SessionNotifierPort>,
    ) -> Self {
        Self {
            synthesis,
            store,
            notifier,
            dispatched: AtomicBool::new(false),
        }
    }

    pub fn is_dispatched(&self) -> bool {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// 合成并持久化反馈
    ///
    /// 任何失败都只产生提示；无论结果如何都会发出完成信号
    pub async fn dispatch(&self, transcript: &Transcript, context: &SessionContext) -> FeedbackOutcome {
        let session_id = &context.session_id;
        let outcome = if transcript.is_empty() {
            tracing::info!(session_id = %session_id, "Transcript is empty, skipping feedback synthesis");
            FeedbackOutcome::EmptyTranscript
        } else if self
            .dispatched
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(session_id = %session_id, "Feedback already dispatched");
            FeedbackOutcome::AlreadyDispatched
        } else {
            self.synthesize_and_store(transcript, context).await
        };

        self.notifier.completed(session_id);
        outcome
    }

    async fn synthesize_and_store(&self, transcript: &Transcript, context: &SessionContext) -> FeedbackOutcome {
        let session_id = &context.session_id;
        let request = SynthesisRequest {
            session_id: session_id.clone(),
            transcript: transcript.clone(),
            job_position: context.job_position.clone(),
            job_description: context.job_description.clone(),
        };

        tracing::info!(
            session_id = %session_id,
            utterances = transcript.len(),
            "Requesting feedback synthesis"
        );

        let result = match self.synthesis.synthesize(request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Feedback synthesis failed");
                self.notifier
                    .notice(session_id, Notice::error("Failed to generate feedback"));
                return FeedbackOutcome::SynthesisFailed(e.to_string());
            }
        };

        let record = FeedbackRecord::new(context, result.payload);
        if let Err(e) = self.store.append_feedback(&record).await {
            tracing::error!(session_id = %session_id, error = %e, "Failed to save feedback");
            self.notifier
                .notice(session_id, Notice::error("Failed to save feedback"));
            return FeedbackOutcome::StoreFailed(e.to_string());
        }

        tracing::info!(
            session_id = %session_id,
            record_id = %record.id,
            average_score = result.report.rating.average(),
            "Feedback saved"
        );
        self.notifier.notice(session_id, Notice::success("Feedback saved"));
        FeedbackOutcome::Saved
    }
}

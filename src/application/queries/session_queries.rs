//! Session Queries - 会话查询

/// 获取会话状态快照
#[derive(Debug, Clone)]
pub struct GetSessionStateQuery {
    pub session_id: String,
}

/// 列出所有活动会话
#[derive(Debug, Clone, Default)]
pub struct ListSessionsQuery;

//! Viva - 实时 AI 面试会话
//!
//! 演示程序：用本地适配器跑一场完整的面试会话，Ctrl-C 相当于候选人挂断

use std::sync::Arc;
use std::time::Duration;

use viva::application::ports::{FeedbackSynthesisPort, SessionRegistryPort, VoiceEvent};
use viva::application::{
    BeginInterviewCommand, BeginInterviewHandler, CloseSessionCommand, CloseSessionHandler,
    EndInterviewCommand, EndInterviewHandler, GetSessionStateHandler, GetSessionStateQuery,
    SessionServices,
};
use viva::config::{load_config, print_config, AppConfig};
use viva::domain::session::{InterviewQuestion, SessionContext, SessionId, Utterance};
use viva::infrastructure::adapters::{
    aligned_subject, FakeSynthesisClient, FixedClassifierLoader, FixedPresenceModel,
    HttpSynthesisClient, HttpSynthesisClientConfig, ScriptStep, ScriptedVoiceConfig,
    ScriptedVoiceFactory, SyntheticCamera, SyntheticCameraConfig,
};
use viva::infrastructure::events::{EventPublisher, SessionEvent};
use viva::infrastructure::memory::InMemorySessionRegistry;
use viva::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteFeedbackStore,
};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},viva={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn demo_context() -> anyhow::Result<SessionContext> {
    let session_id = SessionId::new(format!("demo-{}", uuid::Uuid::new_v4()))?;
    Ok(SessionContext::new(
        session_id,
        "Ada Lovelace",
        "ada@example.com",
        "Backend Engineer",
        vec![
            InterviewQuestion::new("How would you design a rate limiter?"),
            InterviewQuestion::new("Describe a production incident you debugged."),
        ],
    )
    .with_job_description("Build and operate low-latency Rust services."))
}

/// 一段会逐步推进的脚本对话
fn demo_script() -> ScriptedVoiceConfig {
    let turns = vec![
        Utterance::assistant("Hi Ada, thanks for joining. Are you ready to begin?"),
        Utterance::candidate("Yes, ready."),
        Utterance::assistant("How would you design a rate limiter?"),
        Utterance::candidate("A token bucket per client, refilled at a fixed rate."),
        Utterance::assistant("Describe a production incident you debugged."),
        Utterance::candidate("A connection pool leak that only showed under load."),
    ];
    let mut config = ScriptedVoiceConfig::conversation(turns, 1500);
    config
        .script
        .insert(1, ScriptStep::after_millis(0, VoiceEvent::SpeakingChanged(true)));
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Viva - 实时 AI 面试会话");
    print_config(&config);

    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;
    let store = Arc::new(SqliteFeedbackStore::new(pool));

    // 配置了 api key 时调用真实的合成服务
    let synthesis: Arc<dyn FeedbackSynthesisPort> = if config.synthesis.has_api_key() {
        let client = HttpSynthesisClient::new(HttpSynthesisClientConfig {
            base_url: config.synthesis.url.clone(),
            model: config.synthesis.model.clone(),
            api_key: config.synthesis.api_key.clone(),
            timeout_secs: config.synthesis.timeout_secs,
            max_retries: config.synthesis.max_retries,
        })?;
        if !client.health_check().await {
            tracing::warn!(url = %config.synthesis.url, "Synthesis service health check failed");
        }
        Arc::new(client)
    } else {
        tracing::info!("No synthesis api key configured, using fake synthesis client");
        Arc::new(FakeSynthesisClient::new().with_delay(Duration::from_millis(300)))
    };

    let publisher = Arc::new(EventPublisher::new());
    let registry = Arc::new(InMemorySessionRegistry::new());

    let services = SessionServices {
        voice_factory: Arc::new(ScriptedVoiceFactory::new(demo_script())),
        camera: Arc::new(SyntheticCamera::new(SyntheticCameraConfig::default())),
        classifier: Arc::new(FixedClassifierLoader::new(Arc::new(
            FixedPresenceModel::new(vec![aligned_subject()]),
        ))),
        synthesis,
        store: store.clone(),
        notifier: publisher.clone(),
        settings: config.session_settings(),
    };

    let context = demo_context()?;
    let session_id = context.session_id.clone();

    // 打印会话事件
    let mut events = publisher.register_session(session_id.as_str());
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match &event {
                SessionEvent::Notice { level, message, .. } => {
                    tracing::info!(level = ?level, "{}", message)
                }
                SessionEvent::PhaseChanged { phase, .. } => {
                    tracing::info!(phase = phase.as_str(), "Phase changed")
                }
                SessionEvent::Completed { .. } => {
                    tracing::info!("Session completed");
                    break;
                }
            }
        }
    });

    let begin = BeginInterviewHandler::new(services, registry.clone());
    if let Err(e) = begin.handle(BeginInterviewCommand { context }).await {
        tracing::error!(error = %e, "Failed to begin interview");
    }

    let orchestrator = registry.get(session_id.as_str())?;

    tokio::select! {
        phase = orchestrator.wait_until_settled() => {
            tracing::info!(phase = phase.as_str(), "Interview settled");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, ending interview");
            EndInterviewHandler::new(registry.clone())
                .handle(EndInterviewCommand { session_id: session_id.to_string() })
                .await?;
            orchestrator.wait_until_settled().await;
        }
    }

    let snapshot = GetSessionStateHandler::new(registry.clone())
        .handle(GetSessionStateQuery {
            session_id: session_id.to_string(),
        })
        .await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    if let Some(record) = store.find_by_session(&session_id).await? {
        println!("{}", serde_json::to_string_pretty(&record.feedback)?);
    }

    CloseSessionHandler::new(registry)
        .handle(CloseSessionCommand {
            session_id: session_id.to_string(),
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

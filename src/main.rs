use std::sync::Arc;
use std::time::Duration;

use plan_configurator::assistant::{
    AssistantFlow, AssistantMode, ChatTranscript, GeminiSpeech, SpeechProvider, VoiceAssistant,
};
use plan_configurator::config::{AppConfig, AssistantModeKind};
use plan_configurator::configurator::SessionStore;
use plan_configurator::documents::{DocumentSource, GoogleDocumentSource, SampleDocumentSource};
use plan_configurator::llm::{LlmBackend, LlmConfig, create_provider};
use plan_configurator::orders::OrderService;
use plan_configurator::server::{AppState, router};
use plan_configurator::tools::{FetchDocumentTool, ToolRegistry};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    let llm_config = LlmConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export GEMINI_API_KEY=...  (or set CONFIGURATOR_LLM_BACKEND)");
        std::process::exit(1);
    });
    let llm = create_provider(&llm_config)?;

    let catalog = Arc::new(config.load_catalog()?);
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    // ── Assistant ───────────────────────────────────────────────────────
    let mode = match config.assistant_mode {
        AssistantModeKind::Context => AssistantMode::Context,
        AssistantModeKind::Tools => {
            let source: Arc<dyn DocumentSource> = match &config.google_docs_token {
                Some(token) => Arc::new(GoogleDocumentSource::new(http.clone(), token.clone())),
                None => Arc::new(SampleDocumentSource),
            };
            let registry = Arc::new(ToolRegistry::new());
            registry.register(Arc::new(FetchDocumentTool::new(source))).await;
            AssistantMode::Tools {
                registry,
                document_urls: config.document_urls.clone(),
            }
        }
    };
    let assistant = AssistantFlow::new(llm, Arc::clone(&catalog), mode);

    if std::env::args().nth(1).as_deref() == Some("chat") {
        return run_chat(&assistant).await;
    }

    // Speech always goes through Gemini, whatever the text backend.
    let gemini_key = match llm_config.backend {
        LlmBackend::Gemini => Some(llm_config.api_key.clone()),
        _ => std::env::var("GEMINI_API_KEY").ok().map(SecretString::from),
    };
    let voice = gemini_key.map(|key| {
        let speech: Arc<dyn SpeechProvider> =
            Arc::new(GeminiSpeech::new(http.clone(), key, config.speech.clone()));
        VoiceAssistant::new(assistant.clone(), speech)
    });

    let orders = Arc::new(OrderService::from_config(&config.orders, http.clone()));

    eprintln!("🧩 Plan Configurator v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {} ({:?})", llm_config.model, llm_config.backend);
    eprintln!(
        "   Catalog: {} categories, {} plans",
        catalog.categories().len(),
        catalog.plans().len()
    );
    eprintln!("   Assistant: {}", assistant.mode().name());
    eprintln!(
        "   Voice: {}",
        if voice.is_some() { "enabled" } else { "disabled (no GEMINI_API_KEY)" }
    );
    eprintln!("   Session TTL: {}s", config.session_ttl.as_secs());
    eprintln!(
        "   Webhook: {}",
        config.orders.webhook_url.as_deref().unwrap_or("not configured")
    );
    eprintln!("   API: http://{}/api", config.bind_addr());
    eprintln!("   Chat WS: ws://{}/ws/chat\n", config.bind_addr());

    let sessions = SessionStore::with_ttl(config.session_ttl);
    sessions.spawn_sweeper(config.session_ttl.min(Duration::from_secs(60)));

    let state = AppState {
        catalog,
        sessions,
        orders,
        assistant,
        voice,
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Configurator server started");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Stdin/stdout conversation with the assistant.
async fn run_chat(assistant: &AssistantFlow) -> anyhow::Result<()> {
    eprintln!("🧩 Plan Configurator assistant. /quit to exit.\n");
    let mut transcript = ChatTranscript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if !transcript.push_user(line) {
            eprint!("> ");
            continue;
        }
        let reply = assistant.ask(transcript.messages()).await;
        println!("\n{}\n", transcript.record_reply(reply));
        eprint!("> ");
    }
    Ok(())
}

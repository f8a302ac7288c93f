use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::composer::{ChatComposer, Composer};
use crate::config::Config;
use crate::context;
use crate::display::{self, TurnTrace};
use crate::error::{AssistantError, Result};
use crate::intent::{IntentClassifier, IntentDecision};
use crate::session::{InMemorySessionStore, SessionStore, Transcript};
use crate::tools::{RapidSearchClient, ToolInvoker, WeatherApiClient};
use crate::transport::OpenAiTransport;

/// Per-service settings that do not belong to any single component
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub system_prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub debug_trace: bool,
}

impl ServiceSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            system_prompt: cfg.openai.system_prompt.clone(),
            model: cfg.openai.model.clone(),
            temperature: cfg.openai.temperature,
            max_tokens: cfg.openai.max_tokens,
            debug_trace: cfg.server.debug_trace,
        }
    }
}

/// Everything one turn produced for the user
#[derive(Debug)]
pub struct TurnOutcome {
    pub decision: IntentDecision,
    /// Weather summaries, search previews and tool error messages, in tool order
    pub notices: Vec<String>,
    pub reply: Result<String>,
    pub trace: Option<String>,
}

impl TurnOutcome {
    /// The reply prefixed with the intent icon, when the model answered
    pub fn answer(&self) -> Option<String> {
        self.reply
            .as_ref()
            .ok()
            .map(|text| display::final_answer(&self.decision, text))
    }
}

pub struct AssistantService {
    classifier: IntentClassifier,
    tools: ToolInvoker,
    composer: Arc<dyn Composer>,
    store: Arc<dyn SessionStore>,
    settings: ServiceSettings,
    turn_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AssistantService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(OpenAiTransport::new(
            cfg.openai.api_key.clone(),
            &cfg.openai.base_url,
        ));
        let composer = ChatComposer::new(
            transport,
            cfg.openai.model.clone(),
            cfg.openai.temperature,
            cfg.openai.max_tokens,
        );
        let tools = ToolInvoker::new(
            Arc::new(WeatherApiClient::new(&cfg.weather)),
            Arc::new(RapidSearchClient::new(&cfg.search)),
            cfg.weather.forecast_days,
            cfg.search.limit,
        );

        Ok(Self::from_parts(
            IntentClassifier::new(cfg.intent.clone()),
            tools,
            Arc::new(composer),
            Arc::new(InMemorySessionStore::new()),
            ServiceSettings::from_config(cfg),
        ))
    }

    pub fn from_parts(
        classifier: IntentClassifier,
        tools: ToolInvoker,
        composer: Arc<dyn Composer>,
        store: Arc<dyn SessionStore>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            classifier,
            tools,
            composer,
            store,
            settings,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a session with the system instruction unless it already exists
    pub async fn start_session(&self, session_id: &str) -> Result<()> {
        let lock = self.turn_lock(session_id).await;
        let seeded = {
            let _guard = lock.lock().await;
            self.seed_session(session_id).await
        };
        self.release_turn_lock(session_id, lock).await;
        seeded
    }

    async fn seed_session(&self, session_id: &str) -> Result<()> {
        if self.store.get(session_id).await?.is_none() {
            tracing::info!(session = session_id, "Starting session");
            self.store
                .set(session_id, Transcript::new(&self.settings.system_prompt))
                .await?;
        }
        Ok(())
    }

    pub async fn transcript(&self, session_id: &str) -> Result<Option<Transcript>> {
        self.store.get(session_id).await
    }

    /// Run one turn: classify, fetch, assemble, compose, persist.
    ///
    /// Tool failures end up in `notices`; a model failure ends up in `reply`
    /// and leaves only the user entry appended. Turns on the same session run
    /// one at a time.
    pub async fn handle_turn(&self, session_id: &str, utterance: &str) -> Result<TurnOutcome> {
        if utterance.trim().is_empty() {
            return Err(AssistantError::Validation(
                "message cannot be empty".to_string(),
            ));
        }

        let lock = self.turn_lock(session_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.run_turn(session_id, utterance).await
        };
        self.release_turn_lock(session_id, lock).await;
        outcome
    }

    async fn run_turn(&self, session_id: &str, utterance: &str) -> Result<TurnOutcome> {
        tracing::info!(session = session_id, "Handling turn");

        let mut transcript = self
            .store
            .get(session_id)
            .await?
            .unwrap_or_else(|| Transcript::new(&self.settings.system_prompt));
        let mut trace = TurnTrace::new(utterance);

        let decision = self.classifier.classify(utterance);
        tracing::debug!(?decision, "Classified utterance");
        trace.decision(&decision);

        let results = self.tools.run(&decision).await;
        let notices: Vec<String> = results
            .iter()
            .map(|result| {
                trace.tool_result(result);
                display::notice(result)
            })
            .collect();

        let ctx = context::assemble(utterance, &results);
        let message = ctx.augmented_message()?;
        trace.context(
            transcript.system_prompt(),
            ctx.weather_data.is_some(),
            ctx.search_results.is_some(),
            message.chars().count(),
        );
        transcript.push_user(message);

        trace.model_call(
            &self.settings.model,
            self.settings.temperature,
            self.settings.max_tokens,
        );
        let reply = self.composer.compose(&transcript).await;
        match &reply {
            Ok(text) => {
                transcript.push_assistant(text.clone());
                trace.model_response(text);
            }
            Err(e) => {
                tracing::warn!(session = session_id, "Model call failed: {}", e);
                trace.model_error(e);
            }
        }
        trace.summary(&decision);

        self.store.set(session_id, transcript).await?;
        tracing::info!(session = session_id, ok = reply.is_ok(), "Turn finished");

        Ok(TurnOutcome {
            decision,
            notices,
            reply,
            trace: self.settings.debug_trace.then(|| trace.render()),
        })
    }

    async fn turn_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        locks.entry(session_id.to_string()).or_default().clone()
    }

    /// Drop the session's lock entry once no other turn holds or waits on it
    async fn release_turn_lock(&self, session_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.turn_locks.lock().await;
        // one reference in the map, one in `lock`
        if Arc::strong_count(&lock) == 2 {
            locks.remove(session_id);
        }
    }
}

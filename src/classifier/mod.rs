//! Task classification through an external text-generation endpoint.
//!
//! The classifier asks the model for a small JSON object with `priority`,
//! `time` and `severity`. Classification is best effort: `classify` never
//! fails, it substitutes [`Classification::fallback`] for any error.

mod messages;

pub use messages::{DEFAULT_API_VERSION, DEFAULT_ENDPOINT, DEFAULT_MODEL, MessagesClient};

use crate::error::ClassifyError;
use crate::types::{Classification, NewTask};
use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default upper bound on a single classification request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that turns a prompt into generated text.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ClassifyError>;
}

/// Completion source used when classification is switched off. Every request
/// fails immediately, so tasks get the fallback values.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCompletion;

#[async_trait]
impl TextCompletion for DisabledCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, ClassifyError> {
        Err(ClassifyError::Disabled)
    }
}

/// Produces priority, time and severity for new tasks.
#[derive(Clone)]
pub struct Classifier {
    completion: Arc<dyn TextCompletion>,
    timeout: Duration,
}

impl Classifier {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self {
            completion,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// A classifier that always returns the fallback values.
    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledCompletion))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify a task, falling back to the default values on any failure.
    pub async fn classify(&self, task: &NewTask) -> Classification {
        match self.try_classify(task).await {
            Ok(classification) => {
                debug!(
                    priority = %classification.priority,
                    time = %classification.time,
                    severity = %classification.severity,
                    "Task classified"
                );
                classification
            }
            Err(ClassifyError::Disabled) => Classification::fallback(),
            Err(e) => {
                warn!(error = %e, "Classification failed, using fallback values");
                Classification::fallback()
            }
        }
    }

    /// Classify a task, reporting what went wrong instead of falling back.
    pub async fn try_classify(&self, task: &NewTask) -> Result<Classification, ClassifyError> {
        let prompt = build_prompt(task);
        let text = tokio::time::timeout(self.timeout, self.completion.complete(&prompt))
            .await
            .map_err(|_| ClassifyError::Timeout(self.timeout))??;
        parse_classification(&text)
    }
}

/// Instruction sent to the model for one task.
pub fn build_prompt(task: &NewTask) -> String {
    format!(
        "Task: {title}\n\
         Description: {description}\n\
         Category: {category}\n\
         \n\
         Classify this task. Reply with ONLY a JSON object, no markdown, no code fences, no other text:\n\
         {{\"priority\": \"high/medium/low\", \"time\": \"15m/30m/1h/2h\", \"severity\": \"CRITICAL/MEDIUM/LOW\"}}",
        title = task.title,
        description = task.description,
        category = task.category,
    )
}

/// Remove code-fence markers the model may add despite instructions.
pub fn strip_markup(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Raw reply shape. All three fields must be present.
#[derive(Debug, Deserialize)]
struct RawClassification {
    priority: String,
    time: String,
    severity: String,
}

/// Parse a model reply. Missing fields or non-JSON text are errors; a value
/// outside its enumeration falls back for that field only.
pub fn parse_classification(text: &str) -> Result<Classification, ClassifyError> {
    let raw: RawClassification = serde_json::from_str(&strip_markup(text))?;
    Ok(Classification {
        priority: field_or_default(&raw.priority),
        time: field_or_default(&raw.time),
        severity: field_or_default(&raw.severity),
    })
}

fn field_or_default<T>(value: &str) -> T
where
    T: FromStr<Err = crate::error::ParseValueError> + Default,
{
    value.parse().unwrap_or_else(|e| {
        warn!(error = %e, "Classifier returned an unknown value, using default");
        T::default()
    })
}

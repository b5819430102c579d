use crate::browser::BrowserSession;
use crate::error::{EngineError, Result};
use crate::form::question::QuestionDescriptor;
use crate::form::strategy::FormStepStrategy;

/// Scrape the current step into question descriptors.
///
/// The strategy's container scopes are tried in priority order; the first
/// scope yielding a non-empty question list wins. An empty result means
/// "this step has no additional questions" and is not an error; sites
/// render plenty of steps (confirmation screens, resume pickers) without
/// any question elements.
pub fn scrape_questions(
    session: &BrowserSession,
    strategy: &dyn FormStepStrategy,
) -> Result<Vec<QuestionDescriptor>> {
    for scope in strategy.question_scopes() {
        let questions = scrape_scope(session, scope)?;
        if !questions.is_empty() {
            log::debug!(
                "Scraped {} questions from scope '{}' ({})",
                questions.len(),
                scope,
                strategy.name()
            );
            return Ok(questions);
        }
    }

    log::debug!("No question elements in any scope ({})", strategy.name());
    Ok(Vec::new())
}

/// Run the in-page extraction script against one container scope.
fn scrape_scope(session: &BrowserSession, scope: &str) -> Result<Vec<QuestionDescriptor>> {
    // The extraction function runs inside the page and returns a JSON
    // string, which keeps the wire format independent of CDP node ids.
    let js_fn = include_str!("extract_questions.js");
    let scope_arg = serde_json::to_string(scope)
        .map_err(|e| EngineError::ScrapeFailed(format!("encode scope: {}", e)))?;
    let expr = format!("({})({})", js_fn, scope_arg);

    let value = session
        .evaluate(&expr)
        .map_err(|e| EngineError::ScrapeFailed(e.to_string()))?
        .ok_or_else(|| EngineError::ScrapeFailed("No value from extraction script".to_string()))?;

    let json_str: String = serde_json::from_value(value)
        .map_err(|e| EngineError::ScrapeFailed(format!("Expected JSON string: {}", e)))?;

    parse_scrape_payload(&json_str)
}

/// Parse the JSON payload produced by the extraction script.
pub(crate) fn parse_scrape_payload(json_str: &str) -> Result<Vec<QuestionDescriptor>> {
    serde_json::from_str(json_str)
        .map_err(|e| EngineError::ScrapeFailed(format!("Failed to parse questions: {}", e)))
}

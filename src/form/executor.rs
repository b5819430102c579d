use crate::browser::BrowserSession;
use crate::config::RequiredAnswerPolicy;
use crate::error::{EngineError, Result};
use crate::form::question::{AnswerSet, QuestionDescriptor, QuestionKind};
use crate::form::strategy::FormStepStrategy;

/// Result of trying to advance past the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A submit-class control was clicked; the flow is complete.
    ReachedTerminal,
    /// A review or next/continue control was clicked; more steps follow.
    Continued,
    /// No known advance control was found. An ordinary terminal condition,
    /// not an exception: the vocabulary of controls is simply exhausted.
    Stuck,
}

/// Merge resolved answers with required-question defaults.
///
/// Unanswered optional questions are skipped. Required-but-unanswered
/// questions get a best-effort default under `FillDefault` (first option
/// for select/radio; free text and checkboxes stay untouched), or are left
/// alone under `Skip`.
pub fn effective_answers(
    questions: &[QuestionDescriptor],
    answers: &AnswerSet,
    policy: RequiredAnswerPolicy,
) -> Vec<(QuestionDescriptor, String)> {
    let mut effective = Vec::new();

    for question in questions {
        if let Some(answer) = answers.get(&question.id) {
            effective.push((question.clone(), answer.clone()));
            continue;
        }

        if question.required && policy == RequiredAnswerPolicy::FillDefault {
            if let Some(default) = question.first_option() {
                log::warn!(
                    "Required question '{}' unanswered, defaulting to '{}'",
                    question.prompt,
                    default
                );
                effective.push((question.clone(), default.to_string()));
            }
        }
    }

    effective
}

/// Apply resolved answers to the live step. Returns how many were applied.
///
/// A missing or unresponsive element for one answer is logged and skipped;
/// it never fails the step.
pub fn apply_answers(
    session: &BrowserSession,
    questions: &[QuestionDescriptor],
    answers: &AnswerSet,
    policy: RequiredAnswerPolicy,
) -> Result<usize> {
    let mut applied = 0;

    for (question, answer) in effective_answers(questions, answers, policy) {
        let outcome = match question.kind {
            QuestionKind::Select => set_select(session, &question.selector, &answer),
            QuestionKind::Radio => click_radio(session, &question.selector, &answer),
            QuestionKind::Checkbox => set_checkbox(session, &question.selector, &answer),
            QuestionKind::Text => fill_text(session, &question.selector, &answer),
        };

        match outcome {
            Ok(()) => applied += 1,
            Err(e) => log::warn!(
                "Skipping answer for '{}' ({}): {}",
                question.prompt,
                question.selector,
                e
            ),
        }
    }

    Ok(applied)
}

/// Set a native dropdown to the option whose visible text (or value)
/// matches, dispatching the events frameworks listen for.
fn set_select(session: &BrowserSession, selector: &str, value: &str) -> Result<()> {
    let js = format!(
        r#"(function (sel, wanted) {{
            var el = document.querySelector(sel);
            if (!el) return 'missing';
            for (var i = 0; i < el.options.length; i++) {{
                var o = el.options[i];
                var text = (o.innerText || o.textContent || '').trim();
                if (text === wanted || o.value === wanted) {{
                    el.value = o.value;
                    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    return 'ok';
                }}
            }}
            return 'nomatch';
        }})({}, {})"#,
        encode(selector)?,
        encode(value)?
    );
    expect_ok(session, &js, "select", selector)
}

/// Click the radio control in the group whose label (or value) matches.
fn click_radio(session: &BrowserSession, selector: &str, value: &str) -> Result<()> {
    let js = format!(
        r#"(function (sel, wanted) {{
            var els = document.querySelectorAll(sel);
            for (var i = 0; i < els.length; i++) {{
                var el = els[i];
                var label = '';
                if (el.id) {{
                    var bound = document.querySelector("label[for='" + el.id + "']");
                    if (bound) label = (bound.innerText || '').trim();
                }}
                if (!label && el.closest('label')) {{
                    label = (el.closest('label').innerText || '').trim();
                }}
                if (label === wanted || el.value === wanted) {{
                    el.click();
                    return 'ok';
                }}
            }}
            return 'nomatch';
        }})({}, {})"#,
        encode(selector)?,
        encode(value)?
    );
    expect_ok(session, &js, "radio", selector)
}

/// Toggle a checkbox to match an affirmative/negative answer.
fn set_checkbox(session: &BrowserSession, selector: &str, value: &str) -> Result<()> {
    // Anything that is not an explicit negative counts as "check it";
    // checkbox answers often arrive as the label text itself.
    let want = !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "no" | "false" | "0" | "unchecked" | "off"
    );

    let js = format!(
        r#"(function (sel, want) {{
            var el = document.querySelector(sel);
            if (!el) return 'missing';
            if (el.checked !== want) el.click();
            return 'ok';
        }})({}, {})"#,
        encode(selector)?,
        want
    );
    expect_ok(session, &js, "checkbox", selector)
}

/// Clear a text control, then type the value into it.
fn fill_text(session: &BrowserSession, selector: &str, value: &str) -> Result<()> {
    let tab = session.tab()?;
    let element = session.find_element(&tab, selector)?;

    // Focus and wipe any prefilled content before typing.
    element.click().ok();
    tab.press_key("End").ok();
    for _ in 0..value.len() + 100 {
        tab.press_key("Backspace").ok();
    }

    element
        .type_into(value)
        .map_err(|e| EngineError::ExecutionFailed {
            action: "text".to_string(),
            reason: e.to_string(),
        })?;
    Ok(())
}

/// Search for an advance control in priority order and click the first one
/// found: submit beats review beats next/continue. Absence of all three is
/// the `Stuck` value, not an error.
pub fn advance(session: &BrowserSession, strategy: &dyn FormStepStrategy) -> Result<AdvanceOutcome> {
    let tab = session.tab()?;

    for selector in strategy.submit_selectors() {
        if let Some(element) = session.try_find(&tab, selector) {
            element.click().map_err(|e| EngineError::ExecutionFailed {
                action: "submit".to_string(),
                reason: e.to_string(),
            })?;
            log::info!("Clicked submit control '{}'", selector);
            return Ok(AdvanceOutcome::ReachedTerminal);
        }
    }

    for selector in strategy.review_selectors() {
        if let Some(element) = session.try_find(&tab, selector) {
            element.click().map_err(|e| EngineError::ExecutionFailed {
                action: "review".to_string(),
                reason: e.to_string(),
            })?;
            log::info!("Clicked review control '{}'", selector);
            return Ok(AdvanceOutcome::Continued);
        }
    }

    for selector in strategy.next_selectors() {
        if let Some(element) = session.try_find(&tab, selector) {
            element.click().map_err(|e| EngineError::ExecutionFailed {
                action: "continue".to_string(),
                reason: e.to_string(),
            })?;
            log::info!("Clicked continue control '{}'", selector);
            return Ok(AdvanceOutcome::Continued);
        }
    }

    Ok(AdvanceOutcome::Stuck)
}

fn encode(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| EngineError::EvaluationFailed(e.to_string()))
}

/// Run an action script that reports 'ok' / 'missing' / 'nomatch'.
fn expect_ok(session: &BrowserSession, js: &str, action: &str, selector: &str) -> Result<()> {
    let value = session.evaluate(js)?;
    match value.as_ref().and_then(|v| v.as_str()) {
        Some("ok") => Ok(()),
        Some("missing") => Err(EngineError::ElementNotFound(selector.to_string())),
        other => Err(EngineError::ExecutionFailed {
            action: action.to_string(),
            reason: format!("script reported {:?}", other),
        }),
    }
}

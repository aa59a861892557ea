use handlebars::Handlebars;
use serde::Serialize;
use tutor_domain::{HintTier, SessionState};

/// Name under which the system prompt template is registered
const SYSTEM_PROMPT_TEMPLATE: &str = "socratic-tutor.md";

/// Variables the system prompt template renders against. Derived fresh from
/// session state every turn, so escalation applies to the next turn only
/// and never leaks into history.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PromptContext {
    pub current_problem: Option<String>,
    pub gentle_hint: bool,
    pub concrete_hint: bool,
}

impl From<&SessionState> for PromptContext {
    fn from(state: &SessionState) -> Self {
        let tier = state.hint_tier();
        Self {
            current_problem: state.current_problem.clone(),
            gentle_hint: tier == HintTier::Gentle,
            concrete_hint: tier == HintTier::Concrete,
        }
    }
}

/// Renders the versioned Socratic system prompt. The template lives beside
/// the code (`templates/`) so prompt changes are reviewable and testable
/// independently of protocol logic.
pub struct PromptBuilder {
    handlebars: Handlebars<'static>,
}

impl PromptBuilder {
    pub fn new() -> anyhow::Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_template_string(
            SYSTEM_PROMPT_TEMPLATE,
            include_str!("../templates/socratic-tutor.md"),
        )?;
        Ok(Self { handlebars })
    }

    pub fn system_prompt(&self, context: &PromptContext) -> anyhow::Result<String> {
        Ok(self.handlebars.render(SYSTEM_PROMPT_TEMPLATE, context)?)
    }
}

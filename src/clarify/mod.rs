//! Clarification: free-text description plus answers → project specification.

pub mod questions;

use architect_common::spec::{FEATURES_QUESTION, TECH_STACK_QUESTION, UI_TYPE_QUESTION};
use architect_common::{
    ClarificationAnswer, ClarificationQuestion, EventBus, IgnoredReason, PipelineEvent,
    ProjectSpecification,
};
use tracing::{debug, info, warn};

pub use questions::propose_questions;

/// Fallback keys used for unanswered questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDefaults {
    pub tech_stack: String,
    pub ui_type: String,
}

impl Default for SpecDefaults {
    fn default() -> Self {
        Self {
            tech_stack: "nodejs".to_string(),
            ui_type: "cli".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The answer was stored; carries the recomputed specification.
    Recorded(ProjectSpecification),
    Ignored(IgnoredReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed(ProjectSpecification),
    Ignored(IgnoredReason),
}

/// Owns the questions, answers and specification of one clarification
/// session. Starting a new session resets all of it.
pub struct SpecResolver {
    defaults: SpecDefaults,
    events: EventBus,
    description: String,
    questions: Vec<ClarificationQuestion>,
    answers: Vec<ClarificationAnswer>,
    spec: Option<ProjectSpecification>,
}

impl SpecResolver {
    pub fn new(defaults: SpecDefaults, events: EventBus) -> Self {
        Self {
            defaults,
            events,
            description: String::new(),
            questions: Vec::new(),
            answers: Vec::new(),
            spec: None,
        }
    }

    /// Begin a session for `description` and emit the proposed questions.
    ///
    /// The initial specification is computed from the empty answer set, so
    /// confirming straight away yields the defaults.
    pub fn start_clarification(&mut self, description: &str) -> Vec<ClarificationQuestion> {
        self.description = description.to_string();
        self.answers.clear();
        self.questions = propose_questions(description);
        self.spec = Some(self.resolve());

        info!(questions = self.questions.len(), "Clarification started");
        self.events.emit(PipelineEvent::QuestionsGenerated {
            questions: self.questions.clone(),
        });
        self.questions.clone()
    }

    /// Replace any prior answer for the same question and recompute the spec.
    pub fn submit_answer(&mut self, answer: ClarificationAnswer) -> AnswerOutcome {
        if self.spec.as_ref().is_some_and(|s| s.confirmed) {
            warn!(question = %answer.question_id, "Answer ignored: specification already confirmed");
            return AnswerOutcome::Ignored(IgnoredReason::SpecificationLocked);
        }

        debug!(question = %answer.question_id, value = ?answer.value(), "Answer submitted");
        self.answers.retain(|a| a.question_id != answer.question_id);
        self.answers.push(answer);

        let spec = self.resolve();
        self.spec = Some(spec.clone());
        AnswerOutcome::Recorded(spec)
    }

    /// Mark the current specification confirmed and emit it.
    pub fn confirm_spec(&mut self) -> ConfirmOutcome {
        let Some(spec) = self.spec.as_mut() else {
            warn!("Confirm ignored: no specification yet");
            return ConfirmOutcome::Ignored(IgnoredReason::NoSpecification);
        };

        spec.confirmed = true;
        let spec = spec.clone();
        info!(tech_stack = %spec.tech_stack, ui_type = %spec.ui_type, "Specification confirmed");
        self.events.emit(PipelineEvent::SpecConfirmed { spec: spec.clone() });
        ConfirmOutcome::Confirmed(spec)
    }

    /// Drop the session: description, questions, answers and specification.
    pub fn reset(&mut self) {
        self.description.clear();
        self.questions.clear();
        self.answers.clear();
        self.spec = None;
        debug!("Clarification session reset");
    }

    pub fn current_spec(&self) -> Option<&ProjectSpecification> {
        self.spec.as_ref()
    }

    pub fn questions(&self) -> &[ClarificationQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &[ClarificationAnswer] {
        &self.answers
    }

    fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .and_then(ClarificationAnswer::value)
    }

    fn resolve(&self) -> ProjectSpecification {
        let tech_stack = self
            .answer_for(TECH_STACK_QUESTION)
            .unwrap_or(&self.defaults.tech_stack)
            .to_string();
        let ui_type = self
            .answer_for(UI_TYPE_QUESTION)
            .unwrap_or(&self.defaults.ui_type)
            .to_string();
        let features = self
            .answer_for(FEATURES_QUESTION)
            .map(split_features)
            .unwrap_or_default();

        ProjectSpecification {
            description: self.description.clone(),
            tech_stack,
            ui_type,
            features,
            confirmed: false,
        }
    }
}

fn split_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SpecResolver {
        SpecResolver::new(SpecDefaults::default(), EventBus::new(16))
    }

    #[test]
    fn test_start_clarification_emits_questions() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let mut resolver = SpecResolver::new(SpecDefaults::default(), bus);

        let questions = resolver.start_clarification("a todo list");
        assert_eq!(questions.len(), 3);
        match rx.try_recv().unwrap() {
            PipelineEvent::QuestionsGenerated { questions: emitted } => {
                assert_eq!(emitted, questions)
            }
            other => panic!("Expected QuestionsGenerated, got {:?}", other),
        }
    }

    #[test]
    fn test_confirm_without_answers_yields_defaults() {
        let mut resolver = resolver();
        resolver.start_clarification("a file search tool");

        match resolver.confirm_spec() {
            ConfirmOutcome::Confirmed(spec) => {
                assert_eq!(spec.tech_stack, "nodejs");
                assert_eq!(spec.ui_type, "cli");
                assert!(spec.features.is_empty());
                assert!(spec.confirmed);
            }
            other => panic!("Expected Confirmed, got {:?}", other),
        }
    }

    #[test]
    fn test_confirm_before_start_is_ignored() {
        let mut resolver = resolver();
        assert_eq!(
            resolver.confirm_spec(),
            ConfirmOutcome::Ignored(IgnoredReason::NoSpecification)
        );
    }

    #[test]
    fn test_configured_defaults_apply() {
        let defaults = SpecDefaults {
            tech_stack: "go".to_string(),
            ui_type: "api".to_string(),
        };
        let mut resolver = SpecResolver::new(defaults, EventBus::new(4));
        resolver.start_clarification("x");
        let spec = resolver.current_spec().unwrap();
        assert_eq!(spec.tech_stack, "go");
        assert_eq!(spec.ui_type, "api");
    }

    #[test]
    fn test_last_answer_per_question_wins() {
        let mut resolver = resolver();
        resolver.start_clarification("x");
        resolver.submit_answer(ClarificationAnswer::selected(TECH_STACK_QUESTION, "python"));
        resolver.submit_answer(ClarificationAnswer::selected(UI_TYPE_QUESTION, "web"));
        resolver.submit_answer(ClarificationAnswer::selected(TECH_STACK_QUESTION, "go"));

        assert_eq!(resolver.answers().len(), 2);
        let spec = resolver.current_spec().unwrap();
        assert_eq!(spec.tech_stack, "go");
        assert_eq!(spec.ui_type, "web");
    }

    #[test]
    fn test_freeform_beats_selection() {
        let mut resolver = resolver();
        resolver.start_clarification("x");
        let outcome = resolver.submit_answer(ClarificationAnswer {
            question_id: UI_TYPE_QUESTION.to_string(),
            selected_option_id: Some("web".to_string()),
            freeform_value: Some("tui".to_string()),
        });
        match outcome {
            AnswerOutcome::Recorded(spec) => assert_eq!(spec.ui_type, "tui"),
            other => panic!("Expected Recorded, got {:?}", other),
        }
    }

    #[test]
    fn test_features_split_and_trimmed() {
        let mut resolver = resolver();
        resolver.start_clarification("x");
        resolver.submit_answer(ClarificationAnswer::freeform(
            FEATURES_QUESTION,
            " config, search ,,logging ",
        ));
        let spec = resolver.current_spec().unwrap();
        assert_eq!(spec.features, vec!["config", "search", "logging"]);
        assert!(spec.has_feature("config"));
    }

    #[test]
    fn test_answers_after_confirm_are_ignored() {
        let mut resolver = resolver();
        resolver.start_clarification("x");
        resolver.confirm_spec();

        let outcome =
            resolver.submit_answer(ClarificationAnswer::selected(TECH_STACK_QUESTION, "rust"));
        assert_eq!(
            outcome,
            AnswerOutcome::Ignored(IgnoredReason::SpecificationLocked)
        );
        let spec = resolver.current_spec().unwrap();
        assert_eq!(spec.tech_stack, "nodejs");
        assert!(spec.confirmed);
    }

    #[test]
    fn test_reset_drops_confirmed_session() {
        let mut resolver = resolver();
        resolver.start_clarification("a todo list");
        resolver.submit_answer(ClarificationAnswer::selected(TECH_STACK_QUESTION, "go"));
        resolver.confirm_spec();

        resolver.reset();

        assert!(resolver.current_spec().is_none());
        assert!(resolver.questions().is_empty());
        assert!(resolver.answers().is_empty());
        assert_eq!(
            resolver.confirm_spec(),
            ConfirmOutcome::Ignored(IgnoredReason::NoSpecification)
        );
    }

    #[test]
    fn test_new_session_resets_answers() {
        let mut resolver = resolver();
        resolver.start_clarification("first");
        resolver.submit_answer(ClarificationAnswer::selected(TECH_STACK_QUESTION, "rust"));
        resolver.confirm_spec();

        resolver.start_clarification("second");
        assert!(resolver.answers().is_empty());
        let spec = resolver.current_spec().unwrap();
        assert_eq!(spec.description, "second");
        assert!(!spec.confirmed);
    }
}

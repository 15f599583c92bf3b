use serde::{Deserialize, Serialize};

/// Question id for the tech-stack choice.
pub const TECH_STACK_QUESTION: &str = "tech-stack";
/// Question id for the UI / interaction-surface choice.
pub const UI_TYPE_QUESTION: &str = "ui-type";
/// Question id for the feature selection.
pub const FEATURES_QUESTION: &str = "features";

/// A single clarification question, created in a batch when clarification
/// starts and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    pub id: String,
    pub prompt_text: String,
    pub options: Vec<ClarificationOption>,
    pub allows_freeform_answer: bool,
}

impl ClarificationQuestion {
    /// The first option flagged as recommended, if any.
    pub fn recommended_option(&self) -> Option<&ClarificationOption> {
        self.options.iter().find(|o| o.is_recommended)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationOption {
    pub id: String,
    pub label: String,
    pub description: String,
    #[serde(default)]
    pub is_recommended: bool,
}

impl ClarificationOption {
    pub fn new(id: &str, label: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            is_recommended: false,
        }
    }

    pub fn recommended(mut self) -> Self {
        self.is_recommended = true;
        self
    }
}

/// An answer to one question. At most one answer per question is kept;
/// a later answer for the same question replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationAnswer {
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub freeform_value: Option<String>,
}

impl ClarificationAnswer {
    pub fn selected(question_id: &str, option_id: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            selected_option_id: Some(option_id.to_string()),
            freeform_value: None,
        }
    }

    pub fn freeform(question_id: &str, value: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            selected_option_id: None,
            freeform_value: Some(value.to_string()),
        }
    }

    /// The effective value: a non-empty freeform value wins over the selected option.
    pub fn value(&self) -> Option<&str> {
        self.freeform_value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .or(self.selected_option_id.as_deref())
    }
}

/// The derived description of what to generate.
///
/// `confirmed` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpecification {
    pub description: String,
    pub tech_stack: String,
    pub ui_type: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub confirmed: bool,
}

impl ProjectSpecification {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

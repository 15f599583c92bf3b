//! Keyword heuristics that propose clarification questions from a
//! free-text description. Pure and stateless.

use architect_common::spec::{FEATURES_QUESTION, TECH_STACK_QUESTION, UI_TYPE_QUESTION};
use architect_common::{ClarificationOption, ClarificationQuestion};

struct FeatureRule {
    key: &'static str,
    label: &'static str,
    keywords: &'static [&'static str],
}

const FEATURE_RULES: &[FeatureRule] = &[
    FeatureRule {
        key: "auth",
        label: "User authentication",
        keywords: &["login", "user", "登录", "用户"],
    },
    FeatureRule {
        key: "db",
        label: "Database storage",
        keywords: &["data", "store", "db", "数据", "存"],
    },
    FeatureRule {
        key: "api",
        label: "RESTful API",
        keywords: &["api", "server", "接口"],
    },
    FeatureRule {
        key: "realtime",
        label: "Realtime messaging (WebSocket)",
        keywords: &["chat", "realtime", "socket", "聊"],
    },
    FeatureRule {
        key: "search",
        label: "Full-text search",
        keywords: &["search", "find", "搜"],
    },
];

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Propose the tech-stack, UI and feature questions for `description`.
///
/// Always returns exactly one question per category, in that order.
pub fn propose_questions(description: &str) -> Vec<ClarificationQuestion> {
    let lower = description.to_lowercase();
    vec![
        tech_stack_question(&lower),
        ui_type_question(&lower),
        features_question(&lower),
    ]
}

fn tech_stack_question(lower: &str) -> ClarificationQuestion {
    let (prompt, options) = if mentions_any(lower, &["game", "游戏"]) {
        (
            "This looks like a game. Which engine do you prefer?",
            vec![
                ClarificationOption::new("unity", "Unity (C#)", "Professional 3D/2D game engine")
                    .recommended(),
                ClarificationOption::new("godot", "Godot", "Lightweight open-source engine"),
                ClarificationOption::new("canvas", "HTML5 Canvas + TS", "Small browser game"),
            ],
        )
    } else if mentions_any(lower, &["mobile", "app", "移动"]) {
        (
            "Which mobile stack should be used?",
            vec![
                ClarificationOption::new("flutter", "Flutter", "Cross-platform UI toolkit")
                    .recommended(),
                ClarificationOption::new("react-native", "React Native", "Native apps with React"),
                ClarificationOption::new("swift", "Swift (iOS)", "Native iOS development"),
            ],
        )
    } else if mentions_any(lower, &["ai", "data", "模型"]) {
        (
            "AI and data projects usually use:",
            vec![
                ClarificationOption::new("python", "Python (PyTorch/TF)", "Standard for AI work")
                    .recommended(),
                ClarificationOption::new("cpp", "C++", "High-performance computing"),
            ],
        )
    } else {
        (
            "Which tech stack would you like to use?",
            vec![
                ClarificationOption::new("nodejs", "Node.js + TypeScript", "General full-stack choice")
                    .recommended(),
                ClarificationOption::new("python", "Python", "Simple and approachable"),
                ClarificationOption::new("go", "Go", "Fast backend services"),
                ClarificationOption::new("rust", "Rust", "Systems programming"),
            ],
        )
    };

    ClarificationQuestion {
        id: TECH_STACK_QUESTION.to_string(),
        prompt_text: prompt.to_string(),
        options,
        allows_freeform_answer: true,
    }
}

fn ui_type_question(lower: &str) -> ClarificationQuestion {
    let (prompt, options) = if mentions_any(lower, &["tool", "cli", "script", "脚本"]) {
        (
            "How should the tool be driven?",
            vec![
                ClarificationOption::new("cli", "Command line (CLI)", "Plain text, fast to use")
                    .recommended(),
                ClarificationOption::new("tui", "Terminal UI (TUI)", "Interactive terminal screens"),
            ],
        )
    } else {
        (
            "Which interface do you prefer?",
            vec![
                ClarificationOption::new("web", "Web application", "Used from a browser").recommended(),
                ClarificationOption::new("desktop", "Desktop app (Electron)", "Standalone installer"),
                ClarificationOption::new("mobile", "Mobile app", "Runs on phones"),
                ClarificationOption::new("api", "Headless (API service)", "Exposes endpoints only"),
            ],
        )
    };

    ClarificationQuestion {
        id: UI_TYPE_QUESTION.to_string(),
        prompt_text: prompt.to_string(),
        options,
        allows_freeform_answer: true,
    }
}

fn features_question(lower: &str) -> ClarificationQuestion {
    let mut options: Vec<ClarificationOption> = FEATURE_RULES
        .iter()
        .filter(|rule| mentions_any(lower, rule.keywords))
        .map(|rule| {
            ClarificationOption::new(rule.key, rule.label, "Suggested from your description")
                .recommended()
        })
        .collect();

    if options.len() < 2 {
        options.push(ClarificationOption::new("logging", "Logging", "Standard feature"));
        options.push(ClarificationOption::new("config", "Configuration", "Standard feature"));
    }

    ClarificationQuestion {
        id: FEATURES_QUESTION.to_string(),
        prompt_text: "These feature modules fit your description".to_string(),
        options,
        allows_freeform_answer: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option_ids(question: &ClarificationQuestion) -> Vec<&str> {
        question.options.iter().map(|o| o.id.as_str()).collect()
    }

    fn recommended(question: &ClarificationQuestion) -> Option<&str> {
        question.recommended_option().map(|o| o.id.as_str())
    }

    #[test]
    fn test_one_question_per_category_in_order() {
        let questions = propose_questions("");
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["tech-stack", "ui-type", "features"]);
        assert!(questions.iter().all(|q| q.allows_freeform_answer));
        assert!(questions.iter().all(|q| !q.options.is_empty()));
    }

    #[test]
    fn test_generic_description_uses_default_branches() {
        let questions = propose_questions("a file search tool");
        assert_eq!(option_ids(&questions[0]), vec!["nodejs", "python", "go", "rust"]);
        assert_eq!(recommended(&questions[0]), Some("nodejs"));
        assert_eq!(option_ids(&questions[1]), vec!["cli", "tui"]);
        assert_eq!(recommended(&questions[1]), Some("cli"));
    }

    #[test]
    fn test_game_branch_wins_over_mobile() {
        let questions = propose_questions("A mobile GAME about cats");
        assert_eq!(recommended(&questions[0]), Some("unity"));
    }

    #[test]
    fn test_mobile_and_ai_branches() {
        assert_eq!(recommended(&propose_questions("shopping app")[0]), Some("flutter"));
        assert_eq!(
            option_ids(&propose_questions("data pipeline")[0]),
            vec!["python", "cpp"]
        );
    }

    #[test]
    fn test_ui_defaults_to_web_options() {
        let questions = propose_questions("an online shop");
        assert_eq!(option_ids(&questions[1]), vec!["web", "desktop", "mobile", "api"]);
    }

    #[test]
    fn test_features_padded_when_few_match() {
        let questions = propose_questions("a file search tool");
        assert_eq!(option_ids(&questions[2]), vec!["search", "logging", "config"]);
        assert_eq!(recommended(&questions[2]), Some("search"));
    }

    #[test]
    fn test_chinese_keywords_select_branches() {
        let game = propose_questions("一个可以聊天和搜索的小游戏");
        assert_eq!(recommended(&game[0]), Some("unity"));
        assert_eq!(option_ids(&game[1]), vec!["web", "desktop", "mobile", "api"]);
        assert_eq!(option_ids(&game[2]), vec!["realtime", "search"]);

        let mobile = propose_questions("移动端用户登录");
        assert_eq!(recommended(&mobile[0]), Some("flutter"));
        assert_eq!(option_ids(&mobile[2]), vec!["auth", "logging", "config"]);

        let script = propose_questions("模型训练脚本");
        assert_eq!(option_ids(&script[0]), vec!["python", "cpp"]);
        assert_eq!(option_ids(&script[1]), vec!["cli", "tui"]);
    }

    #[test]
    fn test_chinese_feature_keywords() {
        let questions = propose_questions("数据存储接口");
        assert_eq!(option_ids(&questions[2]), vec!["db", "api"]);
    }

    #[test]
    fn test_features_not_padded_with_two_matches() {
        let questions = propose_questions("chat server with user login");
        assert_eq!(option_ids(&questions[2]), vec!["auth", "api", "realtime"]);
    }
}

//! Titles for imported segments.

use growth_journal_types::DEFAULT_CONTEXT;

pub enum Keywords {
    All(&'static [&'static str]),
    Any(&'static [&'static str]),
}

impl Keywords {
    fn matches(&self, text: &str) -> bool {
        match self {
            Keywords::All(words) => words.iter().all(|w| text.contains(w)),
            Keywords::Any(words) => words.iter().any(|w| text.contains(w)),
        }
    }
}

pub struct TitleRule {
    pub keywords: Keywords,
    pub title: &'static str,
}

/// Priority order: the first matching rule names the segment.
pub const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        keywords: Keywords::All(&["朋友", "妈妈"]),
        title: "关于朋友和家人",
    },
    TitleRule {
        keywords: Keywords::Any(&["选择", "刷牙", "洗脸"]),
        title: "日常选择",
    },
    TitleRule {
        keywords: Keywords::Any(&["抱", "亲亲", "挠痒", "举高高"]),
        title: "亲子互动",
    },
    TitleRule {
        keywords: Keywords::Any(&["洗澡"]),
        title: "洗澡时光",
    },
    TitleRule {
        keywords: Keywords::Any(&["吃饭", "吃", "喝"]),
        title: "用餐时光",
    },
    TitleRule {
        keywords: Keywords::Any(&["睡觉", "睡", "午觉"]),
        title: "睡前时光",
    },
    TitleRule {
        keywords: Keywords::Any(&["玩", "游戏"]),
        title: "游戏时光",
    },
    TitleRule {
        keywords: Keywords::Any(&["学习", "读书", "写字", "认字", "上课"]),
        title: "学习时光",
    },
];

/// Title fallback when no rule matches, e.g. `哈哈的对话`.
pub fn generic_title(child_name: &str) -> String {
    format!("{}的对话", child_name)
}

/// An explicit non-generic context wins; otherwise the rule table decides.
pub fn synthesize_title(content: &str, context: Option<&str>, child_name: &str) -> String {
    if let Some(ctx) = context.map(str::trim) {
        if !ctx.is_empty() && ctx != DEFAULT_CONTEXT {
            return ctx.to_string();
        }
    }

    TITLE_RULES
        .iter()
        .find(|rule| rule.keywords.matches(content))
        .map(|rule| rule.title.to_string())
        .unwrap_or_else(|| generic_title(child_name))
}

//! Keyword-driven tags for conversation segments.

pub struct TagRule {
    pub tag: &'static str,
    pub keywords: &'static [&'static str],
}

/// Output order follows this table, not the order keywords appear in the text.
pub const TAG_RULES: &[TagRule] = &[
    TagRule {
        tag: "家庭",
        keywords: &["妈妈", "爸爸", "爷爷", "奶奶", "外公", "外婆", "姥姥", "姥爷", "哥哥", "姐姐"],
    },
    TagRule {
        tag: "好奇",
        keywords: &["？", "?", "为什么", "怎么", "什么", "why"],
    },
    TagRule {
        tag: "兴奋",
        keywords: &["！", "!", "太好了", "开心", "高兴", "哇", "耶"],
    },
    TagRule {
        tag: "拒绝",
        keywords: &["不要", "不想", "不行", "不好", "才不"],
    },
    TagRule {
        tag: "礼貌",
        keywords: &["谢谢", "感谢"],
    },
    TagRule {
        tag: "游戏",
        keywords: &["玩", "游戏", "积木", "捉迷藏", "玩具"],
    },
    TagRule {
        tag: "饮食",
        keywords: &["吃", "饭", "喝", "饿", "水果", "零食"],
    },
    TagRule {
        tag: "睡眠",
        keywords: &["睡", "困", "午觉", "晚安"],
    },
    TagRule {
        tag: "社交",
        keywords: &["朋友", "同学", "小伙伴"],
    },
    TagRule {
        tag: "选择",
        keywords: &["选择", "要不要", "选"],
    },
    TagRule {
        tag: "互动",
        keywords: &["抱", "亲亲", "挠痒", "举高高", "拥抱"],
    },
];

pub fn generate_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TAG_RULES
        .iter()
        .filter(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_before_curious() {
        let tags = generate_tags("哈哈：妈妈，天为什么是蓝的？");
        assert_eq!(tags, vec!["家庭", "好奇"]);
    }

    #[test]
    fn test_rule_order_not_text_order() {
        let tags = generate_tags("我想睡觉了。谢谢爸爸");
        assert_eq!(tags, vec!["家庭", "礼貌", "睡眠"]);
    }

    #[test]
    fn test_each_tag_at_most_once() {
        let tags = generate_tags("妈妈？爸爸？奶奶？");
        assert_eq!(tags, vec!["家庭", "好奇"]);
    }

    #[test]
    fn test_no_match() {
        assert!(generate_tags("今天天气晴").is_empty());
    }

    #[test]
    fn test_ascii_case_insensitive() {
        assert_eq!(generate_tags("WHY"), vec!["好奇"]);
    }
}

//! Groups pasted transcript lines into dated, labelled segments.

use super::recognizer::{classify, LineKind};
use chrono::NaiveDate;
use growth_journal_types::{MemorySegment, DEFAULT_CONTEXT};

pub struct Segmenter {
    today: String,
}

#[derive(Default)]
struct OpenSegment {
    content: String,
    context: Option<String>,
}

impl Segmenter {
    /// `today` dates any lines that appear before the first date header.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: today.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn starting_now() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn segment(&self, text: &str) -> Vec<MemorySegment> {
        let mut segments = Vec::new();
        let mut open = OpenSegment::default();
        let mut current_date = self.today.clone();

        for line in text.lines() {
            match classify(line) {
                LineKind::DateHeader(date) => {
                    flush(&mut segments, &mut open, &current_date);
                    open.context = None;
                    current_date = date;
                }
                LineKind::TitleHeader(title) => {
                    flush(&mut segments, &mut open, &current_date);
                    open.context = Some(title);
                }
                LineKind::Blank => {
                    if !open.content.is_empty() {
                        open.content.push('\n');
                    }
                }
                LineKind::Content => {
                    if !open.content.is_empty() {
                        open.content.push('\n');
                    }
                    open.content.push_str(line);
                }
            }
        }
        flush(&mut segments, &mut open, &current_date);

        segments
    }
}

/// Emit the open segment if it has content. The context label survives the
/// flush; only a new header replaces it.
fn flush(segments: &mut Vec<MemorySegment>, open: &mut OpenSegment, date: &str) {
    if open.content.is_empty() {
        return;
    }
    let mut content = std::mem::take(&mut open.content);
    let trimmed_len = content.trim_end_matches('\n').len();
    content.truncate(trimmed_len);

    segments.push(MemorySegment {
        content,
        date: date.to_string(),
        context: open
            .context
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> Segmenter {
        Segmenter::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    #[test]
    fn test_bath_scenario() {
        let segments = segmenter().segment("2022.3.30\n洗澡时的对话\n妈妈：该洗澡了\n哈哈：好的");
        assert_eq!(
            segments,
            vec![MemorySegment {
                content: "妈妈：该洗澡了\n哈哈：好的".to_string(),
                date: "2022-03-30".to_string(),
                context: "洗澡时的对话".to_string(),
            }]
        );
    }

    #[test]
    fn test_defaults_without_headers() {
        let segments = segmenter().segment("妈妈：吃饭了\n哈哈：不要");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].date, "2024-05-01");
        assert_eq!(segments[0].context, DEFAULT_CONTEXT);
    }

    #[test]
    fn test_date_header_always_starts_new_segment() {
        let text = "2022.3.30\n妈妈：早上好\n2022.3.31\n妈妈：晚上好";
        let segments = segmenter().segment(text);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].date, "2022-03-30");
        assert_eq!(segments[0].content, "妈妈：早上好");
        assert_eq!(segments[1].date, "2022-03-31");
        assert_eq!(segments[1].content, "妈妈：晚上好");
    }

    #[test]
    fn test_date_header_clears_context() {
        let text = "睡前的对话\n哈哈：晚安\n2022.4.1\n哈哈：早安";
        let segments = segmenter().segment(text);
        assert_eq!(segments[0].context, "睡前的对话");
        assert_eq!(segments[1].context, DEFAULT_CONTEXT);
    }

    #[test]
    fn test_title_header_splits_and_is_excluded() {
        let text = "哈哈：我要玩\n吃饭时的对话\n哈哈：我饿了";
        let segments = segmenter().segment(text);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].content, "哈哈：我要玩");
        assert_eq!(segments[0].context, DEFAULT_CONTEXT);
        assert_eq!(segments[1].content, "哈哈：我饿了");
        assert_eq!(segments[1].context, "吃饭时的对话");
        assert!(segments.iter().all(|s| !s.content.contains("吃饭时的对话")));
    }

    #[test]
    fn test_whitespace_and_blank_lines_preserved() {
        let text = "妈妈：看\n    哈哈：哇\n\n妈妈：好看吗\n\n\n";
        let segments = segmenter().segment(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content, "妈妈：看\n    哈哈：哇\n\n妈妈：好看吗");
    }

    #[test]
    fn test_leading_blank_lines_ignored() {
        let segments = segmenter().segment("\n\n妈妈：你好");
        assert_eq!(segments[0].content, "妈妈：你好");
    }

    #[test]
    fn test_headers_without_content_emit_nothing() {
        assert!(segmenter().segment("2022.3.30\n洗澡时的对话\n").is_empty());
        assert!(segmenter().segment("").is_empty());
    }

    #[test]
    fn test_crlf_input() {
        let segments = segmenter().segment("2022.3.30\r\n妈妈：你好\r\n哈哈：你好");
        assert_eq!(segments[0].content, "妈妈：你好\n哈哈：你好");
    }

    #[test]
    fn test_no_line_dropped_or_duplicated() {
        let text = "开始前的一句话\n2022.3.30 周三\n洗澡时的对话\n妈妈：该洗澡了\n\n  哈哈：好的\n他不想继续对话了\n爸爸：为什么？\n2022.4.2\n哈哈：我们去公园吧，那里有很多小朋友可以一起玩";

        let mut expected: Vec<String> = Vec::new();
        let mut header_count = 0;
        for line in text.lines() {
            match classify(line) {
                LineKind::Content => expected.push(line.to_string()),
                LineKind::DateHeader(_) | LineKind::TitleHeader(_) => header_count += 1,
                LineKind::Blank => {}
            }
        }

        let segments = segmenter().segment(text);
        let mut actual: Vec<String> = segments
            .iter()
            .flat_map(|s| s.content.lines())
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect();

        let non_empty_input = text.lines().filter(|l| !l.trim().is_empty()).count();
        assert_eq!(actual.len() + header_count, non_empty_input);

        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
        assert_eq!(segments.len(), 4);
    }
}

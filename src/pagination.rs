//! Pagination utilities.
//!
//! Source documents arrive as plain text; the engine reasons about pages so
//! boilerplate filtering can work page-by-page the way it would over a
//! scanned document. Paragraphs are kept intact and packed greedily into
//! fixed-size pages.

/// Character budget used when the caller does not supply one.
pub const DEFAULT_CHARS_PER_PAGE: usize = 2_000;

/// Split the provided text into page-sized chunks of roughly
/// `chars_per_page` characters. Paragraphs are never split across pages, so
/// a single oversized paragraph still lands on one page.
pub fn paginate(text: &str, chars_per_page: usize) -> Vec<String> {
    let budget = chars_per_page.max(1);

    let paragraphs = split_paragraphs(text);
    if paragraphs.is_empty() {
        return vec![String::new()];
    }

    let mut pages = Vec::new();
    let mut page = String::new();
    let mut page_len = 0usize;

    for para in paragraphs {
        let para_len = para.chars().count();
        // Two characters for the separating blank line when the page already
        // has content.
        let needed = if page.is_empty() {
            para_len
        } else {
            page_len + 2 + para_len
        };

        if !page.is_empty() && needed > budget {
            pages.push(std::mem::take(&mut page));
            page_len = 0;
        }
        if !page.is_empty() {
            page.push_str("\n\n");
            page_len += 2;
        }
        page.push_str(&para);
        page_len += para_len;
    }

    if !page.is_empty() {
        pages.push(page);
    }

    pages
}

/// Split text into paragraphs at runs of blank (or whitespace-only) lines.
fn split_paragraphs(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    lines
        .split(|line| line.trim().is_empty())
        .filter(|block| !block.is_empty())
        .map(|block| block.join("\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_stay_intact_across_pages() {
        let text = "First paragraph with some words.\n\nSecond paragraph here.\n\nThird one.";
        let pages = paginate(text, 40);

        assert!(pages.len() >= 2);
        for page in &pages {
            assert!(!page.starts_with('\n') && !page.ends_with('\n'));
        }
        let rejoined = pages.join("\n\n");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn oversized_paragraph_gets_its_own_page() {
        let long = "x".repeat(500);
        let text = format!("Short intro.\n\n{long}\n\nShort outro.");
        let pages = paginate(&text, 100);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1], long);
    }

    #[test]
    fn whitespace_only_lines_are_paragraph_breaks() {
        let pages = paginate("First line.\n   \nSecond line.", 5);
        assert_eq!(
            pages,
            vec!["First line.".to_string(), "Second line.".to_string()]
        );
    }

    #[test]
    fn empty_input_yields_one_blank_page() {
        assert_eq!(paginate("", 100), vec![String::new()]);
        assert_eq!(paginate("\n\n\n", 100), vec![String::new()]);
    }

    #[test]
    fn single_page_when_everything_fits() {
        let text = "One.\n\nTwo.";
        assert_eq!(paginate(text, DEFAULT_CHARS_PER_PAGE), vec![text.to_string()]);
    }
}

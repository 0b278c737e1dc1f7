use pulldown_cmark::{Options, Parser, html};

/// Reading speed used for step time estimates, in words per minute.
pub const WORDS_PER_MINUTE: f64 = 20.0;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes needed to read `words` words. Halves round to the even
/// neighbour, so 50 words give 2 minutes and 70 give 4.
pub fn time_estimate(words: usize) -> i64 {
    (words as f64 / WORDS_PER_MINUTE).round_ties_even() as i64
}

/// Renders Markdown step content to HTML.
pub fn markdown_to_html(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source, options);

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_words_across_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  one\ttwo\nthree  "), 3);
    }

    #[test]
    fn estimate_rounds_to_minutes() {
        assert_eq!(time_estimate(0), 0);
        assert_eq!(time_estimate(100), 5);
        assert_eq!(time_estimate(29), 1);
        assert_eq!(time_estimate(31), 2);
    }

    #[test]
    fn estimate_rounds_halves_to_even() {
        assert_eq!(time_estimate(50), 2);
        assert_eq!(time_estimate(70), 4);
        assert_eq!(time_estimate(10), 0);
    }

    #[test]
    fn renders_headings_and_emphasis() {
        let html = markdown_to_html("# Ownership\n\nEvery value has *one* owner, **always**.");
        assert!(html.contains("<h1>Ownership</h1>"));
        assert!(html.contains("<em>one</em>"));
        assert!(html.contains("<strong>always</strong>"));
    }

    #[test]
    fn renders_code_and_lists() {
        let html = markdown_to_html("- `let x = 5;`\n- ~~moved~~");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<code>let x = 5;</code>"));
        assert!(html.contains("<del>moved</del>"));
        assert_eq!(markdown_to_html(""), "");
    }
}

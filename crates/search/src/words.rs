use std::fmt;

/// Split the text of a search box into search words.
/// Words are separated by whitespace, and empty words are dropped.
pub fn search_words(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// SearchSummary is the "N of M results" status of a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SearchSummary {
    pub shown: usize,
    pub total: usize,
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.total == 1 { "result" } else { "results" };
        write!(f, "{} of {} {noun}", self.shown, self.total)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_search_words() {
        assert_eq!(search_words(""), Vec::<String>::new());
        assert_eq!(search_words("   \t\n"), Vec::<String>::new());
        assert_eq!(
            search_words("  cpu   Alert\tBOB\n"),
            vec!["cpu".to_string(), "Alert".to_string(), "BOB".to_string()]
        );
    }

    #[test]
    fn test_summary_display() {
        let cases = [(0, 0, "0 of 0 results"), (1, 1, "1 of 1 result"), (3, 12, "3 of 12 results")];

        for (shown, total, expect) in cases {
            assert_eq!(SearchSummary { shown, total }.to_string(), expect);
        }
    }
}

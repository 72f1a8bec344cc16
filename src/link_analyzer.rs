use regex::Regex;

/// Finds URL-like tokens in raw email text.
pub struct LinkAnalyzer {
    link_regex: Regex,
}

impl Default for LinkAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkAnalyzer {
    pub fn new() -> Self {
        Self {
            link_regex: Regex::new(r#"(?i)(https?://[^\s"']+|www\.[^\s"']+)"#)
                .expect("link pattern is valid"),
        }
    }

    /// Unique links in order of first appearance. A link runs until
    /// whitespace or a quote character.
    pub fn extract_links(&self, text: &str) -> Vec<String> {
        let mut links: Vec<String> = Vec::new();
        for m in self.link_regex.find_iter(text) {
            let link = m.as_str();
            if !links.iter().any(|existing| existing == link) {
                links.push(link.to_string());
            }
        }
        links
    }

    /// Exact, case-sensitive `http://` prefix.
    pub fn is_non_https(link: &str) -> bool {
        link.starts_with("http://")
    }

    /// Shortener entries are matched against the link as written.
    pub fn is_shortened(link: &str, shorteners: &[String]) -> bool {
        shorteners.iter().any(|shortener| link.contains(shortener.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_http_https_and_www_links() {
        let analyzer = LinkAnalyzer::new();
        let links = analyzer.extract_links(
            "Visit http://a.com/x or https://b.com/y?z=1 and www.c.com today",
        );
        assert_eq!(links, vec!["http://a.com/x", "https://b.com/y?z=1", "www.c.com"]);
    }

    #[test]
    fn test_links_stop_at_quotes_and_whitespace() {
        let analyzer = LinkAnalyzer::new();
        let links = analyzer.extract_links(r#"<a href="https://evil.example/login">click</a>"#);
        assert_eq!(links, vec!["https://evil.example/login"]);

        let links = analyzer.extract_links("see 'www.quoted.com' ok");
        assert_eq!(links, vec!["www.quoted.com"]);
    }

    #[test]
    fn test_extraction_is_case_insensitive_and_deduplicated() {
        let analyzer = LinkAnalyzer::new();
        let links = analyzer.extract_links("HTTP://X.COM http://y.com http://y.com WWW.Z.COM");
        assert_eq!(links, vec!["HTTP://X.COM", "http://y.com", "WWW.Z.COM"]);
    }

    #[test]
    fn test_no_links() {
        let analyzer = LinkAnalyzer::new();
        assert!(analyzer.extract_links("").is_empty());
        assert!(analyzer.extract_links("plain text, no urls").is_empty());
    }

    #[test]
    fn test_non_https_detection() {
        assert!(LinkAnalyzer::is_non_https("http://a.com"));
        assert!(!LinkAnalyzer::is_non_https("HTTP://a.com"));
        assert!(!LinkAnalyzer::is_non_https("https://a.com"));
        assert!(!LinkAnalyzer::is_non_https("www.a.com"));
        assert!(!LinkAnalyzer::is_non_https("http:/"));
    }

    #[test]
    fn test_shortener_detection() {
        let shorteners = vec!["bit.ly".to_string(), "tinyurl.com".to_string()];
        assert!(LinkAnalyzer::is_shortened("http://bit.ly/x", &shorteners));
        assert!(LinkAnalyzer::is_shortened("https://tinyurl.com/abc", &shorteners));
        assert!(!LinkAnalyzer::is_shortened("https://TinyURL.com/abc", &shorteners));
        assert!(!LinkAnalyzer::is_shortened("https://example.com", &shorteners));
    }
}

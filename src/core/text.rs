use url::Url;

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Publishing site for a URL: the host with any leading `www.` removed.
pub fn site_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Truncate to at most `max_chars` characters (char-aware for Unicode).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  Heavy rain\n\n hits   Johor \t"),
            "Heavy rain hits Johor"
        );
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_site_from_url() {
        let url = Url::parse("https://www.straitstimes.com/singapore/flood").unwrap();
        assert_eq!(site_from_url(&url).as_deref(), Some("straitstimes.com"));

        let url = Url::parse("https://Astroawani.com/berita").unwrap();
        assert_eq!(site_from_url(&url).as_deref(), Some("astroawani.com"));
    }

    #[test]
    fn test_truncate_chars_unicode() {
        assert_eq!(truncate_chars("banjir besar", 6), "banjir");
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }
}

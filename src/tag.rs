//! Tag extraction from resource URLs.
//!
//! IPT resource links carry a short stable identifier in their query
//! string, e.g. `https://ipt.jbrj.gov.br/jabot/resource?r=hhm`. That
//! identifier is the strongest key available for matching a feed item
//! against the catalog.

/// Extract the `r=` value from a `resource?r=<value>` URL.
///
/// Returns everything between `resource?r=` and the next `&` (or the end
/// of the string), or an empty string when the pattern is absent. Callers
/// fall back to the item's guid when the primary link yields nothing.
pub fn extract_tag(url: &str) -> String {
    const MARKER: &str = "resource?r=";
    match url.find(MARKER) {
        Some(pos) => {
            let value = &url[pos + MARKER.len()..];
            match value.find('&') {
                Some(end) => value[..end].to_string(),
                None => value.to_string(),
            }
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_tag() {
        assert_eq!(
            extract_tag("https://ipt.jbrj.gov.br/jabot/resource?r=hhm"),
            "hhm"
        );
    }

    #[test]
    fn stops_at_ampersand() {
        assert_eq!(extract_tag("https://x/resource?r=hhm&v=2"), "hhm");
    }

    #[test]
    fn missing_pattern_is_empty() {
        assert_eq!(extract_tag("https://x/nope"), "");
        assert_eq!(extract_tag(""), "");
    }

    #[test]
    fn empty_value_is_empty() {
        assert_eq!(extract_tag("https://x/resource?r="), "");
        assert_eq!(extract_tag("https://x/resource?r=&v=2"), "");
    }
}

use url::Url;

/// Domain helpers for sender addresses and link hosts
pub struct DomainUtils;

impl DomainUtils {
    /// Domain part of a `From:` value, lowercased.
    ///
    /// Everything after the last `@`, untouched apart from case. A
    /// `Name <user@example.com>` sender keeps its closing bracket and
    /// yields `example.com>`.
    pub fn sender_domain(from: &str) -> Option<String> {
        let at_pos = from.rfind('@')?;
        Some(from[at_pos + 1..].to_lowercase())
    }

    /// Host of a link, lowercased and without port.
    ///
    /// Links without an `http` prefix (e.g. `www.` links) are parsed as
    /// `http://`. Anything the URL parser rejects falls back to a manual
    /// split, which may return an empty string.
    pub fn domain_of(link: &str) -> String {
        let candidate = if link.to_lowercase().starts_with("http") {
            link.to_string()
        } else {
            format!("http://{link}")
        };

        if let Ok(parsed) = Url::parse(&candidate) {
            if let Some(host) = parsed.host_str() {
                return host.to_lowercase();
            }
        }

        log::debug!("Falling back to manual host extraction for: {}", link);
        Self::best_effort_host(&candidate)
    }

    fn best_effort_host(url: &str) -> String {
        let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let host_port = authority.rsplit('@').next().unwrap_or_default();
        host_port
            .split(':')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Substring test used for sender/link alignment. `notexample.com`
    /// contains `example.com` and therefore counts as aligned.
    pub fn contains_domain(link_domain: &str, sender_domain: &str) -> bool {
        link_domain.contains(sender_domain)
    }
}

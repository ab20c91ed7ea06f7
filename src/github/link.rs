//! Parsing of the RFC 8288 `Link` header GitHub uses for pagination.

/// Returns the target of the `rel="next"` link in a `Link` header value.
///
/// ```
/// let header = r#"<https://api.github.com/repositories/1/pulls?page=2>; rel="next", <https://api.github.com/repositories/1/pulls?page=5>; rel="last""#;
/// assert_eq!(
///     tfguard::github::next_url(header).as_deref(),
///     Some("https://api.github.com/repositories/1/pulls?page=2")
/// );
/// ```
#[must_use]
pub fn next_url(header: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let (target, params) = link.split_once(';')?;
        let url = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        params
            .split(';')
            .any(is_next_relation)
            .then(|| url.to_string())
    })
}

fn is_next_relation(param: &str) -> bool {
    let Some((name, value)) = param.split_once('=') else {
        return false;
    };
    name.trim().eq_ignore_ascii_case("rel")
        && value
            .trim()
            .trim_matches('"')
            .split_whitespace()
            .any(|relation| relation.eq_ignore_ascii_case("next"))
}

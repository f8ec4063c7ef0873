/// Parses a comma-separated environment variable into a trimmed,
/// non-empty list of values.
pub fn parse_csv_var(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Accepts the usual env-style truthy/falsy spellings.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_bool_var(name: &str, default: bool) -> bool {
    std::env::var(name).ok().and_then(|raw| parse_bool(&raw)).unwrap_or(default)
}

pub fn parse_num_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|raw| raw.parse().ok()).unwrap_or(default)
}

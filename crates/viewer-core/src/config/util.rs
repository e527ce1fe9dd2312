use super::types::Enforcement;

pub(super) fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

pub(super) fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| non_empty(Some(v)))
}

pub(super) fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "enabled" | "on"
    )
}

pub(super) fn parse_enforcement(raw: &str) -> Enforcement {
    match raw.trim().to_ascii_lowercase().as_str() {
        "terminate" => Enforcement::Terminate,
        _ => Enforcement::Block,
    }
}

/// Facility names on the NBTS listing that do not geocode on their own.
/// Keys are matched against the uppercased, trimmed input.
const ALIASES: &[(&str, &str)] = &[
    ("NBC", "Colombo"),
    ("COLOMBO 01", "Colombo"),
    ("COLOMBO-01", "Colombo"),
];

const COUNTRY_SUFFIX: &str = ", Sri Lanka";

/// Map a raw blood bank / location cell to the `"<Place>, Sri Lanka"` string
/// used as the geocoding query (and cache key).
///
/// Case folding is deliberately naive: the first character keeps its
/// uppercase form and everything after it is lowercased, so multi-word
/// places come out as `"Nuwara eliya"`. Inputs that are only digits leave an
/// empty place name (`", Sri Lanka"`).
pub fn normalize_location(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = raw.to_uppercase();
    let text = text.trim();

    let working = ALIASES
        .iter()
        .find(|(alias, _)| *alias == text)
        .map(|(_, place)| *place)
        .unwrap_or(text);

    let stripped: String = working.chars().filter(|c| !c.is_ascii_digit()).collect();
    let stripped = stripped.trim();

    let mut chars = stripped.chars();
    let mut place = String::with_capacity(stripped.len());
    if let Some(first) = chars.next() {
        place.push(first);
        place.push_str(&chars.as_str().to_lowercase());
    }

    format!("{place}{COUNTRY_SUFFIX}")
}

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const TITLE_COUNT: usize = 5;

const DEFAULT_TITLES: [&str; TITLE_COUNT] = [
    "Default Title 1",
    "Default Title 2",
    "Default Title 3",
    "Default Title 4",
    "Default Title 5",
];

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("valid fence pattern")
});

/// Why a gateway call did not produce a genuine answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// Blank input, rejected before any network call.
    #[error("rejected: {0}")]
    Validation(String),
    /// Transport or API error.
    #[error("provider failure: {0}")]
    Provider(String),
    /// The provider answered, but not in the expected shape.
    #[error("unexpected response: {0}")]
    Shape(String),
}

impl Failure {
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::Validation(_) => "validation",
            Failure::Provider(_) => "provider",
            Failure::Shape(_) => "shape",
        }
    }
}

/// Result of a gateway operation. A `Fallback` still carries something to
/// render, tagged with the failure that caused it.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    Ok(T),
    Fallback { reason: Failure, value: T },
    Error(Failure),
}

impl<T> Completion<T> {
    /// Maps a failed call onto the operation's canned value. Validation
    /// rejections have no canned value and surface as `Error`.
    pub fn recover(result: Result<T, Failure>, fallback: impl FnOnce(&Failure) -> T) -> Self {
        match result {
            Ok(value) => Completion::Ok(value),
            Err(reason @ Failure::Validation(_)) => Completion::Error(reason),
            Err(reason) => {
                let value = fallback(&reason);
                Completion::Fallback { reason, value }
            }
        }
    }

    /// What the view should show, if anything.
    pub fn value(&self) -> Option<&T> {
        match self {
            Completion::Ok(value) | Completion::Fallback { value, .. } => Some(value),
            Completion::Error(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Completion::Ok(value) | Completion::Fallback { value, .. } => Some(value),
            Completion::Error(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Completion::Ok(_) => None,
            Completion::Fallback { reason, .. } | Completion::Error(reason) => Some(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Completion::Ok(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Completion::Fallback { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            Completion::Ok(_) => "ok",
            Completion::Fallback { .. } => "fallback",
            Completion::Error(_) => "error",
        }
    }
}

/// Exactly five titles, in the order the provider gave them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleList(Vec<String>);

impl TitleList {
    pub fn fallback() -> Self {
        Self(DEFAULT_TITLES.iter().map(|t| t.to_string()).collect())
    }

    /// Parses a structured-output answer: a JSON array of strings, optionally
    /// wrapped in a markdown code fence. Blank entries are dropped and extra
    /// entries past the fifth are ignored.
    pub fn parse(text: &str) -> Result<Self, Failure> {
        let trimmed = text.trim();
        let json = CODE_FENCE
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(trimmed);

        let value: Value = serde_json::from_str(json)
            .map_err(|e| Failure::Shape(format!("title list is not JSON: {e}")))?;
        let items = value
            .as_array()
            .ok_or_else(|| Failure::Shape("title list is not an array".to_string()))?;

        let mut titles = Vec::with_capacity(TITLE_COUNT);
        for item in items {
            let title = item
                .as_str()
                .ok_or_else(|| Failure::Shape("title list has a non-string entry".to_string()))?
                .trim();
            if !title.is_empty() {
                titles.push(title.to_string());
            }
        }

        if titles.len() < TITLE_COUNT {
            return Err(Failure::Shape(format!(
                "expected {TITLE_COUNT} titles, got {}",
                titles.len()
            )));
        }
        titles.truncate(TITLE_COUNT);
        Ok(Self(titles))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.as_slice().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_tags_fallbacks_and_keeps_validation_as_error() {
        let ok: Completion<&str> = Completion::recover(Ok("hi"), |_| "canned");
        assert_eq!(ok, Completion::Ok("hi"));

        let failed = Completion::recover(Err(Failure::Provider("down".into())), |_| "canned");
        assert!(failed.is_fallback());
        assert_eq!(failed.value(), Some(&"canned"));
        assert_eq!(failed.failure().map(Failure::kind), Some("provider"));

        let rejected = Completion::recover(Err(Failure::Validation("blank".into())), |_| "canned");
        assert_eq!(rejected.value(), None);
        assert_eq!(rejected.status(), "error");
    }

    #[test]
    fn parses_a_plain_array_in_order() {
        let list = TitleList::parse(r#"["e","d","c","b","a"]"#).unwrap();
        assert_eq!(list.as_slice(), ["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn tolerates_code_fences_and_truncates_extras() {
        let text = "```json\n[\"1\",\"2\",\"3\",\" \",\"4\",\"5\",\"6\"]\n```";
        let list = TitleList::parse(text).unwrap();
        assert_eq!(list.as_slice(), ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn malformed_lists_are_shape_failures() {
        for text in [
            "Here are some titles!",
            r#"{"titles": []}"#,
            r#"["only", "three", "titles"]"#,
            r#"["a", "b", "c", "d", 5]"#,
        ] {
            assert!(matches!(TitleList::parse(text), Err(Failure::Shape(_))), "{text}");
        }
    }

    #[test]
    fn fallback_has_five_titles() {
        let list = TitleList::fallback();
        assert_eq!(list.as_slice().len(), TITLE_COUNT);
        assert_eq!(list.as_slice()[0], "Default Title 1");
        assert_eq!(list.as_slice()[4], "Default Title 5");
    }
}

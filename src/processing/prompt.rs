//! Summary length tiers and prompt construction.

use std::fmt;
use std::str::FromStr;

/// Text placed between the instruction and the document body.
pub const PROMPT_SEPARATOR: &str = "\n\nDocument:\n";

const HIGHLIGHT_INSTRUCTION: &str = "Wrap the most important names, dates, numbers and key concepts in **double asterisks**. Do not use any other formatting.";

/// Requested summary verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthSelector {
    /// Roughly 40–80 words.
    Short,
    /// Roughly 120–170 words.
    #[default]
    Medium,
    /// Roughly 300–500 words.
    Long,
}

/// Raised when a length value is not one of `short`, `medium`, `long`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown summary length '{0}'")]
pub struct UnknownLength(pub String);

impl LengthSelector {
    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Instruction template requesting this length tier.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Short => {
                "Summarize the document below in 40-80 words. Keep only the core points."
            }
            Self::Medium => {
                "Summarize the document below in 120-170 words. Cover the main points and the key supporting details."
            }
            Self::Long => {
                "Summarize the document below in 300-500 words. Preserve its structure and its major arguments."
            }
        }
    }

    /// Resolve an optional caller-supplied value; absent or unknown values select the default.
    pub fn resolve(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|value| !value.is_empty()) {
            None => Self::default(),
            Some(value) => value.parse().unwrap_or_else(|error: UnknownLength| {
                tracing::warn!(
                    %error,
                    fallback = Self::default().as_str(),
                    "Using default summary length"
                );
                Self::default()
            }),
        }
    }
}

impl FromStr for LengthSelector {
    type Err = UnknownLength;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(UnknownLength(s.to_string())),
        }
    }
}

impl fmt::Display for LengthSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compose the instruction for `length` with the full document text.
pub fn build_prompt(text: &str, length: LengthSelector) -> String {
    let instruction = length.instruction();
    let mut prompt = String::with_capacity(
        instruction.len() + HIGHLIGHT_INSTRUCTION.len() + PROMPT_SEPARATOR.len() + text.len() + 1,
    );
    prompt.push_str(instruction);
    prompt.push(' ');
    prompt.push_str(HIGHLIGHT_INSTRUCTION);
    prompt.push_str(PROMPT_SEPARATOR);
    prompt.push_str(text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_template_separator_then_text() {
        let text = "Alpha beta. \nGamma delta.\n";
        let prompt = build_prompt(text, LengthSelector::Short);

        assert!(prompt.starts_with(LengthSelector::Short.instruction()));
        assert!(prompt.contains("**double asterisks**"));
        assert!(prompt.ends_with(&format!("{PROMPT_SEPARATOR}{text}")));
    }

    #[test]
    fn prompt_is_deterministic() {
        let first = build_prompt("Some text", LengthSelector::Long);
        let second = build_prompt("Some text", LengthSelector::Long);
        assert_eq!(first, second);
    }

    #[test]
    fn each_length_has_its_own_word_range() {
        assert!(LengthSelector::Short.instruction().contains("40-80"));
        assert!(LengthSelector::Medium.instruction().contains("120-170"));
        assert!(LengthSelector::Long.instruction().contains("300-500"));
        assert_ne!(
            build_prompt("x", LengthSelector::Short),
            build_prompt("x", LengthSelector::Medium)
        );
    }

    #[test]
    fn parsing_is_strict_and_case_insensitive() {
        assert_eq!("SHORT".parse(), Ok(LengthSelector::Short));
        assert_eq!(" long ".parse(), Ok(LengthSelector::Long));
        assert_eq!(
            "tiny".parse::<LengthSelector>(),
            Err(UnknownLength("tiny".into()))
        );
    }

    #[test]
    fn resolve_falls_back_to_medium() {
        assert_eq!(LengthSelector::resolve(None), LengthSelector::Medium);
        assert_eq!(LengthSelector::resolve(Some("  ")), LengthSelector::Medium);
        assert_eq!(LengthSelector::resolve(Some("huge")), LengthSelector::Medium);
        assert_eq!(LengthSelector::resolve(Some("short")), LengthSelector::Short);
    }
}

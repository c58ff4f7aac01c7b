use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hard cap on essay length, counted in characters.
pub const MAX_ESSAY_CHARS: usize = 2000;
/// Soft word-count window shown to the student.
pub const RECOMMENDED_ESSAY_WORDS: std::ops::RangeInclusive<usize> = 150..=300;

/// Student profile assembled by the wizard and sent to the advisor.
///
/// Nothing here is validated beyond its wire shape: an empty name, no
/// interests, and no aptitude answers are all legitimate profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    pub grade: Grade,
    /// Interest-sector ids in selection order. Unknown ids are kept.
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub aptitude: AptitudeResponses,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub essay: Option<String>,
}

impl UserProfile {
    /// The essay exactly as submitted, if it holds anything beyond whitespace.
    pub fn essay_text(&self) -> Option<&str> {
        self.essay
            .as_deref()
            .filter(|essay| !essay.trim().is_empty())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Grade
// ────────────────────────────────────────────────────────────────────────────

/// Secondary-school grade, 7 through 12.
///
/// Accepted on the wire as `"10"` or `10`; always serialized as a string,
/// matching the select box the wizard submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "GradeRepr", into = "String")]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 7;
    pub const MAX: u8 = 12;

    pub fn new(number: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&number)
            .then_some(Grade(number))
    }

    pub fn all() -> impl Iterator<Item = Grade> {
        (Self::MIN..=Self::MAX).map(Grade)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GradeRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<GradeRepr> for Grade {
    type Error = String;

    fn try_from(repr: GradeRepr) -> Result<Self, Self::Error> {
        let number = match repr {
            GradeRepr::Number(n) => n,
            GradeRepr::Text(text) => text
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("grade must be a number, got '{text}'"))?,
        };

        u8::try_from(number)
            .ok()
            .and_then(Grade::new)
            .ok_or_else(|| {
                format!(
                    "grade must be between {} and {}, got {number}",
                    Grade::MIN,
                    Grade::MAX
                )
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Aptitude answers
// ────────────────────────────────────────────────────────────────────────────

/// One answered aptitude question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AptitudeAnswer {
    /// 2, 4, 6 or 8 depending on the option index chosen.
    pub score: u32,
    /// Literal text of the chosen option.
    pub response: String,
}

/// Question id → answer, kept in the order the answers were given.
///
/// Serialized as a JSON object. The prompt lists answers in this order, so a
/// sorted map would change the rendered text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AptitudeResponses(Vec<(String, AptitudeAnswer)>);

impl AptitudeResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an answer. A replaced answer keeps its position.
    pub fn insert(&mut self, question_id: impl Into<String>, answer: AptitudeAnswer) {
        let question_id = question_id.into();
        match self.0.iter_mut().find(|(id, _)| *id == question_id) {
            Some((_, existing)) => *existing = answer,
            None => self.0.push((question_id, answer)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AptitudeAnswer)> {
        self.0.iter().map(|(id, answer)| (id.as_str(), answer))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for AptitudeResponses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, answer) in &self.0 {
            map.serialize_entry(id, answer)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AptitudeResponses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = AptitudeResponses;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of question id to {score, response}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut responses = AptitudeResponses::new();
                while let Some((id, answer)) = access.next_entry::<String, AptitudeAnswer>()? {
                    responses.insert(id, answer);
                }
                Ok(responses)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Essay helpers
// ────────────────────────────────────────────────────────────────────────────

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns a message when the essay exceeds the character cap.
pub fn essay_length_violation(essay: &str) -> Option<String> {
    let chars = essay.chars().count();
    (chars > MAX_ESSAY_CHARS).then(|| {
        format!("essay must be at most {MAX_ESSAY_CHARS} characters, got {chars}")
    })
}

use serde::{de, Deserialize, Deserializer, Serialize};

/// What the advisor hands back to the wizard. `recommendations` is never
/// empty once it leaves the requester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub overall_advice: String,
    pub recommendations: Vec<Recommendation>,
}

/// A single career pathway suggestion as produced by the model.
///
/// `sector`, `match_percentage` and `explanation` must be present; the list
/// fields default to empty when the model leaves them out. Counts and ranges
/// are conventions only and pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub sector: String,
    #[serde(deserialize_with = "deserialize_percentage")]
    pub match_percentage: i64,
    pub explanation: String,
    #[serde(default)]
    pub cbc_subjects: Vec<String>,
    #[serde(default)]
    pub skills_to_develop: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// Accepts `85` as well as `85.0`; fractional values are rounded.
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    number
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.round() as i64)
        .ok_or_else(|| de::Error::custom(format!("match_percentage out of range: {number}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_list_fields_default_to_empty() {
        let json = r#"{
            "sector": "Modern Agriculture & Agribusiness",
            "match_percentage": 72,
            "explanation": "Strong interest in food systems."
        }"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.match_percentage, 72);
        assert!(rec.cbc_subjects.is_empty());
        assert!(rec.next_steps.is_empty());
    }

    #[test]
    fn test_recommendation_requires_sector() {
        let json = r#"{"match_percentage": 50, "explanation": "x"}"#;
        assert!(serde_json::from_str::<Recommendation>(json).is_err());
    }

    #[test]
    fn test_match_percentage_passes_through_out_of_range() {
        let json = r#"{"sector": "s", "match_percentage": 140, "explanation": "e"}"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.match_percentage, 140);
    }

    #[test]
    fn test_match_percentage_rounds_floats() {
        let json = r#"{"sector": "s", "match_percentage": 84.6, "explanation": "e"}"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.match_percentage, 85);
    }

    #[test]
    fn test_match_percentage_rejects_strings() {
        let json = r#"{"sector": "s", "match_percentage": "85", "explanation": "e"}"#;
        assert!(serde_json::from_str::<Recommendation>(json).is_err());
    }
}

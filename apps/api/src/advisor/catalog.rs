//! Fixed wizard catalogs: interest sectors and the aptitude quiz.
//!
//! These are compiled in. The sector labels are what the model sees in the
//! prompt, so changing one changes the rendered prompt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::profile::{AptitudeAnswer, AptitudeResponses};

/// Score awarded for each option index, 0 through 3.
pub const OPTION_SCORES: [u32; 4] = [2, 4, 6, 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sector {
    pub id: &'static str,
    pub label: &'static str,
}

pub static SECTORS: [Sector; 6] = [
    Sector {
        id: "tech",
        label: "Technology & Digital Innovation",
    },
    Sector {
        id: "agri",
        label: "Modern Agriculture & Agribusiness",
    },
    Sector {
        id: "eng",
        label: "Engineering & Manufacturing",
    },
    Sector {
        id: "health",
        label: "Health & Biomedical Sciences",
    },
    Sector {
        id: "creative",
        label: "Creative Economy & Media",
    },
    Sector {
        id: "geo",
        label: "Geospatial Technologies & Climate Solutions",
    },
];

/// Human-readable label for an interest id; unknown ids come back unchanged.
pub fn sector_label(id: &str) -> &str {
    SECTORS
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.label)
        .unwrap_or(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AptitudeQuestion {
    pub id: &'static str,
    pub label: &'static str,
    pub question: &'static str,
    pub options: [&'static str; 4],
}

impl AptitudeQuestion {
    /// The answer recorded when the student picks `option_index`.
    pub fn answer(&self, option_index: usize) -> Option<AptitudeAnswer> {
        let response = self.options.get(option_index)?;
        Some(AptitudeAnswer {
            score: OPTION_SCORES[option_index],
            response: response.to_string(),
        })
    }
}

pub static APTITUDE_QUESTIONS: [AptitudeQuestion; 6] = [
    AptitudeQuestion {
        id: "problem_solving",
        label: "Problem Solving",
        question: "When faced with a complex puzzle, do you prefer to:",
        options: [
            "Follow step-by-step instructions",
            "Try different approaches until one works",
            "Break it into smaller parts and solve each",
            "Ask for help or collaborate",
        ],
    },
    AptitudeQuestion {
        id: "creativity",
        label: "Creativity",
        question: "When asked to create something new, you:",
        options: [
            "Stick to proven methods and templates",
            "Combine existing ideas in novel ways",
            "Imagine completely original concepts",
            "Experiment until something interesting emerges",
        ],
    },
    AptitudeQuestion {
        id: "analytical",
        label: "Analytical Thinking",
        question: "When analyzing data, you focus on:",
        options: [
            "Finding patterns and trends",
            "Verifying accuracy and facts",
            "Drawing practical conclusions",
            "Exploring what-ifs and possibilities",
        ],
    },
    AptitudeQuestion {
        id: "teamwork",
        label: "Teamwork",
        question: "In group projects, you usually:",
        options: [
            "Take the leadership role",
            "Support and coordinate others",
            "Focus on your assigned tasks",
            "Brainstorm and contribute ideas",
        ],
    },
    AptitudeQuestion {
        id: "adaptability",
        label: "Adaptability",
        question: "When plans change unexpectedly, you:",
        options: [
            "Get stressed but eventually adjust",
            "Quickly find alternative solutions",
            "Stick to the original plan as much as possible",
            "See it as an opportunity for something better",
        ],
    },
    AptitudeQuestion {
        id: "communication",
        label: "Communication",
        question: "When explaining complex ideas, you prefer to:",
        options: [
            "Use diagrams and visuals",
            "Give detailed written explanations",
            "Provide real-life examples",
            "Demonstrate with hands-on examples",
        ],
    },
];

pub fn find_question(id: &str) -> Option<&'static AptitudeQuestion> {
    APTITUDE_QUESTIONS.iter().find(|q| q.id == id)
}

/// A single quiz selection as submitted by the wizard.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizSelection {
    pub question_id: String,
    pub option_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("unknown aptitude question '{0}'")]
    UnknownQuestion(String),

    #[error("option {index} is out of range for question '{question_id}' (expected 0-3)")]
    OptionOutOfRange { question_id: String, index: usize },
}

/// Scores quiz selections in the order given. Questions the student skipped
/// are simply absent; answering the same question twice keeps the last pick.
pub fn score_selections(selections: &[QuizSelection]) -> Result<AptitudeResponses, QuizError> {
    let mut responses = AptitudeResponses::new();

    for selection in selections {
        let question = find_question(&selection.question_id)
            .ok_or_else(|| QuizError::UnknownQuestion(selection.question_id.clone()))?;
        let answer = question
            .answer(selection.option_index)
            .ok_or_else(|| QuizError::OptionOutOfRange {
                question_id: selection.question_id.clone(),
                index: selection.option_index,
            })?;
        responses.insert(question.id, answer);
    }

    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(question_id: &str, option_index: usize) -> QuizSelection {
        QuizSelection {
            question_id: question_id.to_string(),
            option_index,
        }
    }

    #[test]
    fn test_sector_label_known_ids() {
        assert_eq!(sector_label("tech"), "Technology & Digital Innovation");
        assert_eq!(
            sector_label("geo"),
            "Geospatial Technologies & Climate Solutions"
        );
    }

    #[test]
    fn test_sector_label_passes_unknown_through() {
        assert_eq!(sector_label("space"), "space");
        assert_eq!(sector_label(""), "");
    }

    #[test]
    fn test_catalog_shape() {
        assert_eq!(SECTORS.len(), 6);
        assert_eq!(APTITUDE_QUESTIONS.len(), 6);
        assert!(APTITUDE_QUESTIONS.iter().all(|q| q.options.len() == 4));
    }

    #[test]
    fn test_answer_scores_by_option_index() {
        let question = find_question("problem_solving").unwrap();
        let scores: Vec<u32> = (0..4).map(|i| question.answer(i).unwrap().score).collect();
        assert_eq!(scores, vec![2, 4, 6, 8]);
        assert_eq!(
            question.answer(2).unwrap().response,
            "Break it into smaller parts and solve each"
        );
        assert!(question.answer(4).is_none());
    }

    #[test]
    fn test_score_selections_keeps_order_and_skips() {
        let responses =
            score_selections(&[pick("teamwork", 1), pick("problem_solving", 3)]).unwrap();

        let ids: Vec<&str> = responses.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["teamwork", "problem_solving"]);
        let (_, teamwork) = responses.iter().next().unwrap();
        assert_eq!(teamwork.score, 4);
        assert!(responses.iter().all(|(id, _)| id != "creativity"));
    }

    #[test]
    fn test_score_selections_rejects_unknown_question() {
        let err = score_selections(&[pick("telepathy", 0)]).unwrap_err();
        assert_eq!(err, QuizError::UnknownQuestion("telepathy".to_string()));
    }

    #[test]
    fn test_score_selections_rejects_bad_index() {
        let err = score_selections(&[pick("creativity", 4)]).unwrap_err();
        assert!(matches!(err, QuizError::OptionOutOfRange { index: 4, .. }));
    }

    #[test]
    fn test_score_selections_empty_is_empty() {
        assert_eq!(score_selections(&[]).unwrap().len(), 0);
    }
}

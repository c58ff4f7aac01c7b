// LLM prompt for the career pathway advisor.
// Reuses the cross-cutting JSON-only fragment from llm_client::prompts.

use serde_json::{json, Value};

use crate::advisor::catalog::sector_label;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::models::profile::UserProfile;

/// Rendered in place of the essay when the student skipped it.
pub const NO_ESSAY_PLACEHOLDER: &str = "No essay provided";

/// Recommendation prompt template.
/// Replace: {name}, {grade}, {interests}, {aptitude}, {essay}, {json_only}
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"You are an AI Career Pathway Advisor for Kenyan CBC students under Vision 2030.

Analyze this Kenyan student profile for career pathway recommendations:

STUDENT: {name}, Grade {grade}
INTERESTS: {interests}
APTITUDE RESPONSES:
{aptitude}
PERSONAL ESSAY: "{essay}"

Provide 2-3 detailed pathway recommendations, each with:
1. sector: the career sector name
2. match_percentage: how well it fits, 0-100
3. explanation: why it fits this specific profile
4. cbc_subjects: 4 CBC subjects to focus on
5. skills_to_develop: 4 skills to develop
6. resources: 3 Kenyan resources
7. next_steps: 4 actionable next steps

Focus on Kenya's Vision 2030 and the CBC curriculum. Be practical and realistic.

{json_only}
The JSON object MUST match this shape exactly:
{
  "overall_advice": "string",
  "recommendations": [
    {
      "sector": "string",
      "match_percentage": number,
      "explanation": "string",
      "cbc_subjects": ["string", "string", "string", "string"],
      "skills_to_develop": ["string", "string", "string", "string"],
      "resources": ["string", "string", "string"],
      "next_steps": ["string", "string", "string", "string"]
    }
  ]
}"#;

/// Builds the advisor prompt. Pure: the same profile always yields the same
/// bytes.
pub fn build_recommendation_prompt(profile: &UserProfile) -> String {
    let grade = profile.grade.to_string();
    let interests = render_interests(&profile.interests);
    let aptitude = render_aptitude(profile);
    let essay = profile.essay_text().unwrap_or(NO_ESSAY_PLACEHOLDER);

    fill_template(
        RECOMMENDATION_PROMPT_TEMPLATE,
        &[
            ("name", profile.name.as_str()),
            ("grade", grade.as_str()),
            ("interests", interests.as_str()),
            ("aptitude", aptitude.as_str()),
            ("essay", essay),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

fn render_interests(ids: &[String]) -> String {
    ids.iter()
        .map(|id| sector_label(id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One `<id>: <response> (score: <n>/10)` line per answer, in answer order.
fn render_aptitude(profile: &UserProfile) -> String {
    profile
        .aptitude
        .iter()
        .map(|(id, answer)| format!("{id}: {} (score: {}/10)", answer.response, answer.score))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single left-to-right pass over the template. Student-supplied text is
/// never rescanned, so a name like `{essay}` stays literal.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 512);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let placeholder = values.iter().find_map(|(key, value)| {
            let token = format!("{{{key}}}");
            tail.starts_with(&token).then(|| (token.len(), *value))
        });

        match placeholder {
            Some((len, value)) => {
                out.push_str(value);
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// `responseSchema` sent with the request so the provider constrains its
/// output to the recommendation shape.
pub fn recommendation_response_schema() -> Value {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "type": "object",
        "properties": {
            "overall_advice": { "type": "string" },
            "recommendations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "sector": { "type": "string" },
                        "match_percentage": { "type": "number" },
                        "explanation": { "type": "string" },
                        "cbc_subjects": string_list.clone(),
                        "skills_to_develop": string_list.clone(),
                        "resources": string_list.clone(),
                        "next_steps": string_list
                    },
                    "required": [
                        "sector",
                        "match_percentage",
                        "explanation",
                        "cbc_subjects",
                        "skills_to_develop",
                        "resources",
                        "next_steps"
                    ]
                }
            }
        },
        "required": ["overall_advice", "recommendations"]
    })
}

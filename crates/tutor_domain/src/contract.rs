use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-turn structured state reported by the model alongside its reply.
/// The model is not a trusted producer: every sub-field tolerates absence
/// and defaults rather than erroring.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize, Setters)]
#[serde(rename_all = "camelCase", default)]
#[setters(into, strip_option)]
pub struct TurnMetadata {
    /// True only when the user's message introduces a problem not
    /// previously tracked
    pub is_new_problem: bool,
    pub current_problem_text: Option<String>,
    /// Tri-state: `None` means there was no answer to judge this turn
    pub student_answer_correct: Option<bool>,
    pub problem_complete: bool,
}

/// The model's final reply for a turn: user-visible message plus optional
/// structured metadata
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TutorTurnResponse {
    pub message: String,
    pub metadata: Option<TurnMetadata>,
}

#[derive(Deserialize)]
struct WireResponse {
    message: Option<String>,
    metadata: Option<TurnMetadata>,
}

impl TutorTurnResponse {
    /// Parse the model's final content against the structured contract.
    ///
    /// Infallible by design: a malformed reply must never abort the turn.
    /// If the content is not valid JSON, or carries neither `message` nor
    /// `metadata`, the entire raw text becomes the user-visible message and
    /// structured state is lost for this turn (degraded mode).
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<WireResponse>(raw) {
            Ok(WireResponse { message: Some(message), metadata }) => Self { message, metadata },
            Ok(WireResponse { message: None, metadata: Some(metadata) }) => {
                debug!("Model reply carried metadata but no message field");
                Self { message: raw.to_string(), metadata: Some(metadata) }
            }
            _ => {
                debug!("Model reply violated the response contract; degrading to raw text");
                Self { message: raw.to_string(), metadata: None }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_well_formed_response() {
        let raw = r#"{
            "message": "What operation would undo adding 5?",
            "metadata": {
                "isNewProblem": false,
                "currentProblemText": "x + 5 = 12",
                "studentAnswerCorrect": false,
                "problemComplete": false
            }
        }"#;
        let actual = TutorTurnResponse::parse(raw);
        let expected = TutorTurnResponse {
            message: "What operation would undo adding 5?".to_string(),
            metadata: Some(
                TurnMetadata::default()
                    .current_problem_text("x + 5 = 12")
                    .student_answer_correct(false),
            ),
        };
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_non_json_degrades_to_raw_text() {
        let raw = "Great thinking! What should we do first?";
        let actual = TutorTurnResponse::parse(raw);
        let expected = TutorTurnResponse { message: raw.to_string(), metadata: None };
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_json_without_contract_fields_degrades() {
        let raw = r#"{"reply": "hello"}"#;
        let actual = TutorTurnResponse::parse(raw);
        let expected = TutorTurnResponse { message: raw.to_string(), metadata: None };
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_missing_metadata_sub_fields_default() {
        let raw = r#"{"message": "hi", "metadata": {"isNewProblem": true}}"#;
        let actual = TutorTurnResponse::parse(raw);
        let expected = TutorTurnResponse {
            message: "hi".to_string(),
            metadata: Some(TurnMetadata::default().is_new_problem(true)),
        };
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_message_only_object_keeps_message() {
        let raw = r#"{"message": "keep going"}"#;
        let actual = TutorTurnResponse::parse(raw);
        let expected = TutorTurnResponse { message: "keep going".to_string(), metadata: None };
        assert_eq!(actual, expected);
    }
}

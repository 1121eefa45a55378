//! Boundary request parsing.
//!
//! Turns raw front-door input into typed values so callers can tell
//! "malformed request" apart from "not found" and from "no work right now".

use serde::Deserialize;

use crate::domain::{BlobPhase, TaskId, TaskState};
use crate::error::SwatchError;

/// `?id=` style parameter. Missing, empty and non-numeric are all malformed.
pub fn parse_task_id(raw: Option<&str>) -> Result<TaskId, SwatchError> {
    match raw.map(str::trim) {
        None | Some("") => Err(SwatchError::MalformedInput("missing id".to_string())),
        Some(value) => value.parse(),
    }
}

pub fn parse_phase(raw: Option<&str>) -> Result<BlobPhase, SwatchError> {
    raw.ok_or_else(|| SwatchError::MalformedInput("missing state".to_string()))?
        .parse()
}

/// Body of the administrative force-set call: `{"Id": 3, "State": 0}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForceSetRequest {
    pub id: u64,
    pub state: i64,
}

impl ForceSetRequest {
    pub fn decode(body: &[u8]) -> Result<Self, SwatchError> {
        serde_json::from_slice(body)
            .map_err(|e| SwatchError::MalformedInput(format!("force-set body: {e}")))
    }

    /// State outside 0..=2 is `InvalidState`, not malformed.
    pub fn into_parts(self) -> Result<(TaskId, TaskState), SwatchError> {
        Ok((TaskId::new(self.id), TaskState::try_from(self.state)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("  "))]
    #[case(Some("x1"))]
    #[case(Some("-4"))]
    fn bad_ids_are_malformed(#[case] raw: Option<&str>) {
        assert_eq!(parse_task_id(raw).unwrap_err().kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn good_id_parses() {
        assert_eq!(parse_task_id(Some("17")).unwrap(), TaskId::new(17));
    }

    #[test]
    fn phase_must_be_known() {
        assert_eq!(parse_phase(Some("working")).unwrap(), BlobPhase::Working);
        assert_eq!(parse_phase(None).unwrap_err().kind(), ErrorKind::MalformedInput);
        assert_eq!(parse_phase(Some("done")).unwrap_err().kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn force_set_body_decodes() {
        let (id, state) = ForceSetRequest::decode(br#"{"Id": 2, "State": 0}"#)
            .unwrap()
            .into_parts()
            .unwrap();
        assert_eq!(id, TaskId::new(2));
        assert_eq!(state, TaskState::Pending);
    }

    #[test]
    fn force_set_distinguishes_bad_json_from_bad_state() {
        let err = ForceSetRequest::decode(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);

        let err = ForceSetRequest::decode(br#"{"Id": 2, "State": 3}"#)
            .unwrap()
            .into_parts()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err = ForceSetRequest::decode(br#"{"Id": 2, "State": -1}"#)
            .unwrap()
            .into_parts()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}

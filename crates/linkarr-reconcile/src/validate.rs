//! Inbound event validation.

use linkarr_core::{GrabEvent, ReconcileError, ReconcileResult, ReconciliationRequest};

/// What to do with an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// Lifecycle test probe: acknowledge success, perform nothing.
    TestProbe,
    /// Some other event type this service does not act on.
    Ignored {
        /// Event type as received, for the acknowledgement body.
        event_type: String,
    },
    /// A grab to reconcile.
    Reconcile(ReconciliationRequest),
}

/// Classify an inbound event and, for grabs, validate it into a request.
///
/// Validation performs no side effects; a malformed grab is reported to the
/// caller before anything external is touched.
///
/// # Errors
///
/// Returns [`ReconcileError::Validation`] naming the first missing or empty
/// required field of a grab event.
pub fn classify(event: &GrabEvent) -> ReconcileResult<EventDisposition> {
    if event.is_test() {
        return Ok(EventDisposition::TestProbe);
    }
    if !event.is_grab() {
        return Ok(EventDisposition::Ignored {
            event_type: event.event_type.clone().unwrap_or_default(),
        });
    }

    let download_id = event
        .download_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ReconcileError::Validation {
            field: "downloadId",
            reason: "missing or empty",
        })?;
    let library_path = event
        .series
        .as_ref()
        .and_then(|series| series.path.as_deref())
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .ok_or(ReconcileError::Validation {
            field: "series.path",
            reason: "missing or empty",
        })?;
    let episode = event.episodes.first().ok_or(ReconcileError::Validation {
        field: "episodes",
        reason: "at least one episode descriptor required",
    })?;
    let series_id = episode.series_id.ok_or(ReconcileError::Validation {
        field: "episodes[0].seriesId",
        reason: "missing",
    })?;

    Ok(EventDisposition::Reconcile(ReconciliationRequest {
        download_id: download_id.to_string(),
        library_path: library_path.into(),
        series_id,
        season_number: episode.season_number.unwrap_or(1),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkarr_core::FailureReason;
    use std::path::PathBuf;

    fn event(json: &str) -> GrabEvent {
        serde_json::from_str(json).expect("payload should deserialize")
    }

    #[test]
    fn test_probe_short_circuits() {
        let disposition = classify(&event(r#"{"eventType": "test"}"#)).expect("classify");
        assert_eq!(disposition, EventDisposition::TestProbe);
    }

    #[test]
    fn non_grab_events_are_ignored() {
        let disposition = classify(&event(r#"{"eventType": "Download"}"#)).expect("classify");
        assert_eq!(
            disposition,
            EventDisposition::Ignored {
                event_type: "Download".into()
            }
        );
    }

    #[test]
    fn valid_grab_becomes_a_request() {
        let disposition = classify(&event(
            r#"{
                "eventType": "Grab",
                "downloadId": "abc123",
                "series": {"path": "/lib/Show"},
                "episodes": [{"seriesId": 42, "seasonNumber": 1}]
            }"#,
        ))
        .expect("classify");
        assert_eq!(
            disposition,
            EventDisposition::Reconcile(ReconciliationRequest {
                download_id: "abc123".into(),
                library_path: PathBuf::from("/lib/Show"),
                series_id: 42,
                season_number: 1,
            })
        );
    }

    #[test]
    fn season_number_defaults_to_one() {
        let disposition = classify(&event(
            r#"{
                "eventType": "Grab",
                "downloadId": "abc123",
                "series": {"path": "/lib/Show"},
                "episodes": [{"seriesId": 42}]
            }"#,
        ))
        .expect("classify");
        let EventDisposition::Reconcile(request) = disposition else {
            panic!("expected a reconcile disposition");
        };
        assert_eq!(request.season_number, 1);
    }

    #[test]
    fn missing_fields_are_validation_errors() {
        for (json, field) in [
            (r#"{"eventType": "Grab"}"#, "downloadId"),
            (
                r#"{"eventType": "Grab", "downloadId": "abc"}"#,
                "series.path",
            ),
            (
                r#"{"eventType": "Grab", "downloadId": "abc", "series": {"path": ""}}"#,
                "series.path",
            ),
            (
                r#"{"eventType": "Grab", "downloadId": "abc", "series": {"path": "/lib"}}"#,
                "episodes",
            ),
            (
                r#"{"eventType": "Grab", "downloadId": "abc", "series": {"path": "/lib"},
                    "episodes": [{"seasonNumber": 2}]}"#,
                "episodes[0].seriesId",
            ),
        ] {
            let err = classify(&event(json)).expect_err("classify should fail");
            assert!(matches!(err.reason(), FailureReason::Validation));
            let ReconcileError::Validation {
                field: reported, ..
            } = err
            else {
                panic!("expected a validation error");
            };
            assert_eq!(reported, field);
        }
    }
}

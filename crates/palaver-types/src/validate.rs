//! Pure shape checks run before anything touches the store.

use std::num::IntErrorKind;

use thiserror::Error;

use crate::api::SendMessageRequest;
use crate::models::{MessageKind, OutgoingMessage};

/// Every problem found in one input, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// Checks a participant name: present and non-blank.
pub fn participant_name(name: Option<&str>) -> Result<&str, ValidationErrors> {
    let mut errors = Vec::new();
    require_text("name", name, &mut errors);
    match name {
        Some(name) if errors.is_empty() => Ok(name),
        _ => Err(ValidationErrors(errors)),
    }
}

/// Checks an outgoing message: `to` and `text` present and non-blank, `type`
/// one of the known kinds.
pub fn outgoing_message(req: &SendMessageRequest) -> Result<OutgoingMessage, ValidationErrors> {
    let mut errors = Vec::new();
    require_text("to", req.to.as_deref(), &mut errors);
    require_text("text", req.text.as_deref(), &mut errors);

    let kind = match req.kind.as_deref() {
        None => {
            errors.push("\"type\" is required".to_string());
            None
        }
        Some(raw) => {
            let kind = MessageKind::parse(raw);
            if kind.is_none() {
                let allowed: Vec<&str> = MessageKind::ALL.iter().map(|k| k.as_str()).collect();
                errors.push(format!("\"type\" must be one of [{}]", allowed.join(", ")));
            }
            kind
        }
    };

    match (&req.to, &req.text, kind) {
        (Some(to), Some(text), Some(kind)) if errors.is_empty() => Ok(OutgoingMessage {
            to: to.clone(),
            text: text.clone(),
            kind,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

/// Parses the `limit` query value. Absent means unlimited; anything but a
/// positive integer is rejected rather than clamped.
/// Integers too large for `u64` are still positive and saturate.
pub fn limit(raw: Option<&str>) -> Result<Option<u64>, ValidationErrors> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(Some(u64::MAX)),
        _ => Err(ValidationErrors(vec![format!(
            "\"limit\" must be a positive integer, got {raw:?}"
        )])),
    }
}

fn require_text(field: &str, value: Option<&str>, errors: &mut Vec<String>) {
    match value {
        None => errors.push(format!("\"{field}\" is required")),
        Some(v) if v.trim().is_empty() => {
            errors.push(format!("\"{field}\" is not allowed to be empty"))
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(to: Option<&str>, text: Option<&str>, kind: Option<&str>) -> SendMessageRequest {
        SendMessageRequest {
            to: to.map(Into::into),
            text: text.map(Into::into),
            kind: kind.map(Into::into),
        }
    }

    #[test]
    fn participant_name_rules() {
        assert_eq!(participant_name(Some("Alice")), Ok("Alice"));
        assert!(participant_name(None).is_err());
        assert!(participant_name(Some("")).is_err());
        let err = participant_name(Some("   ")).unwrap_err();
        assert_eq!(err.messages(), ["\"name\" is not allowed to be empty"]);
    }

    #[test]
    fn valid_message_passes() {
        let req = request(Some("Todos"), Some("hello"), Some("message"));
        let msg = outgoing_message(&req).unwrap();
        assert_eq!(msg.kind, MessageKind::Chat);
        assert_eq!(msg.to, "Todos");
        assert_eq!(msg.text, "hello");
    }

    #[test]
    fn message_reports_every_problem() {
        let err = outgoing_message(&request(None, Some(" "), Some("shout"))).unwrap_err();
        assert_eq!(err.messages().len(), 3);
        assert!(err.messages()[0].contains("\"to\""));
        assert!(err.messages()[1].contains("\"text\""));
        assert!(err.messages()[2].contains("must be one of"));
    }

    #[test]
    fn missing_kind_is_rejected() {
        let err = outgoing_message(&request(Some("Bob"), Some("hi"), None)).unwrap_err();
        assert_eq!(err.messages(), ["\"type\" is required"]);
    }

    #[test]
    fn limit_rules() {
        assert_eq!(limit(None), Ok(None));
        assert_eq!(limit(Some("3")), Ok(Some(3)));
        assert!(limit(Some("0")).is_err());
        assert!(limit(Some("-1")).is_err());
        assert!(limit(Some("abc")).is_err());
        assert!(limit(Some("")).is_err());
        assert!(limit(Some("2.5")).is_err());
        assert!(limit(Some("+-1")).is_err());
    }

    #[test]
    fn huge_limits_are_accepted() {
        assert_eq!(limit(Some("5000000000")), Ok(Some(5_000_000_000)));
        assert_eq!(limit(Some("99999999999999999999999")), Ok(Some(u64::MAX)));
    }
}

use memorial_types::api::FieldError;

pub const NAME_MAX: usize = 100;
pub const RELATIONSHIP_MAX: usize = 50;
pub const MESSAGE_MAX: usize = 1000;

/// Submission fields as parsed from the form, before validation.
#[derive(Debug, Default)]
pub struct TributeDraft {
    pub name: String,
    pub relationship: Option<String>,
    pub message: String,
    pub publish_permission: String,
    pub consent: bool,
}

/// Check the draft against the schema, collecting every violation rather
/// than stopping at the first.
pub fn validate(draft: &TributeDraft) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if draft.name.is_empty() {
        errors.push(field_error("name", "Name is required"));
    } else if draft.name.chars().count() > NAME_MAX {
        errors.push(field_error("name", "Name must be at most 100 characters"));
    }

    if let Some(relationship) = &draft.relationship {
        if relationship.chars().count() > RELATIONSHIP_MAX {
            errors.push(field_error(
                "relationship",
                "Relationship must be at most 50 characters",
            ));
        }
    }

    if draft.message.is_empty() {
        errors.push(field_error("message", "Message is required"));
    } else if draft.message.chars().count() > MESSAGE_MAX {
        errors.push(field_error(
            "message",
            "Message must be at most 1000 characters",
        ));
    }

    if draft.publish_permission != "yes" && draft.publish_permission != "no" {
        errors.push(field_error(
            "publishPermission",
            "Publish permission must be 'yes' or 'no'",
        ));
    }

    if !draft.consent {
        errors.push(field_error("consent", "Consent is required"));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

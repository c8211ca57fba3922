use crate::routes::SendEmailBody;

/// A validated contact form submission. Lives for the duration of one request.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: String,
    /// Only ever used as the reply address, so it is not checked for format.
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SubmissionError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl TryFrom<SendEmailBody> for ContactSubmission {
    type Error = SubmissionError;

    fn try_from(value: SendEmailBody) -> Result<Self, Self::Error> {
        let name = non_blank(value.name);
        let email = non_blank(value.email);
        let message = non_blank(value.message);

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(Self {
                name,
                email,
                subject: non_blank(value.subject),
                message,
            }),
            (name, email, message) => {
                let missing = [
                    ("name", name.is_none()),
                    ("email", email.is_none()),
                    ("message", message.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, missing)| missing.then_some(field))
                .collect();
                Err(SubmissionError::MissingFields(missing))
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

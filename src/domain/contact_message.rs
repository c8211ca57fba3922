use tera::{Context, Tera};

use crate::domain::ContactSubmission;

pub const DEFAULT_SUBJECT: &str = "New message";
const SUBJECT_NOT_PROVIDED: &str = "Not provided";
const HTML_TEMPLATE: &str = "contact_message.html";

/// The outbound email built from one submission.
#[derive(Debug)]
pub struct ContactMessage {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Templates used to render contact emails.
pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(
        HTML_TEMPLATE,
        include_str!("../../templates/contact_message.html"),
    )?;
    Ok(tera)
}

pub fn subject_tag(from_name: &str) -> String {
    format!("[Portfolio - {from_name}]")
}

impl ContactMessage {
    pub fn compose(
        submission: &ContactSubmission,
        from_name: &str,
        templates: &Tera,
    ) -> Result<Self, tera::Error> {
        let subject = format!(
            "{} {}",
            subject_tag(from_name),
            submission.subject.as_deref().unwrap_or(DEFAULT_SUBJECT)
        );

        let text_body = format!(
            "Name: {}\nEmail: {}\n\n{}",
            submission.name, submission.email, submission.message
        );

        let mut context = Context::new();
        context.insert("name", &submission.name);
        context.insert("email", &submission.email);
        context.insert(
            "subject",
            submission.subject.as_deref().unwrap_or(SUBJECT_NOT_PROVIDED),
        );
        // Rendered with `safe`, so it has to be escaped here.
        context.insert("message", &message_to_html(&submission.message));
        let html_body = templates.render(HTML_TEMPLATE, &context)?;

        Ok(Self {
            subject,
            text_body,
            html_body,
        })
    }
}

fn message_to_html(message: &str) -> String {
    tera::escape_html(message)
        .replace("\r\n", "\n")
        .replace('\n', "<br/>")
}

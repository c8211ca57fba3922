use crate::routes::ErrorResponse;

pub const SEND_EMAIL_PATH: &str = "/api/send-email";
pub const BUSY_LABEL: &str = "Sending...";

pub const MISSING_FIELDS_ALERT: &str = "Please fill in Name, Email and Message.";
pub const SENT_ALERT: &str = "Message sent successfully!";
pub const CONNECTION_FAILED_ALERT: &str =
    "Connection failure while sending. Check your internet connection and try again.";
pub const FALLBACK_ERROR: &str = "Could not send the message right now.";

/// Where blocking user feedback goes; `window.alert` in a browser.
pub trait Alerts {
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    label: String,
    disabled: bool,
}

impl SubmitButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disables the button and shows the busy label until the guard is dropped.
    pub fn busy(&mut self) -> BusyGuard<'_> {
        let original_label = std::mem::replace(&mut self.label, BUSY_LABEL.into());
        self.disabled = true;
        BusyGuard {
            button: self,
            original_label,
        }
    }
}

pub struct BusyGuard<'a> {
    button: &'a mut SubmitButton,
    original_label: String,
}

impl BusyGuard<'_> {
    pub fn button(&self) -> &SubmitButton {
        self.button
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.button.disabled = false;
        self.button.label = std::mem::take(&mut self.original_label);
    }
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub submit_button: SubmitButton,
}

#[derive(serde::Serialize, Debug, PartialEq)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(submit_label: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            subject: String::new(),
            message: String::new(),
            submit_button: SubmitButton::new(submit_label),
        }
    }

    /// Trimmed field values, or `None` when a required field is blank.
    pub fn payload(&self) -> Option<ContactPayload> {
        let payload = ContactPayload {
            name: self.name.trim().into(),
            email: self.email.trim().into(),
            subject: self.subject.trim().into(),
            message: self.message.trim().into(),
        };
        let complete =
            !payload.name.is_empty() && !payload.email.is_empty() && !payload.message.is_empty();
        complete.then_some(payload)
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.email.clear();
        self.subject.clear();
        self.message.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Incomplete,
    Sent,
    Rejected(String),
    ConnectionFailed,
}

#[derive(Clone)]
pub struct ContactFormClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl ContactFormClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SEND_EMAIL_PATH),
        }
    }

    #[tracing::instrument(name = "Submitting the contact form", skip_all)]
    pub async fn submit(&self, form: &mut ContactForm, alerts: &mut impl Alerts) -> SubmitOutcome {
        let Some(payload) = form.payload() else {
            alerts.alert(MISSING_FIELDS_ALERT);
            return SubmitOutcome::Incomplete;
        };

        let outcome = {
            let _busy = form.submit_button.busy();
            self.post(&payload, alerts).await
        };

        if outcome == SubmitOutcome::Sent {
            form.reset();
        }
        outcome
    }

    async fn post(&self, payload: &ContactPayload, alerts: &mut impl Alerts) -> SubmitOutcome {
        let response = match self
            .http_client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Contact form request failed");
                alerts.alert(CONNECTION_FAILED_ALERT);
                return SubmitOutcome::ConnectionFailed;
            }
        };

        if !response.status().is_success() {
            let error = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| FALLBACK_ERROR.into());
            alerts.alert(&format!("Error: {error}"));
            return SubmitOutcome::Rejected(error);
        }

        alerts.alert(SENT_ALERT);
        SubmitOutcome::Sent
    }
}

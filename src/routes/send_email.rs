use actix_web::error::JsonPayloadError;
use actix_web::http::{header, StatusCode};
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use tera::Tera;

use crate::configuration::RelaySettings;
use crate::domain::{ContactMessage, ContactSubmission, SubmissionError};
use crate::email_client::{EmailClient, EmailError, SmtpFailure};
use crate::utils::error_chain_fmt;

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const SENT_MESSAGE: &str = "Email sent successfully!";

#[derive(serde::Deserialize, Default, Debug)]
pub struct SendEmailBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct SendEmailResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(thiserror::Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Request body is not a JSON contact submission")]
    UnreadableBody(#[source] JsonPayloadError),
    #[error(transparent)]
    InvalidSubmission(#[from] SubmissionError),
    #[error("SMTP settings are missing: {}", .0.join(", "))]
    ServerMisconfigured(Vec<&'static str>),
    #[error("SMTP connection could not be verified")]
    MailServerUnavailable(#[source] EmailError),
    #[error("Failed to send the contact email ({0})")]
    SendFailed(SmtpFailure, #[source] anyhow::Error),
}

impl std::fmt::Debug for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<EmailError> for RelayError {
    fn from(e: EmailError) -> Self {
        Self::SendFailed(e.failure(), e.into())
    }
}

impl RelayError {
    /// What the caller is told. Operator detail stays in `Display`/`Debug`.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "Method not allowed.",
            Self::UnreadableBody(_) | Self::InvalidSubmission(_) => {
                "Missing required fields (name, email, message)."
            }
            Self::ServerMisconfigured(_) => {
                "Email configuration not found. Please contact the administrator."
            }
            Self::MailServerUnavailable(_) => {
                "Mail server configuration error. Please try again later."
            }
            Self::SendFailed(failure, _) => match failure {
                SmtpFailure::Authentication => {
                    "Authentication error. Check the SMTP user and password."
                }
                SmtpFailure::Connection => "Could not connect to the SMTP server.",
                SmtpFailure::Timeout => "The SMTP connection timed out.",
                SmtpFailure::Other => "Internal error while sending the email.",
            },
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnreadableBody(_) | Self::InvalidSubmission(_) => StatusCode::BAD_REQUEST,
            Self::ServerMisconfigured(_)
            | Self::MailServerUnavailable(_)
            | Self::SendFailed(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Self::MethodNotAllowed = self {
            response.insert_header((header::ALLOW, ALLOWED_METHODS));
        }
        response.json(ErrorResponse {
            error: self.public_message().into(),
        })
    }
}

/// Permissive CORS headers, added to every response of the relay resource.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
}

pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub async fn method_not_allowed() -> Result<HttpResponse, RelayError> {
    Err(RelayError::MethodNotAllowed)
}

/// Turns malformed or mistyped JSON bodies into the relay's own 400 response.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = RelayError::UnreadableBody(err);
    tracing::warn!(error.cause_chain = ?error, "Rejected contact message");
    error.into()
}

#[tracing::instrument(
    name = "Relaying a contact message",
    skip(body, settings, templates),
    fields(
        sender_email = tracing::field::Empty,
        sender_name = tracing::field::Empty,
    )
)]
pub async fn send_email(
    body: web::Json<SendEmailBody>,
    settings: web::Data<RelaySettings>,
    templates: web::Data<Tera>,
) -> Result<HttpResponse, RelayError> {
    match relay(body.into_inner(), &settings, &templates).await {
        Ok(()) => Ok(HttpResponse::Ok().json(SendEmailResponse {
            ok: true,
            message: Some(SENT_MESSAGE.into()),
        })),
        Err(e) => {
            if e.status_code().is_server_error() {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to relay contact message"
                );
            } else {
                tracing::warn!(error.cause_chain = ?e, "Rejected contact message");
            }
            Err(e)
        }
    }
}

async fn relay(
    body: SendEmailBody,
    settings: &RelaySettings,
    templates: &Tera,
) -> Result<(), RelayError> {
    let submission = ContactSubmission::try_from(body)?;
    tracing::Span::current()
        .record("sender_email", tracing::field::display(&submission.email))
        .record("sender_name", tracing::field::display(&submission.name));

    let smtp = settings.smtp().map_err(RelayError::ServerMisconfigured)?;
    tracing::info!(
        host = %smtp.host,
        port = smtp.port,
        user = %smtp.user,
        implicit_tls = smtp.implicit_tls(),
        "Using SMTP configuration"
    );

    let sender = settings.sender(&smtp).map_err(compose_failure)?;
    let recipient = settings.recipient().map_err(compose_failure)?;
    let email_client = EmailClient::new(&smtp, sender)?;

    if settings.verify_connection {
        email_client
            .verify()
            .await
            .map_err(RelayError::MailServerUnavailable)?;
        tracing::info!("SMTP connection verified");
    }

    let message = ContactMessage::compose(&submission, &settings.from_name, templates)
        .map_err(compose_failure)?;
    tracing::info!(recipient = %recipient, "Sending contact email");
    email_client
        .send_email(
            recipient,
            &submission.email,
            &message.subject,
            &message.html_body,
            &message.text_body,
        )
        .await?;
    tracing::info!("Contact email sent");

    Ok(())
}

fn compose_failure<E>(e: E) -> RelayError
where
    E: std::error::Error + Send + Sync + 'static,
{
    RelayError::SendFailed(
        SmtpFailure::Other,
        anyhow::Error::new(e).context("Failed to compose the contact email"),
    )
}

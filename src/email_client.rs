use std::future::Future;
use std::time::Duration;

use lettre::message::header::{HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use crate::configuration::SmtpSettings;

type SmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

const REPLY_TO: &str = "Reply-To";

/// SMTP reply codes that mean the credentials were refused.
const AUTHENTICATION_CODES: [&str; 3] = ["530", "534", "535"];

/// One SMTP session per instance; nothing is pooled or shared between requests.
pub struct EmailClient {
    transport: SmtpTransport,
    sender: Mailbox,
    timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SmtpFailure {
    Authentication,
    Connection,
    Timeout,
    Other,
}

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("Failed to build the message")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP transport failed")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("SMTP server did not answer NOOP")]
    NotConnected,
    #[error("SMTP operation took longer than {0:?}")]
    Timeout(Duration),
}

impl EmailError {
    pub fn failure(&self) -> SmtpFailure {
        match self {
            Self::Timeout(_) => SmtpFailure::Timeout,
            Self::NotConnected => SmtpFailure::Connection,
            Self::Build(_) => SmtpFailure::Other,
            Self::Transport(e) => {
                let refused_credentials = e
                    .status()
                    .map(|code| AUTHENTICATION_CODES.contains(&code.to_string().as_str()))
                    .unwrap_or(false);
                if refused_credentials {
                    SmtpFailure::Authentication
                } else {
                    SmtpFailure::from_source_chain(e)
                }
            }
        }
    }
}

impl SmtpFailure {
    /// Looks for the I/O error underneath a transport failure.
    pub fn from_source_chain(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut current = Some(error);
        while let Some(cause) = current {
            if let Some(io) = cause.downcast_ref::<std::io::Error>() {
                return match io.kind() {
                    std::io::ErrorKind::TimedOut => Self::Timeout,
                    _ => Self::Connection,
                };
            }
            if cause.is::<tokio::time::error::Elapsed>() {
                return Self::Timeout;
            }
            current = cause.source();
        }
        Self::Other
    }
}

impl EmailClient {
    pub fn new(settings: &SmtpSettings, sender: Mailbox) -> Result<Self, EmailError> {
        let tls_parameters = TlsParameters::new(settings.host.clone())?;
        let tls = if settings.implicit_tls() {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };
        let credentials = Credentials::new(
            settings.user.clone(),
            settings.password.expose_secret().clone(),
        );

        let transport = SmtpTransport::builder_dangerous(&settings.host)
            .port(settings.port)
            .tls(tls)
            .credentials(credentials)
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            transport,
            sender,
            timeout: settings.timeout,
        })
    }

    /// Connects, authenticates and pings the server without sending anything.
    #[tracing::instrument(name = "Verifying SMTP connection", skip(self))]
    pub async fn verify(&self) -> Result<(), EmailError> {
        match self.bounded(self.transport.test_connection()).await? {
            true => Ok(()),
            false => Err(EmailError::NotConnected),
        }
    }

    #[tracing::instrument(
        name = "Sending email over SMTP",
        skip(self, recipient, html_body, text_body),
        fields(recipient = %recipient)
    )]
    pub async fn send_email(
        &self,
        recipient: Mailbox,
        reply_to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), EmailError> {
        let message = self.message(recipient, reply_to, subject, html_body, text_body)?;

        self.bounded(self.transport.send(message)).await?;

        Ok(())
    }

    /// `reply_to` is whatever the visitor typed; text that is not a mailbox
    /// is still passed on, as a raw header.
    fn message(
        &self,
        recipient: Mailbox,
        reply_to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<Message, EmailError> {
        let builder = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(subject);

        let builder = match reply_to.parse::<Mailbox>() {
            Ok(mailbox) => builder.reply_to(mailbox),
            Err(_) => builder.raw_header(HeaderValue::new(
                HeaderName::new_from_ascii_str(REPLY_TO),
                reply_to.to_string(),
            )),
        };

        let message = builder.multipart(MultiPart::alternative_plain_html(
            text_body.to_string(),
            html_body.to_string(),
        ))?;

        Ok(message)
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, EmailError>
    where
        F: Future<Output = Result<T, lettre::transport::smtp::Error>>,
    {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| EmailError::Timeout(self.timeout))?
            .map_err(EmailError::from)
    }
}

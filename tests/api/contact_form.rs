use contact_relay::client::{Alerts, ContactForm, ContactFormClient, SubmitOutcome};

use crate::fake_smtp::AuthBehaviour;
use crate::helpers::{spawn_app, spawn_app_with};

#[derive(Default)]
struct RecordedAlerts(Vec<String>);

impl Alerts for RecordedAlerts {
    fn alert(&mut self, message: &str) {
        self.0.push(message.to_string());
    }
}

fn filled_form() -> ContactForm {
    let mut form = ContactForm::new("Send");
    form.name = "Ursula".into();
    form.email = "visitor@example.com".into();
    form.subject = "Hello".into();
    form.message = "Nice portfolio!".into();
    form
}

#[tokio::test]
async fn form_submission_is_delivered_end_to_end() {
    // GIVEN
    let app = spawn_app().await;
    let client = ContactFormClient::new(&app.address);
    let mut form = filled_form();
    let mut alerts = RecordedAlerts::default();

    // WHEN
    let outcome = client.submit(&mut form, &mut alerts).await;

    // THEN
    assert_eq!(outcome, SubmitOutcome::Sent);
    assert_eq!(alerts.0, vec!["Message sent successfully!"]);
    assert!(form.name.is_empty() && form.message.is_empty());
    assert!(!form.submit_button.is_disabled());
    assert_eq!(app.smtp_server.received().len(), 1);
}

#[tokio::test]
async fn relay_errors_reach_the_visitor() {
    // GIVEN
    let app = spawn_app_with(AuthBehaviour::Accept, |relay| relay.smtp_host = None).await;
    let client = ContactFormClient::new(&app.address);
    let mut form = filled_form();
    let mut alerts = RecordedAlerts::default();

    // WHEN
    let outcome = client.submit(&mut form, &mut alerts).await;

    // THEN
    let error = "Email configuration not found. Please contact the administrator.";
    assert_eq!(outcome, SubmitOutcome::Rejected(error.into()));
    assert_eq!(alerts.0, vec![format!("Error: {error}")]);
    assert_eq!(form.name, "Ursula");
    assert_eq!(form.submit_button.label(), "Send");
    assert_eq!(app.smtp_server.connections(), 0);
}

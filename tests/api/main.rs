mod contact_form;
mod fake_smtp;
mod health_check;

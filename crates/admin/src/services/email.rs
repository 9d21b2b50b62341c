//! Email delivery for invoices.
//!
//! Uses SMTP via lettre with Askama templates, sent as multipart
//! alternative so plain-text clients stay readable.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::invoice::Invoice;

/// HTML template for the invoice email.
#[derive(Template)]
#[template(path = "email/invoice.html")]
struct InvoiceEmailHtml<'a> {
    customer_name: &'a str,
    reference: &'a str,
    amount: String,
    due_date: String,
}

/// Plain text template for the invoice email.
#[derive(Template)]
#[template(path = "email/invoice.txt")]
struct InvoiceEmailText<'a> {
    customer_name: &'a str,
    reference: &'a str,
    amount: String,
    due_date: String,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send an invoice to the customer.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to
    /// render.
    pub async fn send_invoice(&self, to: &str, invoice: &Invoice) -> Result<(), EmailError> {
        let amount = invoice.amount.display();
        let due_date = invoice.due_at.format("%Y-%m-%d").to_string();

        let html = InvoiceEmailHtml {
            customer_name: &invoice.customer_name,
            reference: &invoice.reference,
            amount: amount.clone(),
            due_date: due_date.clone(),
        }
        .render()?;
        let text = InvoiceEmailText {
            customer_name: &invoice.customer_name,
            reference: &invoice.reference,
            amount,
            due_date,
        }
        .render()?;

        let subject = format!("Jade Market Invoice {}", invoice.reference);
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

//! Outbound notification service
//!
//! Email goes through SendGrid, WhatsApp template messages through WATI, and
//! feedback alerts through the CallMeBot WhatsApp gateway. A channel whose
//! credentials are missing is disabled and reports `ServiceUnavailable`.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::config::NotificationsConfig;
use crate::models::feedback::Feedback;
use crate::models::notification::{DeliveryReport, NotificationTemplate};
use crate::utils::errors::{PortalError, Result};
use crate::utils::helpers::{is_valid_email, normalize_phone};
use crate::utils::logging::log_api_error;

#[derive(Clone)]
pub struct NotificationService {
    client: Client,
    config: NotificationsConfig,
}

impl NotificationService {
    pub fn new(config: NotificationsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn email_enabled(&self) -> bool {
        self.sendgrid_credentials().is_some()
    }

    pub fn whatsapp_enabled(&self) -> bool {
        self.wati_credentials().is_some()
    }

    pub fn feedback_alerts_enabled(&self) -> bool {
        self.feedback_credentials().is_some()
    }

    fn sendgrid_credentials(&self) -> Option<(&str, &str)> {
        non_empty(&self.config.sendgrid_api_key).zip(non_empty(&self.config.sender_email))
    }

    fn wati_credentials(&self) -> Option<(&str, &str)> {
        non_empty(&self.config.wati_endpoint).zip(non_empty(&self.config.wati_access_token))
    }

    fn feedback_credentials(&self) -> Option<(&str, &str)> {
        non_empty(&self.config.feedback_phone).zip(non_empty(&self.config.feedback_api_key))
    }

    /// Send an HTML email. SendGrid acknowledges queued mail with 202.
    pub async fn send_email(&self, to_email: &str, subject: &str, html_content: &str) -> Result<DeliveryReport> {
        let (api_key, sender) = self
            .sendgrid_credentials()
            .ok_or_else(|| PortalError::ServiceUnavailable("Email delivery is not configured".to_string()))?;

        if !is_valid_email(to_email) {
            return Err(PortalError::InvalidInput(format!("Invalid recipient email: {}", to_email)));
        }

        debug!(to = %to_email, "Sending email");
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to_email }] }],
            "from": { "email": sender },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html_content }],
        });

        let response = self
            .client
            .post(&self.config.sendgrid_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            log_api_error("sendgrid", &body, Some(status.as_str()));
            return Err(PortalError::Integration(format!(
                "SendGrid returned status {}",
                status.as_u16()
            )));
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        info!(to = %to_email, "Email accepted for delivery");
        Ok(DeliveryReport {
            success: true,
            message_id,
        })
    }

    /// Render a preset template and email it
    pub async fn send_template_email(
        &self,
        to_email: &str,
        template: NotificationTemplate,
        params: &BTreeMap<String, String>,
    ) -> Result<DeliveryReport> {
        let (subject, body) = template.render(params);
        let html = format!("<p>{}</p>", body);
        self.send_email(to_email, &subject, &html).await
    }

    /// Send a WATI template message and return its ticket id
    pub async fn send_whatsapp_template(
        &self,
        to_number: &str,
        template_name: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<DeliveryReport> {
        let (endpoint, token) = self
            .wati_credentials()
            .ok_or_else(|| PortalError::ServiceUnavailable("WhatsApp delivery is not configured".to_string()))?;

        let url = format!("{}/api/v1/sendTemplateMessage", endpoint.trim_end_matches('/'));
        let payload = wati_payload(to_number, template_name, parameters);

        debug!(template = %template_name, "Sending WhatsApp template message");
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_api_error("wati", &body, Some(status.as_str()));
            return Err(PortalError::Integration(format!(
                "WATI returned status {}",
                status.as_u16()
            )));
        }

        let body: Value = response.json().await?;
        match wati_ticket(&body) {
            Some(ticket_id) => {
                info!(template = %template_name, ticket_id = %ticket_id, "WhatsApp message queued");
                Ok(DeliveryReport {
                    success: true,
                    message_id: Some(ticket_id),
                })
            }
            None => {
                log_api_error("wati", &body.to_string(), Some(template_name));
                Err(PortalError::Integration("WATI rejected the message".to_string()))
            }
        }
    }

    /// Forward a feedback record to the admin WhatsApp number
    pub async fn send_feedback_alert(&self, feedback: &Feedback) -> Result<()> {
        let (phone, api_key) = self
            .feedback_credentials()
            .ok_or_else(|| PortalError::ServiceUnavailable("Feedback alerts are not configured".to_string()))?;

        let text = feedback.to_chat_message();
        let response = self
            .client
            .post(&self.config.callmebot_url)
            .form(&[("phone", phone), ("text", text.as_str()), ("apikey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "CallMeBot rejected feedback alert");
            return Err(PortalError::Integration(format!("CallMeBot API error: {}", body)));
        }

        info!(feedback_id = %feedback.id, "Feedback alert delivered");
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// WATI wants the number as bare digits and parameters as name/value pairs
fn wati_payload(to_number: &str, template_name: &str, parameters: &BTreeMap<String, String>) -> Value {
    let custom_params: Vec<Value> = parameters
        .iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();

    json!({
        "broadcast_name": format!("api_broadcast_{}", template_name),
        "template_name": template_name,
        "receivers": [{
            "whatsappNumber": normalize_phone(to_number),
            "customParams": custom_params,
        }],
    })
}

fn wati_ticket(body: &Value) -> Option<String> {
    let accepted = body.get("result").and_then(Value::as_bool) == Some(true)
        || body.get("status").and_then(Value::as_str) == Some("success");

    accepted.then(|| {
        match body.get("ticket_id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => "success".to_string(),
            Some(other) => other.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wati_payload_shape() {
        let params = BTreeMap::from([("name".to_string(), "Ada".to_string())]);
        let payload = wati_payload("+1 555-123-4567", "welcome", &params);

        assert_eq!(payload["broadcast_name"], "api_broadcast_welcome");
        assert_eq!(payload["receivers"][0]["whatsappNumber"], "15551234567");
        assert_eq!(payload["receivers"][0]["customParams"][0]["name"], "name");
        assert_eq!(payload["receivers"][0]["customParams"][0]["value"], "Ada");
    }

    #[test]
    fn test_wati_ticket_detection() {
        assert_eq!(wati_ticket(&json!({ "result": true, "ticket_id": "t-1" })).as_deref(), Some("t-1"));
        assert_eq!(wati_ticket(&json!({ "status": "success" })).as_deref(), Some("success"));
        assert_eq!(wati_ticket(&json!({ "result": false, "info": "bad template" })), None);
    }

    #[tokio::test]
    async fn test_disabled_channels() {
        let service = NotificationService::new(NotificationsConfig::default()).unwrap();
        assert!(!service.email_enabled());
        assert!(!service.whatsapp_enabled());

        let result = service.send_email("a@example.edu", "s", "b").await;
        assert!(matches!(result, Err(PortalError::ServiceUnavailable(_))));
    }
}

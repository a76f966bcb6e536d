//! Webhook payload processing: classify each message and act on it.

use std::sync::Arc;

use super::dispatcher::NotificationDispatcher;
use super::gateway::{DeliveryGateway, send_isolated};
use super::parser::{PayloadParser, Unrecognized};
use super::prompt::MenuPrompter;
use crate::config::{MessagesConfig, SenderPolicy};
use crate::models::webhook::{InboundMessage, StatusUpdate, WebhookPayload};
use crate::models::{BpRange, DeliveryResult, DispatchOutcome, Recipients, Selection};
use crate::utils::PhoneNumber;

/// What happened to one inbound message.
#[derive(Debug)]
pub enum Disposition {
    Dispatched(Box<DispatchOutcome>),
    /// Reading from an unknown sender dropped under the reject policy.
    Rejected { sender: PhoneNumber },
    RangeMenu { range: BpRange, result: DeliveryResult },
    OptIn { result: DeliveryResult },
    MenuResent { result: DeliveryResult },
    Ignored { reason: String },
}

#[derive(Debug, Default)]
pub struct ProcessSummary {
    pub dispositions: Vec<Disposition>,
    pub statuses: usize,
}

#[derive(Clone)]
pub struct WebhookProcessor {
    parser: PayloadParser,
    dispatcher: NotificationDispatcher,
    prompter: MenuPrompter,
    gateway: Arc<dyn DeliveryGateway>,
    recipients: Arc<Recipients>,
    messages: Arc<MessagesConfig>,
    sender_policy: SenderPolicy,
}

impl WebhookProcessor {
    pub fn new(
        parser: PayloadParser,
        dispatcher: NotificationDispatcher,
        prompter: MenuPrompter,
        gateway: Arc<dyn DeliveryGateway>,
        recipients: Arc<Recipients>,
        messages: Arc<MessagesConfig>,
        sender_policy: SenderPolicy,
    ) -> Self {
        Self {
            parser,
            dispatcher,
            prompter,
            gateway,
            recipients,
            messages,
            sender_policy,
        }
    }

    /// Parses a raw request body and processes it.
    pub async fn process_raw(&self, body: &[u8]) -> Result<ProcessSummary, serde_json::Error> {
        let payload: WebhookPayload = serde_json::from_slice(body)?;
        Ok(self.process(&payload).await)
    }

    /// Messages are handled in arrival order, one at a time.
    pub async fn process(&self, payload: &WebhookPayload) -> ProcessSummary {
        let mut summary = ProcessSummary::default();

        if !payload.is_business_account() {
            tracing::warn!(object = %payload.object, "Ignoring webhook for unexpected object");
            return summary;
        }

        for value in payload.values() {
            for status in value.status_updates() {
                match &status.item {
                    Ok(update) => {
                        log_status(update);
                        summary.statuses += 1;
                    }
                    Err(e) => tracing::warn!(
                        status_id = status.raw_id(),
                        error = %e,
                        "Skipping malformed status update"
                    ),
                }
            }
            for message in value.inbound_messages() {
                let disposition = match &message.item {
                    Ok(message) => self.handle_message(message).await,
                    Err(e) => {
                        tracing::warn!(
                            message_id = message.raw_id(),
                            error = %e,
                            "Skipping malformed message"
                        );
                        Disposition::Ignored {
                            reason: format!("malformed message: {e}"),
                        }
                    }
                };
                tracing::debug!(message_id = message.raw_id(), disposition = ?disposition, "Message handled");
                summary.dispositions.push(disposition);
            }
        }

        summary
    }

    async fn handle_message(&self, message: &InboundMessage) -> Disposition {
        match self.parser.classify(message) {
            Ok(Selection::BloodPressure(selection)) => {
                if self.sender_policy == SenderPolicy::Reject
                    && !self.recipients.is_senior(&selection.sender)
                {
                    tracing::warn!(
                        sender = %selection.sender,
                        bucket = %selection.bucket.label,
                        "Rejected reading from unknown sender"
                    );
                    return Disposition::Rejected {
                        sender: selection.sender,
                    };
                }
                Disposition::Dispatched(Box::new(self.dispatcher.dispatch(&selection).await))
            }
            Ok(Selection::Range { sender, range }) => {
                let gateway = self.gateway.clone();
                let result = send_isolated(async move {
                    gateway.send_range_menu(&sender, range).await
                })
                .await;
                Disposition::RangeMenu { range, result }
            }
            Ok(Selection::SubscriptionOptIn { sender }) => {
                tracing::info!(
                    sender = %sender,
                    caregiver = self.recipients.is_caregiver(&sender),
                    "Subscription confirmed"
                );
                let gateway = self.gateway.clone();
                let ack = self.messages.subscription_ack.clone();
                let result =
                    send_isolated(async move { gateway.send_text(&sender, &ack).await }).await;
                Disposition::OptIn { result }
            }
            Err(Unrecognized::NotInteractive { kind }) if kind == "text" => {
                self.handle_text(message).await
            }
            Err(reason) => {
                tracing::warn!(
                    message_id = %message.id,
                    from = %message.from,
                    reason = %reason,
                    "Ignoring unrecognized message"
                );
                Disposition::Ignored {
                    reason: reason.to_string(),
                }
            }
        }
    }

    /// Free text from the senior gets the menu again; anyone else is ignored.
    async fn handle_text(&self, message: &InboundMessage) -> Disposition {
        let sender = PhoneNumber::normalize(&message.from);
        if !self.recipients.is_senior(&sender) {
            tracing::info!(from = %message.from, "Ignoring text message from non-senior");
            return Disposition::Ignored {
                reason: "text message from non-senior".to_string(),
            };
        }

        let prompter = self.prompter.clone();
        let result = send_isolated(async move { prompter.send_default().await }).await;
        Disposition::MenuResent { result }
    }
}

fn log_status(status: &StatusUpdate) {
    if status.status == "failed" {
        tracing::warn!(
            message_id = %status.id,
            recipient = status.recipient_id.as_deref().unwrap_or("-"),
            errors = %serde_json::Value::from(status.errors.clone()),
            "Provider reported failed delivery"
        );
    } else {
        tracing::debug!(message_id = %status.id, status = %status.status, "Delivery status update");
    }
}

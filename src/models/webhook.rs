//! Inbound WhatsApp Cloud API webhook payloads.
//!
//! Only the fields the relay acts on are modeled; everything else is ignored
//! by serde so provider additions never break deserialization. Messages and
//! statuses are kept raw and decoded one at a time, so a malformed item only
//! loses itself.

use serde::Deserialize;

pub const BUSINESS_ACCOUNT_OBJECT: &str = "whatsapp_business_account";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default, rename = "entry")]
    pub entries: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: String,
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
    #[serde(default)]
    pub statuses: Vec<serde_json::Value>,
}

impl ChangeValue {
    pub fn inbound_messages(&self) -> impl Iterator<Item = Decoded<'_, InboundMessage>> {
        self.messages.iter().map(Decoded::from_raw)
    }

    pub fn status_updates(&self) -> impl Iterator<Item = Decoded<'_, StatusUpdate>> {
        self.statuses.iter().map(Decoded::from_raw)
    }
}

/// One array item, decoded on its own. `raw` stays around for logging.
#[derive(Debug)]
pub struct Decoded<'a, T> {
    pub raw: &'a serde_json::Value,
    pub item: Result<T, serde_json::Error>,
}

impl<'a, T: serde::de::DeserializeOwned> Decoded<'a, T> {
    fn from_raw(raw: &'a serde_json::Value) -> Self {
        Self {
            raw,
            item: T::deserialize(raw),
        }
    }

    /// Provider id of the item, when it has a string `id`.
    pub fn raw_id(&self) -> &'a str {
        self.raw
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-")
    }
}

/// A single message as delivered by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub interactive: Option<InteractiveReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// List and button replies arrive in different shapes with the same content.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveReply {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub list_reply: Option<ReplyChoice>,
    #[serde(default)]
    pub button_reply: Option<ReplyChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyChoice {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl WebhookPayload {
    pub fn is_business_account(&self) -> bool {
        self.object == BUSINESS_ACCOUNT_OBJECT
    }

    pub fn values(&self) -> impl Iterator<Item = &ChangeValue> {
        self.entries
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .map(|change| &change.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_list_reply_payload() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "102290129340398",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {"display_phone_number": "15550000000", "phone_number_id": "1"},
                        "messages": [{
                            "from": "37120000000",
                            "id": "wamid.HBgL",
                            "timestamp": "1700000000",
                            "type": "interactive",
                            "interactive": {
                                "type": "list_reply",
                                "list_reply": {"id": "bp_gt160", "title": ">160"}
                            }
                        }]
                    }
                }]
            }]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();
        assert!(payload.is_business_account());

        let messages: Vec<_> = payload
            .values()
            .flat_map(|v| v.inbound_messages())
            .map(|decoded| decoded.item.unwrap())
            .collect();
        assert_eq!(messages.len(), 1);
        let reply = messages[0].interactive.as_ref().unwrap();
        assert_eq!(reply.list_reply.as_ref().unwrap().id, "bp_gt160");
        assert!(reply.button_reply.is_none());
    }

    #[test]
    fn test_deserialize_status_only_payload() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{"id": "1", "changes": [{"field": "messages", "value": {
                "statuses": [{"id": "wamid.1", "status": "delivered", "recipient_id": "37120000001"}]
            }}]}]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();
        let value = payload.values().next().unwrap();
        assert!(value.messages.is_empty());
        let status = value.status_updates().next().unwrap().item.unwrap();
        assert_eq!(status.status, "delivered");
    }

    #[test]
    fn test_malformed_item_fails_alone() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{"id": "1", "changes": [{"field": "messages", "value": {
                "messages": [
                    {"from": "37120000000", "id": "wamid.ok", "type": "text", "text": {"body": "hi"}},
                    {"from": "37120000000", "id": "wamid.bad", "type": "interactive",
                     "interactive": {"list_reply": {"title": ">160"}}}
                ]
            }}]}]
        }"#;

        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();
        let decoded: Vec<_> = payload.values().flat_map(|v| v.inbound_messages()).collect();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].item.as_ref().unwrap().id, "wamid.ok");
        assert!(decoded[1].item.is_err());
        assert_eq!(decoded[1].raw_id(), "wamid.bad");
    }
}

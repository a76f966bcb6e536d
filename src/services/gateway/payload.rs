//! Request bodies for the Cloud API `/messages` endpoint.

use serde::Serialize;

use crate::config::{MenuConfig, MessagesConfig};
use crate::models::{BpRange, Bucket};
use crate::utils::PhoneNumber;

/// Provider limit on row and button titles.
const MAX_TITLE_CHARS: usize = 24;

#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: String,
    #[serde(flatten)]
    pub content: Content,
}

impl OutboundMessage {
    pub fn new(to: &PhoneNumber, content: Content) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: to.as_str().to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: TextContent },
    Interactive { interactive: Interactive },
}

#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    pub preview_url: bool,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Interactive {
    List { body: Body, action: ListAction },
    Button { body: Body, action: ButtonAction },
}

#[derive(Debug, Clone, Serialize)]
pub struct Body {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAction {
    pub button: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ButtonAction {
    pub buttons: Vec<ReplyButton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyButton {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: Row,
}

impl ReplyButton {
    fn new(id: &str, title: &str) -> Self {
        Self {
            kind: "reply",
            reply: row(id, title),
        }
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}

fn row(id: &str, title: &str) -> Row {
    Row {
        id: id.to_string(),
        title: truncate_title(title),
    }
}

fn list<'a>(
    body: &str,
    messages: &MessagesConfig,
    buckets: impl Iterator<Item = &'a Bucket>,
) -> Content {
    Content::Interactive {
        interactive: Interactive::List {
            body: Body {
                text: body.to_string(),
            },
            action: ListAction {
                button: truncate_title(&messages.menu_button),
                sections: vec![Section {
                    title: truncate_title(&messages.menu_section),
                    rows: buckets.map(|b| row(&b.id, &b.label)).collect(),
                }],
            },
        },
    }
}

pub fn text(body: &str) -> Content {
    Content::Text {
        text: TextContent {
            preview_url: false,
            body: body.to_string(),
        },
    }
}

pub fn bucket_menu(menu: &MenuConfig, messages: &MessagesConfig) -> Content {
    list(&messages.menu_body, messages, menu.buckets.iter())
}

pub fn range_menu(menu: &MenuConfig, messages: &MessagesConfig, range: BpRange) -> Content {
    let body = match range {
        BpRange::Low => &messages.low_list_body,
        BpRange::High => &messages.high_list_body,
    };
    list(body, messages, menu.buckets_in(range))
}

pub fn range_buttons(menu: &MenuConfig, messages: &MessagesConfig) -> Content {
    Content::Interactive {
        interactive: Interactive::Button {
            body: Body {
                text: messages.range_body.clone(),
            },
            action: ButtonAction {
                buttons: vec![
                    ReplyButton::new(&menu.range_low_id, &messages.range_low_title),
                    ReplyButton::new(&menu.range_high_id, &messages.range_high_title),
                ],
            },
        },
    }
}

pub fn subscription_prompt(menu: &MenuConfig, messages: &MessagesConfig) -> Content {
    Content::Interactive {
        interactive: Interactive::Button {
            body: Body {
                text: messages.subscription_body.clone(),
            },
            action: ButtonAction {
                buttons: vec![ReplyButton::new(
                    &menu.subscribe_id,
                    &messages.subscription_button,
                )],
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn to_json(content: Content) -> Value {
        let to = PhoneNumber::normalize("+371 2000 0000");
        serde_json::to_value(OutboundMessage::new(&to, content)).unwrap()
    }

    #[test]
    fn test_text_message_shape() {
        assert_eq!(
            to_json(text("hello")),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "37120000000",
                "type": "text",
                "text": { "preview_url": false, "body": "hello" }
            })
        );
    }

    #[test]
    fn test_bucket_menu_lists_every_bucket_in_order() {
        let menu = MenuConfig::default();
        let value = to_json(bucket_menu(&menu, &MessagesConfig::default()));

        assert_eq!(value["type"], "interactive");
        assert_eq!(value["interactive"]["type"], "list");
        let rows = value["interactive"]["action"]["sections"][0]["rows"]
            .as_array()
            .unwrap();
        assert_eq!(rows.len(), menu.buckets.len());
        assert_eq!(rows[0]["id"], "bp_lt110");
        assert_eq!(rows[9]["id"], "bp_gt160");
    }

    #[test]
    fn test_range_menu_only_contains_range_buckets() {
        let menu = MenuConfig::default();
        let value = to_json(range_menu(&menu, &MessagesConfig::default(), BpRange::Low));

        let rows = value["interactive"]["action"]["sections"][0]["rows"]
            .as_array()
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["bp_lt110", "bp_115"]);
    }

    #[test]
    fn test_range_buttons_carry_reply_ids() {
        let value = to_json(range_buttons(
            &MenuConfig::default(),
            &MessagesConfig::default(),
        ));

        assert_eq!(value["interactive"]["type"], "button");
        let buttons = value["interactive"]["action"]["buttons"].as_array().unwrap();
        assert_eq!(buttons[0]["type"], "reply");
        assert_eq!(buttons[0]["reply"]["id"], "range_low");
        assert_eq!(buttons[1]["reply"]["id"], "range_high");
    }

    #[test]
    fn test_titles_are_truncated() {
        let messages = MessagesConfig {
            subscription_button: "x".repeat(40),
            ..MessagesConfig::default()
        };
        let value = to_json(subscription_prompt(&MenuConfig::default(), &messages));

        let title = value["interactive"]["action"]["buttons"][0]["reply"]["title"]
            .as_str()
            .unwrap();
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
    }
}

//! Classification of inbound interactive replies.

use std::sync::Arc;

use thiserror::Error;

use crate::config::MenuConfig;
use crate::models::webhook::InboundMessage;
use crate::models::{BloodPressureSelection, Selection};
use crate::utils::{PhoneError, PhoneNumber};

/// Why an inbound message did not map to any [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unrecognized {
    #[error("message type '{kind}' is not an interactive reply")]
    NotInteractive { kind: String },

    #[error("interactive message carries neither a list nor a button reply")]
    MissingReply,

    #[error("unknown reply identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("invalid sender: {0}")]
    InvalidSender(#[from] PhoneError),
}

/// Maps reply identifiers to selections using the configured allow-list.
#[derive(Debug, Clone)]
pub struct PayloadParser {
    menu: Arc<MenuConfig>,
}

impl PayloadParser {
    pub fn new(menu: Arc<MenuConfig>) -> Self {
        Self { menu }
    }

    /// Pure classification. Range identifiers win over the subscription
    /// identifier, which wins over bucket identifiers.
    pub fn classify(&self, message: &InboundMessage) -> Result<Selection, Unrecognized> {
        if message.kind != "interactive" {
            return Err(Unrecognized::NotInteractive {
                kind: message.kind.clone(),
            });
        }

        let reply = message
            .interactive
            .as_ref()
            .and_then(|i| i.list_reply.as_ref().or(i.button_reply.as_ref()))
            .ok_or(Unrecognized::MissingReply)?;

        let sender = PhoneNumber::parse(&message.from)?;
        let id = reply.id.as_str();

        if let Some(range) = self.menu.range_for(id) {
            return Ok(Selection::Range { sender, range });
        }

        if id == self.menu.subscribe_id {
            return Ok(Selection::SubscriptionOptIn { sender });
        }

        self.menu
            .bucket(id)
            .map(|bucket| {
                Selection::BloodPressure(BloodPressureSelection {
                    sender,
                    bucket: bucket.clone(),
                })
            })
            .ok_or_else(|| Unrecognized::UnknownIdentifier(id.to_string()))
    }

    /// Like [`classify`](Self::classify) but logs unrecognized input.
    pub fn parse(&self, message: &InboundMessage) -> Option<Selection> {
        match self.classify(message) {
            Ok(selection) => Some(selection),
            Err(reason) => {
                tracing::warn!(
                    message_id = %message.id,
                    from = %message.from,
                    reason = %reason,
                    "Ignoring unrecognized reply"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BpRange;
    use crate::models::webhook::{InteractiveReply, ReplyChoice, TextBody};
    use proptest::prelude::*;

    const SENDER: &str = "37120000000";

    fn parser() -> PayloadParser {
        PayloadParser::new(Arc::new(MenuConfig::default()))
    }

    fn list_reply(id: &str) -> InboundMessage {
        InboundMessage {
            from: SENDER.to_string(),
            id: "wamid.in".to_string(),
            timestamp: Some("1700000000".to_string()),
            kind: "interactive".to_string(),
            text: None,
            interactive: Some(InteractiveReply {
                kind: "list_reply".to_string(),
                list_reply: Some(ReplyChoice {
                    id: id.to_string(),
                    title: String::new(),
                }),
                button_reply: None,
            }),
        }
    }

    fn button_reply(id: &str) -> InboundMessage {
        let mut message = list_reply(id);
        message.interactive = Some(InteractiveReply {
            kind: "button_reply".to_string(),
            list_reply: None,
            button_reply: Some(ReplyChoice {
                id: id.to_string(),
                title: String::new(),
            }),
        });
        message
    }

    #[test]
    fn test_bucket_reply_maps_to_selection() {
        let selection = parser().classify(&list_reply("bp_gt160")).unwrap();

        match selection {
            Selection::BloodPressure(s) => {
                assert_eq!(s.sender.as_str(), SENDER);
                assert_eq!(s.bucket.label, ">160");
                assert!(s.bucket.critical);
            }
            other => panic!("expected blood pressure selection, got {other:?}"),
        }
    }

    #[test]
    fn test_range_and_subscription_buttons() {
        assert_eq!(
            parser().classify(&button_reply("range_low")).unwrap(),
            Selection::Range {
                sender: PhoneNumber::normalize(SENDER),
                range: BpRange::Low
            }
        );
        assert_eq!(
            parser().classify(&button_reply("subscribe_yes")).unwrap(),
            Selection::SubscriptionOptIn {
                sender: PhoneNumber::normalize(SENDER)
            }
        );
    }

    #[test]
    fn test_range_identifier_wins_over_bucket() {
        let mut menu = MenuConfig::default();
        menu.buckets[0].id = "range_high".to_string();
        let parser = PayloadParser::new(Arc::new(menu));

        assert!(matches!(
            parser.classify(&list_reply("range_high")),
            Ok(Selection::Range { range: BpRange::High, .. })
        ));
    }

    #[test]
    fn test_text_message_is_not_interactive() {
        let mut message = list_reply("bp_120");
        message.kind = "text".to_string();
        message.interactive = None;
        message.text = Some(TextBody {
            body: "hi".to_string(),
        });

        assert_eq!(
            parser().classify(&message),
            Err(Unrecognized::NotInteractive {
                kind: "text".to_string()
            })
        );
        assert!(parser().parse(&message).is_none());
    }

    #[test]
    fn test_missing_reply_and_bad_sender() {
        let mut message = list_reply("bp_120");
        message.interactive = None;
        assert_eq!(parser().classify(&message), Err(Unrecognized::MissingReply));

        let mut message = list_reply("bp_120");
        message.from = "123".to_string();
        assert_eq!(
            parser().classify(&message),
            Err(Unrecognized::InvalidSender(PhoneError::Length(3)))
        );
    }

    proptest! {
        #[test]
        fn prop_every_allow_listed_bucket_is_recognized(index in 0usize..10) {
            let menu = MenuConfig::default();
            let bucket = menu.buckets[index].clone();
            let selection = parser().classify(&list_reply(&bucket.id)).unwrap();
            prop_assert_eq!(
                selection,
                Selection::BloodPressure(BloodPressureSelection {
                    sender: PhoneNumber::normalize(SENDER),
                    bucket,
                })
            );
        }

        #[test]
        fn prop_unknown_identifiers_are_rejected(id in "[a-z_0-9]{1,20}") {
            let menu = MenuConfig::default();
            prop_assume!(menu.bucket(&id).is_none());
            prop_assume!(menu.range_for(&id).is_none());
            prop_assume!(id != menu.subscribe_id);

            prop_assert_eq!(
                parser().classify(&list_reply(&id)),
                Err(Unrecognized::UnknownIdentifier(id.clone()))
            );
        }
    }
}

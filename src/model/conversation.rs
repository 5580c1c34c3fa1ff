use serde::Serialize;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One slot in a multimodal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    /// Placeholder the tokenizer fills with the image tokens
    Image,
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

/// Chat structure handed to the tokenizer's template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    /// A single user turn holding one image slot followed by the instruction.
    pub fn single_turn(instruction: &str) -> Self {
        Self {
            messages: vec![Message {
                role: Role::User,
                content: vec![
                    ContentPart::Image,
                    ContentPart::Text { text: instruction.to_string() },
                ],
            }],
        }
    }

    /// Number of image slots across all messages
    pub fn image_slots(&self) -> usize {
        self.messages
            .iter()
            .flat_map(|m| m.content.iter())
            .filter(|part| matches!(part, ContentPart::Image))
            .count()
    }

    /// Text of the last user message, text parts joined by newlines.
    pub fn last_user_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| {
                m.content
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::Text { text } => Some(text.as_str()),
                        ContentPart::Image => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_turn_shape() {
        let conversation = Conversation::single_turn("Describe the film");
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].role, Role::User);
        assert_eq!(conversation.image_slots(), 1);
        assert_eq!(conversation.messages[0].content[0], ContentPart::Image);
        assert_eq!(conversation.last_user_text().as_deref(), Some("Describe the film"));
    }

    #[test]
    fn test_serializes_like_chat_messages() {
        let conversation = Conversation::single_turn("hi");
        let json = serde_json::to_value(&conversation).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "content": [{"type": "image"}, {"type": "text", "text": "hi"}]}
            ])
        );
    }
}

use crate::types::ChatMessage;

/// Chat template used to render a conversation into a raw prompt and to pull
/// the assistant's logical message back out of a raw completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTemplate {
    ChatMl,
    Zephyr,
}

impl ChatTemplate {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "chatml" => Some(ChatTemplate::ChatMl),
            "zephyr" => Some(ChatTemplate::Zephyr),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChatTemplate::ChatMl => "chatml",
            ChatTemplate::Zephyr => "zephyr",
        }
    }

    fn assistant_header(self) -> &'static str {
        match self {
            ChatTemplate::ChatMl => "<|im_start|>assistant",
            ChatTemplate::Zephyr => "<|assistant|>",
        }
    }

    fn stop_marker(self) -> &'static str {
        match self {
            ChatTemplate::ChatMl => "<|im_end|>",
            ChatTemplate::Zephyr => "</s>",
        }
    }

    /// Render an ordered conversation into one prompt string ending with the
    /// assistant generation header.
    pub fn render(self, messages: &[ChatMessage]) -> String {
        let mut prompt = String::new();
        for message in messages {
            match self {
                ChatTemplate::ChatMl => {
                    prompt.push_str("<|im_start|>");
                    prompt.push_str(message.role.as_str());
                    prompt.push('\n');
                    prompt.push_str(&message.content);
                    prompt.push_str("<|im_end|>\n");
                }
                ChatTemplate::Zephyr => {
                    prompt.push_str("<|");
                    prompt.push_str(message.role.as_str());
                    prompt.push_str("|>\n");
                    prompt.push_str(&message.content);
                    prompt.push_str("</s>\n");
                }
            }
        }
        prompt.push_str(self.assistant_header());
        prompt.push('\n');
        prompt
    }

    /// Extract the assistant message from a raw completion, stripping template
    /// artifacts. Engines differ in how much of the template they echo back,
    /// so a completion without any markers is taken verbatim.
    pub fn extract_assistant(self, completion: &str) -> Option<String> {
        let header = self.assistant_header();
        let body = match completion.rfind(header) {
            Some(index) => &completion[index + header.len()..],
            None => completion,
        };
        let body = body.strip_prefix('\n').unwrap_or(body);
        let body = match body.find(self.stop_marker()) {
            Some(end) => &body[..end],
            None => body,
        };
        let trimmed = body.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[test]
    fn from_name_recognizes_known_templates() {
        assert_eq!(ChatTemplate::from_name("chatml"), Some(ChatTemplate::ChatMl));
        assert_eq!(ChatTemplate::from_name("zephyr"), Some(ChatTemplate::Zephyr));
        assert_eq!(ChatTemplate::from_name("alpaca"), None);
    }

    #[test]
    fn chatml_render_tags_each_turn_and_opens_assistant() {
        let messages = vec![
            ChatMessage::system("be terse"),
            ChatMessage::user("hello"),
        ];
        let prompt = ChatTemplate::ChatMl.render(&messages);
        assert!(prompt.starts_with("<|im_start|>system\nbe terse<|im_end|>\n"));
        assert!(prompt.contains("<|im_start|>user\nhello<|im_end|>\n"));
        assert!(prompt.ends_with("<|im_start|>assistant\n"));
    }

    #[test]
    fn zephyr_render_uses_own_markers() {
        let prompt = ChatTemplate::Zephyr.render(&[ChatMessage::user("hi")]);
        assert!(prompt.starts_with("<|user|>\nhi</s>\n"));
        assert!(prompt.ends_with("<|assistant|>\n"));
    }

    #[test]
    fn extract_strips_template_artifacts() {
        let completion = "<|im_start|>assistant\nThe answer is 4.<|im_end|>";
        let message = ChatTemplate::ChatMl.extract_assistant(completion);
        assert_eq!(message.as_deref(), Some("The answer is 4."));
    }

    #[test]
    fn extract_passes_plain_completion_through() {
        let message = ChatTemplate::ChatMl.extract_assistant("plain text answer");
        assert_eq!(message.as_deref(), Some("plain text answer"));
    }

    #[test]
    fn extract_returns_none_for_empty_message() {
        let completion = "<|im_start|>assistant\n<|im_end|>";
        assert_eq!(ChatTemplate::ChatMl.extract_assistant(completion), None);
        assert_eq!(ChatTemplate::ChatMl.extract_assistant("   "), None);
    }

    #[test]
    fn extract_takes_last_assistant_segment() {
        let completion = "<|im_start|>assistant\nfirst<|im_end|>\n<|im_start|>assistant\nsecond<|im_end|>";
        let message = ChatTemplate::ChatMl.extract_assistant(completion);
        assert_eq!(message.as_deref(), Some("second"));
    }
}

use crate::domain::value::StatusCode;

#[derive(Debug, Clone, PartialEq)]
pub struct SendSmsResponse {
    pub message_count: Option<u32>,
    pub messages: Vec<MessageResult>,
    /// Response body exactly as received.
    pub raw: String,
}

impl SendSmsResponse {
    /// The first message result, which carries the outcome of a single-recipient send.
    pub fn first(&self) -> Option<&MessageResult> {
        self.messages.first()
    }

    /// `true` when the first message was accepted by the gateway.
    pub fn is_accepted(&self) -> bool {
        self.first().is_some_and(|message| message.status.is_accepted())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageResult {
    pub status: StatusCode,
    pub to: Option<String>,
    pub message_id: Option<String>,
    pub message_price: Option<String>,
    pub remaining_balance: Option<String>,
    pub network: Option<String>,
    pub error_text: Option<String>,
}

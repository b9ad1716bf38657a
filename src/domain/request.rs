use crate::domain::value::{MessageText, Recipient, SenderId};

#[derive(Debug, Clone)]
/// A single outbound SMS.
///
/// All three parts are already validated; building one cannot fail.
pub struct SendSms {
    from: SenderId,
    to: Recipient,
    text: MessageText,
}

impl SendSms {
    pub fn new(from: SenderId, to: Recipient, text: MessageText) -> Self {
        Self { from, to, text }
    }

    pub fn sender(&self) -> &SenderId {
        &self.from
    }

    pub fn recipient(&self) -> &Recipient {
        &self.to
    }

    pub fn text(&self) -> &MessageText {
        &self.text
    }
}

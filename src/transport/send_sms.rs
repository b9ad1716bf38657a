use serde::Deserialize;

use super::amount::optional_amount;
use crate::domain::{
    MessageResult, MessageText, Recipient, SendSms, SendSmsResponse, SenderId, StatusCode,
};

/// Content type field; every message goes out as unicode.
const TYPE_FIELD: &str = "type";
const UNICODE: &str = "unicode";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response contains no message results")]
    NoMessages,
}

#[derive(Debug, Clone, Deserialize)]
struct SendSmsJsonResponse {
    #[serde(default, rename = "message-count")]
    message_count: Option<TransportCount>,
    messages: Vec<MessageJsonResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct MessageJsonResult {
    status: TransportCode,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default, deserialize_with = "optional_amount")]
    message_price: Option<String>,
    #[serde(default, deserialize_with = "optional_amount")]
    remaining_balance: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    error_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransportCode {
    String(String),
    Number(i64),
}

impl TransportCode {
    fn into_status_code(self) -> StatusCode {
        match self {
            Self::String(value) => StatusCode::new(value.trim()),
            Self::Number(value) => StatusCode::new(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TransportCount {
    Int(u32),
    String(String),
}

impl TransportCount {
    fn into_u32(self) -> Option<u32> {
        match self {
            Self::Int(value) => Some(value),
            Self::String(value) => value.trim().parse::<u32>().ok(),
        }
    }
}

/// Message fields of the query string; credentials are added by the client.
pub fn encode_send_sms_query(request: &SendSms) -> Vec<(String, String)> {
    vec![
        (
            SenderId::FIELD.to_owned(),
            request.sender().as_str().to_owned(),
        ),
        (Recipient::FIELD.to_owned(), request.recipient().raw().to_owned()),
        (
            MessageText::FIELD.to_owned(),
            request.text().as_str().to_owned(),
        ),
        (TYPE_FIELD.to_owned(), UNICODE.to_owned()),
    ]
}

pub fn decode_send_sms_json_response(json: &str) -> Result<SendSmsResponse, TransportError> {
    let parsed: SendSmsJsonResponse = serde_json::from_str(json)?;
    if parsed.messages.is_empty() {
        return Err(TransportError::NoMessages);
    }

    let messages = parsed
        .messages
        .into_iter()
        .map(|message| MessageResult {
            status: message.status.into_status_code(),
            to: message.to,
            message_id: message.message_id,
            message_price: message.message_price,
            remaining_balance: message.remaining_balance,
            network: message.network,
            error_text: message.error_text,
        })
        .collect();

    Ok(SendSmsResponse {
        message_count: parsed.message_count.and_then(TransportCount::into_u32),
        messages,
        raw: json.to_owned(),
    })
}

//! Generation request payloads.
//!
//! The user-authored field (`originalMessage` for replies, `prompt` for new
//! emails) is sealed into envelope text before the payload leaves the client
//! when the request asks for encryption. Everything else passes through.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::service::EncryptionService;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub original_message: String,
    pub language: String,
    pub tone: String,
    pub intent: String,
    #[serde(default)]
    pub encrypted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub prompt: String,
    pub language: String,
    pub tone: String,
    #[serde(default)]
    pub encrypted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPayload {
    pub original_message: String,
    pub language: String,
    pub tone: String,
    pub intent: String,
    pub encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPayload {
    pub prompt: String,
    pub language: String,
    pub tone: String,
    pub encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Build the reply payload, sealing `original_message` for the active user
/// when the request is marked encrypted.
pub async fn prepare_reply_payload(
    service: &EncryptionService,
    request: ReplyRequest,
    token: Option<&str>,
) -> Result<ReplyPayload> {
    let original_message =
        seal_field(service, request.original_message, request.encrypted).await?;
    Ok(ReplyPayload {
        original_message,
        language: request.language,
        tone: request.tone,
        intent: request.intent,
        encrypted: request.encrypted,
        token: token.map(str::to_string),
    })
}

pub async fn prepare_email_payload(
    service: &EncryptionService,
    request: EmailRequest,
    token: Option<&str>,
) -> Result<EmailPayload> {
    let prompt = seal_field(service, request.prompt, request.encrypted).await?;
    Ok(EmailPayload {
        prompt,
        language: request.language,
        tone: request.tone,
        encrypted: request.encrypted,
        token: token.map(str::to_string),
    })
}

async fn seal_field(service: &EncryptionService, text: String, encrypted: bool) -> Result<String> {
    // empty fields go out as-is
    if !encrypted || text.is_empty() {
        return Ok(text);
    }
    debug!(len = text.len(), "sealing payload field");
    service.encrypt(&text, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SealConfig;
    use crate::error::SealError;
    use mailseal_crypto::is_envelope_formatted;

    fn reply(encrypted: bool) -> ReplyRequest {
        ReplyRequest {
            original_message: "Can we move the meeting to Friday?".into(),
            language: "English".into(),
            tone: "Professional".into(),
            intent: "Say Yes".into(),
            encrypted,
        }
    }

    fn email(prompt: &str, encrypted: bool) -> EmailRequest {
        EmailRequest {
            prompt: prompt.into(),
            language: "English".into(),
            tone: "Friendly".into(),
            encrypted,
        }
    }

    async fn ready_service() -> EncryptionService {
        let svc = EncryptionService::new(SealConfig::default()).unwrap();
        svc.initialize_for_user("u1", Some("john@x.com")).await.unwrap();
        svc
    }

    #[tokio::test]
    async fn plain_reply_passes_through() {
        let svc = EncryptionService::new(SealConfig::default()).unwrap();
        let payload = prepare_reply_payload(&svc, reply(false), None).await.unwrap();
        assert_eq!(payload.original_message, "Can we move the meeting to Friday?");
        assert!(!payload.encrypted);
        assert_eq!(svc.engine().derivations_started(), 0);
    }

    #[tokio::test]
    async fn encrypted_reply_seals_message_only() {
        let svc = ready_service().await;
        let payload = prepare_reply_payload(&svc, reply(true), Some("hook-token"))
            .await
            .unwrap();
        assert!(payload.encrypted);
        assert!(is_envelope_formatted(&payload.original_message));
        assert_eq!(payload.intent, "Say Yes");
        assert_eq!(payload.tone, "Professional");
        assert_eq!(
            svc.decrypt(&payload.original_message, None).await.unwrap(),
            "Can we move the meeting to Friday?"
        );
    }

    #[tokio::test]
    async fn encrypted_email_seals_prompt() {
        let svc = ready_service().await;
        let payload = prepare_email_payload(&svc, email("Invite the team to lunch", true), None)
            .await
            .unwrap();
        assert!(payload.prompt.starts_with("v2:"));
        assert_eq!(
            svc.decrypt(&payload.prompt, None).await.unwrap(),
            "Invite the team to lunch"
        );
    }

    #[tokio::test]
    async fn empty_prompt_is_not_sealed() {
        let svc = EncryptionService::new(SealConfig::default()).unwrap();
        let payload = prepare_email_payload(&svc, email("", true), None).await.unwrap();
        assert_eq!(payload.prompt, "");
        assert!(payload.encrypted);
    }

    #[tokio::test]
    async fn encrypted_without_user_fails() {
        let svc = EncryptionService::new(SealConfig::default()).unwrap();
        let err = prepare_reply_payload(&svc, reply(true), None).await.unwrap_err();
        assert!(matches!(err, SealError::KeyNotInitialized));
    }

    #[tokio::test]
    async fn token_is_omitted_when_absent() {
        let svc = EncryptionService::new(SealConfig::default()).unwrap();
        let payload = prepare_email_payload(&svc, email("hi", false), None).await.unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["encrypted"], false);

        let payload = prepare_reply_payload(&svc, reply(false), Some("t")).await.unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["token"], "t");
        assert_eq!(json["originalMessage"], "Can we move the meeting to Friday?");
    }

    #[test]
    fn requests_deserialize_camel_case() {
        let req: ReplyRequest = serde_json::from_str(
            r#"{"originalMessage":"m","language":"English","tone":"Friendly","intent":"Follow Up"}"#,
        )
        .unwrap();
        assert_eq!(req.original_message, "m");
        assert!(!req.encrypted);
    }
}

use std::path::Path;

use outreach_common::contacts::load_contacts;
use outreach_common::file_config::DispatcherConfig;
use outreach_common::{Contact, OutreachError, Result};
use tracing::{info, warn};
use whatsapp_client::{ChatId, MediaAttachment};

/// Everything a sending run needs, loaded once the session is ready.
#[derive(Debug, Clone)]
pub struct SendInputs {
    pub contacts: Vec<Contact>,
    pub template: String,
    pub media: Option<MediaAttachment>,
}

impl SendInputs {
    pub fn load(config: &DispatcherConfig) -> Result<Self> {
        let contacts = load_contacts(&config.contacts_file)?;
        let template = load_template(&config.template_file)?;
        let media = load_media(&config.media_file);
        Ok(Self {
            contacts,
            template,
            media,
        })
    }
}

/// Read the message template. Surrounding whitespace is dropped; an empty
/// template is treated like a missing one.
pub fn load_template(path: &Path) -> Result<String> {
    const GUIDANCE: &str = "create it with the message text; {business_name}, {business_address}, \
{business_category} and {business_rating} are filled in per contact";

    if !path.exists() {
        return Err(OutreachError::missing_input(path, GUIDANCE));
    }
    let raw = std::fs::read_to_string(path).map_err(|e| OutreachError::io(path, e))?;
    let template = raw.trim();
    if template.is_empty() {
        return Err(OutreachError::missing_input(
            path,
            format!("template is empty; {GUIDANCE}"),
        ));
    }
    Ok(template.to_string())
}

/// Optional image sent with every message. Absent or unreadable means text only.
fn load_media(path: &Path) -> Option<MediaAttachment> {
    if !path.exists() {
        info!(path = %path.display(), "No media file, sending text only");
        return None;
    }
    match MediaAttachment::from_path(path) {
        Ok(media) => {
            info!(path = %path.display(), mimetype = %media.mimetype, "Attaching media to every message");
            Some(media)
        }
        Err(e) => {
            warn!(error = %e, "Could not read media file, sending text only");
            None
        }
    }
}

/// Chat address for a stored phone. Non-digits are stripped and the country
/// code prefixed when missing; a full chat id is used as-is.
pub fn chat_id_for(phone: &str, country_code: &str) -> ChatId {
    if phone.ends_with(ChatId::USER_SUFFIX) {
        return ChatId::new(phone);
    }
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with(country_code) {
        ChatId::new(&digits)
    } else {
        ChatId::new(&format!("{country_code}{digits}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_ids_get_country_code_once() {
        assert_eq!(chat_id_for("9812222222", "977").as_str(), "9779812222222@c.us");
        assert_eq!(chat_id_for("+977981111111", "977").as_str(), "977981111111@c.us");
        assert_eq!(chat_id_for("981-222 2222", "977").as_str(), "9779812222222@c.us");
        assert_eq!(
            chat_id_for("9779812222222@c.us", "977").as_str(),
            "9779812222222@c.us"
        );
    }

    #[test]
    fn template_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.txt");
        std::fs::write(&path, "\n  Hello {business_name}  \n\n").unwrap();

        assert_eq!(load_template(&path).unwrap(), "Hello {business_name}");
    }

    #[test]
    fn missing_or_blank_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.txt");

        let err = load_template(&path).unwrap_err();
        assert!(matches!(err, OutreachError::MissingInputFile { .. }));

        std::fs::write(&path, "  \n").unwrap();
        let err = load_template(&path).unwrap_err();
        assert!(matches!(err, OutreachError::MissingInputFile { .. }));
    }

    #[test]
    fn media_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = dir.path().join("phone_numbers.txt");
        let template = dir.path().join("message.txt");
        std::fs::write(&contacts, "9812222222,Cafe B,Tokha,Cafe,4.5,No website\n").unwrap();
        std::fs::write(&template, "Hi {business_name}").unwrap();

        let config = DispatcherConfig {
            contacts_file: contacts,
            template_file: template,
            media_file: dir.path().join("advertisement.png"),
            ..DispatcherConfig::default()
        };
        let inputs = SendInputs::load(&config).unwrap();
        assert_eq!(inputs.contacts.len(), 1);
        assert!(inputs.media.is_none());

        std::fs::write(&config.media_file, b"png").unwrap();
        let inputs = SendInputs::load(&config).unwrap();
        assert_eq!(inputs.media.unwrap().filename, "advertisement.png");
    }
}

//! MIME message construction.

use crate::error::{ReportError, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{Address, Message};
use std::path::Path;

/// A file read into memory once and attached to every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl AttachmentFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read(path).map_err(|e| {
            ReportError::mail(format!("Failed to read attachment {}: {e}", path.display()))
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        Ok(Self { filename, content })
    }
}

/// Parts of one outgoing message, shared by every recipient.
#[derive(Debug, Clone, Copy)]
pub struct MessageParts<'a> {
    pub subject: &'a str,
    pub body: &'a str,
    pub attachment: Option<&'a AttachmentFile>,
    pub html: Option<&'a str>,
}

/// Builds a `multipart/mixed` message: plain text if `body` is non-empty,
/// then the attachment, then the HTML part.
pub fn build_message(from: &Mailbox, to: &Address, parts: MessageParts<'_>) -> Result<Message> {
    let builder = Message::builder()
        .from(from.clone())
        .to(Mailbox::new(None, to.clone()))
        .subject(parts.subject);

    let mut singleparts = Vec::new();
    if !parts.body.is_empty() {
        singleparts.push(SinglePart::plain(parts.body.to_string()));
    }
    if let Some(file) = parts.attachment {
        let content_type = ContentType::parse("application/octet-stream")
            .map_err(|e| ReportError::mail(format!("Invalid content type: {e}")))?;
        singleparts.push(Attachment::new(file.filename.clone()).body(file.content.clone(), content_type));
    }
    if let Some(html) = parts.html {
        singleparts.push(SinglePart::html(html.to_string()));
    }

    let mut singleparts = singleparts.into_iter();
    let message = match singleparts.next() {
        None => builder.body(String::new()),
        Some(first) => {
            let multipart = singleparts.fold(MultiPart::mixed().singlepart(first), |multipart, part| {
                multipart.singlepart(part)
            });
            builder.multipart(multipart)
        }
    };

    message.map_err(|e| ReportError::mail(format!("Failed to build message: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Mailbox {
        Mailbox::new(None, "reports@example.com".parse().unwrap())
    }

    fn recipient() -> Address {
        "boss@example.com".parse().unwrap()
    }

    fn render(message: &Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn test_all_parts() {
        let file = AttachmentFile {
            filename: "report.csv".to_string(),
            content: b",id\n0,1\n".to_vec(),
        };
        let message = build_message(
            &sender(),
            &recipient(),
            MessageParts {
                subject: "Daily report",
                body: "See attached",
                attachment: Some(&file),
                html: Some("<h1>Report</h1>"),
            },
        )
        .unwrap();

        let raw = render(&message);
        assert!(raw.contains("Subject: Daily report"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("Content-Type: application/octet-stream"));
        assert!(raw.contains("filename=\"report.csv\""));

        let plain = raw.find("text/plain").unwrap();
        let attachment = raw.find("application/octet-stream").unwrap();
        let html = raw.find("text/html").unwrap();
        assert!(plain < attachment && attachment < html);

        assert_eq!(message.envelope().to(), &[recipient()]);
    }

    #[test]
    fn test_empty_body_omits_plain_part() {
        let message = build_message(
            &sender(),
            &recipient(),
            MessageParts {
                subject: "s",
                body: "",
                attachment: None,
                html: Some("<p>hi</p>"),
            },
        )
        .unwrap();

        let raw = render(&message);
        assert!(!raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_no_parts_still_builds() {
        let message = build_message(
            &sender(),
            &recipient(),
            MessageParts {
                subject: "empty",
                body: "",
                attachment: None,
                html: None,
            },
        )
        .unwrap();
        assert!(render(&message).contains("Subject: empty"));
    }

    #[test]
    fn test_attachment_uses_file_name_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_file.xlsx");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = AttachmentFile::load(&path).unwrap();
        assert_eq!(file.filename, "test_file.xlsx");
        assert_eq!(file.content, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_attachment_is_mail_error() {
        let err = AttachmentFile::load(Path::new("/nonexistent/report.xlsx")).unwrap_err();
        assert!(matches!(err, ReportError::Mail(_)));
    }
}

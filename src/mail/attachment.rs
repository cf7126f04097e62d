use base64::{engine::general_purpose::STANDARD, Engine};
use mime::Mime;
use serde::{ser::SerializeStruct, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Attachment,
    Inline,
}

/// A file joined to a mail.
///
/// The content is opaque to the pipeline: it is never inspected nor re-encoded, only
/// base64-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content_type: Mime,
    content: Vec<u8>,
    content_disposition: Disposition,
    content_id: Option<String>,
}

impl Attachment {
    /// Creates an attachment, defaulting to `application/octet-stream`
    pub fn new<F: Into<String>, C: Into<Vec<u8>>>(filename: F, content: C) -> Self {
        Self {
            filename: filename.into(),
            content_type: mime::APPLICATION_OCTET_STREAM,
            content: content.into(),
            content_disposition: Disposition::Attachment,
            content_id: None,
        }
    }

    /// Creates an attachment to be displayed inside the html body, referenced by `content_id`
    pub fn new_inline<F: Into<String>, C: Into<Vec<u8>>>(
        filename: F,
        content: C,
        content_id: String,
    ) -> Self {
        Self {
            content_disposition: Disposition::Inline,
            content_id: Some(content_id),
            ..Self::new(filename, content)
        }
    }

    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    pub fn is_inline(&self) -> bool {
        self.content_disposition == Disposition::Inline
    }
}

impl Serialize for Attachment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Attachment", 5)?;
        state.serialize_field("filename", &self.filename)?;
        state.serialize_field("mimeType", self.content_type.as_ref())?;
        state.serialize_field("contents", &STANDARD.encode(&self.content))?;
        state.serialize_field("contentId", &self.content_id)?;
        state.serialize_field("inline", &self.is_inline())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn inline_attachment() {
        let attachment = Attachment::new_inline("logo.png", vec![1, 2, 3], "logo".to_owned())
            .content_type(mime::IMAGE_PNG);

        assert!(attachment.is_inline());
        assert_eq!(attachment.content_id(), Some("logo"));
        assert_eq!(attachment.mime_type(), &mime::IMAGE_PNG);
    }

    #[test]
    fn serialized_content_is_base64() {
        let attachment = Attachment::new("hello.txt", "Hello".as_bytes())
            .content_type(mime::TEXT_PLAIN);

        assert_eq!(
            serde_json::to_string(&attachment).unwrap(),
            r#"{"filename":"hello.txt","mimeType":"text/plain","contents":"SGVsbG8=","contentId":null,"inline":false}"#
        );
    }
}

use serde::Serialize;

use super::catalog::VolumeDisplay;

/// A composed book recommendation email. Delivery happens outside the
/// core: the user addresses and sends it from their own mail app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub subject: String,
    pub body: String,
}

impl Recommendation {
    /// Compose from a placeholder-defaulted display view, so a volume with
    /// missing fields still yields a complete email.
    pub fn for_volume(display: &VolumeDisplay) -> Self {
        let subject = format!("Check out this book: {}", display.title);
        let body = format!(
            "<h2>{}</h2>\n<p><strong>Author:</strong> {}</p>\n<p><strong>Description:</strong> {}</p>",
            display.title, display.authors, display.description
        );
        Self { subject, body }
    }

    /// `mailto:` URL with an empty recipient; the user fills one in.
    pub fn mailto_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("subject", &self.subject)
            .append_pair("body", &self.body)
            .finish();
        format!("mailto:?{query}")
    }
}

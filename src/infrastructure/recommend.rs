use crate::domain::recommend::Recommendation;

/// Hand a composed recommendation to the platform's default mail app via
/// a `mailto:` URL. Best-effort: the user addresses and sends the email
/// themselves, and there is nothing to observe about the outcome.
pub fn open_in_mail_app(recommendation: &Recommendation) -> std::io::Result<()> {
    open::that(recommendation.mailto_url())
}

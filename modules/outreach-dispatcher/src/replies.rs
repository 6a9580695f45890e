use outreach_common::file_config::RepliesConfig;

/// Keyword auto-replies. The whole trimmed body must equal a trigger.
#[derive(Debug, Clone)]
pub struct CannedReplies {
    rules: Vec<(String, String)>,
}

impl CannedReplies {
    pub fn new(config: &RepliesConfig) -> Self {
        Self {
            rules: vec![
                (config.interest_trigger.clone(), config.interest_reply.clone()),
                (config.website_trigger.clone(), config.website_reply.clone()),
            ],
        }
    }

    pub fn reply_for(&self, body: &str) -> Option<&str> {
        let body = body.trim();
        self.rules
            .iter()
            .find(|(trigger, _)| trigger == body)
            .map(|(_, reply)| reply.as_str())
    }
}

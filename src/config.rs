use serde::Deserialize;

/// Default pitch prepended to every outreach prompt.
pub const DEFAULT_COMPANY_PITCH: &str = "SkillUp MENA is the pioneer of e-learning services, with our vast curated e-learning library of over 85000 courses, all offered by the world's leading training providers. Our aim is to simplify the corporate training process by offering a unique engaging learning experience, whilst maintaining our partners' business needs.";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub apollo_api_key: String,
    pub apollo_base_url: String,
    /// Page size requested from the people search (single page only).
    pub apollo_page_size: u32,
    /// Webhook Apollo posts revealed phone numbers to. `None` reveals emails only.
    pub apollo_reveal_webhook_url: Option<String>,
    pub hubspot_token: String,
    pub hubspot_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub company_pitch: String,
    /// When set, every outreach mail goes here instead of the lead's mailbox.
    pub outreach_redirect_to: Option<String>,
    /// Label kept on leads without a resolvable company. `None` drops them.
    pub company_placeholder: Option<String>,
    /// Populate `CanonicalLead::phone` instead of leaving it to the phone bag.
    pub include_phone_on_lead: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            apollo_api_key: required_var("APOLLO_API_KEY")?,
            apollo_base_url: base_url_var("APOLLO_BASE_URL", "https://api.apollo.io/api/v1")?,
            apollo_page_size: std::env::var("APOLLO_PAGE_SIZE")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("APOLLO_PAGE_SIZE must be a positive number"))
                .and_then(|size: u32| {
                    if size == 0 {
                        anyhow::bail!("APOLLO_PAGE_SIZE must be greater than zero");
                    }
                    Ok(size)
                })?,
            apollo_reveal_webhook_url: optional_var("APOLLO_REVEAL_WEBHOOK_URL")
                .map(|raw| {
                    url::Url::parse(&raw)
                        .map(|_| raw)
                        .map_err(|e| anyhow::anyhow!("APOLLO_REVEAL_WEBHOOK_URL is not a valid URL: {}", e))
                })
                .transpose()?,
            hubspot_token: required_var("HUBSPOT_PRIVATE_TOKEN")?,
            hubspot_base_url: base_url_var("HUBSPOT_BASE_URL", "https://api.hubapi.com")?,
            openai_api_key: required_var("OPENAI_API_KEY")?,
            openai_base_url: base_url_var("OPENAI_BASE_URL", "https://api.openai.com/v1")?,
            openai_model: optional_var("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            smtp_host: required_var("SMTP_HOST")?,
            smtp_port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SMTP_PORT must be a valid number between 1-65535"))?,
            smtp_user: required_var("SMTP_USER")?,
            smtp_password: required_var("SMTP_PASSWORD")?,
            company_pitch: optional_var("OUTREACH_COMPANY_PITCH")
                .unwrap_or_else(|| DEFAULT_COMPANY_PITCH.to_string()),
            outreach_redirect_to: optional_var("OUTREACH_REDIRECT_TO"),
            company_placeholder: optional_var("LEAD_COMPANY_PLACEHOLDER"),
            include_phone_on_lead: std::env::var("LEAD_INCLUDE_PHONE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Apollo Base URL: {}", config.apollo_base_url);
        match config.apollo_reveal_webhook_url {
            Some(ref hook) => tracing::debug!("Apollo phone reveals delivered to {}", hook),
            None => tracing::info!("Apollo reveal limited to emails (no APOLLO_REVEAL_WEBHOOK_URL)"),
        }
        tracing::debug!("HubSpot Base URL: {}", config.hubspot_base_url);
        tracing::debug!(
            "OpenAI Base URL: {} (model {})",
            config.openai_base_url,
            config.openai_model
        );
        tracing::debug!("SMTP relay: {}:{}", config.smtp_host, config.smtp_port);
        if let Some(ref redirect) = config.outreach_redirect_to {
            tracing::warn!("Outreach mail redirected to {}", redirect);
        }
        match config.company_placeholder {
            Some(ref label) => tracing::info!("Leads without company kept as '{}'", label),
            None => tracing::info!("Leads without company are dropped"),
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))
        .and_then(|value| {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            Ok(value)
        })
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn base_url_var(name: &str, default: &str) -> anyhow::Result<String> {
    let raw = optional_var(name).unwrap_or_else(|| default.to_string());
    let parsed = url::Url::parse(&raw)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
impl Config {
    /// Fully populated config with every base URL pointing at `base_url`.
    pub(crate) fn for_tests(base_url: &str) -> Self {
        Self {
            port: 8080,
            apollo_api_key: "test_apollo_key".to_string(),
            apollo_base_url: base_url.to_string(),
            apollo_page_size: 25,
            apollo_reveal_webhook_url: None,
            hubspot_token: "test_hubspot_token".to_string(),
            hubspot_base_url: base_url.to_string(),
            openai_api_key: "test_openai_key".to_string(),
            openai_base_url: base_url.to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_user: "outreach@example.com".to_string(),
            smtp_password: "test_pass".to_string(),
            company_pitch: DEFAULT_COMPANY_PITCH.to_string(),
            outreach_redirect_to: None,
            company_placeholder: None,
            include_phone_on_lead: false,
        }
    }
}

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use platform_api::ClientSettings;
use products_hr::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const DEFAULT_ENDPOINT: &str =
    "https://api.test.ulaznice.hr/paganini/api/job-interview/employees";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub endpoint: String,
    pub request_timeout: Option<Duration>,
    pub page_size: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let endpoint = non_empty(lookup("HR_EMPLOYEES_ENDPOINT"))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(anyhow!(
                "HR_EMPLOYEES_ENDPOINT must be an http(s) URL, got {endpoint}"
            ));
        }

        let request_timeout = non_empty(lookup("HR_HTTP_TIMEOUT_SECS"))
            .map(|raw| -> Result<Duration> {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("invalid HR_HTTP_TIMEOUT_SECS `{raw}`"))?;
                if secs == 0 {
                    return Err(anyhow!("HR_HTTP_TIMEOUT_SECS must be positive"));
                }
                Ok(Duration::from_secs(secs))
            })
            .transpose()?;

        let page_size = match non_empty(lookup("HR_PAGE_SIZE")) {
            Some(raw) => {
                let size: usize = raw
                    .parse()
                    .with_context(|| format!("invalid HR_PAGE_SIZE `{raw}`"))?;
                if !(1..=MAX_PAGE_SIZE).contains(&size) {
                    return Err(anyhow!("HR_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}"));
                }
                size
            }
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            endpoint,
            request_timeout,
            page_size,
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            timeout: self.request_timeout,
            ..ClientSettings::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};

use super::environment::ShopEnvironment;
use super::model::{Form, ShopError, ValidateShopNameResponse};

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub name_check_delay: Duration,
    pub domain_check_delay: Duration,
    pub submit_delay: Duration,
    pub taken_names: Vec<String>,
    pub taken_domains: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name_check_delay: Duration::from_secs(2),
            domain_check_delay: Duration::from_secs(1),
            submit_delay: Duration::from_secs(1),
            taken_names: Vec::new(),
            taken_domains: Vec::new(),
        }
    }
}

impl BackendConfig {
    /// Same latency for every operation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.name_check_delay = delay;
        self.domain_check_delay = delay;
        self.submit_delay = delay;
        self
    }

    pub fn with_taken_name(mut self, name: impl Into<String>) -> Self {
        self.taken_names.push(name.into());
        self
    }

    pub fn with_taken_domain(mut self, domain: impl Into<String>) -> Self {
        self.taken_domains.push(domain.into());
        self
    }
}

/// In-process stand-in for the shop service: answers after the configured
/// latency and rejects anything on the taken lists.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    config: Arc<BackendConfig>,
}

impl SimulatedBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn is_taken_name(&self, name: &str) -> bool {
        self.config
            .taken_names
            .iter()
            .any(|taken| taken.eq_ignore_ascii_case(name))
    }

    fn is_taken_domain(&self, domain: &str) -> bool {
        self.config
            .taken_domains
            .iter()
            .any(|taken| taken.eq_ignore_ascii_case(domain))
    }
}

/// "Nook Inc." -> "nook-inc.com"
pub fn suggest_domain(shop_name: &str) -> String {
    let slug = shop_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "shop.com".to_owned()
    } else {
        format!("{slug}.com")
    }
}

fn delayed<T: Send + 'static>(delay: Duration, value: T) -> BoxStream<'static, T> {
    stream::once(async move {
        tokio::time::sleep(delay).await;
        value
    })
    .boxed()
}

impl ShopEnvironment for SimulatedBackend {
    fn check_shop_name(&self, name: &str) -> BoxStream<'static, ValidateShopNameResponse> {
        log::info!("checking shop name {:?}", name);
        let suggested = suggest_domain(name);
        let response = if self.is_taken_name(name) {
            ValidateShopNameResponse::rejected(suggested, format!("{name} is already taken"))
        } else {
            ValidateShopNameResponse::valid(suggested)
        };
        delayed(self.config.name_check_delay, response)
    }

    fn check_domain_name(&self, domain: &str) -> BoxStream<'static, Result<(), ShopError>> {
        log::info!("checking domain {:?}", domain);
        let result = if self.is_taken_domain(domain) {
            Err(ShopError::new(format!("{domain} already taken")))
        } else {
            Ok(())
        };
        delayed(self.config.domain_check_delay, result)
    }

    fn submit(&self, form: Form) -> BoxStream<'static, Result<(), ShopError>> {
        log::info!("submitting {:?}", form);
        let result = if self.is_taken_name(&form.shop_name) || self.is_taken_domain(&form.domain_name)
        {
            Err(ShopError::new(format!(
                "{} could not be registered",
                form.shop_name
            )))
        } else {
            Ok(())
        };
        delayed(self.config.submit_delay, result)
    }
}

use crate::config::template::{
    fill_detail_template, fill_listing_template, BRAND_PLACEHOLDER, CATEGORY_PLACEHOLDER,
    PAGE_PLACEHOLDER, PRODUCT_ID_PLACEHOLDER,
};
use crate::config::types::{Config, CrawlerConfig, LoggingConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_template(
        "url_get_products",
        &config.url_get_products,
        &[CATEGORY_PLACEHOLDER, BRAND_PLACEHOLDER, PAGE_PLACEHOLDER],
    )?;
    validate_template(
        "url_get_product_detail",
        &config.url_get_product_detail,
        &[PRODUCT_ID_PLACEHOLDER],
    )?;

    validate_endpoint_url(
        "url_get_products",
        &fill_listing_template(&config.url_get_products, "category", "brand", 1),
    )?;
    validate_endpoint_url(
        "url_get_product_detail",
        &fill_detail_template(&config.url_get_product_detail, "1"),
    )?;

    if config.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    if config.brand.trim().is_empty() {
        return Err(ConfigError::Validation("brand cannot be empty".to_string()));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Checks that a template is non-empty and carries every required placeholder
fn validate_template(name: &str, template: &str, placeholders: &[&str]) -> Result<(), ConfigError> {
    if template.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    for placeholder in placeholders {
        if !template.contains(placeholder) {
            return Err(ConfigError::Validation(format!(
                "{} must contain the {} placeholder",
                name, placeholder
            )));
        }
    }

    Ok(())
}

/// Checks that a filled template is an absolute HTTP(S) URL
fn validate_endpoint_url(name: &str, filled: &str) -> Result<(), ConfigError> {
    let url = Url::parse(filled)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name,
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates logging configuration
fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if matches!(config.directory.as_deref(), Some(dir) if dir.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "logging directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

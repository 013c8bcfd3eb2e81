//! Config loading and validation.

use super::error::{ConfigError, ValidationIssue};
use super::types::{Configuration, Method};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ordered fallback search list used when no explicit path is given.
fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut candidates = Vec::new();
    if let Ok(env_path) = std::env::var("CONFIG_FILE") {
        candidates.push(PathBuf::from(env_path));
    }
    candidates.push(PathBuf::from("./config.yaml"));
    candidates.push(PathBuf::from("./config.yml"));
    candidates.push(PathBuf::from("/etc/pingwatch/config.yaml"));
    candidates
}

/// Load and validate a [`Configuration`] document.
///
/// `explicit_path` overrides the fallback search order entirely (e.g. from
/// `--config`). Returns the accumulated list of every validation violation
/// found, not just the first.
pub fn load(explicit_path: Option<&Path>) -> Result<Configuration, ConfigError> {
    let candidates = candidate_paths(explicit_path);

    let mut tried = Vec::with_capacity(candidates.len());
    let mut found: Option<(PathBuf, String)> = None;

    for candidate in &candidates {
        tried.push(candidate.display().to_string());

        if candidate.as_os_str().as_encoded_bytes().contains(&0) {
            continue;
        }

        match std::fs::read_to_string(candidate) {
            Ok(contents) => {
                found = Some((candidate.clone(), contents));
                break;
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(ConfigError::Io {
                    path: candidate.display().to_string(),
                    source: err,
                })
            }
        }
    }

    let (path, contents) = found.ok_or(ConfigError::NotFound { tried })?;

    parse_and_validate(&path, &contents)
}

fn parse_and_validate(path: &Path, contents: &str) -> Result<Configuration, ConfigError> {
    let trimmed = contents.trim();
    if trimmed.is_empty() || is_comment_only(trimmed) {
        return Err(ConfigError::Invalid {
            issues: vec![ValidationIssue::new(
                "configuration document is empty or contains only comments",
            )],
        });
    }

    let config: Configuration =
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    let issues = validate(&config);
    if !issues.is_empty() {
        return Err(ConfigError::Invalid { issues });
    }

    Ok(config)
}

fn is_comment_only(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

/// Cross-field validation rules. Each rule contributes at most one issue
/// per scope; every applicable rule is checked regardless of earlier
/// failures — the caller sees every violation at once.
fn validate(config: &Configuration) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if config.pings.is_empty() {
        issues.push(ValidationIssue::at("pings", "must contain at least one service"));
    }

    if config.settings.warning_threshold >= config.settings.timeout {
        issues.push(ValidationIssue::at(
            "settings",
            format!(
                "warning_threshold ({}) must be less than timeout ({})",
                config.settings.warning_threshold, config.settings.timeout
            ),
        ));
    }

    if !(10..=u64::MAX).contains(&config.settings.check_interval) {
        issues.push(ValidationIssue::at(
            "settings.check_interval",
            "must be >= 10 seconds",
        ));
    }

    if config.settings.max_retries > 10 {
        issues.push(ValidationIssue::at(
            "settings.max_retries",
            "must be between 0 and 10",
        ));
    }

    if config.settings.worker_pool_size > 100 {
        issues.push(ValidationIssue::at(
            "settings.worker_pool_size",
            "must be between 0 and 100",
        ));
    }

    let mut seen_names = HashSet::new();
    for (index, service) in config.pings.iter().enumerate() {
        let field = format!("pings[{index}]");

        if service.name.is_empty() || service.name.len() > 100 || !service.name.is_ascii() {
            issues.push(ValidationIssue::at(
                format!("{field}.name"),
                "must be 1-100 ASCII characters",
            ));
        }

        if !seen_names.insert(service.name.clone()) {
            issues.push(ValidationIssue::new(format!(
                "Duplicate service name: \"{}\"",
                service.name
            )));
        }

        if !service.resource.starts_with("http://") && !service.resource.starts_with("https://") {
            issues.push(ValidationIssue::at(
                format!("{field}.resource"),
                "must be an absolute http:// or https:// URL",
            ));
        }

        if !(100..=599).contains(&service.expected.status) {
            issues.push(ValidationIssue::at(
                format!("{field}.expected.status"),
                "must be between 100 and 599",
            ));
        }

        if let Some(headers) = &service.headers {
            for header in headers {
                if header.name.is_empty() {
                    issues.push(ValidationIssue::at(
                        format!("{field}.headers"),
                        "header name must not be empty",
                    ));
                }
            }
        }

        if service.payload.is_some() && service.method != Method::Post {
            issues.push(ValidationIssue::at(
                format!("{field}.payload"),
                "payload is only valid for POST",
            ));
        }

        let timeout = service.timeout.unwrap_or(config.settings.timeout);
        let warning = service
            .warning_threshold
            .unwrap_or(config.settings.warning_threshold);
        if warning >= timeout {
            issues.push(ValidationIssue::at(
                format!("{field}"),
                format!(
                    "warning_threshold ({warning}) must be less than timeout ({timeout})"
                ),
            ));
        }

        if let Some(interval) = service.interval {
            if interval < 10 {
                issues.push(ValidationIssue::at(
                    format!("{field}.interval"),
                    "must be >= 10 seconds",
                ));
            }
        }
    }

    issues
}

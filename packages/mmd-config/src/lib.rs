mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Repository, Solr, XsltProcessor};

use std::{
	env, fs,
	path::{Path, PathBuf},
};

/// Names the config file when no explicit path is given.
pub const CONFIG_ENV: &str = "MMD_CSW_CONFIG";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn load_from_env() -> Result<Config> {
	load(&config_path_from_env()?)
}

pub fn config_path_from_env() -> Result<PathBuf> {
	env::var_os(CONFIG_ENV)
		.filter(|value| !value.is_empty())
		.map(PathBuf::from)
		.ok_or(Error::MissingConfigPath { var: CONFIG_ENV })
}

/// Parses, normalizes, and validates config text that did not come from a file.
pub fn parse(raw: &str) -> Result<Config> {
	let table: toml::Table = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: PathBuf::new(), source: err })?;
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: PathBuf::new(), source: err })?;

	cfg.raw = table;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let url = cfg.solr.url.as_str();

	if url.is_empty() {
		return Err(Error::Validation { message: "solr.url must be non-empty.".to_string() });
	}
	if !(url.starts_with("http://") || url.starts_with("https://")) {
		return Err(Error::Validation {
			message: "solr.url must use the http or https scheme.".to_string(),
		});
	}
	if cfg.solr.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "solr.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.solr.spatial_field.is_empty() {
		return Err(Error::Validation {
			message: "solr.spatial_field must be non-empty.".to_string(),
		});
	}
	if cfg.repository.active_status.is_empty() {
		return Err(Error::Validation {
			message: "repository.active_status must be non-empty.".to_string(),
		});
	}
	if cfg.stylesheet(&cfg.repository.record_stylesheet).is_none() {
		return Err(Error::Validation {
			message: format!(
				"repository.record_stylesheet '{}' must name an entry in [xslt].",
				cfg.repository.record_stylesheet
			),
		});
	}

	for (schema, path) in &cfg.xslt {
		if path.as_os_str().is_empty() {
			return Err(Error::Validation {
				message: format!("xslt.{schema} must be a non-empty path."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.solr.url = cfg.solr.url.trim().trim_end_matches('/').to_string();
	cfg.solr.spatial_field = cfg.solr.spatial_field.trim().to_string();
	cfg.repository.collection_filter = cfg.repository.collection_filter.trim().to_string();
	cfg.repository.active_status = cfg.repository.active_status.trim().to_string();
	cfg.repository.record_stylesheet = cfg.repository.record_stylesheet.trim().to_string();
}

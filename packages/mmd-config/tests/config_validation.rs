use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use mmd_config::Error;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let table = root
		.as_table_mut()
		.expect("Template config must be a table.")
		.get_mut(section)
		.and_then(Value::as_table_mut)
		.expect("Template config must include the requested section.");

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("mmd_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn validation_message(payload: &str) -> String {
	let err = mmd_config::parse(payload).expect_err("Expected a validation error.");

	match err {
		Error::Validation { message } => message,
		other => panic!("Unexpected error: {other}"),
	}
}

#[test]
fn loads_template_and_applies_defaults() {
	let path = write_temp_config(SAMPLE_CONFIG_TEMPLATE_TOML);
	let result = mmd_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Template config must load.");

	assert_eq!(cfg.solr.url, "http://localhost:8983/solr/mmd");
	assert_eq!(cfg.solr.select_url(), "http://localhost:8983/solr/mmd/select");
	assert_eq!(cfg.solr.spatial_field, "bbox");
	assert_eq!(cfg.repository.active_status, "Active");
	assert!(cfg.repository.skip_failed_records);
	assert_eq!(cfg.xslt_processor.program, PathBuf::from("xsltproc"));
}

#[test]
fn collection_filter_is_normalized() {
	let cfg = mmd_config::parse(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Template config must parse.");

	assert_eq!(cfg.collection_filter(), vec!["ADC", "NBS", "SIOS"]);
}

#[test]
fn empty_collection_filter_yields_no_collections() {
	let payload = sample_toml_with("repository", "collection_filter", Value::String("  ".into()));
	let cfg = mmd_config::parse(&payload).expect("Config must parse.");

	assert!(cfg.collection_filter().is_empty());
}

#[test]
fn value_reads_raw_sections() {
	let cfg = mmd_config::parse(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Template config must parse.");

	assert_eq!(
		cfg.value("xslt", "wmo").as_deref(),
		Some("/usr/share/mmd/xslt/mmd-to-wmo.xsl")
	);
	assert_eq!(cfg.value("solr", "timeout_ms").as_deref(), Some("10000"));
	assert_eq!(cfg.value("xslt", "missing"), None);
	assert_eq!(cfg.value("missing", "wmo"), None);
}

#[test]
fn stylesheet_lookup_by_schema() {
	let cfg = mmd_config::parse(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Template config must parse.");

	assert_eq!(
		cfg.stylesheet("dif10"),
		Some(PathBuf::from("/usr/share/mmd/xslt/mmd-to-dif10.xsl").as_path())
	);
	assert!(cfg.stylesheet("dif9").is_none());
}

#[test]
fn solr_url_requires_http_scheme() {
	let payload = sample_toml_with("solr", "url", Value::String("ftp://solr".into()));
	let message = validation_message(&payload);

	assert!(message.contains("solr.url"), "Unexpected error message: {message}");
}

#[test]
fn timeout_must_be_positive() {
	let payload = sample_toml_with("solr", "timeout_ms", Value::Integer(0));
	let message = validation_message(&payload);

	assert!(message.contains("solr.timeout_ms"), "Unexpected error message: {message}");
}

#[test]
fn record_stylesheet_must_exist() {
	let payload = sample_toml_with("repository", "record_stylesheet", Value::String("echo".into()));
	let message = validation_message(&payload);

	assert!(message.contains("record_stylesheet 'echo'"), "Unexpected error message: {message}");
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("mmd_config_test_does_not_exist.toml");
	let err = mmd_config::load(&path).expect_err("Expected a read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
	assert!(err.to_string().contains("mmd_config_test_does_not_exist.toml"));
}

#[test]
fn parse_error_reports_path() {
	let path = write_temp_config("[solr\nurl = ");
	let result = mmd_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	match result.expect_err("Expected a parse error.") {
		Error::ParseConfig { path: reported, .. } => assert_eq!(reported, path),
		other => panic!("Unexpected error: {other}"),
	}
}

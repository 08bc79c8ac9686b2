use std::{path::Path, process::Stdio};

use tokio::{io::AsyncWriteExt, process::Command};

use crate::{Error, Result};

const MAX_STDERR_CHARS: usize = 512;

/// Runs `stylesheet` over `source` with the configured XSLT processor and returns the output
/// document. The source is fed on stdin so no temporary files are involved.
pub async fn transform(
	cfg: &mmd_config::XsltProcessor,
	stylesheet: &Path,
	source: &[u8],
) -> Result<Vec<u8>> {
	let mut child = Command::new(&cfg.program)
		.arg(stylesheet)
		.arg("-")
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.kill_on_drop(true)
		.spawn()?;
	let mut stdin = child.stdin.take().ok_or_else(|| Error::Transform {
		message: "XSLT processor stdin is not available.".to_string(),
	})?;
	let write = async move {
		let written = stdin.write_all(source).await;

		drop(stdin);

		written
	};
	let (written, output) = tokio::join!(write, child.wait_with_output());
	let output = output?;

	if !output.status.success() {
		let stderr = String::from_utf8_lossy(&output.stderr);

		return Err(Error::Transform {
			message: format!(
				"XSLT processor exited with {}: {}",
				output.status,
				stderr.trim().chars().take(MAX_STDERR_CHARS).collect::<String>()
			),
		});
	}

	// A processor that exits early may close stdin first; its exit status is what counts.
	if let Err(err) = written {
		tracing::debug!(error = %err, "XSLT processor closed stdin before the source was written.");
	}
	if output.stdout.is_empty() {
		return Err(Error::Transform {
			message: format!("Stylesheet {} produced no output.", stylesheet.display()),
		});
	}

	Ok(output.stdout)
}

use anyhow::Result;

use crate::cli::Output;
use crate::config::PathrunConfig;
use crate::scan::CompiledJob;

pub fn execute(config: &PathrunConfig, output: &Output) -> Result<()> {
    let settings = config.settings()?;

    if settings.jobs.is_empty() {
        output.warning("No jobs configured");
        return Ok(());
    }

    for spec in &settings.jobs {
        output.section_header(&spec.name);
        output.key_value("pattern", &spec.pattern, false);
        output.key_value("command", &spec.command.join(" "), false);

        match CompiledJob::compile(spec) {
            Ok(_) => output.key_value("status", "ok", true),
            Err(err) => output.error(&err.to_string()),
        }
    }

    Ok(())
}

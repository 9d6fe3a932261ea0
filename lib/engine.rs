use anyhow::{Context, Result};

pub trait Engine {
    /// Evaluates one statement, returning the display form of its value.
    fn run(&mut self, input: &str) -> Result<String>;

    /// Runs a script one line at a time. Blank lines and lines starting with `#`
    /// are skipped; the first failing line stops the script.
    fn run_script(&mut self, source: &str) -> Result<Vec<String>> {
        let mut outputs = Vec::new();
        for (number, line) in source.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let output = self
                .run(line)
                .with_context(|| format!("line {}: {}", number + 1, line))?;
            outputs.push(output);
        }
        Ok(outputs)
    }
}

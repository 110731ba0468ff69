use anyhow::Context;
use std::io::Write;

/// Print `question` without a newline and read one trimmed line from stdin.
pub fn ask(question: &str) -> anyhow::Result<String> {
    print!("{question}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read answer from stdin")?;
    Ok(line.trim().to_string())
}

/// Rewrite the current terminal line with a progress status.
pub fn progress(status: &str) {
    print!("\r[Ollama] {status}... ");
    let _ = std::io::stdout().flush();
}

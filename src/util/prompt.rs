use std::io::{self, BufRead, Write};

/// Reads one trimmed line from stdin after printing `label`. EOF surfaces
/// as `UnexpectedEof` so the caller can end the session cleanly.
pub fn prompt_line(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    let bytes = io::stdin().lock().read_line(&mut line)?;
    if bytes == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }

    Ok(line.trim().to_string())
}

pub fn prompt_with_default(label: &str, default: &str) -> io::Result<String> {
    let answer = prompt_line(label)?;
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}

pub fn is_negative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "no" | "n" | "false" | "0"
    )
}

//! Interactive stdin prompts. Questions go to stderr so stdout stays
//! clean for command output.

use std::io::{BufRead, Write};

/// Ask `question` and return the trimmed answer, or `fallback` when the
/// answer is empty.
pub fn prompt(question: &str, fallback: &str) -> String {
    eprint!("{question} ");
    let _ = std::io::stderr().flush();
    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input).unwrap_or_default();
    resolve_answer(&input, fallback)
}

/// Ask for a secret without echoing it.
pub fn prompt_password(question: &str) -> anyhow::Result<String> {
    let password = rpassword::prompt_password_stderr(question)?;
    Ok(password)
}

/// Block until the operator presses RETURN.
pub fn wait_for_enter(message: &str) {
    eprint!("{message}");
    let _ = std::io::stderr().flush();
    let mut sink = String::new();
    let _ = std::io::stdin().lock().read_line(&mut sink);
}

fn resolve_answer(input: &str, fallback: &str) -> String {
    match input.trim() {
        "" => fallback.to_owned(),
        answer => answer.to_owned(),
    }
}

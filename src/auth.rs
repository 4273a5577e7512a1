use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal, Write};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "PWVAULT_PASSWORD";

/// Master password for an existing vault.
///
/// Sources, in order:
///   PWVAULT_PASSWORD="supersecret" pwvault get github
///   echo "supersecret" | pwvault get github
///   interactive prompt on a TTY
pub fn read_master_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = from_env() {
        return Ok(pw);
    }

    let pw = read_secret("Enter master password: ")?;
    if pw.is_empty() {
        bail!("master password cannot be empty");
    }
    Ok(pw)
}

/// Master password for a new vault, confirmed twice unless it comes from the
/// environment.
pub fn read_new_master_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = from_env() {
        return Ok(pw);
    }

    let pw1 = read_secret("New master password: ")?;
    let pw2 = read_secret("Confirm master password: ")?;

    if pw1.is_empty() {
        bail!("master password cannot be empty");
    }

    if pw1 != pw2 {
        bail!("passwords do not match");
    }

    Ok(pw1)
}

/// Password of the entry being saved.
pub fn read_entry_password() -> Result<Zeroizing<String>> {
    let pw = read_secret("Enter password: ")?;
    if pw.is_empty() {
        bail!("password cannot be empty");
    }
    Ok(pw)
}

/// Asks a yes/no question; anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> Result<bool> {
    print!("{question} (y/N): ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn from_env() -> Option<Zeroizing<String>> {
    let pw = Zeroizing::new(std::env::var(PASSWORD_ENV).ok()?);
    (!pw.is_empty()).then_some(pw)
}

/// Hidden prompt on a TTY, otherwise one line from stdin.
fn read_secret(prompt: &str) -> Result<Zeroizing<String>> {
    if io::stdin().is_terminal() {
        return Ok(Zeroizing::new(rpassword::prompt_password(prompt)?));
    }

    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    trim_newline(&mut line);
    Ok(line)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}

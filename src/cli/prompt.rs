//! Interactive prompts for values missing from the command line.

use std::io::{self, BufRead, IsTerminal, Write};

/// Ask for a value on stdin, re-asking while `validate` rejects it.
///
/// An empty answer takes `default`. When stdin is not a terminal the default
/// is returned without asking.
pub fn prompt_value<F, E>(label: &str, default: &str, validate: F) -> io::Result<String>
where
    F: Fn(&str) -> Result<(), E>,
    E: std::fmt::Display,
{
    if !io::stdin().is_terminal() {
        return Ok(default.to_string());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_from(&mut input, &mut output, label, default, validate)
}

/// [`prompt_value`] over explicit streams.
pub fn prompt_from<R, W, F, E>(
    input: &mut R,
    output: &mut W,
    label: &str,
    default: &str,
    validate: F,
) -> io::Result<String>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> Result<(), E>,
    E: std::fmt::Display,
{
    loop {
        write!(output, "{} [{}]: ", label, default)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF
            return Ok(default.to_string());
        }

        let value = match line.trim() {
            "" => default,
            answer => answer,
        };

        match validate(value) {
            Ok(()) => return Ok(value.to_string()),
            Err(e) => writeln!(output, "✗ {}", e)?,
        }
    }
}

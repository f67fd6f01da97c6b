use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, ErrorKind, IsTerminal, Write};

/// Prints `prompt` and reads one line from stdin, without its line ending.
pub fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Reads a password without echoing it when stdin is a terminal.
pub fn read_password(prompt: &str) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return Ok(read_line(prompt)?.unwrap_or_default());
    }

    print!("{}", prompt);
    io::stdout().flush()?;

    enable_raw_mode()?;
    let password = read_hidden();
    let _ = disable_raw_mode();
    println!();
    password
}

fn read_hidden() -> io::Result<String> {
    let mut password = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(ErrorKind::Interrupted, "password entry interrupted"));
            }
            KeyCode::Char(c) => password.push(c),
            KeyCode::Backspace => {
                password.pop();
            }
            _ => {}
        }
    }
}

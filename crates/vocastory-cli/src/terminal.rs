//! Line-oriented terminal front-end for the wizard.

use std::io::{self, BufRead, Write};
use std::path::Path;

use eyre::Result;

use vocastory_cli::error::SessionError;
use vocastory_cli::notice::NoticeLevel;
use vocastory_cli::render;
use vocastory_cli::session::{Confirm, Session, Stage};
use vocastory_core::validation::FieldErrors;

/// Terminator for multi-line fields.
const END_OF_FIELD: &str = ".";

struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        matches!(
            ask(&format!("{prompt} [y/N]"), "").as_deref(),
            Ok("y" | "Y" | "yes")
        )
    }
}

pub async fn run(mut session: Session, html: Option<&Path>) -> Result<()> {
    loop {
        let keep_going = match session.stage() {
            Stage::Gate => gate(&mut session).await?,
            Stage::Composer => composer(&mut session)?,
            Stage::Preview => preview(&mut session, html).await?,
        };
        print_notices(&mut session);
        if !keep_going {
            return Ok(());
        }
    }
}

async fn gate(session: &mut Session) -> Result<bool> {
    println!("\n== Content store ==");
    let creds = session.credentials_mut()?;
    creds.store_id = ask("Project ID", &creds.store_id)?;
    let hint = if creds.token.is_empty() { String::new() } else { creds.token_hint() };
    let token = ask("Token", &hint)?;
    if token != hint {
        creds.token = token;
    }
    creds.dataset = ask("Dataset", &creds.dataset)?;

    if session.can_submit_gate() {
        println!("checking credentials...");
    }
    if let Err(e) = session.submit_gate().await {
        report(&e);
    }
    if session.stage() != Stage::Gate {
        return Ok(true);
    }

    print_notices(session);
    Ok(menu("[r]etry or [q]uit", &["r", "q"])? == "r")
}

fn composer(session: &mut Session) -> Result<bool> {
    println!("\n== Story ==");
    let draft = session.draft_mut()?;
    draft.key_word = ask("Key phrase", &draft.key_word)?;
    draft.title = ask("Title", &draft.title)?;
    draft.content = ask_multiline("Content (must contain the key phrase)", &draft.content)?;
    draft.vocabulary = ask_multiline(
        "Vocabulary, one `english | vietnamese` pair per line",
        &draft.vocabulary,
    )?;

    let Err(e) = session.submit_composer() else {
        return Ok(true);
    };
    report(&e);

    match menu("[e]dit again, back to [g]ate, or [q]uit", &["e", "g", "q"])? {
        "g" => {
            session.reset_to_gate();
            Ok(true)
        }
        "q" => Ok(false),
        _ => Ok(true),
    }
}

async fn preview(session: &mut Session, html: Option<&Path>) -> Result<bool> {
    let Some(preview) = session.preview() else {
        session.reset_to_composer()?;
        return Ok(true);
    };

    println!("\n== Preview ==\n{}", render::render_text(preview)?);
    if let Some(path) = html {
        std::fs::write(path, render::render_html(preview)?)?;
        println!("(HTML preview written to {})", path.display());
    }

    loop {
        match ask("[s]ave, [e]dit, [g]ate, [q]uit", "s")?.as_str() {
            "s" => {
                println!("saving...");
                if let Err(e) = session.commit(&TerminalConfirm).await {
                    report(&e);
                }
                return Ok(true);
            }
            "e" => {
                session.reset_to_composer()?;
                return Ok(true);
            }
            "g" => {
                session.reset_to_gate();
                return Ok(true);
            }
            "q" => return Ok(false),
            _ => continue,
        }
    }
}

/// Ask until the answer is one of `choices`. The first choice is the default.
fn menu<'a>(prompt: &str, choices: &[&'a str]) -> Result<&'a str> {
    loop {
        let answer = ask(prompt, choices[0])?;
        if let Some(choice) = choices.iter().find(|c| **c == answer) {
            return Ok(*choice);
        }
    }
}

fn report(error: &SessionError) {
    match error.field_errors() {
        Some(errors) => print_field_errors(errors),
        None => eprintln!("error: {error}"),
    }
}

fn print_field_errors(errors: &FieldErrors) {
    for (field, messages) in errors.iter() {
        for message in messages {
            eprintln!("  {field}: {message}");
        }
    }
}

fn print_notices(session: &mut Session) {
    for notice in session.drain_notices() {
        match notice.level {
            NoticeLevel::Success => println!("✔ {}", notice.message),
            NoticeLevel::Failure => eprintln!("✘ {}", notice.message),
        }
    }
}

/// Read one line. An empty answer keeps `default`.
fn ask(label: &str, default: &str) -> io::Result<String> {
    if default.is_empty() {
        print!("{label}: ");
    } else {
        print!("{label} [{default}]: ");
    }
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    let line = line.trim_end_matches(['\r', '\n']);
    Ok(if line.is_empty() { default.to_string() } else { line.to_string() })
}

/// Read lines until one holding only [`END_OF_FIELD`]. Ending immediately
/// keeps `current`.
fn ask_multiline(label: &str, current: &str) -> io::Result<String> {
    println!("{label} (end with a line containing only `{END_OF_FIELD}`):");
    if !current.is_empty() {
        println!("--- current ---\n{current}\n---------------");
    }

    let stdin = io::stdin();
    let mut lines = Vec::new();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim_end() == END_OF_FIELD {
            break;
        }
        lines.push(line);
    }

    Ok(if lines.is_empty() { current.to_string() } else { lines.join("\n") })
}

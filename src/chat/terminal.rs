//! Terminal chat: rustyline prompt with colored output

use anyhow::Result;
use crossterm::{execute, style::{Color, Print, ResetColor, SetForegroundColor}};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io;

use super::{handle_query, is_quit_word, Choice, Presenter};
use crate::session::{LearnOutcome, Session};
use crate::types::{to_percent, QaEntry, ScoredCandidate};

/// Print colored output
pub fn print_colored(text: &str, color: Color) {
    let _ = execute!(
        io::stdout(),
        SetForegroundColor(color),
        Print(text),
        ResetColor
    );
}

pub fn print_dim(text: &str) {
    print_colored(text, Color::DarkGrey);
}

pub fn print_success(text: &str) {
    print_colored(text, Color::Green);
}

pub fn print_info(text: &str) {
    print_colored(text, Color::Cyan);
}

pub fn print_error(text: &str) {
    print_colored(text, Color::Red);
}

/// Numbered suggestion list, 1-based
pub fn format_suggestions(suggestions: &[ScoredCandidate]) -> Vec<String> {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, c)| format!("  {}. {} ({}%)", i + 1, c.entry.question(), c.percent()))
        .collect()
}

/// Read the reply to a suggestion prompt
pub fn parse_choice(input: &str, count: usize) -> Option<Choice> {
    let input = input.trim();
    if input.is_empty() {
        return Some(Choice::Skip);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(Choice::Suggestion(n - 1)),
        _ => None,
    }
}

/// Presenter backed by the user's terminal
pub struct TerminalPresenter {
    editor: DefaultEditor,
}

impl TerminalPresenter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }

    /// Read one line; `None` on Ctrl-D
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Presenter for TerminalPresenter {
    fn answered(&mut self, entry: &QaEntry, similarity: f64) {
        println!("{}", entry.answer());
        print_dim(&format!("(similarity {}%)\n", to_percent(similarity)));
    }

    fn unmatched(&mut self, _query: &str, suggestions: &[ScoredCandidate]) {
        print_info("I could not find a close enough answer.\n");
        if !suggestions.is_empty() {
            println!("Did you mean:");
            for line in format_suggestions(suggestions) {
                println!("{}", line);
            }
        }
    }

    fn choose(&mut self, query: &str, suggestions: &[ScoredCandidate]) -> Result<Choice> {
        let hint = if suggestions.is_empty() {
            "[a] add an answer, Enter to skip: ".to_string()
        } else {
            format!("[1-{}] pick, [a] add an answer, Enter to skip: ", suggestions.len())
        };

        loop {
            let Some(input) = self.read_line(&hint)? else {
                return Ok(Choice::Skip);
            };
            if input.trim().eq_ignore_ascii_case("a") {
                let prompt = format!("Answer for '{}': ", query);
                return Ok(match self.read_line(&prompt)? {
                    Some(answer) => Choice::Teach(answer),
                    None => Choice::Skip,
                });
            }
            match parse_choice(&input, suggestions.len()) {
                Some(choice) => return Ok(choice),
                None => print_error("Please pick a listed number, 'a' or Enter.\n"),
            }
        }
    }

    fn learned(&mut self, outcome: &LearnOutcome) {
        match outcome {
            LearnOutcome::Rejected => print_dim("No answer was added.\n"),
            LearnOutcome::Learned { persisted: Ok(()), .. } => {
                print_success("✓ Question and answer added!\n")
            }
            LearnOutcome::Learned { persisted: Err(e), .. } => {
                print_success("✓ Learned for this session.\n");
                print_error(&format!("✗ Could not save it: {}\n", e));
            }
        }
    }
}

fn print_banner(session: &Session) {
    println!();
    println!("  \x1b[1m{} v{}\x1b[0m", crate::NAME, crate::VERSION);
    println!();
    println!("  \x1b[90mentries\x1b[0m    \x1b[36m{}\x1b[0m", session.base().len());
    println!("  \x1b[90mthreshold\x1b[0m  \x1b[36m{}\x1b[0m", session.threshold());
    println!("  \x1b[90mstore\x1b[0m      {}", session.store().path().display());
    println!();
    println!("  \x1b[90mAsk a question · {} to leave\x1b[0m", super::QUIT_WORDS.join(" / "));
    println!();
}

/// Interactive question loop
pub fn run_chat(session: &mut Session) -> Result<()> {
    let mut presenter = TerminalPresenter::new()?;
    print_banner(session);

    loop {
        let Some(line) = presenter.read_line("\x1b[32m❯\x1b[0m ")? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_quit_word(input) {
            break;
        }

        if let Err(e) = handle_query(session, &mut presenter, input) {
            print_error(&format!("✗ {:#}\n", e));
        }
        println!();
    }

    print_success("Goodbye!\n");
    Ok(())
}

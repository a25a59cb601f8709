//! Interactive questions: yes/no confirmation, free text, and menus.
//!
//! Menus go through the [`Selector`] trait. On a terminal they are arrow-key
//! menus drawn with crossterm; when stdin or stdout is redirected they fall
//! back to a numbered list read line by line.

use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, queue};
use rdd_core::error::{RddError, Result};
use std::io::{BufRead, IsTerminal, Write};

/// Picks one entry out of a list of labels.
pub trait Selector {
    /// Index of the chosen item. `input` is the line source shared with the
    /// rest of the prompter; terminal menus read key events instead.
    fn select(&mut self, title: &str, items: &[&str], input: &mut dyn BufRead) -> Result<usize>;
}

// ---------------------------------------------------------------------------
// Numbered list
// ---------------------------------------------------------------------------

/// `1. main / 2. dev / ...` followed by a line of input. Enter picks the first.
#[derive(Debug, Default)]
pub struct NumberedSelector;

impl Selector for NumberedSelector {
    fn select(&mut self, title: &str, items: &[&str], input: &mut dyn BufRead) -> Result<usize> {
        println!("{title}");
        for (i, label) in items.iter().enumerate() {
            println!("  {}. {label}", i + 1);
        }
        loop {
            print!("Choose an option [1..{}] (Enter for 1): ", items.len());
            std::io::stdout().flush()?;
            let Some(raw) = read_line(input)? else {
                println!();
                return Err(RddError::Cancelled);
            };
            match parse_choice(&raw, items.len()) {
                Some(idx) => return Ok(idx),
                None => println!("{}", format!("⚠ Invalid selection: {}", raw.trim()).yellow()),
            }
        }
    }
}

/// Zero-based index for a 1-based answer; empty input means the first item.
pub fn parse_choice(raw: &str, len: usize) -> Option<usize> {
    let raw = raw.trim();
    if raw.is_empty() {
        return (len > 0).then_some(0);
    }
    match raw.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Arrow-key menu
// ---------------------------------------------------------------------------

/// Arrow keys or `j`/`k` to move, Enter or Space to pick, `q`/Esc/Ctrl-C to cancel.
#[derive(Debug, Default)]
pub struct TerminalSelector;

struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Selector for TerminalSelector {
    fn select(&mut self, title: &str, items: &[&str], _input: &mut dyn BufRead) -> Result<usize> {
        if items.is_empty() {
            return Err(RddError::Cancelled);
        }
        println!("{title}");
        println!("{}", "Use ↑/↓ to move, Enter/Space to select, q to cancel.".dimmed());

        let mut out = std::io::stdout();
        let _raw = RawMode::enable()?;
        let mut current = 0usize;
        draw_menu(&mut out, items, current)?;

        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Up | KeyCode::Char('k') => {
                    current = (current + items.len() - 1) % items.len();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    current = (current + 1) % items.len();
                }
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(current),
                KeyCode::Esc | KeyCode::Char('q') => return Err(RddError::Cancelled),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(RddError::Cancelled)
                }
                _ => continue,
            }
            queue!(
                out,
                cursor::MoveUp(items.len() as u16),
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::FromCursorDown)
            )?;
            draw_menu(&mut out, items, current)?;
        }
    }
}

fn draw_menu(out: &mut impl Write, items: &[&str], current: usize) -> Result<()> {
    for (idx, label) in items.iter().enumerate() {
        if idx == current {
            write!(out, "{}\r\n", format!("> {label}").reversed())?;
        } else {
            write!(out, "  {label}\r\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Prompter
// ---------------------------------------------------------------------------

pub struct Prompter {
    assume_yes: bool,
    input: Box<dyn BufRead>,
    selector: Box<dyn Selector>,
}

impl Prompter {
    /// Prompter over the process's stdin, with an arrow-key menu when both
    /// stdin and stdout are terminals.
    pub fn stdio(assume_yes: bool) -> Self {
        let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
        let selector: Box<dyn Selector> = if interactive {
            Box::new(TerminalSelector)
        } else {
            Box::new(NumberedSelector)
        };
        Self::with_io(assume_yes, Box::new(std::io::stdin().lock()), selector)
    }

    pub fn with_io(assume_yes: bool, input: Box<dyn BufRead>, selector: Box<dyn Selector>) -> Self {
        Self {
            assume_yes,
            input,
            selector,
        }
    }

    /// Yes/no question. Only `y`/`yes` count as yes; end of input answers no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{} ", format!("{question} [y/N]:").yellow());
        if self.assume_yes {
            println!("y");
            return Ok(true);
        }
        std::io::stdout().flush()?;
        match read_line(&mut self.input)? {
            Some(answer) => Ok(is_yes(&answer)),
            None => {
                println!();
                Ok(false)
            }
        }
    }

    /// Free-text answer, trimmed. End of input cancels the operation.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        if !question.is_empty() {
            println!("{question}");
        }
        print!("> ");
        std::io::stdout().flush()?;
        match read_line(&mut self.input)? {
            Some(answer) => Ok(answer.trim().to_string()),
            None => {
                println!();
                Err(RddError::Cancelled)
            }
        }
    }

    pub fn select(&mut self, title: &str, items: &[&str]) -> Result<usize> {
        self.selector.select(title, items, &mut self.input)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn read_line(input: &mut dyn BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

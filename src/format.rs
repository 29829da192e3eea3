//! Final formatting pass over generated source.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{GenError, GenResult};

/// Reformats generated source. Fails if the input is not well formed.
pub trait Formatter {
    fn format(&self, source: &str) -> GenResult<String>;
}

/// Built-in formatter.
///
/// Checks that brackets, strings and comments are balanced, strips trailing
/// whitespace, collapses runs of blank lines and ends the file with one newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn format(&self, source: &str) -> GenResult<String> {
        check_balanced(source)?;

        let mut out = String::with_capacity(source.len());
        let mut blank = false;

        for line in source.lines().map(str::trim_end) {
            if line.is_empty() {
                blank = !out.is_empty();
                continue;
            }
            if blank {
                out.push('\n');
                blank = false;
            }
            out.push_str(line);
            out.push('\n');
        }

        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lex {
    Code,
    Str(char),
    LineComment,
    BlockComment,
}

fn check_balanced(source: &str) -> GenResult<()> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut state = Lex::Code;
    let mut line = 1;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        match state {
            Lex::Code => match c {
                '"' | '\'' | '`' => state = Lex::Str(c),
                '/' if chars.peek() == Some(&'/') => state = Lex::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = Lex::BlockComment;
                }
                '(' | '{' | '[' => stack.push((c, line)),
                ')' | '}' | ']' => {
                    let open = match c {
                        ')' => '(',
                        '}' => '{',
                        _ => '[',
                    };
                    match stack.pop() {
                        Some((o, _)) if o == open => {}
                        _ => {
                            return Err(GenError::Format(format!(
                                "unexpected '{}' on line {}",
                                c, line
                            )));
                        }
                    }
                }
                _ => {}
            },
            Lex::Str(quote) => match c {
                '\\' => {
                    if chars.next() == Some('\n') {
                        line += 1;
                    }
                }
                '\n' if quote != '`' => {
                    return Err(GenError::Format(format!(
                        "unterminated string on line {}",
                        line - 1
                    )));
                }
                _ if c == quote => state = Lex::Code,
                _ => {}
            },
            Lex::LineComment => {
                if c == '\n' {
                    state = Lex::Code;
                }
            }
            Lex::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = Lex::Code;
                }
            }
        }
    }

    if let Lex::Str(_) | Lex::BlockComment = state {
        return Err(GenError::Format("unterminated string or comment".to_string()));
    }
    if let Some((c, l)) = stack.pop() {
        return Err(GenError::Format(format!("unclosed '{}' from line {}", c, l)));
    }
    Ok(())
}

/// Pipes source through the `prettier` CLI.
#[derive(Debug, Clone)]
pub struct PrettierFormatter {
    program: String,
}

impl Default for PrettierFormatter {
    fn default() -> Self {
        Self::new("prettier")
    }
}

impl PrettierFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Formatter for PrettierFormatter {
    fn format(&self, source: &str) -> GenResult<String> {
        let mut child = Command::new(&self.program)
            .args(["--parser", "typescript", "--print-width", "120"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GenError::Format(format!("Failed to run {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(GenError::Format(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        String::from_utf8(output.stdout).map_err(|e| GenError::Format(e.to_string()))
    }
}

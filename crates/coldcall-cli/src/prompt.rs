//! Interactive console prompts. Bad answers re-prompt; closed input is fatal.

use coldcall_core::mail::Message;
use coldcall_core::orchestrator::Triage;
use coldcall_core::types::SectionId;
use std::io::{self, BufRead, Write};
use thiserror::Error;

pub const BOTH: &str = "both";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized command '{input}'. Please type {expected}")]
pub struct UnrecognizedCommand {
    input: String,
    expected: String,
}

impl UnrecognizedCommand {
    fn new(input: &str, valid: &[&str]) -> Self {
        Self {
            input: input.to_string(),
            expected: join_or(valid),
        }
    }
}

fn join_or(words: &[&str]) -> String {
    match words {
        [] => String::new(),
        [one] => (*one).to_string(),
        [a, b] => format!("{a} or {b}"),
        [init @ .., last] => format!("{}, or {last}", init.join(", ")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionChoice {
    One(SectionId),
    Both,
}

pub fn parse_section(
    input: &str,
    sections: &[SectionId],
) -> Result<SectionChoice, UnrecognizedCommand> {
    if let Some(s) = sections.iter().find(|s| s.as_str() == input) {
        return Ok(SectionChoice::One(s.clone()));
    }
    if input == BOTH && sections.len() > 1 {
        return Ok(SectionChoice::Both);
    }
    let mut valid: Vec<&str> = sections.iter().map(SectionId::as_str).collect();
    if sections.len() > 1 {
        valid.push(BOTH);
    }
    Err(UnrecognizedCommand::new(input, &valid))
}

pub fn parse_triage(input: &str) -> Result<Triage, UnrecognizedCommand> {
    match input {
        "delete" => Ok(Triage::Delete),
        "skip" => Ok(Triage::Skip),
        "switch" => Ok(Triage::Switch),
        other => Err(UnrecognizedCommand::new(other, &["delete", "skip", "switch"])),
    }
}

/// `true` to process another section, `false` to stop.
pub fn parse_again(input: &str) -> Result<bool, UnrecognizedCommand> {
    match input {
        "again" => Ok(true),
        "exit" => Ok(false),
        other => Err(UnrecognizedCommand::new(other, &["again", "exit"])),
    }
}

pub struct Prompt<R, W> {
    input: R,
    output: W,
    triage_announced: bool,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            triage_announced: false,
        }
    }

    fn answer(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            ));
        }
        Ok(line.trim().to_lowercase())
    }

    fn ask<T>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> Result<T, UnrecognizedCommand>,
    ) -> io::Result<T> {
        loop {
            writeln!(self.output, "{question}")?;
            self.output.flush()?;
            let answer = self.answer()?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    pub fn section(&mut self, sections: &[SectionId]) -> io::Result<SectionChoice> {
        let mut names: Vec<&str> = sections.iter().map(SectionId::as_str).collect();
        if sections.len() > 1 {
            names.push(BOTH);
        }
        let question = format!(
            "Please select one of the following sections by typing its name: {}",
            names.join(" ")
        );
        let choice = self.ask(&question, |a| parse_section(a, sections))?;
        match &choice {
            SectionChoice::One(s) => writeln!(self.output, "Section {s} selected")?,
            SectionChoice::Both => writeln!(self.output, "Both sections selected")?,
        }
        Ok(choice)
    }

    pub fn triage(&mut self, message: &Message) -> io::Result<Triage> {
        if !self.triage_announced {
            writeln!(
                self.output,
                "The following emails could not be classified. \
                 Classify each one by typing delete, skip, or switch."
            )?;
            self.triage_announced = true;
        }
        let question = format!("From: {} with subject: {}", message.from, message.subject);
        self.ask(&question, parse_triage)
    }

    pub fn again(&mut self) -> io::Result<bool> {
        self.ask(
            "Type again to process another section or exit to quit",
            parse_again,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sections() -> Vec<SectionId> {
        vec![SectionId::new("10a"), SectionId::new("2")]
    }

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn parses_sections_and_both() {
        assert_eq!(
            parse_section("10a", &sections()),
            Ok(SectionChoice::One(SectionId::new("10a")))
        );
        assert_eq!(parse_section("both", &sections()), Ok(SectionChoice::Both));
        let err = parse_section("3", &sections()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unrecognized command '3'. Please type 10a, 2, or both"
        );
    }

    #[test]
    fn both_needs_two_sections() {
        let one = vec![SectionId::new("a")];
        assert!(parse_section("both", &one).is_err());
    }

    #[test]
    fn parses_triage_and_again() {
        assert_eq!(parse_triage("skip"), Ok(Triage::Skip));
        assert_eq!(parse_triage("delete"), Ok(Triage::Delete));
        assert!(parse_triage("maybe").is_err());
        assert_eq!(parse_again("again"), Ok(true));
        assert_eq!(parse_again("exit"), Ok(false));
        assert!(parse_again("save").is_err());
    }

    #[test]
    fn reprompts_until_valid() {
        let mut p = prompt("nope\n  SWITCH \n");
        let message = Message {
            id: "1".into(),
            from: "alice@x.edu".into(),
            subject: "econ 26 swap".into(),
        };
        assert_eq!(p.triage(&message).unwrap(), Triage::Switch);
        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("Unrecognized command 'nope'"));
        assert_eq!(shown.matches("with subject: econ 26 swap").count(), 2);
    }

    #[test]
    fn section_prompt_lists_choices() {
        let mut p = prompt("2\n");
        assert_eq!(
            p.section(&sections()).unwrap(),
            SectionChoice::One(SectionId::new("2"))
        );
        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("typing its name: 10a 2 both"));
        assert!(shown.contains("Section 2 selected"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = prompt("bogus\n");
        let err = p.again().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}

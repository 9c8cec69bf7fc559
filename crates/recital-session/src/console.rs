//! Screen rendering for the interactive session.

use std::io::Write;
use std::path::Path;

use recital_core::error::Result;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RECORDED_MARKER: &str = "* ";

/// Writes session screens to a terminal (or any writer in tests).
#[derive(Debug)]
pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn clear(&mut self) -> Result<()> {
        write!(self.out, "{}", CLEAR_SCREEN)?;
        self.out.flush()?;
        Ok(())
    }

    /// Write a line without clearing (startup messages).
    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(())
    }

    /// Clear and show one sentence. `recorded` prefixes it with a marker.
    pub fn show_sentence(&mut self, sentence: &str, recorded: bool, notices: &[String]) -> Result<()> {
        write!(self.out, "{}", CLEAR_SCREEN)?;
        if recorded {
            writeln!(self.out, "{}{}", RECORDED_MARKER, sentence)?;
        } else {
            writeln!(self.out, "{}", sentence)?;
        }
        self.write_notices(notices)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn show_empty(&mut self, source: &Path, notices: &[String]) -> Result<()> {
        write!(self.out, "{}", CLEAR_SCREEN)?;
        writeln!(
            self.out,
            "No sentences found in {}. Please add text and press 'R' to reload.",
            source.display()
        )?;
        self.write_notices(notices)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn show_fault(&mut self, message: &str) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "An unexpected error occurred: {}", message)?;
        writeln!(self.out, "Press 'q' to quit or any other key to continue.")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_notices(&mut self, notices: &[String]) -> Result<()> {
        if notices.is_empty() {
            return Ok(());
        }
        writeln!(self.out)?;
        for notice in notices {
            writeln!(self.out, "{}", notice)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(console: &Console<Vec<u8>>) -> String {
        String::from_utf8(console.get_ref().clone()).unwrap()
    }

    #[test]
    fn test_sentence_screen() {
        let mut console = Console::new(Vec::new());
        console.show_sentence("Hello world.", false, &[]).unwrap();
        assert_eq!(rendered(&console), "\x1b[2J\x1b[HHello world.\n");
    }

    #[test]
    fn test_recorded_sentence_is_marked() {
        let mut console = Console::new(Vec::new());
        console.show_sentence("Hello world.", true, &[]).unwrap();
        assert!(rendered(&console).ends_with("* Hello world.\n"));
    }

    #[test]
    fn test_notices_follow_sentence() {
        let mut console = Console::new(Vec::new());
        let notices = vec!["Sentence 2 / 5".to_string(), "Another".to_string()];
        console.show_sentence("Two.", false, &notices).unwrap();
        assert_eq!(
            rendered(&console),
            "\x1b[2J\x1b[HTwo.\n\nSentence 2 / 5\nAnother\n"
        );
    }

    #[test]
    fn test_empty_screen_names_file() {
        let mut console = Console::new(Vec::new());
        console.show_empty(Path::new("texts/data.txt"), &[]).unwrap();
        assert!(rendered(&console).contains(
            "No sentences found in texts/data.txt. Please add text and press 'R' to reload."
        ));
    }

    #[test]
    fn test_fault_screen_offers_choice() {
        let mut console = Console::new(Vec::new());
        console.show_fault("disk full").unwrap();
        let out = rendered(&console);
        assert!(out.contains("disk full"));
        assert!(out.contains("Press 'q' to quit or any other key to continue."));
        assert!(!out.contains("\x1b[2J"));
    }

    #[test]
    fn test_into_inner_returns_writer() {
        let mut console = Console::new(Vec::new());
        console.line("Starting").unwrap();
        assert_eq!(console.into_inner(), b"Starting\n");
    }
}

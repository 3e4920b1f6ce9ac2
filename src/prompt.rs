use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

/// Source of user decisions for the interactive loop
pub trait Prompt {
    /// Ask for an image path. `None` means the user closed the input.
    fn image_path(&mut self) -> Result<Option<PathBuf>>;

    /// Ask a yes/no question. End of input counts as "no".
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Show a message to the user.
    fn notify(&mut self, message: &str) -> Result<()>;
}

/// Line-based prompt over any reader/writer pair
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn image_path(&mut self) -> Result<Option<PathBuf>> {
        loop {
            match self.ask("Image path: ")? {
                None => return Ok(None),
                Some(answer) if answer.is_empty() => continue,
                Some(answer) => return Ok(Some(PathBuf::from(answer))),
            }
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N] ", question))?;
        Ok(matches!(
            answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y") | Some("yes")
        ))
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}

/// Prompt for unattended runs: never asks, always declines
pub struct Unattended;

impl Prompt for Unattended {
    fn image_path(&mut self) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(false)
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        eprintln!("{}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn image_path_skips_blank_lines() -> Result<()> {
        let mut prompt = LinePrompt::new(Cursor::new("\n  \nImages/a.jpg\n"), Vec::new());
        assert_eq!(prompt.image_path()?, Some(PathBuf::from("Images/a.jpg")));
        Ok(())
    }

    #[test]
    fn image_path_returns_none_at_end_of_input() -> Result<()> {
        let mut prompt = LinePrompt::new(Cursor::new(""), Vec::new());
        assert_eq!(prompt.image_path()?, None);
        Ok(())
    }

    #[test]
    fn confirm_accepts_yes_variants_only() -> Result<()> {
        let mut prompt = LinePrompt::new(Cursor::new("Y\nyes\nn\nmaybe\n"), Vec::new());
        assert!(prompt.confirm("Save?")?);
        assert!(prompt.confirm("Save?")?);
        assert!(!prompt.confirm("Save?")?);
        assert!(!prompt.confirm("Save?")?);
        assert!(!prompt.confirm("Save?")?);

        let output = String::from_utf8(prompt.into_output())?;
        assert!(output.starts_with("Save? [y/N] "));
        Ok(())
    }
}

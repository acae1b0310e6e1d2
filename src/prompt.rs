// Line-oriented console helpers: prompts, menus, masked password entry.

use std::io::{self, BufRead, IsTerminal, Write};

pub struct Console<R: BufRead, W: Write> {
    input: R,
    output: W,
    interactive: bool,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    /// Console on the process's stdin/stdout
    pub fn stdio() -> Self {
        let interactive = io::stdin().is_terminal();
        Console::new(io::stdin().lock(), io::stdout(), interactive)
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, interactive: bool) -> Self {
        Console {
            input,
            output,
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Print `prompt` and read one line without its terminator.
    /// `None` means end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Read an integer, re-prompting until the input parses
    pub fn read_number(&mut self, prompt: &str) -> io::Result<Option<i64>> {
        loop {
            let Some(line) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match line.trim().parse() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => writeln!(self.output, "Invalid input. Please enter a number.")?,
            }
        }
    }

    /// Read a password without echoing it (stars instead) when attached to
    /// a terminal.
    pub fn read_masked(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if !(self.interactive && cfg!(feature = "tui")) {
            return self.read_line(prompt);
        }

        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let secret = read_masked_raw(&mut self.output)?;
        writeln!(self.output)?;
        Ok(secret)
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        if self.interactive {
            clear_terminal(&mut self.output)?;
        }
        Ok(())
    }

    /// Clear the screen and print a boxed title
    pub fn header(&mut self, title: &str) -> io::Result<()> {
        self.clear_screen()?;
        let rule = "=".repeat(50);
        writeln!(self.output, "{}\n\t\t{}\n{}\n", rule, title, rule)
    }

    /// `[ message ]`
    pub fn line(&mut self, content: &str) -> io::Result<()> {
        writeln!(self.output, "[ {} ]", content)
    }

    pub fn menu_option(&mut self, option: usize, description: &str) -> io::Result<()> {
        writeln!(self.output, "  {}. {}", option, description)
    }

    pub fn println(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Wait for Enter (only when a person is watching)
    pub fn pause(&mut self) -> io::Result<()> {
        if self.interactive {
            self.read_line("\nPress Enter to continue...")?;
        }
        Ok(())
    }
}

#[cfg(feature = "tui")]
fn clear_terminal<W: Write>(output: &mut W) -> io::Result<()> {
    use crossterm::cursor::MoveTo;
    use crossterm::execute;
    use crossterm::terminal::{Clear, ClearType};

    execute!(output, Clear(ClearType::All), MoveTo(0, 0))
}

#[cfg(not(feature = "tui"))]
fn clear_terminal<W: Write>(output: &mut W) -> io::Result<()> {
    write!(output, "\x1B[2J\x1B[1;1H")?;
    output.flush()
}

#[cfg(not(feature = "tui"))]
fn read_masked_raw<W: Write>(_output: &mut W) -> io::Result<Option<String>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "masked input requires the tui feature",
    ))
}

#[cfg(feature = "tui")]
fn read_masked_raw<W: Write>(output: &mut W) -> io::Result<Option<String>> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
    use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

    enable_raw_mode()?;

    let result = (|| -> io::Result<Option<String>> {
        let mut secret = String::new();
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Enter => return Ok(Some(secret)),
                    KeyCode::Char('c') | KeyCode::Char('d')
                        if key.modifiers.contains(KeyModifiers::CONTROL) =>
                    {
                        return Ok(None)
                    }
                    KeyCode::Backspace => {
                        if secret.pop().is_some() {
                            write!(output, "\x08 \x08")?;
                        }
                    }
                    KeyCode::Char(c) => {
                        secret.push(c);
                        write!(output, "*")?;
                    }
                    _ => {}
                }
                output.flush()?;
            }
        }
    })();

    disable_raw_mode()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console(input: &str) -> Console<&[u8], Vec<u8>> {
        Console::new(input.as_bytes(), Vec::new(), false)
    }

    #[test]
    fn test_read_line_strips_terminator() {
        let mut c = console("alice\r\nbob\n");

        assert_eq!(c.read_line("> ").unwrap().as_deref(), Some("alice"));
        assert_eq!(c.read_line("> ").unwrap().as_deref(), Some("bob"));
        assert_eq!(c.read_line("> ").unwrap(), None);
    }

    #[test]
    fn test_read_number_reprompts() {
        let mut c = console("abc\n\n 7 \n");

        assert_eq!(c.read_number("Nights: ").unwrap(), Some(7));

        let out = String::from_utf8(c.output).unwrap();
        assert_eq!(out.matches("Invalid input. Please enter a number.").count(), 2);
        assert_eq!(out.matches("Nights: ").count(), 3);
    }

    #[test]
    fn test_masked_falls_back_without_terminal() {
        let mut c = console("hunter2\n");
        assert_eq!(c.read_masked("Password: ").unwrap().as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_menu_formatting() {
        let mut c = console("");
        c.header("Main Menu").unwrap();
        c.menu_option(1, "Login").unwrap();
        c.line("Goodbye").unwrap();

        let out = String::from_utf8(c.output).unwrap();
        assert!(out.contains("\t\tMain Menu\n"));
        assert!(out.contains("  1. Login\n"));
        assert!(out.ends_with("[ Goodbye ]\n"));
    }
}

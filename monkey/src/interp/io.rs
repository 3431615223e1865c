//! Console collaborator used by the I/O builtins

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Line-oriented standard output and standard input
pub trait Console {
    /// Write `line` followed by a line terminator
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Show `prompt` (if any) and read one line without its terminator.
    /// `None` means the input is exhausted or could not be read.
    fn read_line(&mut self, prompt: Option<&str>) -> Option<String>;
}

/// Console bound to the process's stdin and stdout
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        StdConsole
    }
}

impl Console for StdConsole {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()
    }

    fn read_line(&mut self, prompt: Option<&str>) -> Option<String> {
        if let Some(prompt) = prompt {
            let mut out = io::stdout().lock();
            if let Err(e) = write!(out, "{prompt}").and_then(|_| out.flush()) {
                tracing::warn!(error = %e, "failed to write prompt");
            }
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(strip_line_ending(line)),
            Err(e) => {
                tracing::debug!(error = %e, "stdin read failed");
                None
            }
        }
    }
}

/// In-memory console: scripted input, captured output
#[derive(Debug, Default)]
pub struct BufferConsole {
    input: VecDeque<String>,
    output: Vec<String>,
    prompts: Vec<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console whose input yields `lines` in order, then end-of-stream
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BufferConsole {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Lines written so far
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Prompts shown by `read_line`, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Console for BufferConsole {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self, prompt: Option<&str>) -> Option<String> {
        if let Some(prompt) = prompt {
            self.prompts.push(prompt.to_string());
        }
        self.input.pop_front().map(strip_line_ending)
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

//! Interactive answers from a terminal.

use std::io::{BufRead, Write};

use bedlevel::{Parameter, ParameterSource};

/// Asks each parameter on `output` and reads one line of `input` per answer.
pub struct ConsoleSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ParameterSource for ConsoleSource<R, W> {
    fn answer(&mut self, parameter: Parameter) -> bedlevel::Result<Option<String>> {
        write!(self.output, "{}", parameter.prompt())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn notify(&mut self, message: &str) {
        // Notices are also logged; a broken console is not worth aborting for.
        let _ = writeln!(self.output, "{message}\n");
    }
}

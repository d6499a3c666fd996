use std::io::{self, BufRead, Write};
use tracing::{debug, debug_span, trace};
use crate::ast::Program;
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::{ParseError, Parser};

pub const PROMPT: &str = ">> ";

pub const MONKEY_FACE: &str =
r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

const ERROR_HEADER: &str = "Woops! We ran into some monkey business here!\n";
const ERROR_SUB_HEADER: &str = " parser errors:\n";

/// Stack size for a thread running a session. Parsing recurses up to
/// [`crate::parser::MAX_NESTING_DEPTH`] levels and evaluation up to
/// [`crate::evaluator::MAX_CALL_DEPTH`] calls,
/// which a debug build cannot fit in the default 2 MiB of a spawned thread.
pub const STACK_SIZE: usize = 16 * 1024 * 1024;

/// Which pipeline every line of a session goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tokenize,
    Parse,
    Evaluate,
}

/// Runs a session in `mode` until `reader` has no more lines.
pub fn start<R: BufRead, W: Write>(mode: Mode, reader: R, writer: W) -> io::Result<()> {
    match mode {
        Mode::Tokenize => start_tokenize(reader, writer),
        Mode::Parse => start_parse(reader, writer),
        Mode::Evaluate => start_evaluate(reader, writer),
    }
}

/// Prints every token of each line, one per line, leaving out the EOF marker.
pub fn start_tokenize<R: BufRead, W: Write>(reader: R, writer: W) -> io::Result<()> {
    Session::new(Mode::Tokenize, reader, writer).run(|line, out| {
        for tok in Lexer::new(line) {
            trace!(token = %tok, "token");
            writeln!(out, "{}", tok)?;
        }
        Ok(())
    })
}

/// Prints the syntax tree of each line, or its parser errors.
pub fn start_parse<R: BufRead, W: Write>(reader: R, mut writer: W) -> io::Result<()> {
    writer.write_all(MONKEY_FACE.as_bytes())?;
    Session::new(Mode::Parse, reader, writer).run(|line, out| {
        if let Some(program) = parse_line(line, out)? {
            writeln!(out, "{}", program)?;
        }
        Ok(())
    })
}

/// Prints the value of each line, or its parser errors. Lines without a
/// value, such as `let` statements, print nothing.
pub fn start_evaluate<R: BufRead, W: Write>(reader: R, mut writer: W) -> io::Result<()> {
    writer.write_all(MONKEY_FACE.as_bytes())?;
    let mut evaluator = Evaluator::new();
    Session::new(Mode::Evaluate, reader, writer).run(|line, out| {
        let program = match parse_line(line, out)? {
            Some(program) => program,
            None => return Ok(()),
        };

        match evaluator.eval(&program) {
            Some(evaluated) => writeln!(out, "{}", evaluated),
            None => {
                debug!("no value to print");
                Ok(())
            }
        }
    })
}

/// Parses `line` with a fresh parser. On failure the diagnostics are written
/// to `out` and `None` is returned.
fn parse_line<W: Write>(line: &str, out: &mut W) -> io::Result<Option<Program>> {
    let mut p = Parser::new(Lexer::new(line));
    let program = p.parse_program();
    if !p.errors().is_empty() {
        debug!(errors = p.errors().len(), "line did not parse");
        print_parser_errors(out, p.errors())?;
        return Ok(None);
    }
    Ok(Some(program))
}

fn print_parser_errors<W: Write>(out: &mut W, errors: &[ParseError]) -> io::Result<()> {
    out.write_all(ERROR_HEADER.as_bytes())?;
    out.write_all(ERROR_SUB_HEADER.as_bytes())?;
    for msg in errors {
        writeln!(out, "\t{}", msg)?;
    }
    Ok(())
}

struct Session<R, W> {
    mode: Mode,
    reader: R,
    writer: W,
    buf: Vec<u8>,
    lines: usize,
}

impl<R: BufRead, W: Write> Session<R, W> {
    fn new(mode: Mode, reader: R, writer: W) -> Self {
        Session {
            mode,
            reader,
            writer,
            buf: Vec::new(),
            lines: 0,
        }
    }

    /// Reads lines and hands each to `dispatch` until input runs out.
    fn run<F>(mut self, mut dispatch: F) -> io::Result<()>
    where
        F: FnMut(&str, &mut W) -> io::Result<()>,
    {
        debug!(mode = ?self.mode, "session started");
        loop {
            let line = match self.read_line()? {
                Some(line) => line,
                None => break,
            };

            let _span = debug_span!("line", n = self.lines).entered();
            dispatch(&line, &mut self.writer)?;
        }
        debug!(lines = self.lines, "end of input");
        Ok(())
    }

    /// Writes the prompt, then blocks for the next line. The prompt is
    /// written even when the read finds the input exhausted.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.writer.write_all(PROMPT.as_bytes())?;
        self.writer.flush()?;

        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.lines += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        trace!(bytes = self.buf.len(), "read line");
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

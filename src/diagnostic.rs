use crate::{
    lexer::{LexicalError, LineBreaks},
    parser::ParserError,
    value::error::RuntimeError,
};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait DiagnosticFormatter {
    fn format_lexical(&self, error: &LexicalError) -> String;
    fn format_parser(&self, error: &ParserError) -> String;
    fn format_runtime(&self, error: &RuntimeError) -> String;
}

/// The canonical plain-text diagnostics.
pub struct BasicFormatter;

impl DiagnosticFormatter for BasicFormatter {
    fn format_lexical(&self, error: &LexicalError) -> String {
        format!("Error on line {}\n\t{}", error.line, error.kind)
    }

    fn format_parser(&self, error: &ParserError) -> String {
        format!("Error on line {}\n\t{}", error.line, error.kind)
    }

    fn format_runtime(&self, error: &RuntimeError) -> String {
        format!("Runtime Error on line {}\n\t{error}", error.line)
    }
}

pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src str) -> Self {
        Self {
            text,
            path,
            line_breaks: LineBreaks::new(text),
        }
    }

    fn render(&self, code: &str, message: &str, label: String, line: u32) -> String {
        let range = self.line_breaks.get_line_range(line);
        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (self.path, range.clone()))
            .with_code(code)
            .with_message(message)
            .with_label(
                Label::new((self.path, range))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((self.path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}

impl DiagnosticFormatter for PrettyFormatter<'_> {
    fn format_lexical(&self, error: &LexicalError) -> String {
        self.render(
            error.code(),
            "Failed to scan the source",
            format!("{}", (&error.kind).fg(Color::BrightRed)),
            error.line,
        )
    }

    fn format_parser(&self, error: &ParserError) -> String {
        self.render(
            error.code(),
            "Failed to parse the program",
            format!("{}", (&error.kind).fg(Color::BrightRed)),
            error.line,
        )
    }

    fn format_runtime(&self, error: &RuntimeError) -> String {
        self.render(
            error.code(),
            "Runtime error",
            format!(
                "{} at `{}`",
                (&error.kind).fg(Color::BrightRed),
                (&error.lexeme).fg(Color::BrightYellow)
            ),
            error.line,
        )
    }
}

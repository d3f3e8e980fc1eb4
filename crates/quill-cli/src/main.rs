mod repl;

use std::fs;
use std::process::exit;

use owo_colors::OwoColorize;
use quill_interpreter::Interpreter;
use quill_lexer::Lexer;
use quill_parser::Parser;
use quill_syntax::error::Error;

/// Renders a diagnostic as a labeled line plus a source caret when the error
/// carries a location.
pub fn render_error(source: &str, err: &Error) {
    eprintln!("{}: {}", err.kind.label().red().bold(), err.to_string().red());
    if let (Some(line), Some(col)) = (err.line, err.col) {
        if let Some(src_line) = source.lines().nth(line - 1) {
            eprintln!("  {}", src_line.bright_black());
            let mut marker = String::new();
            if col > 1 {
                marker.push_str(&" ".repeat(col - 1));
            }
            marker.push('^');
            eprintln!("  {}", marker.red());
        }
    }
}

fn run_file(path: &str) -> Result<(), ()> {
    let src = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}: {}",
                "error".red().bold(),
                format!("Cannot open file {}: {}", path, e).red()
            );
            return Err(());
        }
    };

    let mut parser = match Parser::new(Lexer::new(&src)) {
        Ok(p) => p,
        Err(e) => {
            render_error(&src, &e);
            return Err(());
        }
    };
    let program = match parser.parse_program() {
        Ok(p) => p,
        Err(e) => {
            render_error(&src, &e);
            return Err(());
        }
    };

    let mut interp = Interpreter::new();
    if let Err(e) = interp.run(&program) {
        render_error(&src, &e);
        return Err(());
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    match args.len() {
        1 => repl::start_repl(),
        2 => {
            if run_file(&args[1]).is_err() {
                exit(1);
            }
        }
        _ => {
            eprintln!("Usage:");
            eprintln!("  quill-cli <file>   # run a script");
            eprintln!("  quill-cli          # interactive REPL");
            exit(1);
        }
    }
}

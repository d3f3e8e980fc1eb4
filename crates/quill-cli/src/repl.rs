use std::io::{self, Write};

use owo_colors::OwoColorize;
use quill_interpreter::{Interpreter, Value};
use quill_lexer::Lexer;
use quill_parser::Parser;

use crate::render_error;

/// Reads one line at a time, runs it as a program against a persistent root
/// environment, and echoes the last non-null value.
pub fn start_repl() {
    println!("{}", "Quill REPL. Type :quit to exit.".bold().green());

    let mut interpreter = Interpreter::new();
    let env = Interpreter::root_env();

    loop {
        print!("{}", "quill> ".cyan());
        let _ = io::stdout().flush();

        let mut line = String::new();
        let n = match io::stdin().read_line(&mut line) {
            Ok(n) => n,
            Err(_) => {
                println!("<input error>");
                break;
            }
        };
        if n == 0 {
            // EOF
            println!("\nGoodbye.");
            break;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == ":quit" || trimmed == ":q" {
            println!("Goodbye.");
            break;
        }

        let mut parser = match Parser::new(Lexer::new(trimmed)) {
            Ok(p) => p,
            Err(e) => {
                render_error(trimmed, &e);
                continue;
            }
        };
        match parser.parse_program() {
            Ok(program) => match interpreter.run_with_env(&program, &env) {
                Ok(value) => {
                    if value != Value::Null {
                        println!("{}", value.to_string().bright_blue());
                    }
                }
                Err(e) => render_error(trimmed, &e),
            },
            Err(e) => render_error(trimmed, &e),
        }
    }
}

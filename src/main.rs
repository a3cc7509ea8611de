use std::{
    fs,
    io::{self, BufRead, Write},
    process,
};

use clap::Parser;
use kestrel::{
    Value,
    interpreter::{evaluator::core::Context, lexer::tokenize, parser::statement::parse_program},
};

/// kestrel is a small, dynamically-typed scripting language with
/// first-class closures.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Evaluates an inline snippet instead of reading a file.
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// The script file to run. With no file and no snippet, a REPL starts.
    file: Option<String>,
}

fn main() {
    let args = Args::parse();

    match (args.eval, args.file) {
        (Some(code), _) => {
            run_source(&code, true);
        },
        (None, Some(path)) => {
            let script = fs::read_to_string(&path).unwrap_or_else(|_| {
                eprintln!("Failed to read the input file '{path}'. Perhaps this file does not exist?");
                process::exit(1);
            });
            run_source(&script, false);
        },
        (None, None) => repl(),
    }
}

/// Runs a source string in a fresh context; any uncaught error prints and
/// exits with code 1. With `show_value`, a non-nil script value is printed.
fn run_source(source: &str, show_value: bool) {
    match kestrel::execute(source, None) {
        Ok(Value::Nil) | Ok(Value::Undefined) => {},
        Ok(value) => {
            if show_value {
                println!("{value}");
            }
        },
        Err(error) => {
            eprintln!("{error}");
            process::exit(1);
        },
    }
}

/// The interactive loop. Bindings persist across lines; dot-prefixed
/// commands control the session.
fn repl() {
    let mut context = Context::new();
    println!("kestrel {} — type .help for commands", env!("CARGO_PKG_VERSION"));

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {},
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('.') {
            if !command(&mut context, line) {
                break;
            }
            continue;
        }

        run_line(&mut context, line);
    }
}

/// Parses and runs one REPL line in the persistent context, printing the
/// script value when it is not nil.
fn run_line(context: &mut Context, source: &str) {
    let parsed = tokenize(source).and_then(|tokens| {
                                     let mut iter = tokens.iter().peekable();
                                     parse_program(&mut iter)
                                 });

    match parsed {
        Ok(statements) => match context.run_script(&statements) {
            Ok(Value::Nil) => {},
            Ok(value) => println!("{value}"),
            Err(error) => eprintln!("{error}"),
        },
        Err(error) => eprintln!("{error}"),
    }
}

/// Handles a dot command. Returns `false` when the REPL should exit.
fn command(context: &mut Context, line: &str) -> bool {
    let (name, argument) = match line.split_once(' ') {
        Some((name, argument)) => (name, argument.trim()),
        None => (line, ""),
    };

    match name {
        ".exit" => return false,
        ".help" => {
            println!(".help          show this help");
            println!(".exit          leave the REPL");
            println!(".clear         reset all bindings");
            println!(".vars          list defined variables");
            println!(".load <file>   run a script file in this session");
        },
        ".clear" => *context = Context::new(),
        ".vars" => {
            for name in context.global_names() {
                println!("{name}");
            }
        },
        ".load" => match fs::read_to_string(argument) {
            Ok(script) => run_line(context, &script),
            Err(_) => eprintln!("Failed to read '{argument}'."),
        },
        unknown => eprintln!("Unknown command '{unknown}'. Try .help"),
    }

    true
}

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use seqlisp::ast::{Value, val};
use seqlisp::evaluator::{self, GlobalEnv};
use seqlisp::reader::{ReadConfig, read_with_config};
use std::process;

fn main() {
    init_tracing();

    if let Err(err) = run_repl() {
        eprintln!("The REPL encountered an unexpected error and must exit.");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

/// Install a subscriber only when `RUST_LOG` is set,
/// e.g. `RUST_LOG=seqlisp=trace cargo run --example repl`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_repl() -> Result<(), ReadlineError> {
    println!("seqlisp S-expression evaluator");
    println!("Enter S-expressions like: (+ 1 2)");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new()?;
    let env = evaluator::create_global_env().with_binding("one", val(1));
    let config = ReadConfig {
        handle_comments: true,
        ..ReadConfig::default()
    };

    loop {
        match rl.readline("seqlisp> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                match read_with_config(line, &config) {
                    Ok(form) => match evaluator::eval(&env, &form) {
                        Ok(result) => println!("{result}"),
                        Err(e) => println!("Error: {e}"),
                    },
                    Err(e) => println!("{}", e.report()),
                }
            }

            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

fn print_help() {
    println!("seqlisp REPL commands:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Language:");
    println!("  Numbers: 42, -5");
    println!("  Booleans: #t, #f (only #f is false)");
    println!("  Special forms: (if c a b), (quote x)");
    println!("  Builtins: +, *");
    println!("  Comments: ; to end of line");
    println!();
    println!("Examples:");
    println!("  (+ 1 2 3)");
    println!("  (if 0 (quote zero-is-true) (quote never))");
    println!("  ((if #f + *) 3 4)");
    println!();
}

fn print_environment(env: &GlobalEnv) {
    let bindings = env.bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Environment bindings ({} total):", bindings.len());

    let (builtins, values): (Vec<_>, Vec<_>) = bindings
        .into_iter()
        .partition(|(_, value)| matches!(value, Value::Function(_)));

    if !builtins.is_empty() {
        println!("Built-in functions ({}):", builtins.len());
        for (name, _) in builtins {
            print!("  {name:<15}");
        }
        println!();
    }

    if !values.is_empty() {
        println!("Values ({}):", values.len());
        for (name, value) in values {
            println!("  {name} = {value}");
        }
    }
}

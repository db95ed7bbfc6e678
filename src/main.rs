use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use lisp_bridge::{ConfigEngine, Editor, Host, lifecycle};

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Parse command line args
    let args: Vec<String> = env::args().skip(1).collect();
    let print_config = args.iter().any(|a| a == "--print-config");
    let path = args.iter().find(|a| !a.starts_with("--"));

    let mut config = ConfigEngine::new();
    if let Err(err) = config.load_default() {
        eprintln!("{}", err);
    }
    let settings = config.settings();

    if print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let editor = Arc::new(match path {
        Some(path) => Editor::open(PathBuf::from(path))?,
        None => Editor::new(),
    });
    let interpreter = lifecycle::initialize_once(editor.clone(), settings)?;
    interpreter.refresh_all();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            ":quit" => break,
            ":diagnostics" => {
                for diagnostic in interpreter.diagnostics().drain() {
                    println!("{}", serde_json::to_string(&diagnostic)?);
                }
            }
            source => {
                let text = editor.make_string(source);
                let result = interpreter.evaluate_expression(text);
                match editor.string_value(result)? {
                    Some(printed) => println!("{}", printed),
                    None => println!("nil"),
                }
                // Nothing roots the strings we just created
                editor.collect();
            }
        }
    }

    Ok(())
}

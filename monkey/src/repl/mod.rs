//! REPL (Read-Eval-Print Loop) for Monkey

use crate::error::report_error;
use crate::interp::{Console, Interpreter, StdConsole, Value, registry};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = ">> ";
const HISTORY_FILE: &str = ".monkey_history";

/// What the REPL should do after handling a line
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// REPL state
pub struct Repl<C: Console = StdConsole> {
    editor: DefaultEditor,
    interpreter: Interpreter<C>,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL on the process's stdin and stdout
    pub fn new() -> RlResult<Self> {
        Self::with_console(StdConsole::new())
    }
}

impl<C: Console> Repl<C> {
    pub fn with_console(console: C) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            interpreter: Interpreter::with_console(console),
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Monkey REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) == Flow::Quit {
                            break;
                        }
                        continue;
                    }

                    self.eval_input(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path
            && let Err(e) = self.editor.save_history(path)
        {
            tracing::warn!(error = %e, path = %path.display(), "could not save REPL history");
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> Flow {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                Flow::Quit
            }
            ":help" | ":h" | ":?" => {
                print_help();
                Flow::Continue
            }
            ":builtins" => {
                print_builtins();
                Flow::Continue
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                Flow::Continue
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                Flow::Continue
            }
        }
    }

    /// Evaluate one line and print its result
    fn eval_input(&mut self, input: &str) -> Option<Value> {
        match self.interpreter.run_source(input) {
            Ok(value) => {
                match &value {
                    Value::Null => {}
                    Value::Error(_) => eprintln!("{value}"),
                    _ => println!("{value}"),
                }
                Some(value)
            }
            Err(err) => {
                report_error("<repl>", input, &err);
                None
            }
        }
    }
}

fn print_help() {
    println!("Monkey REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :builtins       List built-in functions");
    println!("  :quit, :q       Exit the REPL");
    println!("  :clear          Clear the screen");
    println!();
    println!("You can enter:");
    println!("  - Bindings: let xs = [1, 2, 3];");
    println!("  - Expressions: len(xs) * 2");
    println!("  - Hashes: let h = {{\"k\": 1}}; object_set(h, \"j\", 2);");
}

/// List the builtin registry
pub fn print_builtins() {
    let builtins = registry();
    println!("Built-in functions ({}):", builtins.len());
    for builtin in builtins.iter() {
        println!("  {:<30}{}", builtin.usage, builtin.summary);
    }
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

use clap::{Parser, Subcommand};
use scriptflow::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Visits to one page after which an unattended run is treated as stuck in a rule cycle.
const MAX_PAGE_VISITS: usize = 10;

/// Check, compile and walk through call scripts from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report graph problems such as dangling rules or unreachable pages
    Check {
        /// Builder JSON export or compiled `.script` file
        script_path: String,
    },
    /// Compile a builder JSON export into a binary snapshot
    Compile {
        /// Builder JSON export
        script_path: String,
        /// Output path for the compiled snapshot
        #[arg(short, long, default_value = "script.script")]
        output: String,
    },
    /// Walk through a script, from an answers file or interactively
    Run {
        /// Builder JSON export or compiled `.script` file
        script_path: String,
        /// JSON object mapping field ids to answers
        #[arg(short, long)]
        answers: Option<String>,
        /// Prompt for every field instead of reading an answers file
        #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
        human: bool,
        /// Append the final submission to this JSON-lines file
        #[arg(short, long)]
        submissions: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { script_path } => run_check(&script_path),
        Command::Compile {
            script_path,
            output,
        } => run_compile(&script_path, &output),
        Command::Run {
            script_path,
            answers,
            human,
            submissions,
            first_name,
            last_name,
            email,
            username,
        } => {
            let operator = OperatorIdentity {
                first_name,
                last_name,
                email,
                username,
            };
            run_script(&script_path, answers, human, submissions, operator);
        }
    }
}

fn load_script(path: &str) -> ScriptSnapshot {
    if path.ends_with(".script") {
        return ScriptSnapshot::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load compiled script '{}': {}", path, e))
        });
    }
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read script file '{}': {}", path, e)));
    ScriptSnapshot::from_builder_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert script: {}", e)))
}

fn run_check(script_path: &str) {
    let script = load_script(script_path);
    let diagnostics = validate(&script);

    println!(
        "Script '{}': {} pages ({} visible), {} rules",
        script.name(),
        script.pages().len(),
        script.visible_pages().len(),
        script.rules().len()
    );
    if diagnostics.is_empty() {
        println!("No problems found.");
        return;
    }
    for diagnostic in &diagnostics {
        println!("  - {}", diagnostic);
    }
    std::process::exit(2);
}

fn run_compile(script_path: &str, output: &str) {
    let script = load_script(script_path);
    script
        .save(output)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write snapshot: {}", e)));
    println!("Compiled '{}' to '{}'", script.name(), output);
}

fn run_script(
    script_path: &str,
    answers_path: Option<String>,
    human: bool,
    submissions_path: Option<String>,
    operator: OperatorIdentity,
) {
    let script = Arc::new(load_script(script_path));
    let mut run = ScriptRun::start(Arc::clone(&script))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to start run: {}", e)));

    if let Some(path) = &answers_path {
        let json = fs::read_to_string(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read answers '{}': {}", path, e)));
        let answers: HashMap<String, AnswerValue> = serde_json::from_str(&json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse answers JSON: {}", e)));
        for (field_id, value) in answers {
            if let Err(e) = run.set_answer(field_id, value) {
                exit_with_error(&e.to_string());
            }
        }
    } else if !human {
        println!("No answers file provided. Walking the script with no answers.");
    }

    loop {
        let Some(page) = run.current_page().cloned() else {
            break;
        };

        let progress = run.progress();
        println!(
            "\n[{}/{} - {:.0}%] {}",
            progress.step,
            progress.total,
            progress.percent,
            run.render(&page.title, Some(&operator))
        );
        if !page.content.is_empty() {
            println!("{}", run.render(&page.content, Some(&operator)));
        }

        if human {
            prompt_for_page(&mut run, &page);
        }

        match run.next() {
            Ok(Transition::Advanced {
                page_id,
                resolution,
            }) => {
                println!("  {}", resolution);
                if !human && run.visit_count(&page_id) > MAX_PAGE_VISITS {
                    exit_with_error(&format!(
                        "Page '{}' was visited more than {} times; the rules form a cycle these answers never leave",
                        page_id, MAX_PAGE_VISITS
                    ));
                }
            }
            Ok(Transition::Completed { resolution }) => {
                println!("  {}", resolution);
                break;
            }
            Err(RunError::RequiredFieldsMissing { field_ids, .. }) if human => {
                println!("  Please fill in: {}", field_ids.join(", "));
            }
            Err(e) => exit_with_error(&e.to_string()),
        }
    }

    submit_run(&mut run, &operator, submissions_path);
}

fn submit_run(run: &mut ScriptRun, operator: &OperatorIdentity, submissions_path: Option<String>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to start runtime: {}", e)));
    let cancel = CancellationToken::new();
    let user_agent = concat!("scriptflow-cli/", env!("CARGO_PKG_VERSION"));

    let result = match &submissions_path {
        Some(path) => {
            let sink = JsonLinesSink::new(path);
            runtime.block_on(run.submit(&sink, Some(operator), Some(user_agent), &cancel))
        }
        None => {
            let sink = MemorySink::new();
            runtime.block_on(run.submit(&sink, Some(operator), Some(user_agent), &cancel))
        }
    };

    match result {
        Ok(submission) => {
            println!("\nRun complete.");
            let keyed = submission.keyed_by_api_name(run.script());
            match serde_json::to_string_pretty(&keyed) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Could not print submission: {}", e),
            }
            if let Some(path) = submissions_path {
                println!("Submission appended to '{}'", path);
            }
        }
        Err(e) => exit_with_error(&format!("Submission failed: {}", e)),
    }
}

/// Asks for every field on the page, offering the current answer as the default.
fn prompt_for_page(run: &mut ScriptRun, page: &Page) {
    for field in page.active_fields() {
        if field.field_type == FieldType::Content {
            continue;
        }

        let marker = if field.required { " *" } else { "" };
        if !field.choices.is_empty() {
            for choice in &field.choices {
                println!("    ({}) {}", choice.id, choice.text);
            }
        }
        let current = run.answers().get(&field.id).map(|v| v.to_string());
        let input = prompt_for_input(&format!("{}{}", field.label, marker), current.as_deref());
        if input.is_empty() {
            continue;
        }

        let value = match field.field_type {
            FieldType::Checkbox => AnswerValue::Bool(matches!(input.as_str(), "y" | "yes" | "true")),
            _ => AnswerValue::Text(input),
        };
        if let Err(e) = run.set_answer(field.id.clone(), value) {
            exit_with_error(&e.to_string());
        }
    }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to flush stdout: {}", e));
    }
    if let Err(e) = io::stdin().read_line(&mut line) {
        exit_with_error(&format!("Failed to read line: {}", e));
    }

    let trimmed = line.trim().to_string();
    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

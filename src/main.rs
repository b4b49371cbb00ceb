// Main CLI entry point for the AV Ops console
// Uses clap for argument parsing, rustyline for the interactive prompt and
// tracing-subscriber for diagnostics

use avops_console::config::{ConsoleConfig, DEFAULT_BASE_URL};
use avops_console::console::{apply_command, parse_command, render_outcome, settle, ConsoleCommand, Settled, Step};
use avops_console::engine::RequestExecutor;
use avops_console::error::ConsoleError;
use avops_console::models::Method;
use avops_console::reporting::{render_catalog, render_record_json};
use avops_console::session::{CallOutcome, ConsoleSession};
use clap::{Arg, ArgAction, ArgMatches, Command};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::io::{BufRead, IsTerminal};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "avops> ";

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the response record as JSON")
}

fn request_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("endpoint")
            .required(true)
            .num_args(1)
            .help("Catalog position, key (\"GET /health\") or name"))
        .arg(Arg::new("method")
            .long("method")
            .num_args(1)
            .help("Override the endpoint's method"))
        .arg(Arg::new("path")
            .long("path")
            .num_args(1)
            .help("Override the endpoint's path template"))
        .arg(Arg::new("param")
            .short('p')
            .long("param")
            .action(ArgAction::Append)
            .help("Path parameter, name=value"))
        .arg(Arg::new("query")
            .short('q')
            .long("query")
            .action(ArgAction::Append)
            .help("Query parameter, key=value"))
        .arg(Arg::new("header")
            .short('H')
            .long("header")
            .action(ArgAction::Append)
            .help("Header, key=value"))
        .arg(Arg::new("body")
            .short('d')
            .long("body")
            .num_args(1)
            .help("Body text (JSON, or JSON object for form endpoints)"))
        .arg(json_arg())
}

fn build_cli() -> Command {
    Command::new("avops-console")
        .version(clap::crate_version!())
        .about("Terminal API console and copilot runner for the AV Ops backend")
        .after_help("EXAMPLES:\n  avops-console endpoints\n  avops-console send \"GET /api/v1/telemetry/latest/{device_id}\" -p device_id=002\n  avops-console send \"Reset Device (auth)\" -q device_id=001\n  avops-console copilot \"Diagnose device 001 audio dropouts error E42\"\n  avops-console console")
        .arg(Arg::new("base_url")
            .short('b')
            .long("base-url")
            .env("AVOPS_BASE_URL")
            .num_args(1)
            .global(true)
            .help(format!("API base URL (default {})", DEFAULT_BASE_URL)))
        .arg(Arg::new("token")
            .short('t')
            .long("token")
            .env("AVOPS_TOKEN")
            .num_args(1)
            .global(true)
            .help("Bearer token attached to every request"))
        .arg(Arg::new("timeout")
            .long("timeout")
            .env("AVOPS_TIMEOUT")
            .num_args(1)
            .value_parser(clap::value_parser!(u64))
            .global(true)
            .help("Request timeout in seconds (default: none)"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .global(true)
            .help("More log output (-v info, -vv debug)"))
        .subcommand(Command::new("endpoints").about("List the endpoint catalog"))
        .subcommand(request_args(Command::new("send").about("Send one catalog request")))
        .subcommand(request_args(Command::new("curl").about("Print a catalog request as a cURL command")))
        .subcommand(Command::new("ping").about("GET /health").arg(json_arg()))
        .subcommand(Command::new("copilot")
            .about("Run a copilot diagnostic task")
            .arg(Arg::new("task").required(true).num_args(1..).help("Task description")))
        .subcommand(Command::new("console").about("Interactive console (default)"))
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn split_pair(raw: &str, flag: &str) -> Result<(String, String), ConsoleError> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| ConsoleError::InvalidCommand(format!("--{} expects key=value, got {}", flag, raw)))
}

/// Select the endpoint and apply the request flags to the draft.
fn apply_request_args(session: &mut ConsoleSession, args: &ArgMatches) -> Result<(), ConsoleError> {
    let endpoint = args.get_one::<String>("endpoint").map(String::as_str).unwrap_or_default();
    session.select_endpoint(endpoint)?;

    if let Some(method) = args.get_one::<String>("method") {
        session.set_method(method.parse::<Method>()?);
    }
    if let Some(path) = args.get_one::<String>("path") {
        session.set_path(path);
    }
    for raw in args.get_many::<String>("param").into_iter().flatten() {
        let (k, v) = split_pair(raw, "param")?;
        session.set_path_param(&k, &v);
    }
    for raw in args.get_many::<String>("query").into_iter().flatten() {
        let (k, v) = split_pair(raw, "query")?;
        session.set_query_param(&k, &v);
    }
    for raw in args.get_many::<String>("header").into_iter().flatten() {
        let (k, v) = split_pair(raw, "header")?;
        session.set_header(&k, &v);
    }
    if let Some(body) = args.get_one::<String>("body") {
        session.set_body(body);
    }
    Ok(())
}

/// Read console lines on a blocking thread and forward them.
///
/// A terminal gets a rustyline editor with history; piped input is read line
/// by line. The channel closes on EOF or Ctrl+C.
fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        if !std::io::stdin().is_terminal() {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to read input");
                        break;
                    }
                }
            }
            return;
        }

        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                warn!(error = %e, "failed to create line editor");
                return;
            }
        };
        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    break;
                }
            }
        }
    });
    rx
}

fn report(result: Result<String, ConsoleError>) {
    match result {
        Ok(output) => print!("{}", output),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn report_settled(session: &mut ConsoleSession, joined: Result<Settled, tokio::task::JoinError>) {
    match joined {
        Ok(settled) => report(settle(session, settled)),
        Err(e) => warn!(error = %e, "request task did not complete"),
    }
}

/// Interactive loop. Network calls run as tasks so the prompt keeps taking
/// commands; each result is applied to the session when it settles.
async fn run_console(session: &mut ConsoleSession, executor: &RequestExecutor) -> Result<(), ConsoleError> {
    println!("AV Ops Copilot Console - {} (type 'help' for commands)", session.base_url());
    if let Some(selected) = session.selected() {
        println!("Selected {} ({})", selected.key(), selected.name);
    }

    let mut input = spawn_line_reader();
    let mut calls: JoinSet<Settled> = JoinSet::new();
    loop {
        tokio::select! {
            Some(joined) = calls.join_next(), if !calls.is_empty() => report_settled(session, joined),
            line = input.recv() => {
                let Some(line) = line else { break };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };
                if command == ConsoleCommand::Quit {
                    break;
                }

                // Errors are local to the command that raised them
                match apply_command(session, command) {
                    Ok(Step::Output(output)) => print!("{}", output),
                    Ok(Step::Dispatch(call)) => {
                        println!("-> {}", call.describe());
                        let executor = executor.clone();
                        calls.spawn(async move { call.execute(&executor).await });
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
    }

    // Calls are never cancelled; let the ones still in flight land
    while let Some(joined) = calls.join_next().await {
        report_settled(session, joined);
    }
    Ok(())
}

/// Print a one-shot result. Non-2xx responses exit with status 2.
fn finish_one_shot(outcome: CallOutcome, args: &ArgMatches) -> Result<(), ConsoleError> {
    if args.get_flag("json") {
        println!("{}", render_record_json(&outcome.record)?);
    } else {
        print!("{}", render_outcome(&outcome));
    }
    let code = exit_code(&outcome);
    if code != 0 {
        if let Some(error) = &outcome.error {
            eprintln!("Error: {}", error);
        }
        std::process::exit(code);
    }
    Ok(())
}

fn exit_code(outcome: &CallOutcome) -> i32 {
    if outcome.record.ok {
        0
    } else {
        2
    }
}

async fn run(matches: ArgMatches) -> Result<(), ConsoleError> {
    let config = ConsoleConfig::new(
        matches.get_one::<String>("base_url").map(String::as_str),
        matches.get_one::<String>("token").map(String::as_str),
        matches.get_one::<u64>("timeout").copied(),
    );
    let executor = RequestExecutor::new(config.timeout)?;
    let mut session = ConsoleSession::new(&config);

    match matches.subcommand() {
        Some(("endpoints", _)) => print!("{}", render_catalog(session.catalog())),
        Some(("send", args)) => {
            apply_request_args(&mut session, args)?;
            let outcome = session.send(&executor).await?;
            finish_one_shot(outcome, args)?;
        }
        Some(("curl", args)) => {
            apply_request_args(&mut session, args)?;
            println!("{}", session.curl_command());
        }
        Some(("ping", args)) => {
            let outcome = session.quick_ping(&executor).await?;
            finish_one_shot(outcome, args)?;
        }
        Some(("copilot", args)) => {
            let task: Vec<&str> = args
                .get_many::<String>("task")
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();
            session.set_task(&task.join(" "));
            let result = session.run_copilot(&executor).await?;
            print!("{}", result.render());
        }
        _ => run_console(&mut session, &executor).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    if let Err(e) = run(matches).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn send_collects_repeated_flags() {
        let matches = build_cli()
            .try_get_matches_from([
                "avops-console", "send", "Reset Device (auth)", "-q", "device_id=001", "-q", "limit=", "-H", "X-A=1",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let mut session = ConsoleSession::new(&ConsoleConfig::default());
        apply_request_args(&mut session, args).unwrap();
        let built = session.build_request();
        assert_eq!(built.url, "http://localhost:8000/api/v1/device/reset?device_id=001");
        assert_eq!(built.headers.get("X-A").unwrap(), "1");
    }

    #[test]
    fn ping_and_send_accept_json_flag() {
        for sub in ["send", "ping"] {
            let argv: Vec<&str> = if sub == "send" {
                vec!["avops-console", sub, "Health", "--json"]
            } else {
                vec!["avops-console", sub, "--json"]
            };
            let matches = build_cli().try_get_matches_from(argv).unwrap();
            let (_, args) = matches.subcommand().unwrap();
            assert!(args.get_flag("json"));
        }
    }

    #[test]
    fn non_success_exits_with_two() {
        let mut session = ConsoleSession::new(&ConsoleConfig::default());
        let pending = session.begin_send(Default::default()).unwrap();
        let record = avops_console::models::ResponseRecord {
            ok: false,
            status: 503,
            status_text: "Service Unavailable".to_string(),
            elapsed_millis: 3,
            response_headers: Default::default(),
            parsed_body: None,
            raw_body: Some(String::new()),
            timestamp: "2026-01-07T10:00:00.000Z".to_string(),
            request: avops_console::models::RequestSummary {
                name: "Quick Health".to_string(),
                method: Method::GET,
                path: "/health".to_string(),
                url: "http://localhost:8000/health".to_string(),
                body_sent: String::new(),
            },
        };
        let mut ok_record = record.clone();
        ok_record.ok = true;
        ok_record.status = 200;

        let failed = session.finish_send(pending, Ok(record)).unwrap();
        assert_eq!(exit_code(&failed), 2);
        let pending = session.begin_send(Default::default()).unwrap();
        let passed = session.finish_send(pending, Ok(ok_record)).unwrap();
        assert_eq!(exit_code(&passed), 0);
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert!(split_pair("novalue", "query").is_err());
        assert_eq!(split_pair("a= b", "query").unwrap(), ("a".to_string(), " b".to_string()));
    }
}

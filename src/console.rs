// Interactive console for the AV Ops backend
// Line commands are parsed into ConsoleCommand and applied to a ConsoleSession
//
// Commands that hit the network do not run here: they come back as an
// InFlight call, the caller drives it to completion and hands the Settled
// result back through `settle`. The session stays free for other commands
// meanwhile.

use crate::auth::decode_claims;
use crate::copilot::COPILOT_RUNNER_NAME;
use crate::engine::RequestExecutor;
use crate::error::ConsoleError;
use crate::models::{Method, ResponseRecord};
use crate::reporting::{render_catalog, render_draft, render_history, render_record};
use crate::session::{CallOutcome, ConsoleSession, PendingCall, PendingCopilot, SendOverrides};

pub const HELP: &str = "\
Commands:
  endpoints              list the endpoint catalog
  select <n|key|name>    select an endpoint and reset the draft
  reset                  reset the draft to the selected endpoint
  method <METHOD>        set the draft method
  path <path>            set the draft path (may contain {placeholders})
  param <name>=<value>   set a path parameter
  query <key>=<value>    set a query parameter (empty value removes it)
  unquery <key>          remove a query parameter
  header <key>=<value>   set a header
  unheader <key>         remove a header
  body <text>            set the body text (no text clears it)
  show                   print the current draft
  send                   send the draft
  ping                   GET /health
  token [value|show|hide] print, set, reveal or mask the bearer token
  base [url]             print or set the API base URL
  history                list past calls, newest first
  replay <n>             load history entry n into the draft
  curl                   print the draft as a cURL command
  task <text>            set the copilot task
  example                load the example copilot task
  run                    run the copilot task
  quit                   leave the console
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    Endpoints,
    Select(String),
    Reset,
    SetMethod(Method),
    SetPath(String),
    SetParam(String, String),
    SetQuery(String, String),
    RemoveQuery(String),
    SetHeader(String, String),
    RemoveHeader(String),
    SetBody(String),
    Show,
    Send,
    Ping,
    ShowToken,
    SetToken(String),
    RevealToken(bool),
    ShowBase,
    SetBase(String),
    History,
    Replay(usize),
    Curl,
    SetTask(String),
    ExampleTask,
    Run,
    Quit,
}

fn key_value(arg: &str, command: &str) -> Result<(String, String), ConsoleError> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| ConsoleError::InvalidCommand(format!("{} expects <key>=<value>", command)))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConsoleError::InvalidCommand(format!("{} expects a key", command)));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn required<'a>(arg: &'a str, command: &str) -> Result<&'a str, ConsoleError> {
    if arg.is_empty() {
        Err(ConsoleError::InvalidCommand(format!("{} expects an argument", command)))
    } else {
        Ok(arg)
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => ConsoleCommand::Help,
        "endpoints" | "ls" => ConsoleCommand::Endpoints,
        "select" | "use" => ConsoleCommand::Select(required(rest, word)?.to_string()),
        "reset" => ConsoleCommand::Reset,
        "method" => ConsoleCommand::SetMethod(required(rest, word)?.parse()?),
        "path" => ConsoleCommand::SetPath(required(rest, word)?.to_string()),
        "param" => {
            let (k, v) = key_value(rest, word)?;
            ConsoleCommand::SetParam(k, v)
        }
        "query" => {
            let (k, v) = key_value(rest, word)?;
            ConsoleCommand::SetQuery(k, v)
        }
        "unquery" => ConsoleCommand::RemoveQuery(required(rest, word)?.to_string()),
        "header" => {
            let (k, v) = key_value(rest, word)?;
            ConsoleCommand::SetHeader(k, v)
        }
        "unheader" => ConsoleCommand::RemoveHeader(required(rest, word)?.to_string()),
        "body" => ConsoleCommand::SetBody(rest.to_string()),
        "show" => ConsoleCommand::Show,
        "send" => ConsoleCommand::Send,
        "ping" => ConsoleCommand::Ping,
        "token" => match rest {
            "" => ConsoleCommand::ShowToken,
            "show" => ConsoleCommand::RevealToken(true),
            "hide" => ConsoleCommand::RevealToken(false),
            value => ConsoleCommand::SetToken(value.to_string()),
        },
        "base" => match rest {
            "" => ConsoleCommand::ShowBase,
            url => ConsoleCommand::SetBase(url.to_string()),
        },
        "history" => ConsoleCommand::History,
        "replay" => {
            let n: usize = required(rest, word)?
                .parse()
                .map_err(|_| ConsoleError::InvalidCommand(format!("replay expects a number, got {}", rest)))?;
            if n == 0 {
                return Err(ConsoleError::InvalidCommand("history entries start at 1".to_string()));
            }
            ConsoleCommand::Replay(n)
        }
        "curl" => ConsoleCommand::Curl,
        "task" => ConsoleCommand::SetTask(required(rest, word)?.to_string()),
        "example" => ConsoleCommand::ExampleTask,
        "run" => ConsoleCommand::Run,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(ConsoleError::InvalidCommand(format!("unknown command {}", other))),
    };
    Ok(Some(command))
}

/// Text printed after a settled send.
pub fn render_outcome(outcome: &CallOutcome) -> String {
    let mut out = render_record(&outcome.record);
    if let Some(error) = &outcome.error {
        out.push_str(&format!("Error: {}\n", error));
    }
    if outcome.token_captured {
        out.push_str("Token saved from login response.\n");
    }
    out
}

fn render_token(session: &ConsoleSession) -> String {
    let mut out = format!("Token: {}\n", session.token_display());
    if let Some(claims) = decode_claims(session.token()) {
        if let Some(sub) = claims.subject {
            out.push_str(&format!("  sub: {}\n", sub));
        }
        if let Some(exp) = claims.expires_at {
            out.push_str(&format!("  exp: {}\n", exp.to_rfc3339()));
        }
    }
    out
}

/// A dispatched call waiting on the network
#[derive(Debug)]
pub enum InFlight {
    Send(PendingCall),
    Copilot(PendingCopilot),
}

/// A call whose network exchange is over, ready to be applied to the session
#[derive(Debug)]
pub enum Settled {
    Send(PendingCall, Result<ResponseRecord, ConsoleError>),
    Copilot(PendingCopilot, Result<ResponseRecord, ConsoleError>),
}

impl InFlight {
    /// Short label printed when the call is dispatched.
    pub fn describe(&self) -> String {
        match self {
            InFlight::Send(call) => format!("{} {}", call.request.method, call.request.url),
            InFlight::Copilot(run) => format!("{} {}", run.request.method, run.request.url),
        }
    }

    /// Perform the exchange. Never touches the session.
    pub async fn execute(self, executor: &RequestExecutor) -> Settled {
        match self {
            InFlight::Send(call) => {
                let result = executor.execute(&call.request, &call.name).await;
                Settled::Send(call, result)
            }
            InFlight::Copilot(run) => {
                let result = executor.execute(&run.request, COPILOT_RUNNER_NAME).await;
                Settled::Copilot(run, result)
            }
        }
    }
}

/// What a command produced: text to print now, or a call to drive.
#[derive(Debug)]
pub enum Step {
    Output(String),
    Dispatch(InFlight),
}

/// Apply a command to the session.
///
/// `send`, `ping` and `run` only mark their flow busy and return the call;
/// a second call of the same flow is refused with `Busy` until it settles.
pub fn apply_command(session: &mut ConsoleSession, command: ConsoleCommand) -> Result<Step, ConsoleError> {
    let output = match command {
        ConsoleCommand::Help => HELP.to_string(),
        ConsoleCommand::Endpoints => render_catalog(session.catalog()),
        ConsoleCommand::Select(query) => {
            let endpoint = session.select_endpoint(&query)?.clone();
            let mut out = format!("Selected {} ({})\n", endpoint.key(), endpoint.name);
            if !endpoint.hint.is_empty() {
                out.push_str(&format!("  {}\n", endpoint.hint));
            }
            out.push_str(&render_draft(session.draft()));
            out
        }
        ConsoleCommand::Reset => {
            session.reset_draft();
            render_draft(session.draft())
        }
        ConsoleCommand::SetMethod(method) => {
            session.set_method(method);
            String::new()
        }
        ConsoleCommand::SetPath(path) => {
            session.set_path(&path);
            String::new()
        }
        ConsoleCommand::SetParam(k, v) => {
            session.set_path_param(&k, &v);
            String::new()
        }
        ConsoleCommand::SetQuery(k, v) => {
            session.set_query_param(&k, &v);
            String::new()
        }
        ConsoleCommand::RemoveQuery(k) => {
            session.remove_query_param(&k);
            String::new()
        }
        ConsoleCommand::SetHeader(k, v) => {
            session.set_header(&k, &v);
            String::new()
        }
        ConsoleCommand::RemoveHeader(k) => {
            session.remove_header(&k);
            String::new()
        }
        ConsoleCommand::SetBody(text) => {
            session.set_body(&text);
            String::new()
        }
        ConsoleCommand::Show => render_draft(session.draft()),
        ConsoleCommand::Send => {
            return Ok(Step::Dispatch(InFlight::Send(session.begin_send(SendOverrides::default())?)))
        }
        ConsoleCommand::Ping => {
            return Ok(Step::Dispatch(InFlight::Send(session.begin_send(SendOverrides::health_ping())?)))
        }
        ConsoleCommand::ShowToken => render_token(session),
        ConsoleCommand::SetToken(token) => {
            session.set_token(&token);
            render_token(session)
        }
        ConsoleCommand::RevealToken(visible) => {
            session.set_token_visible(visible);
            render_token(session)
        }
        ConsoleCommand::ShowBase => format!("{}\n", session.base_url()),
        ConsoleCommand::SetBase(url) => {
            session.set_base_url(&url);
            String::new()
        }
        ConsoleCommand::History => render_history(session.history()),
        ConsoleCommand::Replay(n) => {
            let record = session.replay(n - 1)?.clone();
            let mut out = render_record(&record);
            if let Some(error) = session.current_error() {
                out.push_str(&format!("Error: {}\n", error));
            }
            out.push_str(&render_draft(session.draft()));
            out
        }
        ConsoleCommand::Curl => format!("{}\n", session.curl_command()),
        ConsoleCommand::SetTask(task) => {
            session.set_task(&task);
            String::new()
        }
        ConsoleCommand::ExampleTask => {
            session.load_example_task();
            format!("Task: {}\n", session.task())
        }
        ConsoleCommand::Run => return Ok(Step::Dispatch(InFlight::Copilot(session.begin_copilot()?))),
        ConsoleCommand::Quit => String::new(),
    };
    Ok(Step::Output(output))
}

/// Apply a settled call to the session and return what to print.
///
/// Transport failures and non-2xx copilot runs come back as `Err` with the
/// session already updated; the console prints them and carries on.
pub fn settle(session: &mut ConsoleSession, settled: Settled) -> Result<String, ConsoleError> {
    match settled {
        Settled::Send(call, result) => Ok(render_outcome(&session.finish_send(call, result)?)),
        Settled::Copilot(run, result) => Ok(session.finish_copilot(run, result)?.render()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_commands() {
        assert_eq!(
            parse_command("query limit = 50").unwrap(),
            Some(ConsoleCommand::SetQuery("limit".to_string(), "50".to_string()))
        );
        assert_eq!(
            parse_command("header X-Trace=abc=def").unwrap(),
            Some(ConsoleCommand::SetHeader("X-Trace".to_string(), "abc=def".to_string()))
        );
        assert!(parse_command("param device_id").is_err());
    }

    #[test]
    fn body_keeps_the_rest_of_the_line() {
        assert_eq!(
            parse_command(r#"body {"task": "a b"}"#).unwrap(),
            Some(ConsoleCommand::SetBody(r#"{"task": "a b"}"#.to_string()))
        );
        assert_eq!(parse_command("body").unwrap(), Some(ConsoleCommand::SetBody(String::new())));
    }

    #[test]
    fn token_subcommands() {
        assert_eq!(parse_command("token").unwrap(), Some(ConsoleCommand::ShowToken));
        assert_eq!(parse_command("token show").unwrap(), Some(ConsoleCommand::RevealToken(true)));
        assert_eq!(parse_command("token abc").unwrap(), Some(ConsoleCommand::SetToken("abc".to_string())));
    }

    #[test]
    fn replay_is_one_based() {
        assert_eq!(parse_command("replay 2").unwrap(), Some(ConsoleCommand::Replay(2)));
        assert!(parse_command("replay 0").is_err());
        assert!(parse_command("replay x").is_err());
    }

    fn dispatched(step: Result<Step, ConsoleError>) -> InFlight {
        match step {
            Ok(Step::Dispatch(call)) => call,
            other => panic!("expected a dispatched call, got {:?}", other),
        }
    }

    #[test]
    fn run_is_accepted_while_send_is_in_flight() {
        let mut session = ConsoleSession::new(&crate::config::ConsoleConfig::default());
        let send = dispatched(apply_command(&mut session, ConsoleCommand::Send));
        assert!(matches!(send, InFlight::Send(_)));

        // editing and the copilot flow stay available
        assert!(matches!(apply_command(&mut session, ConsoleCommand::Show), Ok(Step::Output(_))));
        let run = dispatched(apply_command(&mut session, ConsoleCommand::Run));
        assert!(matches!(run, InFlight::Copilot(_)));

        assert!(matches!(apply_command(&mut session, ConsoleCommand::Ping), Err(ConsoleError::Busy(_))));
        assert!(matches!(apply_command(&mut session, ConsoleCommand::Run), Err(ConsoleError::Busy(_))));
    }

    #[test]
    fn settling_a_failed_send_frees_the_flow() {
        let mut session = ConsoleSession::new(&crate::config::ConsoleConfig::default());
        let call = match dispatched(apply_command(&mut session, ConsoleCommand::Ping)) {
            InFlight::Send(call) => call,
            other => panic!("expected a send, got {:?}", other),
        };
        assert!(call.request.url.ends_with("/health"));

        let refused = Settled::Send(call, Err(ConsoleError::Transport("connection refused".to_string())));
        assert!(settle(&mut session, refused).is_err());
        assert!(!session.is_sending());
        assert!(session.history().is_empty());
        assert!(apply_command(&mut session, ConsoleCommand::Send).is_ok());
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(matches!(parse_command("frobnicate"), Err(ConsoleError::InvalidCommand(_))));
        assert_eq!(parse_command("METHOD put").unwrap(), Some(ConsoleCommand::SetMethod(Method::PUT)));
    }
}

use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use rpl_dispatch::{Dispatcher, Response};
use rpl_server::{NodeConfig, RidePoolServer};
use rpl_types::{DocType, Record};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::cli::{Cli, Command, InvokeArgs, OutputFormat, QueryArgs, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let node = node_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Invoke(args) => cmd_invoke(&node, format, args),
        Command::Query(args) => cmd_query(&node, format, args),
        Command::Ops => cmd_ops(&node, format),
        Command::Serve(args) => cmd_serve(node, args),
        Command::Config => cmd_config(&node, format),
    }
}

/// The configuration file (if any) with command-line overrides applied.
fn node_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut node = match &cli.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };
    if let Some(ledger) = &cli.ledger {
        node.ledger.path = Some(ledger.clone());
    }
    Ok(node)
}

fn open_dispatcher(node: &NodeConfig) -> anyhow::Result<Dispatcher> {
    let ledger = node.ledger.open().context("failed to open ledger")?;
    let height = ledger.height()?;
    info!(
        ledger = %ledger_label(node),
        height,
        check_references = node.rides.check_references,
        "ledger opened"
    );
    if node.ledger.path.is_none() {
        eprintln!(
            "{} no --ledger given; changes are discarded on exit",
            "note:".yellow()
        );
    }
    Ok(Dispatcher::new(ledger, node.rides.clone()))
}

fn cmd_invoke(node: &NodeConfig, format: OutputFormat, args: InvokeArgs) -> anyhow::Result<ExitCode> {
    let dispatcher = open_dispatcher(node)?;
    let response = dispatcher.invoke(&args.function, &args.args);
    Ok(print_response(&args.function, &response, format))
}

fn cmd_query(node: &NodeConfig, format: OutputFormat, args: QueryArgs) -> anyhow::Result<ExitCode> {
    let dispatcher = open_dispatcher(node)?;
    if args.list {
        let prefix = args.key.unwrap_or_default();
        let entries = list_entries(&dispatcher, &prefix)?;
        match format {
            OutputFormat::Json => {
                let entries: Vec<_> = entries
                    .iter()
                    .map(|(key, doc_type)| json!({ "key": key, "docType": doc_type }))
                    .collect();
                println!("{}", json!({ "prefix": prefix, "entries": entries }));
            }
            OutputFormat::Text => {
                if entries.is_empty() {
                    println!("No keys.");
                }
                for (key, doc_type) in &entries {
                    let doc_type = doc_type.map_or_else(|| "?".to_string(), |d| d.to_string());
                    println!("{:<20} {}", doc_type.dimmed(), key);
                }
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let key = args
        .key
        .context("query needs a key (or --list [prefix])")?;
    let response = dispatcher.invoke("query", &[key]);
    Ok(print_response("query", &response, format))
}

/// Keys under `prefix` with the kind of record each holds (`None` when the
/// bytes are not a record).
fn list_entries(dispatcher: &Dispatcher, prefix: &str) -> anyhow::Result<Vec<(String, Option<DocType>)>> {
    let ledger = dispatcher.ledger();
    let mut entries = Vec::new();
    for key in ledger.keys(prefix)? {
        let doc_type = ledger
            .get(&key)?
            .and_then(|stored| Record::peek_doc_type(&stored.value).ok());
        entries.push((key.as_str().to_string(), doc_type));
    }
    debug!(prefix, count = entries.len(), "listed keys");
    Ok(entries)
}

fn cmd_ops(node: &NodeConfig, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let dispatcher = Dispatcher::new(node.ledger.open()?, node.rides.clone());
    match format {
        OutputFormat::Json => {
            let ops: Vec<_> = dispatcher
                .operations()
                .map(|op| json!({ "name": op.name, "params": op.params, "summary": op.summary }))
                .collect();
            let aliases: serde_json::Map<_, _> = dispatcher
                .aliases()
                .map(|(alias, name)| (alias.to_string(), Value::from(name)))
                .collect();
            println!("{}", json!({ "operations": ops, "aliases": aliases }));
        }
        OutputFormat::Text => {
            println!("{}", "Operations:".bold());
            for op in dispatcher.operations() {
                println!("  {} {}", format!("{:<44}", op.usage()).cyan(), op.summary.dimmed());
            }
            println!("{}", "Aliases:".bold());
            for (alias, name) in dispatcher.aliases() {
                println!("  {} -> {}", alias.yellow(), name);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_serve(mut node: NodeConfig, args: ServeArgs) -> anyhow::Result<ExitCode> {
    if let Some(bind) = args.bind {
        node.server.bind_addr = bind;
    }
    let server = RidePoolServer::from_node_config(&node).context("failed to start server")?;
    info!(bind = %node.server.bind_addr, ledger = %ledger_label(&node), "starting server");
    println!(
        "RidePool server on {} (ledger: {})",
        node.server.bind_addr.to_string().bold(),
        ledger_label(&node)
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_config(node: &NodeConfig, format: OutputFormat) -> anyhow::Result<ExitCode> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(node)?),
        OutputFormat::Text => print!("{}", node.to_toml()?),
    }
    Ok(ExitCode::SUCCESS)
}

fn ledger_label(node: &NodeConfig) -> String {
    match &node.ledger.path {
        Some(path) => path.display().to_string(),
        None => "in-memory".to_string(),
    }
}

/// Print a dispatcher response and pick the process exit code.
fn print_response(function: &str, response: &Response, format: OutputFormat) -> ExitCode {
    match format {
        OutputFormat::Json => println!("{}", response_json(response)),
        OutputFormat::Text => match response {
            Response::Success { payload } => {
                println!("{} {}", "✓".green().bold(), function);
                if !payload.is_empty() {
                    println!("{}", pretty_payload(payload));
                }
            }
            Response::Error { kind, message } => {
                eprintln!(
                    "{} {} [{}] {}",
                    "✗".red().bold(),
                    function,
                    kind.to_string().red(),
                    message
                );
            }
        },
    }
    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn response_json(response: &Response) -> Value {
    match response {
        Response::Success { payload } => {
            let payload = serde_json::from_slice::<Value>(payload)
                .unwrap_or_else(|_| Value::from(String::from_utf8_lossy(payload).into_owned()));
            json!({ "status": "success", "payload": payload })
        }
        Response::Error { kind, message } => {
            json!({ "status": "error", "kind": kind, "message": message })
        }
    }
}

/// Records are JSON; anything else is shown as text.
fn pretty_payload(payload: &[u8]) -> String {
    serde_json::from_slice::<Value>(payload)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(payload).into_owned())
}

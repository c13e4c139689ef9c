//! Batch example: run the same commands on every host in a list
//!
//! Reads hosts from a file (one per line, `#` comments allowed), detects
//! each device's dialect and prints the cleaned output per host.
//!
//! # Usage
//!
//! ```bash
//! NETSHELL_PASSWORD=secret NETSHELL_ENABLE=enable-secret \
//!     cargo run --example batch_collect -- --hosts ip_list.txt --user admin
//! ```
//!
//! Add `--json` to print the outcomes as JSON instead.

use std::env;
use std::time::Duration;

use netshell::{BatchRunner, DialectTag, SessionConfig, SshConnector, load_host_list};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let hosts = load_host_list(&args.hosts).await?;

    let password = env::var("NETSHELL_PASSWORD").map_err(|_| "NETSHELL_PASSWORD is not set")?;

    let mut builder = SessionConfig::builder()
        .port(args.port)
        .username(&args.user)
        .password(password)
        .commands(["show version", "show ip interface brief"])
        .dialect_commands(
            DialectTag::Huawei,
            ["display version", "display ip interface brief"],
        )
        .per_command_timeout(Duration::from_secs(args.timeout));

    if let Ok(secret) = env::var("NETSHELL_ENABLE") {
        builder = builder.privilege_secret(secret);
    }
    if let Some(level) = &args.level {
        builder = builder.privilege_level(level);
    }

    let shared = builder.build()?;

    println!("Collecting from {} host(s)...", hosts.len());
    let outcomes = BatchRunner::new(SshConnector::default())
        .concurrency(args.concurrency)
        .run(hosts, &shared)
        .await;

    if args.json {
        let outcomes: Vec<_> = outcomes.values().collect();
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    for outcome in outcomes.values() {
        println!("{}", "=".repeat(70));
        print!("{}", outcome);
    }

    let failed = outcomes.values().filter(|o| !o.is_success()).count();
    println!("\n{} host(s) done, {} failed", outcomes.len(), failed);

    Ok(())
}

/// Simple argument parser
struct Args {
    hosts: String,
    port: u16,
    user: String,
    level: Option<String>,
    timeout: u64,
    concurrency: usize,
    json: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut hosts = "ip_list.txt".to_string();
        let mut port = 22u16;
        let mut user = env::var("USER").unwrap_or_else(|_| "admin".to_string());
        let mut level = None;
        let mut timeout = 15u64;
        let mut concurrency = 8usize;
        let mut json = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--hosts" | "-f" => {
                    i += 1;
                    if i < args.len() {
                        hosts = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--level" | "-l" => {
                    i += 1;
                    if i < args.len() {
                        level = Some(args[i].clone());
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(15);
                    }
                }
                "--concurrency" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        concurrency = args[i].parse().unwrap_or(8);
                    }
                }
                "--json" => json = true,
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            hosts,
            port,
            user,
            level,
            timeout,
            concurrency,
            json,
        }
    }

    fn print_help() {
        println!(
            r#"netshell batch_collect example

USAGE:
    cargo run --example batch_collect -- [OPTIONS]

OPTIONS:
    -f, --hosts <PATH>        Host list file [default: ip_list.txt]
    -p, --port <PORT>         SSH port [default: 22]
    -u, --user <USER>         Username [default: $USER]
    -l, --level <LEVEL>       Privilege level (Huawei super) [default: none]
    -t, --timeout <SECS>      Per-command timeout [default: 15]
    -c, --concurrency <N>     Sessions in flight [default: 8]
    --json                    Print outcomes as JSON
    --help                    Print this help message

ENVIRONMENT:
    NETSHELL_PASSWORD         Login password (required)
    NETSHELL_ENABLE           Privilege secret; escalation is skipped when unset
"#
        );
    }
}

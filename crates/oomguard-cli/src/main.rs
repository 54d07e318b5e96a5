//! oomguard: run a low-memory killer against a recorded cluster snapshot.

use std::path::PathBuf;

use anyhow::Context;
use oomguard_core::{KillerConfig, KillerPolicy};
use tracing_subscriber::EnvFilter;

mod snapshot_file;

const USAGE: &str = "\
oomguard - low-memory killer inspector

Usage: oomguard <command>

Commands:
  decide <snapshot.json> [--policy <name>]  Print what the killer would terminate
  policies                                  List available killer policies
  help                                      Show this help message

The policy defaults to $OOMGUARD_KILLER_POLICY, then total-reservation-on-blocked-nodes.";

/// Arguments of the `decide` command.
#[derive(Debug, PartialEq)]
struct DecideArgs {
    snapshot: PathBuf,
    policy: Option<KillerPolicy>,
}

fn parse_decide_args(args: &[String]) -> anyhow::Result<DecideArgs> {
    let mut snapshot = None;
    let mut policy = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--policy" | "-p" => {
                let name = iter.next().context("--policy needs a value")?;
                policy = Some(name.parse::<KillerPolicy>()?);
            }
            other if snapshot.is_none() => snapshot = Some(PathBuf::from(other)),
            other => anyhow::bail!("unexpected argument: {}", other),
        }
    }
    let snapshot = snapshot.context("missing snapshot file")?;
    Ok(DecideArgs { snapshot, policy })
}

/// An explicit `--policy` wins; the environment is only read without one.
fn resolve_config(policy: Option<KillerPolicy>) -> anyhow::Result<KillerConfig> {
    match policy {
        Some(policy) => Ok(KillerConfig::default().with_policy(policy)),
        None => Ok(KillerConfig::from_env()?),
    }
}

fn run_decide(args: DecideArgs) -> anyhow::Result<()> {
    let config = resolve_config(args.policy)?;
    let killer = oomguard_killer::create_killer(config.policy);

    let snapshot = snapshot_file::load_snapshot(&args.snapshot)
        .with_context(|| format!("failed to load {}", args.snapshot.display()))?;
    let target = snapshot_file::decide(killer.as_ref(), &snapshot);
    println!("{}", snapshot_file::render_decision(target.as_ref())?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "decide" => match parse_decide_args(&args[2..]) {
            Ok(decide) => run_decide(decide),
            Err(e) => {
                eprintln!("{}. Usage: oomguard decide <snapshot.json> [--policy <name>]", e);
                std::process::exit(1);
            }
        },
        "policies" => {
            for policy in KillerPolicy::all() {
                println!("{}", policy);
            }
            Ok(())
        }
        "--help" | "-h" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}. Use 'oomguard help' for usage.", other);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_decide_args() {
        let parsed = parse_decide_args(&args(&["snap.json"])).unwrap();
        assert_eq!(
            parsed,
            DecideArgs {
                snapshot: PathBuf::from("snap.json"),
                policy: None,
            }
        );

        let parsed = parse_decide_args(&args(&["--policy", "none", "snap.json"])).unwrap();
        assert_eq!(parsed.policy, Some(KillerPolicy::None));
        assert_eq!(parsed.snapshot, PathBuf::from("snap.json"));
    }

    #[test]
    fn test_explicit_policy_ignores_broken_environment() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("snapshot.json");
        std::fs::write(&snapshot, "{}").unwrap();

        std::env::set_var(oomguard_core::config::KILLER_POLICY_ENV, "bogus");
        let from_env = resolve_config(None);
        let overridden = resolve_config(Some(KillerPolicy::None));
        let decided = run_decide(DecideArgs {
            snapshot,
            policy: Some(KillerPolicy::None),
        });
        std::env::remove_var(oomguard_core::config::KILLER_POLICY_ENV);

        assert!(from_env.is_err());
        assert_eq!(overridden.unwrap().policy, KillerPolicy::None);
        assert!(decided.is_ok());
    }

    #[test]
    fn test_parse_decide_args_errors() {
        assert!(parse_decide_args(&args(&[])).is_err());
        assert!(parse_decide_args(&args(&["snap.json", "--policy"])).is_err());
        assert!(parse_decide_args(&args(&["snap.json", "--policy", "biggest"])).is_err());
        assert!(parse_decide_args(&args(&["a.json", "b.json"])).is_err());
    }

    #[test]
    fn test_usage_covers_every_command() {
        for command in ["decide", "policies", "help", "--policy"] {
            assert!(USAGE.contains(command), "usage is missing {command}");
        }
        assert!(USAGE.contains(oomguard_core::config::KILLER_POLICY_ENV));
    }
}

//! Skillgate - validate skill bundles against layered rules.

mod dashboard;
mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use skillgate_common::error::EXIT_CONFIG_ERROR;
use skillgate_report::listing::{render_pending, render_phases};
use skillgate_report::{render, Format, FormatOptions, Style};
use skillgate_runner::{
    discover, execute, pending_overview, phase_overview, BatchOptions, DiscoveryMode,
};
use skillgate_schema::{RuleSet, RuleSetLoader};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "skillgate")]
#[command(
    author,
    version,
    about = "Validate skill bundles against base, community and project rules"
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print failures and the summary
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct RuleArgs {
    /// Directory holding one subdirectory per skill
    #[arg(long, default_value = "skills")]
    skills_dir: PathBuf,

    /// Rules file (base rules and phases)
    #[arg(long, default_value = "validation-rules.yaml")]
    rules: PathBuf,

    /// Community practices file, replaces the practices in the rules file
    #[arg(long)]
    community: Option<PathBuf>,

    /// Project rules file, appended to the project rules in the rules file
    #[arg(long)]
    project: Option<PathBuf>,

    /// Community preset (minimal, standard, strict)
    #[arg(long)]
    preset: Option<String>,

    /// Skip community practice checks
    #[arg(long)]
    no_community: bool,

    /// Skip project rule checks
    #[arg(long)]
    skip_project_rules: bool,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format (console, json, junit, tap, markdown)
    #[arg(long, short, default_value = "console")]
    format: String,

    /// Write the report to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// List community suggestions in console output
    #[arg(long)]
    show_community: bool,
}

#[derive(Args, Clone)]
struct BatchArgs {
    /// Stop after the first skill with errors
    #[arg(long)]
    fail_fast: bool,

    /// Skills validated concurrently
    #[arg(long, short, default_value = "1")]
    jobs: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every skill in the skills directory
    RunAll {
        /// Only validate skills that have a descriptor
        #[arg(long)]
        completed_only: bool,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Validate the skills listed in one phase
    RunPhase {
        /// Phase number
        phase: u32,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Validate one skill by name or path
    RunSingle {
        /// Skill name under the skills directory, or a path to a skill directory
        name: String,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show every phase and the status of its skills
    ListPhases {
        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Show skills that only have a draft
    ListPending {
        #[command(flatten)]
        rules: RuleArgs,
    },

    /// Interactive results browser
    Dashboard {
        /// Only validate skills that have a descriptor
        #[arg(long)]
        completed_only: bool,

        /// Restrict the run to one phase
        #[arg(long, conflicts_with = "completed_only")]
        phase: Option<u32>,

        /// Plain text markers instead of colored glyphs
        #[arg(long)]
        plain: bool,

        #[command(flatten)]
        rules: RuleArgs,
    },
}

/// Flags that shape every rendered view.
#[derive(Clone, Copy)]
struct View {
    verbose: bool,
    quiet: bool,
    color: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    let view = View {
        verbose: cli.verbose,
        quiet: cli.quiet,
        color: !cli.no_color && std::io::stdout().is_terminal(),
    };

    match run(cli.command, view).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn run(command: Commands, view: View) -> anyhow::Result<u8> {
    match command {
        Commands::RunAll {
            completed_only,
            rules,
            output,
            batch,
        } => {
            let mode = if completed_only {
                DiscoveryMode::CompletedOnly
            } else {
                DiscoveryMode::All
            };
            validate(mode, &rules, &output, &batch, view).await
        }

        Commands::RunPhase {
            phase,
            rules,
            output,
            batch,
        } => validate(DiscoveryMode::Phase(phase), &rules, &output, &batch, view).await,

        Commands::RunSingle {
            name,
            rules,
            output,
        } => {
            let batch = BatchArgs {
                fail_fast: false,
                jobs: 1,
            };
            validate(DiscoveryMode::Single(name), &rules, &output, &batch, view).await
        }

        Commands::ListPhases { rules } => {
            let ruleset = load_rules(&rules)?;
            let phases = phase_overview(&rules.skills_dir, &ruleset);
            output::emit(&render_phases(&phases, Style::new(view.color)), None)?;
            Ok(0)
        }

        Commands::ListPending { rules } => {
            let ruleset = load_rules(&rules)?;
            let pending = pending_overview(&rules.skills_dir, &ruleset)?;
            output::emit(&render_pending(&pending, Style::new(view.color)), None)?;
            Ok(0)
        }

        Commands::Dashboard {
            completed_only,
            phase,
            plain,
            rules,
        } => {
            let mode = match (phase, completed_only) {
                (Some(n), _) => DiscoveryMode::Phase(n),
                (None, true) => DiscoveryMode::CompletedOnly,
                (None, false) => DiscoveryMode::All,
            };
            let ruleset = Arc::new(load_rules(&rules)?);
            let enhanced = view.color && !plain;
            dashboard::run(rules.skills_dir, mode, ruleset, enhanced).await
        }
    }
}

async fn validate(
    mode: DiscoveryMode,
    rule_args: &RuleArgs,
    output_args: &OutputArgs,
    batch_args: &BatchArgs,
    view: View,
) -> anyhow::Result<u8> {
    // Parse the format before doing any work so a typo fails fast.
    let format: Format = output_args.format.parse()?;
    let rules = load_rules(rule_args)?;

    let candidates = discover(&rule_args.skills_dir, &mode, &rules)?;
    info!("Validating {} ({} candidates)", mode, candidates.len());

    let options = BatchOptions {
        fail_fast: batch_args.fail_fast,
        jobs: batch_args.jobs,
    };
    let report = execute(candidates, Arc::new(rules), &options).await?;

    let format_options = FormatOptions {
        color: view.color && output_args.output.is_none() && format.is_human(),
        show_community: output_args.show_community,
        verbose: view.verbose,
        quiet: view.quiet,
    };
    let text = render(&report, format, format_options)?;
    output::emit(&text, output_args.output.as_deref())?;

    debug!(
        "Run finished: {} passed, {} failed",
        report.passed_count(),
        report.failed_count()
    );
    Ok(report.exit_code())
}

fn load_rules(args: &RuleArgs) -> anyhow::Result<RuleSet> {
    let mut loader = RuleSetLoader::new().rules_file(&args.rules);
    if let Some(path) = &args.community {
        loader = loader.community_file(path);
    }
    if let Some(path) = &args.project {
        loader = loader.project_file(path);
    }
    let mut rules = loader
        .load()
        .with_context(|| format!("loading rules from {}", args.rules.display()))?;

    if let Some(preset) = &args.preset {
        rules = rules.select_preset(preset)?;
    }
    if args.no_community {
        rules = rules.without_community();
    }
    if args.skip_project_rules {
        rules = rules.without_project_rules();
    }
    Ok(rules)
}

/// Exit code for a fatal error. Anything not raised by skillgate itself is
/// still an input problem from the caller's point of view.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<skillgate_common::Error>()
        .map(|e| e.exit_code())
        .unwrap_or(EXIT_CONFIG_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_all_flags() {
        let cli = Cli::parse_from([
            "skillgate",
            "run-all",
            "--completed-only",
            "--format",
            "junit",
            "--preset",
            "strict",
            "--no-color",
            "-q",
        ]);
        assert!(cli.quiet);
        assert!(cli.no_color);
        match cli.command {
            Commands::RunAll {
                completed_only,
                rules,
                output,
                batch,
            } => {
                assert!(completed_only);
                assert_eq!(output.format, "junit");
                assert_eq!(rules.preset.as_deref(), Some("strict"));
                assert_eq!(rules.skills_dir, PathBuf::from("skills"));
                assert_eq!(batch.jobs, 1);
            }
            _ => panic!("expected run-all"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["skillgate", "-v", "-q", "list-phases"]).is_err());
    }

    #[test]
    fn test_exit_code_for_errors() {
        let err: anyhow::Error = skillgate_common::Error::config("bad").into();
        assert_eq!(exit_code_for(&err.context("loading")), 2);
        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), 2);
    }

    #[test]
    fn test_load_rules_applies_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let args = RuleArgs {
            skills_dir: dir.path().join("skills"),
            rules: dir.path().join("missing.yaml"),
            community: None,
            project: None,
            preset: Some("strict".to_string()),
            no_community: true,
            skip_project_rules: true,
        };
        let rules = load_rules(&args).unwrap();
        assert!(rules.used_builtin_defaults());
        assert!(rules.enabled_practices().is_empty());
        assert!(!rules.project_rules_enabled());
    }

    #[tokio::test]
    async fn test_unknown_format_is_config_exit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("skills")).unwrap();
        let rules = RuleArgs {
            skills_dir: dir.path().join("skills"),
            rules: dir.path().join("missing.yaml"),
            community: None,
            project: None,
            preset: None,
            no_community: false,
            skip_project_rules: false,
        };
        let output = OutputArgs {
            format: "yaml".to_string(),
            output: None,
            show_community: false,
        };
        let batch = BatchArgs {
            fail_fast: false,
            jobs: 1,
        };
        let view = View {
            verbose: false,
            quiet: true,
            color: false,
        };
        let err = validate(DiscoveryMode::All, &rules, &output, &batch, view)
            .await
            .unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use codeshift::config::{CodeshiftConfig, CONFIG_FILENAME};
use codeshift::orchestrator::{Orchestrator, Outcome};
use codeshift::planner::{Mapping, PlanBuilder, RuleCoverage};
use codeshift::translator::Translator;
use codeshift::types::Language;
use codeshift::validator::{ValidationResult, Validator};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "codeshift")]
#[command(version, about = "Plan, translate and validate code across languages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the translation plan for a language pair
    Plan {
        /// Source language
        #[arg(long)]
        from: Language,

        /// Target language
        #[arg(long)]
        to: Language,

        /// Source file (stdin if omitted)
        file: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply the rule set without executing the result
    Rewrite {
        /// Source language
        #[arg(long)]
        from: Language,

        /// Target language
        #[arg(long)]
        to: Language,

        /// Source file (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Execute code in its runtime and report detected errors
    Validate {
        /// Language of the code
        #[arg(short, long)]
        language: Language,

        /// Code file (stdin if omitted)
        file: Option<PathBuf>,

        /// Print the validation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Translate, validate and correct within the attempt budget
    Translate {
        /// Source language
        #[arg(long)]
        from: Language,

        /// Target language
        #[arg(long)]
        to: Language,

        /// Source file (stdin if omitted)
        file: Option<PathBuf>,

        /// Override the configured correction budget
        #[arg(long)]
        max_attempts: Option<usize>,

        /// Print the full orchestration report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured runtimes and whether they are installed
    Runtimes,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter_layer = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("codeshift v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Init { force } => cmd_init(&cli.config, force),
        Commands::Plan {
            from,
            to,
            file,
            json,
        } => cmd_plan(&from, &to, file.as_deref(), json),
        Commands::Rewrite { from, to, file } => cmd_rewrite(&cli.config, &from, &to, file.as_deref()),
        Commands::Validate {
            language,
            file,
            json,
        } => cmd_validate(&cli.config, &language, file.as_deref(), json),
        Commands::Translate {
            from,
            to,
            file,
            max_attempts,
            json,
        } => cmd_translate(&cli.config, &from, &to, file.as_deref(), max_attempts, json),
        Commands::Runtimes => cmd_runtimes(&cli.config),
    }
}

/// Read source text from a file, or stdin when no file is given
fn read_source(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<CodeshiftConfig> {
    CodeshiftConfig::load_or_default(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn cmd_init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    CodeshiftConfig::default().save(path)?;
    println!(
        "{} Created configuration: {}",
        "✓".bright_green(),
        path.display()
    );
    Ok(())
}

fn cmd_plan(from: &Language, to: &Language, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let source = read_source(file)?;
    let builder = PlanBuilder::new();
    let plan = builder.create_plan(&source, from, to);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} {} → {}",
        "Translation Plan".bright_cyan().bold(),
        from,
        to
    );
    println!("{}", "─".repeat(50).dimmed());
    for (idx, step) in plan.steps.iter().enumerate() {
        println!("  {}. {}", idx + 1, step);
    }
    println!();

    match plan.coverage() {
        RuleCoverage::NoRules => {
            println!("  {} No rules for this language pair", "⚠".bright_yellow());
            let pairs: Vec<String> = builder
                .rule_book()
                .pairs()
                .iter()
                .map(|(source, target)| format!("{} → {}", source.tag(), target.tag()))
                .collect();
            println!("  Supported pairs: {}", pairs.join(", "));
        }
        RuleCoverage::Applied { rules } => {
            println!("  {} {} rule(s)", "✓".bright_green(), rules);
            print_mapping("syntax", &plan.rule_set.syntax_mapping);
            print_mapping("library", &plan.rule_set.library_mapping);
            print_mapping("idiom", &plan.rule_set.idiom_mapping);
        }
    }
    Ok(())
}

fn print_mapping(name: &str, mapping: &Mapping) {
    if mapping.is_empty() {
        return;
    }
    println!("  {}:", name.bold());
    for (from, to) in mapping {
        println!("    {} → {}", from.cyan(), to.green());
    }
}

fn cmd_rewrite(
    config_path: &Path,
    from: &Language,
    to: &Language,
    file: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let source = read_source(file)?;
    let plan = PlanBuilder::new().create_plan(&source, from, to);
    let mut translator = Translator::with_policy(config.translation.cache.eviction_policy());

    let translation = translator.translate_with_coverage(&source, &plan);
    if translation.coverage == RuleCoverage::NoRules {
        eprintln!(
            "{} No rules for {} → {}; output is unchanged apart from post-processing",
            "⚠".bright_yellow(),
            from,
            to
        );
    }
    println!("{}", translation.code);
    Ok(())
}

fn cmd_validate(
    config_path: &Path,
    language: &Language,
    file: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let code = read_source(file)?;
    let validator = Validator::new(config.validation.registry());

    let result = validator.validate(&code, language)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_validation(&result);
    }

    if !result.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn print_validation(result: &ValidationResult) {
    if result.is_valid {
        println!("{} Code executed without detected errors", "✓".bright_green());
        return;
    }

    println!(
        "{} {} error(s) detected",
        "✗".bright_red(),
        result.errors.len()
    );
    for error in &result.errors {
        println!("  {}", error.to_string().red());
    }
    if !result.suggestions.is_empty() {
        println!();
        println!("{}", "Suggestions:".bold());
        for suggestion in &result.suggestions {
            println!("  • {}", suggestion);
        }
    }
}

fn cmd_translate(
    config_path: &Path,
    from: &Language,
    to: &Language,
    file: Option<&Path>,
    max_attempts: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let source = read_source(file)?;

    let mut orchestrator = Orchestrator::from_config(&config);
    if let Some(max_attempts) = max_attempts {
        orchestrator = orchestrator.with_max_attempts(max_attempts);
    }

    let report = orchestrator.translate_detailed(&source, from, to)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &report.outcome {
            Outcome::Validated { code, attempt } => {
                eprintln!(
                    "{} Validated on attempt {}",
                    "✓".bright_green(),
                    attempt
                );
                println!("{}", code);
            }
            Outcome::BudgetExhausted { .. } => {
                eprintln!(
                    "{} No valid translation after {} attempt(s)",
                    "✗".bright_red(),
                    report.attempt_count()
                );
                if let Some(last) = report.attempts.last() {
                    for error in &last.validation.errors {
                        eprintln!("  {}", error.to_string().red());
                    }
                }
            }
        }
    }

    if !report.is_validated() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_runtimes(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = config.validation.registry();

    let available = registry.available_runtimes();

    println!("{}", "Runtimes".bright_cyan().bold());
    println!("{}", "─".repeat(50).dimmed());
    for runtime in &config.validation.runtimes {
        let installed = available
            .iter()
            .any(|(lang, ok)| *lang == runtime.language && *ok);
        let icon = if installed {
            "✓".bright_green()
        } else {
            "✗".bright_red()
        };
        println!(
            "  {} {:<12} {} {}",
            icon,
            runtime.language.tag(),
            runtime.program,
            runtime.inline_flag.dimmed()
        );
    }
    Ok(())
}

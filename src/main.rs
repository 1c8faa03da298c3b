//! mnky CLI
//!
//! Entry point for the `mnky` command-line tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mnky::command::CommandSummary;
use mnky::settings::{
    project_settings_path, user_settings_path, EffectiveSettings, FEATURE_TEMPLATE_ENGINE,
    FEATURE_UNDO,
};
use mnky::{
    lint, undo_all, Configuration, LintReport, MemoryTree, Repository, Settings, TemplateOptions,
    Tree, UrlRequest,
};

#[derive(Parser)]
#[command(name = "mnky")]
#[command(about = "Compile and preview demo-masking configurations", version)]
struct Cli {
    /// Log compilation details to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report problems in a configuration
    Lint {
        file: PathBuf,

        /// Directory imports are resolved against
        #[arg(long, short = 'r')]
        repo: Option<PathBuf>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },

    /// Print the compiled command list as JSON
    Compile {
        file: PathBuf,

        #[arg(long, short = 'r')]
        repo: Option<PathBuf>,

        /// Variable override, e.g. `--set name=Bar`
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// Print declared variables with their effective values
    Variables {
        file: PathBuf,

        #[arg(long, short = 'r')]
        repo: Option<PathBuf>,

        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// Check whether a configuration applies to a URL
    Check {
        file: PathBuf,

        #[arg(long)]
        url: String,

        /// Treat the configuration as switched off
        #[arg(long)]
        disabled: bool,
    },

    /// Apply a configuration to a piece of text
    Apply {
        file: PathBuf,

        /// Text placed in a textarea and rewritten
        #[arg(long)]
        text: String,

        /// Page location
        #[arg(long, default_value = "https://example.com/")]
        url: String,

        #[arg(long, short = 'r')]
        repo: Option<PathBuf>,

        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Number of re-application passes, `monkey_interval` apart
        #[arg(long, default_value_t = 1)]
        watch_count: u32,

        /// Apply even if the configuration does not match the URL
        #[arg(long)]
        force: bool,
    },

    /// Ask what a configuration does with an outbound request
    Intercept {
        file: PathBuf,

        /// Request URL
        #[arg(long)]
        request: String,

        /// Resource type, e.g. `xmlhttprequest`
        #[arg(long = "type", default_value = "xmlhttprequest")]
        resource_type: String,

        /// Page issuing the request
        #[arg(long, default_value = "https://example.com/")]
        url: String,

        #[arg(long, short = 'r')]
        repo: Option<PathBuf>,
    },

    /// Create a configuration from the base template
    New { file: PathBuf },

    /// Print effective settings with their sources
    Settings,
}

fn main() {
    let cli = Cli::parse();

    let effective = match load_settings(cli.debug) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Settings error: {}", e);
            process::exit(1);
        }
    };
    init_tracing(&effective.settings);

    match cli.command {
        Commands::Lint { file, repo, human } => {
            run_lint(&effective.settings, &file, repo, human);
        }
        Commands::Compile { file, repo, set } => {
            run_compile(&effective.settings, &file, repo, &set);
        }
        Commands::Variables { file, repo, set } => {
            run_variables(&effective.settings, &file, repo, &set);
        }
        Commands::Check { file, url, disabled } => {
            run_check(&file, &url, disabled);
        }
        Commands::Apply {
            file,
            text,
            url,
            repo,
            set,
            watch_count,
            force,
        } => {
            let options = ApplyOptions {
                text,
                url,
                set,
                watch_count,
                force,
            };
            run_apply(&effective.settings, &file, repo, options);
        }
        Commands::Intercept {
            file,
            request,
            resource_type,
            url,
            repo,
        } => {
            run_intercept(&effective.settings, &file, repo, &request, &resource_type, &url);
        }
        Commands::New { file } => {
            run_new(&effective.settings, &file);
        }
        Commands::Settings => match effective.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => fail(format!("Error serializing output: {}", e)),
        },
    }
}

fn load_settings(debug: bool) -> Result<EffectiveSettings, mnky::SettingsError> {
    let user = user_settings_path();
    let project = std::env::current_dir().ok().map(|dir| project_settings_path(&dir));
    let cli = debug.then(|| json!({ "debug_mode": true }));
    EffectiveSettings::build(user.as_deref(), project.as_deref(), cli)
}

fn init_tracing(settings: &Settings) {
    let default_filter = if settings.is_debug_enabled() {
        "mnky=debug"
    } else {
        "mnky=warn"
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("MNKY_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("Error serializing output: {}", e)),
    }
}

/// Explicit `--repo`, else the configured repository, else none.
fn load_repository(settings: &Settings, repo: Option<PathBuf>) -> Repository {
    let Some(dir) = repo.or_else(|| settings.repository.as_ref().map(PathBuf::from)) else {
        return Repository::new();
    };
    match Repository::from_dir(&dir) {
        Ok(r) => r,
        Err(e) => fail(format!("Error loading repository {}: {}", dir.display(), e)),
    }
}

fn load_configuration(path: &Path, template: &TemplateOptions) -> Configuration<'static> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => fail(format!("Error reading {}: {}", path.display(), e)),
    };
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Configuration::with_template(name, content, template)
}

fn parse_overrides(set: &[String]) -> Vec<(String, String)> {
    set.iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), value.to_string()),
            None => fail(format!("Invalid --set \"{}\", expected NAME=VALUE", pair)),
        })
        .collect()
}

fn run_lint(settings: &Settings, file: &Path, repo: Option<PathBuf>, human: bool) {
    let repository = load_repository(settings, repo);
    let configuration = load_configuration(file, &TemplateOptions::disabled());
    let report = LintReport::new(
        file.display().to_string(),
        lint(&configuration, &repository),
    );

    if human {
        print!("{}", report.to_human());
    } else {
        print_json(&report);
    }

    if report.has_errors() {
        process::exit(1);
    }
}

fn run_compile(settings: &Settings, file: &Path, repo: Option<PathBuf>, set: &[String]) {
    let repository = load_repository(settings, repo);
    let mut configuration =
        load_configuration(file, &TemplateOptions::disabled()).with_repository(&repository);
    configuration.update_values(parse_overrides(set));

    match configuration.commands() {
        Ok(commands) => {
            let summaries: Vec<CommandSummary> = commands.iter().map(|c| c.summary()).collect();
            print_json(&summaries);
        }
        Err(e) => fail(format!("Compile error: {}", e)),
    }
}

fn run_variables(settings: &Settings, file: &Path, repo: Option<PathBuf>, set: &[String]) {
    let repository = load_repository(settings, repo);
    let mut configuration =
        load_configuration(file, &TemplateOptions::disabled()).with_repository(&repository);
    configuration.update_values(parse_overrides(set));

    match configuration.variables() {
        Ok(variables) => print_json(&variables),
        Err(e) => fail(format!("Compile error: {}", e)),
    }
}

fn run_check(file: &Path, url: &str, disabled: bool) {
    let configuration =
        load_configuration(file, &TemplateOptions::disabled()).with_enabled(!disabled);
    print_json(&json!({
        "name": configuration.name(),
        "url": url,
        "restricted": configuration.is_restricted(),
        "template": configuration.is_template(),
        "available": configuration.is_available_for_url(url),
        "enabled": configuration.is_enabled_for_url(url),
    }));
}

struct ApplyOptions {
    text: String,
    url: String,
    set: Vec<String>,
    watch_count: u32,
    force: bool,
}

fn run_apply(settings: &Settings, file: &Path, repo: Option<PathBuf>, options: ApplyOptions) {
    let template = if settings.is_feature_enabled(FEATURE_TEMPLATE_ENGINE) {
        TemplateOptions::with_variables(json!({ "location": options.url.as_str() }))
    } else {
        TemplateOptions::disabled()
    };
    let repository = load_repository(settings, repo);
    let mut configuration = load_configuration(file, &template)
        .with_repository(&repository)
        .with_enabled(true);
    configuration.update_values(parse_overrides(&options.set));

    let mut tree = MemoryTree::new(options.url.as_str());
    let field = tree.append_field(tree.root(), "textarea", &options.text);

    if !options.force && !configuration.is_enabled_for_url(&options.url) {
        eprintln!(
            "{} does not apply to {}, leaving the text unchanged (use --force)",
            configuration.name(),
            options.url
        );
        println!("{}", options.text);
        return;
    }

    let passes = options.watch_count.max(1);
    let mut undo = Vec::new();
    for pass in 0..passes {
        if pass > 0 {
            thread::sleep(Duration::from_millis(settings.monkey_interval));
        }
        match configuration.apply_default(&mut tree, field) {
            Ok(records) => {
                tracing::debug!(pass, changes = records.len(), "pass finished");
                undo.extend(records);
            }
            Err(e) => fail(format!("Compile error: {}", e)),
        }
    }

    println!("{}", tree.get(field, mnky_tree::DEFAULT_PROPERTY).unwrap_or_default());

    if settings.is_feature_enabled(FEATURE_UNDO) {
        eprintln!("{} change(s)", undo.len());
        match serde_json::to_string(&undo) {
            Ok(json) => eprintln!("{}", json),
            Err(e) => fail(format!("Error serializing output: {}", e)),
        }
        let restored = undo_all(&undo, &mut tree);
        eprintln!(
            "undo ({} restored): {}",
            restored,
            tree.get(field, mnky_tree::DEFAULT_PROPERTY).unwrap_or_default()
        );
    }
}

fn run_intercept(
    settings: &Settings,
    file: &Path,
    repo: Option<PathBuf>,
    request: &str,
    resource_type: &str,
    page_url: &str,
) {
    let repository = load_repository(settings, repo);
    let configuration =
        load_configuration(file, &TemplateOptions::disabled()).with_repository(&repository);
    let request = UrlRequest {
        url: request,
        resource_type,
        page_url,
    };
    match configuration.intercept(&request) {
        Ok(Some(action)) => print_json(&action),
        Ok(None) => println!("null"),
        Err(e) => fail(format!("Compile error: {}", e)),
    }
}

fn run_new(settings: &Settings, file: &Path) {
    if file.exists() {
        fail(format!("{} already exists", file.display()));
    }
    if let Err(e) = fs::write(file, &settings.base_template) {
        fail(format!("Error writing {}: {}", file.display(), e));
    }
    println!("Created {}", file.display());
}

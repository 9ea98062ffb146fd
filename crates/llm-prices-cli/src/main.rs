mod server;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use llm_prices_core::{
    view::{self, ProviderFilter, SortKey, SortState, ViewOptions, SORT_KEYS},
    Aggregator, Catalog, Credentials, Endpoints, ModelRecord, ProviderKind, ProviderOutcome,
    PROVIDERS,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ── Palette ──────────────────────────────────────────────────────────

fn s_header() -> Style { Style::new().color256(252).bold() }  // bright gray, bold
fn s_dim() -> Style    { Style::new().color256(248) }         // light gray
fn s_tree() -> Style   { Style::new().color256(245) }         // mid gray
fn s_hint() -> Style   { Style::new().color256(243) }         // soft gray
fn s_free() -> Style   { Style::new().color256(114) }         // green
fn s_warn() -> Style   { Style::new().color256(214) }         // amber
fn s_err() -> Style    { Style::new().color256(167) }         // red
fn s_price() -> Style  { Style::new().color256(109) }         // teal
fn s_bold() -> Style   { Style::new().bold() }
fn s_label() -> Style  { Style::new().color256(146) }         // muted lavender

fn sep(width: usize) -> String {
    s_tree().apply_to("\u{2500}".repeat(width)).to_string()
}

// ── CLI Args ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "llm-prices",
    about = "Compare LLM pricing across OpenRouter, Together AI, Groq, Replicate and Hugging Face",
    version,
    after_help = "examples:\n  \
        llm-prices                               (all models, sorted by name)\n  \
        llm-prices list --free                   (free models only)\n  \
        llm-prices list --provider Groq --sort prompt_price\n  \
        llm-prices list --sort stars --desc\n  \
        llm-prices show meta-llama/Llama-3.3-70B-Instruct\n  \
        llm-prices providers                     (which credentials are set)\n  \
        llm-prices serve --port 3000             (GET /api/models)\n\n\
        credentials are read from OPENROUTER_API_KEY, TOGETHER_API_KEY, GROQ_API_KEY,\n\
        REPLICATE_API_TOKEN, HF_TOKEN and GITHUB_PAT"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Catalog TOML to use instead of the bundled one.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(clap::Args, Default)]
struct ListArgs {
    /// Provider label or id, e.g. "Together AI" or groq. "All" disables the filter.
    #[arg(long, short, default_value = view::ALL_PROVIDERS)]
    provider: String,
    /// Only models whose prompt and completion prices are both zero.
    #[arg(long)]
    free: bool,
    /// provider, model, context_length, prompt_price, completion_price, stars, hf_likes
    #[arg(long, short, default_value = "model")]
    sort: SortKey,
    /// Sort descending.
    #[arg(long)]
    desc: bool,
    #[arg(long, short)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Comparison table of every model.
    List(ListArgs),
    /// All fields of one model.
    Show {
        model: String,
        #[arg(long, short)]
        provider: Option<String>,
    },
    /// Which providers are enabled, and what they returned.
    Providers {
        /// Also fetch each enabled provider and report its outcome.
        #[arg(long)]
        check: bool,
    },
    /// Serve the aggregated list over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, short, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("llm_prices=info,llm_prices_core=info,warp=info")
        })
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::bundled()?,
    };
    let aggregator = Aggregator::new(Endpoints::default(), catalog, Credentials::from_env())?;

    match cli.command {
        None => cmd_list(&aggregator, &ListArgs::default()).await?,
        Some(Commands::List(args)) => cmd_list(&aggregator, &args).await?,
        Some(Commands::Show { model, provider }) => {
            cmd_show(&aggregator, &model, provider.as_deref()).await?;
        }
        Some(Commands::Providers { check }) => cmd_providers(&aggregator, check).await,
        Some(Commands::Serve { host, port }) => {
            let addr = SocketAddr::new(host, port);
            server::run(Arc::new(aggregator), addr)
                .await
                .with_context(|| format!("cannot serve on {addr}"))?;
        }
    }
    Ok(())
}

/// `--provider` value to a filter; unknown providers are an error.
fn provider_filter(name: &str) -> anyhow::Result<ProviderFilter> {
    if ProviderFilter::from(name) == ProviderFilter::All {
        return Ok(ProviderFilter::All);
    }
    match ProviderKind::find(name) {
        Some(kind) => Ok(ProviderFilter::Named(kind.display_name().to_string())),
        None => {
            let known: Vec<_> = PROVIDERS.iter().map(|p| p.display_name).collect();
            anyhow::bail!("unknown provider '{name}' (expected one of: {})", known.join(", "))
        }
    }
}

async fn fetch_all(aggregator: &Aggregator) -> anyhow::Result<Vec<ModelRecord>> {
    let term = Term::stderr();
    let interactive = term.is_term();
    if interactive {
        term.write_line(&format!("{}", s_dim().apply_to("loading...")))?;
    }
    let models = aggregator.collect().await;
    if interactive {
        term.clear_last_lines(1)?;
    }
    Ok(models)
}

// ── List ─────────────────────────────────────────────────────────────

async fn cmd_list(aggregator: &Aggregator, args: &ListArgs) -> anyhow::Result<()> {
    let provider = provider_filter(&args.provider)?;
    let models = fetch_all(aggregator).await?;
    let opts = ViewOptions {
        provider,
        free_only: args.free,
        sort: SortState {
            key: args.sort,
            ascending: !args.desc,
        },
    };
    let rows = view::apply(&models, &opts);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if models.is_empty() {
        eprintln!("{}", s_err().apply_to("error: no models fetched"));
        eprintln!();
        eprintln!(
            "{}",
            s_dim().apply_to("  Set at least one provider credential, see llm-prices providers")
        );
        return Ok(());
    }

    println!();
    println!(
        "{}  {}",
        s_header().apply_to("LLM price comparison"),
        s_hint().apply_to(format!(
            "last updated {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ))
    );
    println!("{}", sep(96));

    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header: Vec<Cell> = SORT_KEYS
        .iter()
        .map(|k| {
            let arrow = opts.sort.arrow(*k);
            let text = if arrow.is_empty() {
                k.label().to_string()
            } else {
                format!("{} {arrow}", k.label())
            };
            Cell::new(text).fg(Color::AnsiValue(243))
        })
        .collect();
    header.push(Cell::new("Description").fg(Color::AnsiValue(243)));
    table.set_header(header);

    for r in &rows {
        let model = if r.is_free() {
            format!("{} {}", r.model, s_free().apply_to("Free"))
        } else {
            r.model.clone()
        };
        table.add_row(vec![
            Cell::new(&r.provider).fg(Color::AnsiValue(146)),
            Cell::new(model).fg(Color::AnsiValue(252)),
            Cell::new(view::fmt_count(r.context_length)).fg(Color::AnsiValue(248)),
            Cell::new(view::fmt_price(r.prompt_price)).fg(Color::AnsiValue(109)),
            Cell::new(view::fmt_price(r.completion_price)).fg(Color::AnsiValue(109)),
            Cell::new(view::fmt_count(r.stars)).fg(Color::AnsiValue(248)),
            Cell::new(view::fmt_count(r.hf_likes)).fg(Color::AnsiValue(248)),
            Cell::new(truncate(&r.description, 60)).fg(Color::AnsiValue(245)),
        ]);
    }
    println!("{table}");

    println!("{}", sep(96));
    let providers = view::provider_options(&models);
    println!(
        "{}",
        s_hint().apply_to(format!(
            "  {}   providers: {}",
            view::fmt_summary(rows.len()),
            providers.join(", ")
        ))
    );
    println!();
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.is_empty() {
        return "\u{2014}".to_string();
    }
    let first_line = s.lines().next().unwrap_or("");
    if first_line.chars().count() <= max {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    }
}

// ── Show ─────────────────────────────────────────────────────────────

async fn cmd_show(
    aggregator: &Aggregator,
    model: &str,
    provider: Option<&str>,
) -> anyhow::Result<()> {
    let filter = provider_filter(provider.unwrap_or(view::ALL_PROVIDERS))?;
    let models = fetch_all(aggregator).await?;
    let matches: Vec<&ModelRecord> = models
        .iter()
        .filter(|r| filter.matches(r) && r.model.eq_ignore_ascii_case(model))
        .collect();

    if matches.is_empty() {
        eprintln!(
            "{}",
            s_err().apply_to(format!("error: no model named '{model}'"))
        );
        let close: Vec<&str> = models
            .iter()
            .filter(|r| r.model.to_lowercase().contains(&model.to_lowercase()))
            .map(|r| r.model.as_str())
            .take(5)
            .collect();
        if !close.is_empty() {
            eprintln!();
            eprintln!("{}", s_dim().apply_to("  Did you mean:"));
            for c in close {
                eprintln!("{}", s_dim().apply_to(format!("    {c}")));
            }
        }
        return Ok(());
    }

    for r in matches {
        println!();
        let badge = if r.is_free() {
            s_free().apply_to(" Free").to_string()
        } else {
            String::new()
        };
        println!("{}{badge}", s_bold().apply_to(&r.model));
        println!("{}", sep(64));
        let field = |label: &str, value: String| {
            println!("  {:<18} {}", s_label().apply_to(label), value);
        };
        field("provider", r.provider.clone());
        field("context", view::fmt_count(r.context_length));
        field("prompt $/1M", s_price().apply_to(view::fmt_price(r.prompt_price)).to_string());
        field(
            "completion $/1M",
            s_price().apply_to(view::fmt_price(r.completion_price)).to_string(),
        );
        field("github stars", view::fmt_count(r.stars));
        field("hf likes", view::fmt_count(r.hf_likes));
        if !r.description.is_empty() {
            println!();
            for line in r.description.lines() {
                println!("  {}", s_dim().apply_to(line));
            }
        }
        println!("{}", sep(64));
    }
    println!();
    Ok(())
}

// ── Providers ────────────────────────────────────────────────────────

async fn cmd_providers(aggregator: &Aggregator, check: bool) {
    let creds = aggregator.credentials();
    let outcomes = if check {
        Some(aggregator.collect_with_outcomes().await.1)
    } else {
        None
    };

    println!();
    println!("{}", s_header().apply_to("providers"));
    println!("{}", sep(64));

    for p in PROVIDERS {
        let status = if creds.is_enabled(p.kind) {
            s_free().apply_to("enabled ")
        } else {
            s_dim().apply_to("disabled")
        };
        let outcome = outcomes
            .as_ref()
            .and_then(|all| all.iter().find(|(k, _)| *k == p.kind))
            .map(|(_, o)| match o {
                ProviderOutcome::Skipped => String::new(),
                ProviderOutcome::Fetched(n) => {
                    s_price().apply_to(view::fmt_summary(*n)).to_string()
                }
                ProviderOutcome::Failed(reason) => {
                    s_err().apply_to(truncate(reason, 48)).to_string()
                }
            })
            .unwrap_or_default();
        println!(
            "  {:<14} {}  {:<22} {}",
            s_bold().apply_to(p.display_name),
            status,
            s_dim().apply_to(p.credential_env),
            outcome
        );
    }

    let gh = if creds.github.is_some() {
        s_free().apply_to("set")
    } else {
        s_warn().apply_to("unset (anonymous rate limit)")
    };
    println!("{}", sep(64));
    println!("  {:<14} {}", s_bold().apply_to("GitHub stars"), gh);
    println!(
        "{}",
        s_hint().apply_to("  llm-prices providers --check   fetch and report each provider")
    );
    println!();
}

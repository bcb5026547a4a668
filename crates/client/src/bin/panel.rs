use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use client::{
    ActionOutcome, ActionRunner, FormState, LogNotifier, PanelAction, PanelClient, PanelConfig,
    RankEditor, RankEditorConfig, ResultPanel, SearchBox, SearchBoxConfig,
    search_box::NO_RESULTS_TEXT,
    traits::{AutoConfirm, Confirm},
};
use domain::dto::action::BulkStatusRequest;
use domain::dto::attempts::{
    AddAttemptRequest, AttemptLayout, FieldAttemptRow, HighJumpRow, UpdateAttemptsRequest,
};
use domain::dto::game::EditGameRequest;
use domain::models::attempt::best_attempt;
use domain::models::performance::{EventKind, PerformanceCheck, validate_performance};
use domain::models::{Compatibility, CompatibilityContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "panel")]
#[command(about = "Results administration panel client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "PANEL_BASE_URL", global = true)]
    base_url: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search athletes or guides the way the result form does
    Search {
        query: String,

        /// Event used to narrow the candidate list
        #[arg(long)]
        event: Option<String>,

        /// Event classes, e.g. "T46, T47", for compatibility warnings
        #[arg(long)]
        classes: Option<String>,

        /// Event gender for compatibility warnings
        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        guides: bool,

        /// Candidate id to select from the results
        #[arg(long)]
        select: Option<String>,
    },
    /// Save a manual ranking
    Rank {
        #[arg(long)]
        game: String,

        /// Result ids in their current order, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        rows: Vec<String>,

        #[command(flatten)]
        change: RankChange,
    },
    /// Run a game-level action
    Action {
        kind: GameAction,

        #[arg(long)]
        game: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    EditGame {
        #[arg(long)]
        game: String,

        /// Game fields as a JSON object
        #[arg(long)]
        json: String,
    },
    /// Replace the attempts of one result
    UpdateAttempts {
        #[arg(long)]
        result: String,

        /// Event name; "High Jump" switches to height/mark attempts
        #[arg(long)]
        event: String,

        /// `VALUE[@WIND]` for field events, `HEIGHT:MARK` for High Jump
        #[arg(long = "attempt")]
        attempts: Vec<String>,

        #[arg(long, default_value = "")]
        record: String,

        #[arg(long, default_value = "")]
        weight: String,

        #[arg(long, default_value = "")]
        guide: String,
    },
    AddAttempt {
        #[arg(long)]
        result: String,

        #[arg(long)]
        height: String,

        #[arg(long)]
        mark: String,
    },
    DeleteResult {
        #[arg(long)]
        result: String,

        #[arg(short, long)]
        yes: bool,
    },
    BulkStatus {
        #[arg(long)]
        status: String,

        #[arg(long, value_delimiter = ',')]
        results: Vec<String>,

        #[arg(short, long)]
        yes: bool,
    },
    /// Validate a performance value offline
    CheckPerformance {
        value: String,

        #[arg(long)]
        track: bool,
    },
    /// Print the best of a list of attempts offline
    BestAttempt { attempts: Vec<String> },
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct RankChange {
    /// New order of the result ids, comma separated
    #[arg(long, value_delimiter = ',')]
    order: Option<Vec<String>>,

    /// Move one row, `FROM:TO` as 0-based positions
    #[arg(long = "move")]
    move_row: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GameAction {
    Publish,
    AutoRank,
    SelectFinalists,
    RecalculateRaza,
    RecalculateHighJump,
    ToggleOfficial,
}

impl GameAction {
    fn into_action(self, game_id: String) -> PanelAction {
        match self {
            Self::Publish => PanelAction::Publish { game_id },
            Self::AutoRank => PanelAction::AutoRank { game_id },
            Self::SelectFinalists => PanelAction::SelectFinalists { game_id },
            Self::RecalculateRaza => PanelAction::RecalculateRaza { game_id },
            Self::RecalculateHighJump => PanelAction::RecalculateHighJump { game_id },
            Self::ToggleOfficial => PanelAction::ToggleOfficial { game_id },
        }
    }
}

/// Asks on the terminal; anything but "y"/"yes" declines.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("panel={},client={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &cli.command {
        Commands::CheckPerformance { value, track } => {
            check_performance(value, *track);
            return Ok(());
        }
        Commands::BestAttempt { attempts } => {
            match best_attempt(attempts.iter().map(String::as_str)) {
                Some(best) => println!("{}", best),
                None => println!("No valid attempt"),
            }
            return Ok(());
        }
        _ => {}
    }

    let config = PanelConfig::load(cli.base_url.clone())?;
    let client = Arc::new(PanelClient::new(config).context("Failed to build HTTP client")?);

    match cli.command {
        Commands::Search {
            query,
            event,
            classes,
            gender,
            guides,
            select,
        } => {
            let search = SearchRequest {
                query,
                event,
                classes,
                gender,
                guides,
                select,
            };
            handle_search(client, search).await?;
        }
        Commands::Rank { game, rows, change } => {
            handle_rank(client, game, rows, change).await?;
        }
        Commands::Action { kind, game, yes } => {
            run_action(client, kind.into_action(game), yes).await?;
        }
        Commands::EditGame { game, json } => {
            let request: EditGameRequest =
                serde_json::from_str(&json).context("Game fields must be a JSON object")?;
            run_action(
                client,
                PanelAction::EditGame {
                    game_id: game,
                    request,
                },
                true,
            )
            .await?;
        }
        Commands::UpdateAttempts {
            result,
            event,
            attempts,
            record,
            weight,
            guide,
        } => {
            let request = build_attempts(&event, &attempts, &record, &weight, &guide)?;
            tracing::info!("Sending {} attempts", request.attempt_count());
            run_action(
                client,
                PanelAction::UpdateAttempts {
                    result_id: result,
                    request,
                },
                true,
            )
            .await?;
        }
        Commands::AddAttempt {
            result,
            height,
            mark,
        } => {
            let request = AddAttemptRequest::from_form(&height, &mark)?;
            run_action(
                client,
                PanelAction::AddAttempt {
                    result_id: result,
                    request,
                },
                true,
            )
            .await?;
        }
        Commands::DeleteResult { result, yes } => {
            run_action(client, PanelAction::DeleteResult { result_id: result }, yes).await?;
        }
        Commands::BulkStatus {
            status,
            results,
            yes,
        } => {
            let request = BulkStatusRequest::new(status, results)?;
            run_action(client, PanelAction::BulkUpdateStatus(request), yes).await?;
        }
        Commands::CheckPerformance { .. } | Commands::BestAttempt { .. } => {}
    }

    Ok(())
}

struct SearchRequest {
    query: String,
    event: Option<String>,
    classes: Option<String>,
    gender: Option<String>,
    guides: bool,
    select: Option<String>,
}

async fn handle_search(client: Arc<PanelClient>, request: SearchRequest) -> anyhow::Result<()> {
    let mut config = if request.guides {
        SearchBoxConfig::guide()
    } else {
        SearchBoxConfig::athlete()
    };
    config = config.with_debounce(client.config().search_debounce);
    if let Some(event) = &request.event {
        config = config.with_context_filter(event.clone());
    }
    if request.classes.is_some() || request.gender.is_some() {
        config = config.with_compatibility(CompatibilityContext::from_class_list(
            request.classes.as_deref().unwrap_or_default(),
            request.gender.clone().unwrap_or_default(),
        ));
    }

    let mut fields = vec![config.target_field.clone()];
    fields.extend(config.clears_on_select.iter().cloned());
    let form = Arc::new(FormState::with_fields(fields));

    let wait = client.config().timeout + config.debounce;
    let search_box = SearchBox::new(config, client, form.clone());
    let mut panel = search_box.subscribe();

    search_box.on_input(&request.query);
    if !search_box.is_search_pending() {
        bail!("Query '{}' is too short to search", request.query.trim());
    }

    let shown = tokio::time::timeout(wait, panel.wait_for(ResultPanel::is_visible))
        .await
        .context("Timed out waiting for search results")?
        .context("Search box closed")?
        .clone();

    let classification = match shown {
        ResultPanel::Results(classification) => classification,
        ResultPanel::NoResults => {
            println!("{}", NO_RESULTS_TEXT);
            return Ok(());
        }
        ResultPanel::Failed(message) => bail!(message),
        ResultPanel::Hidden => return Ok(()),
    };

    for bucket in &classification.buckets {
        println!("{}", bucket.label);
        for entry in &bucket.entries {
            let marker = match entry.compatibility {
                Compatibility::Compatible => "",
                other => other.as_str(),
            };
            println!("  {}  {}", entry.candidate.summary(), marker);
        }
    }

    if let Some(id) = request.select {
        let entry = classification
            .find(&id)
            .with_context(|| format!("Candidate {} is not in the results", id))?;
        let selected = search_box.on_select(&entry.candidate);
        println!();
        println!("{}", selected.selection.display);
        if let Some(banner) = selected.banner {
            println!("{}", banner);
        }
        tracing::debug!("Form after selection: {:?}", form.snapshot());
    }

    Ok(())
}

async fn handle_rank(
    client: Arc<PanelClient>,
    game: String,
    rows: Vec<String>,
    change: RankChange,
) -> anyhow::Result<()> {
    let editor = RankEditor::new(
        RankEditorConfig::new(game),
        rows,
        client,
        Arc::new(LogNotifier),
    )?;

    let handle = match (change.order, change.move_row) {
        (Some(order), _) => editor.on_reorder(&order)?,
        (None, Some(spec)) => {
            let (from, to) = parse_move(&spec)?;
            editor.on_move(from, to)?
        }
        (None, None) => bail!("Either --order or --move is required"),
    };

    for row in editor.rows() {
        println!("{:>3}  {}", row.rank, row.row_id);
    }

    let outcome = handle.await.context("Ranking task failed")?;
    if !outcome.is_success() {
        bail!("Ranking was not saved; reload the page to see the server order");
    }

    Ok(())
}

fn parse_move(spec: &str) -> anyhow::Result<(usize, usize)> {
    let (from, to) = spec
        .split_once(':')
        .with_context(|| format!("Invalid move '{}', expected FROM:TO", spec))?;
    let from = from.trim().parse().context("FROM must be a row position")?;
    let to = to.trim().parse().context("TO must be a row position")?;
    Ok((from, to))
}

fn build_attempts(
    event: &str,
    attempts: &[String],
    record: &str,
    weight: &str,
    guide: &str,
) -> anyhow::Result<UpdateAttemptsRequest> {
    match AttemptLayout::for_event(event) {
        AttemptLayout::HighJump => {
            let rows = attempts
                .iter()
                .map(|attempt| {
                    let (height, mark) = attempt.split_once(':').with_context(|| {
                        format!("Invalid High Jump attempt '{}', expected HEIGHT:MARK", attempt)
                    })?;
                    Ok(HighJumpRow {
                        height: height.trim().to_string(),
                        mark: mark.trim().to_string(),
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(UpdateAttemptsRequest::from_high_jump_rows(&rows, record, guide))
        }
        AttemptLayout::Field => {
            let rows: Vec<FieldAttemptRow> = attempts
                .iter()
                .map(|attempt| {
                    let (value, wind) = attempt.split_once('@').unwrap_or((attempt, ""));
                    FieldAttemptRow {
                        value: value.trim().to_string(),
                        wind: wind.trim().to_string(),
                    }
                })
                .collect();
            Ok(UpdateAttemptsRequest::from_field_rows(
                &rows, record, weight, guide,
            ))
        }
    }
}

async fn run_action(client: Arc<PanelClient>, action: PanelAction, yes: bool) -> anyhow::Result<()> {
    let confirm: Arc<dyn Confirm> = if yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(StdinConfirm)
    };
    let runner = ActionRunner::new(client, Arc::new(LogNotifier), confirm);

    match runner.run(action).await {
        ActionOutcome::Reload => println!("Done; reload the page to see the changes"),
        ActionOutcome::Removed(id) => println!("Result {} removed", id),
        ActionOutcome::Cancelled => println!("Cancelled"),
        ActionOutcome::Failed(message) => bail!(message),
    }

    Ok(())
}

fn check_performance(value: &str, track: bool) {
    let kind = if track { EventKind::Track } else { EventKind::Field };
    match validate_performance(value, kind) {
        PerformanceCheck::Valid => println!("valid"),
        PerformanceCheck::Invalid => println!("invalid"),
        PerformanceCheck::Empty => println!("empty"),
    }
}

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use auction_client::HttpClient;
use auction_core::{
    AuctionStatus, Countdown, CountdownEngine, CountdownSchedule, DataSync, FetchError,
    Snapshot, StatusOptions, SystemClock,
};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::warn;

mod logging;
mod render;
mod settings;

use logging::init_logging;
use render::render_status;
use settings::Settings;

const TOKEN_FILE: &str = ".auction_token";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Parser)]
#[command(name = "auction-cli", version, about = "Детальная страница аукциона в терминале")]
struct Cli {
    /// Адрес сервера (по умолчанию AUCTION_API_URL).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Bearer-токен; по умолчанию читается из .auction_token.
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Показать аукцион.
    Show {
        #[arg(long)]
        id: String,
        /// Страница ставок, начиная с 1.
        #[arg(long)]
        page: Option<usize>,
        /// Обновлять отсчёт каждую секунду до Ctrl+C.
        #[arg(long)]
        watch: bool,
        /// Не ждать профиль пользователя.
        #[arg(long)]
        anonymous: bool,
    },
    /// Удалить аукцион (только для администратора).
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Сохранить токен в .auction_token.
    Token {
        #[arg(long)]
        value: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env()?.with_server(cli.server);
    init_logging(&settings.log_level)?;

    let token = match cli.token.as_deref().and_then(parse_token_content) {
        Some(token) => Some(token),
        None => load_token().context("не удалось прочитать .auction_token")?,
    };

    match cli.command {
        Command::Show {
            id,
            page,
            watch,
            anonymous,
        } => {
            let options = StatusOptions {
                anonymous_viewing: anonymous,
            };
            let sync = DataSync::new(build_api(&settings, token.as_deref())?, token);
            if watch {
                watch_auction(sync, &id, page, options).await?;
            } else {
                show_auction(sync, &id, page, options).await?;
            }
        }
        Command::Delete { id } => {
            let sync = DataSync::new(build_api(&settings, token.as_deref())?, token);
            delete_auction(sync, &id).await?;
        }
        Command::Token { value } => {
            let Some(token) = parse_token_content(&value) else {
                bail!("токен не может быть пустым");
            };
            fs::write(TOKEN_FILE, token).context("не удалось сохранить токен")?;
            println!("Токен сохранён в {TOKEN_FILE}");
        }
    }

    Ok(())
}

fn build_api(settings: &Settings, token: Option<&str>) -> Result<Arc<HttpClient>> {
    let mut client = HttpClient::new(settings.api_url.clone(), settings.http_timeout)
        .context("не удалось создать HTTP-клиент")?;
    if let Some(token) = token {
        client.set_token(token);
    }
    Ok(Arc::new(client))
}

async fn show_auction(
    mut sync: DataSync,
    id: &str,
    page: Option<usize>,
    options: StatusOptions,
) -> Result<()> {
    sync.mount(id);
    sync.settled().await;
    apply_page(&sync, page);

    let engine = CountdownEngine::new(SystemClock);
    print!("{}", render_snapshot(&sync.snapshot(), &engine, options));
    Ok(())
}

async fn watch_auction(
    mut sync: DataSync,
    id: &str,
    page: Option<usize>,
    options: StatusOptions,
) -> Result<()> {
    let engine = CountdownEngine::new(SystemClock);
    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let mut schedule = CountdownSchedule::new(tick_tx);
    let mut updates = sync.subscribe();
    let mut page_pending = page;

    sync.mount(id);

    loop {
        let snapshot = sync.snapshot();
        if snapshot.bids.is_settled() {
            if let Some(page) = page_pending.take() {
                apply_page(&sync, Some(page));
                continue;
            }
        }

        schedule.sync(snapshot.auction.ready().is_some());

        {
            let mut stdout = io::stdout().lock();
            write!(
                stdout,
                "{CLEAR_SCREEN}{}",
                render_snapshot(&snapshot, &engine, options)
            )?;
            stdout.flush()?;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            tick = ticks.recv() => {
                if tick.is_none() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    schedule.stop();
    sync.unmount();
    Ok(())
}

async fn delete_auction(mut sync: DataSync, id: &str) -> Result<()> {
    sync.mount(id);
    sync.settled().await;

    let snapshot = sync.snapshot();
    let engine = CountdownEngine::new(SystemClock);
    let countdown = countdown_for(&snapshot, &engine);
    match snapshot.status(countdown, StatusOptions::default()) {
        AuctionStatus::Ready(view) if view.admin_controls.is_some() => {}
        AuctionStatus::Ready(_) => bail!("удаление доступно только администратору"),
        AuctionStatus::LoadingProfile => {
            bail!("требуется авторизация: выполните `auction-cli token --value ...`")
        }
        AuctionStatus::NotFound | AuctionStatus::Redirected(_) => bail!("аукцион не найден"),
    }

    let redirect = sync.delete().await.map_err(map_fetch_error)?;
    println!("Аукцион удалён: id={id}");
    println!("Переход: {redirect}");
    Ok(())
}

fn apply_page(sync: &DataSync, page: Option<usize>) {
    if let Some(page) = page {
        if !sync.go_to_page(page) {
            warn!(page, "requested bid page is out of range, staying on current page");
        }
    }
}

fn countdown_for(
    snapshot: &Snapshot,
    engine: &CountdownEngine<SystemClock>,
) -> Countdown {
    snapshot
        .end_date()
        .map(|end| engine.remaining(end))
        .unwrap_or_default()
}

fn render_snapshot(
    snapshot: &Snapshot,
    engine: &CountdownEngine<SystemClock>,
    options: StatusOptions,
) -> String {
    let countdown = countdown_for(snapshot, engine);
    render_status(&snapshot.status(countdown, options))
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn map_fetch_error(err: FetchError) -> anyhow::Error {
    let message = match err {
        FetchError::Unauthorized => {
            "требуется авторизация: выполните `auction-cli token --value ...`".to_string()
        }
        FetchError::NotFound(message) => format!("ресурс не найден: {message}"),
        FetchError::Transport(message) => format!("ошибка HTTP: {message}"),
        FetchError::Decode(message) => format!("некорректный ответ сервера: {message}"),
        FetchError::Invalid(err) => format!("некорректные данные: {err}"),
    };
    anyhow::anyhow!(message)
}

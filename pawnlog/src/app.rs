use crate::config::Settings;
use crate::games::{GameCatalogStore, DEFAULT_SYNC_MAX_GAMES};
use crate::session::handshake::{CallbackHandshake, HandshakeOutcome, StateStash};
use crate::session::snapshot::SnapshotStore;
use crate::session::SessionStore;
use anyhow::Result;
use pawnlog_api::models::{Game, GameFilters, User};
use pawnlog_api::{ApiClient, TokenStore};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use url::Url;

enum AppEvent {
    SessionInvalidated,
}

type InputLines = Lines<BufReader<Stdin>>;

/// Line-oriented front end over the session and game catalog stores.
pub struct App {
    api: Arc<ApiClient>,
    session: SessionStore,
    games: GameCatalogStore,
    stash: StateStash,
    events: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub async fn new(settings: &Settings) -> Result<Self> {
        let token_store = TokenStore::new()?;
        let api = Arc::new(ApiClient::new(settings.api_base(), token_store)?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        {
            let event_tx = event_tx.clone();
            api.on_session_invalidated(move || {
                let _ = event_tx.send(AppEvent::SessionInvalidated);
            });
        }

        let session = SessionStore::new(api.clone(), SnapshotStore::new()?).await;
        let games = GameCatalogStore::new(api.clone());

        Ok(Self {
            api,
            session,
            games,
            stash: StateStash::new(),
            events: event_rx,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        // Resume a persisted session if the stored token is still good
        self.session.fetch_user().await;
        self.print_greeting();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            self.drain_events().await;

            let mut words = line.split_whitespace();
            let Some(command) = words.next() else {
                continue;
            };
            let args: Vec<&str> = words.collect();

            match command {
                "help" => print_help(),
                "login" => self.cmd_login(&mut lines).await,
                "logout" => self.cmd_logout().await,
                "profile" => self.cmd_profile(),
                "refresh" => self.cmd_refresh().await,
                "user" => self.cmd_user(&args).await,
                "games" => self.cmd_games(&args).await,
                "more" => self.cmd_more().await,
                "game" => self.cmd_game(&args).await,
                "filter" => self.cmd_filter(&args).await,
                "nofilter" => self.cmd_nofilter().await,
                "sync" => self.cmd_sync(&args).await,
                "stats" => self.cmd_stats().await,
                "quit" | "exit" => break,
                other => println!("Unknown command '{other}'. Try 'help'."),
            }

            self.drain_events().await;
        }

        Ok(())
    }

    async fn drain_events(&mut self) {
        let mut invalidated = false;
        while let Ok(event) = self.events.try_recv() {
            match event {
                AppEvent::SessionInvalidated => invalidated = true,
            }
        }
        if invalidated {
            println!("Session expired; you have been signed out.");
            self.session.fetch_user().await;
        }
    }

    fn print_greeting(&self) {
        match self.session.user() {
            Some(user) => println!("Signed in as {}.", user.username),
            None => println!("Not signed in. Use 'login' to connect your account."),
        }
        println!("Type 'help' for commands.");
    }

    async fn cmd_login(&mut self, lines: &mut InputLines) {
        if self.session.is_authenticated() {
            if let Some(user) = self.session.user() {
                println!("Already signed in as {}.", user.username);
                return;
            }
        }

        let start = match self.api.start_oauth().await {
            Ok(start) => start,
            Err(e) => {
                println!("Could not start login: {}", e.surface("Failed to start login"));
                return;
            }
        };
        self.stash.put(start.state.clone());

        if open::that(&start.auth_url).is_ok() {
            println!("Browser opened. Authorize the application, then come back here.");
        } else {
            println!("Open this URL in your browser to authorize:");
        }
        println!("{}\n", start.auth_url);
        println!("Paste the full redirect URL here once you are sent back:");

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            _ => return,
        };
        let callback = match Url::parse(line.trim()) {
            Ok(url) => url,
            Err(e) => {
                println!("That does not look like a URL: {e}");
                return;
            }
        };

        let mut handshake = CallbackHandshake::new();
        match handshake
            .run(&callback, &mut self.stash, &mut self.session)
            .await
        {
            Ok(HandshakeOutcome::Completed) => {
                if let Some(user) = self.session.user() {
                    println!("Authentication successful. Welcome, {}!", user.username);
                }
            }
            Ok(HandshakeOutcome::AlreadyHandled) => {}
            Err(e) => println!("Authentication failed: {e}"),
        }
    }

    async fn cmd_logout(&mut self) {
        self.session.logout().await;
        println!("Signed out.");
    }

    fn cmd_profile(&self) {
        match self.session.user() {
            Some(user) => print_user(user),
            None => println!("Not signed in."),
        }
        if let Some(error) = self.session.error() {
            println!("Note: {error}");
        }
    }

    async fn cmd_refresh(&mut self) {
        if !self.session.is_authenticated() {
            println!("Not signed in.");
            return;
        }
        self.session.refresh_user().await;
        match self.session.error() {
            Some(error) => println!("Refresh failed: {error}"),
            None => {
                println!("Profile refreshed from the platform.");
                if let Some(user) = self.session.user() {
                    print_user(user);
                }
            }
        }
    }

    async fn cmd_user(&self, args: &[&str]) {
        let Some(username) = args.first() else {
            println!("Usage: user <username>");
            return;
        };
        match self.api.user_profile(username).await {
            Ok(user) => print_user(&user),
            Err(e) => println!("Could not load {}: {}", username, e.surface("lookup failed")),
        }
    }

    async fn cmd_games(&mut self, args: &[&str]) {
        let page = args.first().and_then(|a| a.parse().ok()).unwrap_or(1);
        self.games.fetch_games(page, false).await;
        self.print_games();
    }

    async fn cmd_more(&mut self) {
        if !self.games.state().has_more {
            println!("No more games.");
            return;
        }
        let next = self.games.state().page + 1;
        self.games.fetch_games(next, true).await;
        self.print_games();
    }

    async fn cmd_game(&self, args: &[&str]) {
        let Some(id) = args.first() else {
            println!("Usage: game <id>");
            return;
        };
        match self.api.game(id).await {
            Ok(game) => print_game_detail(&game),
            Err(e) => println!("Could not load game: {}", e.surface("lookup failed")),
        }
    }

    async fn cmd_filter(&mut self, args: &[&str]) {
        if args.is_empty() {
            println!("Usage: filter [perf=<type>] [result=win|loss|draw] [rated=true|false]");
            return;
        }
        let filters = match parse_filters(args) {
            Ok(filters) => filters,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        self.games.set_filters(filters).await;
        self.print_games();
    }

    async fn cmd_nofilter(&mut self) {
        self.games.reset_filters().await;
        self.print_games();
    }

    async fn cmd_sync(&mut self, args: &[&str]) {
        let max_games = args
            .first()
            .and_then(|a| a.parse().ok())
            .unwrap_or(DEFAULT_SYNC_MAX_GAMES);
        println!("Syncing up to {max_games} games...");
        match self.games.sync_games(max_games).await {
            Ok(report) => {
                println!(
                    "Sync finished: {} fetched, {} new.",
                    report.fetched, report.saved
                );
                self.print_games();
            }
            Err(_) => {
                if let Some(error) = self.games.error() {
                    println!("Sync failed: {error}");
                }
            }
        }
    }

    async fn cmd_stats(&mut self) {
        self.games.fetch_stats().await;
        match &self.games.state().stats {
            Some(stats) => {
                println!(
                    "{} games: {} wins / {} losses / {} draws ({:.1}% win rate)",
                    stats.total,
                    stats.results.win,
                    stats.results.loss,
                    stats.results.draw,
                    stats.win_rate
                );
                for (perf, count) in &stats.by_type {
                    println!("  {perf:<14} {count}");
                }
            }
            None => println!("Stats are unavailable right now."),
        }
    }

    fn print_games(&self) {
        if let Some(error) = self.games.error() {
            println!("Error: {error}");
            return;
        }
        let state = self.games.state();
        if state.games.is_empty() {
            println!("No games. Try 'sync' to pull them from the platform.");
            return;
        }
        for game in &state.games {
            print_game_row(game);
        }
        let suffix = if state.has_more {
            " — 'more' to load the next page"
        } else {
            ""
        };
        println!(
            "Page {} · showing {} of {} games{}",
            state.page,
            state.games.len(),
            state.total,
            suffix
        );
        if !state.filters.is_empty() {
            println!("(filters active — 'nofilter' to clear)");
        }
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  login                 sign in with your chess-platform account");
    println!("  logout                sign out");
    println!("  profile               show your profile and ratings");
    println!("  refresh               re-pull your profile from the platform");
    println!("  user <name>           look up another player");
    println!("  games [page]          list your games");
    println!("  more                  append the next page");
    println!("  game <id>             show one game");
    println!("  filter k=v ...        set filters (perf, result, rated)");
    println!("  nofilter              clear filters");
    println!("  sync [n]              pull up to n new games (default {DEFAULT_SYNC_MAX_GAMES})");
    println!("  stats                 aggregate statistics");
    println!("  quit");
}

fn parse_filters(args: &[&str]) -> Result<GameFilters, String> {
    let mut filters = GameFilters::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            return Err(format!("Expected key=value, got '{arg}'"));
        };
        match key {
            "perf" | "perf_type" => filters.perf_type = Some(value.to_string()),
            "result" => filters.result = Some(value.parse()?),
            "rated" => {
                filters.rated = Some(
                    value
                        .parse()
                        .map_err(|_| format!("rated must be true or false, got '{value}'"))?,
                )
            }
            other => return Err(format!("Unknown filter '{other}'")),
        }
    }
    Ok(filters)
}

fn print_user(user: &User) {
    match &user.title {
        Some(title) => println!("{} {}", title, user.username),
        None => println!("{}", user.username),
    }
    if user.patron {
        println!("  patron");
    }
    let ratings = &user.ratings;
    let categories = [
        ("bullet", &ratings.bullet),
        ("blitz", &ratings.blitz),
        ("rapid", &ratings.rapid),
        ("classical", &ratings.classical),
        ("correspondence", &ratings.correspondence),
        ("chess960", &ratings.chess960),
        ("puzzle", &ratings.puzzle),
    ];
    for (name, rating) in categories {
        if let Some(rating) = rating {
            let prov = if rating.prov.unwrap_or(false) { "?" } else { "" };
            println!(
                "  {:<14} {:>4}{} ({} games)",
                name, rating.rating, prov, rating.games
            );
        }
    }
    if let Some(profile) = &user.profile {
        if let Some(bio) = &profile.bio {
            println!("  {bio}");
        }
    }
}

fn print_game_row(game: &Game) {
    let opponent = game.opponent_username.as_deref().unwrap_or("?");
    let rated = if game.rated { "rated" } else { "casual" };
    println!(
        "  {:<10} {:<4} {:>5} vs {:<20} {} {}",
        game.id,
        game.result,
        game.perf_type,
        opponent,
        rated,
        game.created_at.format("%Y-%m-%d")
    );
}

fn print_game_detail(game: &Game) {
    println!(
        "{} · {} · {} · {}",
        game.id,
        game.perf_type,
        if game.rated { "rated" } else { "casual" },
        game.created_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "  white: {} ({})",
        game.white_username,
        game.white_rating
            .map_or("unrated".to_string(), |r| r.to_string())
    );
    println!(
        "  black: {} ({})",
        game.black_username,
        game.black_rating
            .map_or("unrated".to_string(), |r| r.to_string())
    );
    println!(
        "  result: {} as {} ({})",
        game.result, game.user_color, game.status
    );
    if let Some(opening) = &game.opening_name {
        let eco = game.opening_eco.as_deref().unwrap_or("");
        println!("  opening: {eco} {opening}");
    }
    if let Some(url) = &game.lichess_url {
        println!("  {url}");
    }
}

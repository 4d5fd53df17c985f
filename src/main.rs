use cinefind::{
    Carousel, Catalog, CineFindError, Config, GENRES, Genre, Lookup, MoviePage, MovieSummary,
    PageContext, SortOrder, SubscriberList, Subscription, Toggled, Watchlist, WatchlistEntry,
    load_homepage, load_movie_page, open_store,
};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use dialoguer::Confirm;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cinefind")]
#[command(about = "CineFind - Discover movies and keep a watchlist")]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to config.toml in the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    Search { title: String },
    /// Show a movie with cast, trailer and recommendations
    Movie {
        /// IMDb identifier, e.g. tt0137523
        imdb_id: String,
    },
    /// Show the homepage carousels
    Home,
    /// List popular movies
    Popular,
    /// List movies trending today
    Trending,
    /// List movies now in theaters
    NowPlaying,
    /// List movies of a genre
    Genre {
        /// Genre name, e.g. "science fiction"; omit to list all genres
        name: Option<String>,
    },
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Subscribe an email address to the newsletter
    Subscribe { email: String },
    /// Remove an email address from the newsletter
    Unsubscribe { email: String },
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// Show saved movies
    List {
        #[arg(long, value_enum, default_value = "added")]
        sort: SortArg,
    },
    /// Save a movie, or remove it if already saved
    Toggle { imdb_id: String },
    /// Remove a saved movie
    Remove { imdb_id: String },
    /// Remove every saved movie
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    /// Order in which movies were saved
    Added,
    /// Alphabetical by title
    Title,
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Added => SortOrder::Added,
            SortArg::Title => SortOrder::Title,
        }
    }
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise the level follows the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug,hyper_util=info,reqwest=info",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CineFindError> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search { title } => {
            let catalog = Catalog::from_config(&config)?;
            Ok(match catalog.search(&title).await {
                Lookup::Found(results) => {
                    print_summaries(&results);
                    ExitCode::SUCCESS
                }
                Lookup::NotFound => {
                    println!("No results for '{title}'.");
                    ExitCode::SUCCESS
                }
                Lookup::Unavailable => unavailable(),
            })
        }
        Commands::Movie { imdb_id } => {
            let catalog = Catalog::from_config(&config)?;
            let page = load_movie_page(&catalog, &imdb_id).await;
            Ok(print_movie_page(&imdb_id, &page))
        }
        Commands::Home => {
            let catalog = Catalog::from_config(&config)?;
            let mut ctx = PageContext::new();
            let homepage = load_homepage(&catalog, &mut ctx).await;

            if let Some(backdrop) = &homepage.backdrop {
                println!("Backdrop: {backdrop}\n");
            }
            print_section("Popular", &homepage.popular);
            print_section("Trending today", &homepage.trending);
            print_section("New releases", &homepage.now_playing);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Popular => {
            let catalog = Catalog::from_config(&config)?;
            Ok(print_carousel(catalog.popular().await))
        }
        Commands::Trending => {
            let catalog = Catalog::from_config(&config)?;
            Ok(print_carousel(catalog.trending().await))
        }
        Commands::NowPlaying => {
            let catalog = Catalog::from_config(&config)?;
            Ok(print_carousel(catalog.now_playing().await))
        }
        Commands::Genre { name: None } => {
            print_genres();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Genre { name: Some(name) } => {
            let Some(genre) = Genre::by_name(&name) else {
                eprintln!("Unknown genre '{name}'. Available genres:");
                print_genres();
                return Ok(ExitCode::FAILURE);
            };
            let catalog = Catalog::from_config(&config)?;
            Ok(print_carousel(catalog.by_genre(genre).await))
        }
        Commands::Watchlist { cmd } => run_watchlist(&config, cmd).await,
        Commands::Subscribe { email } => {
            let mut subscribers = SubscriberList::new(open_store(&config)?);
            match subscribers.subscribe(&email)? {
                Subscription::Added => println!("Subscribed {}.", email.trim()),
                Subscription::AlreadySubscribed => println!("{} is already subscribed.", email.trim()),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Unsubscribe { email } => {
            let mut subscribers = SubscriberList::new(open_store(&config)?);
            if subscribers.unsubscribe(&email)? {
                println!("Unsubscribed {}.", email.trim());
            } else {
                println!("{} was not subscribed.", email.trim());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_watchlist(config: &Config, cmd: WatchlistCommands) -> Result<ExitCode, CineFindError> {
    let mut watchlist = Watchlist::new(open_store(config)?);

    match cmd {
        WatchlistCommands::List { sort } => {
            let entries = watchlist.list_sorted(sort.into());
            if entries.is_empty() {
                println!("Your watchlist is empty.");
            }
            for entry in &entries {
                print_entry(entry);
            }
        }
        WatchlistCommands::Toggle { imdb_id } => {
            let catalog = Catalog::from_config(config)?;
            let catalog = &catalog;
            let outcome = watchlist
                .toggle(&imdb_id, |id| async move { catalog.movie_detail(&id).await })
                .await?;

            match outcome {
                Toggled::Added(entry) => println!("Added '{}' to your watchlist.", entry.title),
                Toggled::Removed => println!("Removed {imdb_id} from your watchlist."),
                Toggled::DetailUnavailable => {
                    eprintln!("Could not fetch details for {imdb_id}; watchlist unchanged.");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        WatchlistCommands::Remove { imdb_id } => {
            if watchlist.remove(&imdb_id)? {
                println!("Removed {imdb_id} from your watchlist.");
            } else {
                println!("{imdb_id} is not on your watchlist.");
            }
        }
        WatchlistCommands::Clear { yes } => {
            let count = watchlist.list().len();
            if count == 0 {
                println!("Your watchlist is already empty.");
                return Ok(ExitCode::SUCCESS);
            }

            if !yes && !confirm(&format!("Remove all {count} movie(s) from your watchlist?")) {
                println!("Aborted.");
                return Ok(ExitCode::SUCCESS);
            }

            watchlist.clear()?;
            println!("Cleared {count} movie(s) from your watchlist.");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Asks for confirmation; a prompt that cannot be shown counts as "no"
fn confirm(prompt: &str) -> bool {
    match Confirm::new().with_prompt(prompt).default(false).interact() {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!(error = %e, "Confirmation prompt failed");
            false
        }
    }
}

fn unavailable() -> ExitCode {
    eprintln!("Movie data is unavailable right now. Run with -v for details.");
    ExitCode::FAILURE
}

fn print_summaries(movies: &[MovieSummary]) {
    for movie in movies {
        match &movie.poster_url {
            Some(poster) => println!("{}  {}  ({})", movie.external_id, movie.title, poster),
            None => println!("{}  {}", movie.external_id, movie.title),
        }
    }
}

fn print_section(title: &str, movies: &[MovieSummary]) {
    println!("=== {title} ===");
    if movies.is_empty() {
        println!("(nothing to show)");
    }
    print_summaries(movies);
    println!();
}

fn print_carousel(carousel: Carousel) -> ExitCode {
    if carousel.movies.is_empty() {
        println!("No movies to show.");
    }
    print_summaries(&carousel.movies);
    ExitCode::SUCCESS
}

fn print_genres() {
    for genre in GENRES {
        println!("{}", genre.name);
    }
}

fn print_entry(entry: &WatchlistEntry) {
    println!("{}  {}", entry.external_id, entry.title);
}

fn print_movie_page(imdb_id: &str, page: &MoviePage) -> ExitCode {
    let detail = match &page.detail {
        Lookup::Found(detail) => detail,
        Lookup::NotFound => {
            eprintln!("Movie {imdb_id} not found.");
            return ExitCode::FAILURE;
        }
        Lookup::Unavailable => return unavailable(),
    };

    println!("{} ({})", detail.title, detail.year);
    let runtime = detail.runtime_display();
    if runtime.is_empty() {
        println!("{}", detail.genre);
    } else {
        println!("{} | {}", detail.genre, runtime);
    }
    match detail.rating_out_of_ten {
        Some(rating) => println!("{} {rating}/10", detail.stars()),
        None => println!("{} no rating", detail.stars()),
    }
    if !detail.plot.is_empty() {
        println!("\n{}", detail.plot);
    }
    if let Some(poster) = &detail.poster_url {
        println!("\nPoster: {poster}");
    }
    if let Some(trailer) = &page.trailer {
        println!("Trailer: {} ({})", trailer.watch_url(), trailer.name);
    }

    if !page.cast.is_empty() {
        println!("\n=== Cast ===");
        for member in &page.cast {
            match &member.character {
                Some(character) => println!("{} as {}", member.name, character),
                None => println!("{}", member.name),
            }
        }
    }

    if !page.recommendations.is_empty() {
        println!("\n=== You might also like ===");
        print_summaries(&page.recommendations);
    }

    ExitCode::SUCCESS
}

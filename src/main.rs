use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use reel::config::LoggingConfig;
use reel::{
    build_controller, build_ephemeral, load_config, Category, ChangeFlag, Movie, MovieController,
    MovieId, MovieInput, ReelError, ReelResult, SortDirection, SortKey, Status,
};

/// Reel: a movie catalog with undoable edits
#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Keep a movie catalog with search, filters, sorting and undo/redo.")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Catalog file; overrides storage.path
    #[arg(long, global = true, env = "REEL_DATA")]
    data: Option<PathBuf>,
    /// Work on an in-memory catalog that is never saved
    #[arg(long, global = true)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List movies through the search/filter/sort pipeline
    List {
        /// Case-insensitive substring of title or director
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        status: Option<Status>,
        /// Only movies with exactly this rating
        #[arg(long)]
        rating: Option<u8>,
        /// Sort key: title, year or rating
        #[arg(long, default_value = "title")]
        sort: SortKey,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Add a movie
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        director: String,
        #[arg(long)]
        year: String,
        #[arg(long)]
        category: Category,
        #[arg(long, default_value = "want-to-watch")]
        status: Status,
        #[arg(long, allow_negative_numbers = true)]
        rating: i32,
    },
    /// Edit a movie; omitted fields keep their current value
    Edit {
        #[arg(long)]
        id: MovieId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        director: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long, allow_negative_numbers = true)]
        rating: Option<i32>,
    },
    /// Delete a movie
    Delete {
        #[arg(long)]
        id: MovieId,
    },
    /// Start an interactive session with undo/redo
    Interactive,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(data) = cli.data {
        config.storage.path = data;
    }
    init_tracing(&config.logging);

    let mut controller = if cli.ephemeral {
        build_ephemeral(config.history.max_depth)?
    } else {
        build_controller(&config)
            .with_context(|| format!("failed to open {}", config.storage.path.display()))?
    };

    match cli.command {
        Commands::List {
            search,
            category,
            status,
            rating,
            sort,
            desc,
        } => {
            controller.search(search.as_deref())?;
            controller.set_category_filter(category)?;
            controller.set_status_filter(status)?;
            controller.set_rating_filter(rating)?;
            controller.set_sort(sort)?;
            if desc {
                controller.set_direction(SortDirection::Descending)?;
            }
            print_table(&controller.movies(), None);
        }
        Commands::Add {
            title,
            director,
            year,
            category,
            status,
            rating,
        } => {
            let movie = controller.add_movie(MovieInput::new(
                title, director, year, category, status, rating,
            ))?;
            println!("Added {} ({})", movie, movie.id());
        }
        Commands::Edit {
            id,
            title,
            director,
            year,
            category,
            status,
            rating,
        } => {
            let current = controller.find(id).ok_or(ReelError::NotFound(id))?;
            let mut input = MovieInput::from_movie(current);
            if let Some(title) = title {
                input.title = title;
            }
            if let Some(director) = director {
                input.director = director;
            }
            if let Some(year) = year {
                input.year_text = year;
            }
            if let Some(category) = category {
                input.category = category;
            }
            if let Some(status) = status {
                input.status = status;
            }
            if let Some(rating) = rating {
                input.rating = rating;
            }
            let movie = controller.edit_movie(id, input)?;
            println!("Updated {}", movie);
        }
        Commands::Delete { id } => {
            let movie = controller.delete_movie(id)?;
            println!("Deleted {}", movie);
        }
        Commands::Interactive => run_interactive(&mut controller),
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ---------------------------------------------------------------------------
// Interactive REPL
// ---------------------------------------------------------------------------

fn run_interactive(controller: &mut MovieController) {
    let flag = ChangeFlag::new();
    controller.subscribe(Arc::new(flag.clone()));
    let mut focus: Option<MovieId> = None;

    println!("=== Reel Interactive ===");
    println!("{} movies in the catalog.\n", controller.all_movies().len());
    print_table(&controller.movies(), focus);
    print_help();

    let stdin = io::stdin();
    loop {
        print!("\nreel> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, args) = match line.split_once(char::is_whitespace) {
            Some((cmd, args)) => (cmd.to_lowercase(), args.trim()),
            None => (line.to_lowercase(), ""),
        };

        let result = match cmd.as_str() {
            "help" | "h" | "?" => {
                print_help();
                Ok(())
            }
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "list" | "ls" => {
                print_table(&controller.movies(), focus);
                Ok(())
            }
            "add" => cmd_add(controller, args).map(|movie| focus = Some(movie.id())),
            "edit" => cmd_edit(controller, args).map(|movie| focus = Some(movie.id())),
            "delete" | "rm" => cmd_delete(controller, args),
            "undo" => cmd_undo(controller, &mut focus),
            "redo" => cmd_redo(controller, &mut focus),
            "history" => {
                cmd_history(controller);
                Ok(())
            }
            "search" => controller.search(Some(args)),
            "filter" => cmd_filter(controller, args),
            "sort" => cmd_sort(controller, args),
            "reset" => controller.reset_filters_and_sort(),
            other => {
                println!("  Unknown command '{}'. Type 'help' for a list.", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("  Error: {}", e);
        }

        if flag.take() {
            print_table(&controller.movies(), focus);
        }
    }
}

fn print_help() {
    println!("  Commands:");
    println!("    list                                   Show the current view");
    println!("    add <title> | <director> | <year> | <category> | <status> | <rating>");
    println!("                                           Add a movie");
    println!("    edit <row|id> <field> <value>          Change one field (title, director, year,");
    println!("                                           category, status, rating)");
    println!("    delete <row|id>                        Delete a movie");
    println!("    undo / redo                            Step through the edit history");
    println!("    history                                Show undoable and redoable commands");
    println!("    search [text]                          Search title and director (blank clears)");
    println!("    filter <category|status|rating> <value|any>");
    println!("                                           Narrow the view");
    println!("    sort <title|year|rating> [asc|desc]    Order the view");
    println!("    reset                                  Clear search, filters and sorting");
    println!("    help                                   Show this help message");
    println!("    quit                                   Exit");
    println!(
        "  Categories: {}",
        Category::ALL.map(|c| c.label()).join(", ")
    );
    println!("  Statuses: {}", Status::ALL.map(|s| s.label()).join(", "));
}

// ---------------------------------------------------------------------------
// REPL commands
// ---------------------------------------------------------------------------

fn cmd_add(controller: &mut MovieController, args: &str) -> ReelResult<Movie> {
    let fields: Vec<&str> = args.split('|').map(str::trim).collect();
    if fields.len() != 6 {
        return Err(ReelError::Parse(
            "usage: add <title> | <director> | <year> | <category> | <status> | <rating>"
                .to_string(),
        ));
    }
    let input = MovieInput::new(
        fields[0],
        fields[1],
        fields[2],
        fields[3].parse()?,
        fields[4].parse()?,
        parse_rating(fields[5])?,
    );
    let movie = controller.add_movie(input)?;
    println!("  Added {}", movie);
    Ok(movie)
}

fn cmd_edit(controller: &mut MovieController, args: &str) -> ReelResult<Movie> {
    let mut parts = args.splitn(3, char::is_whitespace);
    let (Some(target), Some(field), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ReelError::Parse(
            "usage: edit <row|id> <field> <value>".to_string(),
        ));
    };

    let id = resolve_movie(controller, target)?;
    let current = controller.find(id).ok_or(ReelError::NotFound(id))?;
    let mut input = MovieInput::from_movie(current);
    let value = value.trim();

    match field.to_lowercase().as_str() {
        "title" => input.title = value.to_string(),
        "director" => input.director = value.to_string(),
        "year" => input.year_text = value.to_string(),
        "category" => input.category = value.parse()?,
        "status" => input.status = value.parse()?,
        "rating" => input.rating = parse_rating(value)?,
        other => return Err(ReelError::Parse(format!("unknown field '{}'", other))),
    }

    let movie = controller.edit_movie(id, input)?;
    println!("  Updated {}", movie);
    Ok(movie)
}

fn cmd_delete(controller: &mut MovieController, args: &str) -> ReelResult<()> {
    if args.is_empty() {
        return Err(ReelError::Parse("usage: delete <row|id>".to_string()));
    }
    let id = resolve_movie(controller, args)?;
    let movie = controller.delete_movie(id)?;
    println!("  Deleted {}", movie);
    Ok(())
}

fn cmd_undo(controller: &mut MovieController, focus: &mut Option<MovieId>) -> ReelResult<()> {
    match controller.undo()? {
        Some(command) => {
            println!("  Undid {}", command);
            *focus = command.focus_after_undo();
        }
        None => println!("  Nothing to undo."),
    }
    Ok(())
}

fn cmd_redo(controller: &mut MovieController, focus: &mut Option<MovieId>) -> ReelResult<()> {
    match controller.redo()? {
        Some(command) => {
            println!("  Redid {}", command);
            *focus = command.focus_after_redo();
        }
        None => println!("  Nothing to redo."),
    }
    Ok(())
}

fn cmd_history(controller: &MovieController) {
    if !controller.can_undo() && !controller.can_redo() {
        println!("  History is empty.");
        return;
    }
    for entry in controller.history() {
        println!(
            "  undo  {}  {}",
            entry.executed_at.format("%H:%M:%S"),
            entry.command
        );
    }
    for entry in controller.redo_history() {
        println!(
            "  redo  {}  {}",
            entry.executed_at.format("%H:%M:%S"),
            entry.command
        );
    }
}

fn cmd_filter(controller: &mut MovieController, args: &str) -> ReelResult<()> {
    let Some((kind, value)) = args.split_once(char::is_whitespace) else {
        return Err(ReelError::Parse(
            "usage: filter <category|status|rating> <value|any>".to_string(),
        ));
    };
    let value = value.trim();
    let any = value.eq_ignore_ascii_case("any");

    match kind.to_lowercase().as_str() {
        "category" => controller.set_category_filter(if any { None } else { Some(value.parse()?) }),
        "status" => controller.set_status_filter(if any { None } else { Some(value.parse()?) }),
        "rating" => {
            let rating = if any {
                None
            } else {
                Some(value.parse::<u8>().map_err(|_| {
                    ReelError::Parse(format!("rating must be a number, got '{}'", value))
                })?)
            };
            controller.set_rating_filter(rating)
        }
        other => Err(ReelError::Parse(format!("unknown filter '{}'", other))),
    }
}

fn cmd_sort(controller: &mut MovieController, args: &str) -> ReelResult<()> {
    let mut parts = args.split_whitespace();
    let key: SortKey = parts
        .next()
        .ok_or_else(|| ReelError::Parse("usage: sort <title|year|rating> [asc|desc]".to_string()))?
        .parse()?;
    let direction = match parts.next() {
        Some(direction) => direction.parse()?,
        None => SortDirection::Ascending,
    };

    controller.set_sort(key)?;
    if controller.query().direction != direction {
        controller.set_direction(direction)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accept either a 1-based row number from the current view or a full id.
fn resolve_movie(controller: &MovieController, token: &str) -> ReelResult<MovieId> {
    if let Ok(row) = token.parse::<usize>() {
        let rows = controller.movies();
        return row
            .checked_sub(1)
            .and_then(|i| rows.get(i))
            .map(Movie::id)
            .ok_or_else(|| ReelError::Parse(format!("no row {} in the current view", row)));
    }
    token.parse()
}

fn parse_rating(value: &str) -> ReelResult<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| ReelError::Parse(format!("rating must be a number, got '{}'", value)))
}

fn print_table(movies: &[Movie], focus: Option<MovieId>) {
    if movies.is_empty() {
        println!("  (no movies)");
        return;
    }
    println!(
        "    {:>3}  {:<30} {:<22} {:>4}  {:<6} {:<12} {}",
        "#", "Title", "Director", "Year", "Rating", "Category", "Status"
    );
    for (i, movie) in movies.iter().enumerate() {
        let marker = if Some(movie.id()) == focus { '>' } else { ' ' };
        println!(
            "  {} {:>3}  {:<30} {:<22} {:>4}  {:<6} {:<12} {}",
            marker,
            i + 1,
            clip(movie.title(), 30),
            clip(movie.director(), 22),
            movie.year(),
            "*".repeat(usize::from(movie.rating())),
            movie.category().label(),
            movie.status().label()
        );
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

// UI layer: the interactive search-and-save loop, built on `dialoguer`
// prompts. Everything the session knows (who is logged in, which search
// filters are set) lives in an explicit `Session` value owned by the
// loop and handed to the functions that need it.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::api::{Movie, MovieApi, SearchOptions};
use crate::directory::UserDirectory;
use crate::watchlist::WatchlistClient;

/// State for one interactive run: the logged-in user and their current
/// search filters.
pub struct Session {
    pub user_name: String,
    pub user_id: u64,
    pub options: SearchOptions,
}

/// Main interactive loop. Logs the user in against the directory, then
/// repeats search rounds until the user declines another one. Blocks
/// until exit.
pub fn run(api: MovieApi, watchlist: WatchlistClient, directory: &mut UserDirectory) -> Result<()> {
    intro();

    let name: String = Input::new().with_prompt("What is your username?").interact_text()?;
    let user_id = directory.resolve_or_create(&name);
    println!("Welcome, {}! Your watch list has been loaded.", name);

    let mut session = Session {
        user_name: name,
        user_id,
        options: SearchOptions::default(),
    };

    loop {
        define_search(&session.options);

        let choice: String = Input::new()
            .with_prompt("Input A for advanced features, W to see watchlist, or press Enter to continue")
            .allow_empty(true)
            .interact_text()?;
        match choice.trim().to_uppercase().as_str() {
            "A" => {
                advanced_menu(&mut session.options)?;
                define_search(&session.options);
            }
            "W" => show_watchlist(&api, &watchlist, &session),
            _ => {}
        }

        prompt_options(&mut session.options)?;

        match run_search(&api, &session.options) {
            Ok(movies) if movies.is_empty() => {
                println!("No movies matched those filters. Try loosening them.")
            }
            Ok(movies) => add_to_watchlist(&watchlist, &session, &movies)?,
            // A failed search costs one round, not the session.
            Err(e) => println!("Search failed: {}", e),
        }

        let again = Confirm::new()
            .with_prompt("Would you like to initiate another search?")
            .default(true)
            .interact()?;
        if !again {
            println!("\nThank you for using Top Movie Finder, {}! Goodbye!", session.user_name);
            break;
        }
    }
    Ok(())
}

/// Application title and usage blurb shown once at startup.
fn intro() {
    let title = "\
******************************************************************************
* _    _      _                            _          _   _                  *
*| |  | |    | |                          | |        | | | |                 *
*| |  | | ___| | ___ ___  _ __ ___   ___  | |_ ___   | |_| |__   ___         *
*| |/\\| |/ _ \\ |/ __/ _ \\| '_ ` _ \\ / _ \\ | __/ _ \\  | __| '_ \\ / _ \\        *
*\\  /\\  /  __/ | (_| (_) | | | | | |  __/ | || (_) | | |_| | | |  __/        *
* \\/  \\/ \\___|_|\\___\\___/|_| |_| |_|\\___|  \\__\\___/   \\__|_| |_|\\___|        *
*                                                                            *
* _____            ___  ___           _       ______ _           _           *
*|_   _|           |  \\/  |          (_)      |  ___(_)         | |          *
*  | | ___  _ __   | .  . | _____   ___  ___  | |_   _ _ __   __| | ___ _ __ *
*  | |/ _ \\| '_ \\  | |\\/| |/ _ \\ \\ / / |/ _ \\ |  _| | | '_ \\ / _` |/ _ \\ '__|*
*  | | (_) | |_) | | |  | | (_) \\ V /| |  __/ | |   | | | | | (_| |  __/ |   *
*  \\_/\\___/| .__/  \\_|  |_/\\___/ \\_/ |_|\\___| \\_|   |_|_| |_|\\__,_|\\___|_|   *
*          | |                                                               *
*          |_|                                                               *
******************************************************************************";
    println!("{}\n", title);
    println!(
        "This application is intended to locate the best movies released in a given year\n\
         and display them in order of popularity, so that you can work your way through\n\
         all the top hits!\n"
    );
}

/// Show the currently enabled search options with their one-line
/// definitions.
fn define_search(options: &SearchOptions) {
    println!("The following search options are currently enabled:\n");
    let mut num = 1;
    println!(
        "{})  Release year - searches for movies with an initial release in the given year - Default current year",
        num
    );
    num += 1;
    if options.language_enabled {
        println!(
            "{})  Language - searches for movies with dialogue in the given language - Default English",
            num
        );
        num += 1;
    }
    if options.threshold_enabled {
        println!(
            "{})  Vote threshold - minimum amount of user votes for ratings - Default 2500",
            num
        );
        num += 1;
    }
    println!("{})  Vote - minimum voter rating score - Default 8.0", num);
    println!(
        "\nTo enable advanced search options input 'A' at the menu screen. Be advised that\n\
         enabling custom search options could negatively impact the quality of search\n\
         results. Options currently include Language selection and Vote threshold.\n"
    );
}

/// Advanced menu: toggle the Language and Vote-threshold options on and
/// off until the user picks Done.
fn advanced_menu(options: &mut SearchOptions) -> Result<()> {
    println!("******************************************************************************");
    println!("Advanced Search Options");
    println!("******************************************************************************\n");
    loop {
        let language_label = if options.language_enabled {
            "Language (enabled) - disable"
        } else {
            "Language - enable"
        };
        let threshold_label = if options.threshold_enabled {
            "Vote threshold (enabled) - disable"
        } else {
            "Vote threshold - enable"
        };
        let items = vec![language_label, threshold_label, "Done"];
        let selection = Select::new().items(&items).default(2).interact()?;
        match selection {
            0 => options.language_enabled = !options.language_enabled,
            1 => options.threshold_enabled = !options.threshold_enabled,
            _ => break,
        }
    }
    Ok(())
}

/// Prompt for a value for each enabled option. A blank answer keeps the
/// current value.
fn prompt_options(options: &mut SearchOptions) -> Result<()> {
    let year: String = Input::new()
        .with_prompt(format!(
            "Release year to search (currently {}, Enter keeps it)",
            options.year
        ))
        .allow_empty(true)
        .interact_text()?;
    apply_parsed(&year, &mut options.year, "release year");

    if options.language_enabled {
        println!("Language options are two letter language codes i.e. English-en, French-fr, Spanish-es");
        let language: String = Input::new()
            .with_prompt(format!(
                "Language to search (currently {}, Enter keeps it)",
                options.language
            ))
            .allow_empty(true)
            .interact_text()?;
        if !language.trim().is_empty() {
            options.language = language.trim().to_string();
        }
    }

    if options.threshold_enabled {
        let threshold: String = Input::new()
            .with_prompt(format!(
                "Minimum vote count (currently {}, Enter keeps it)",
                options.vote_threshold
            ))
            .allow_empty(true)
            .interact_text()?;
        apply_parsed(&threshold, &mut options.vote_threshold, "vote threshold");
    }

    let score: String = Input::new()
        .with_prompt(format!(
            "Minimum voter rating score (currently {}, Enter keeps it)",
            options.vote_score
        ))
        .allow_empty(true)
        .interact_text()?;
    apply_parsed(&score, &mut options.vote_score, "vote score");

    Ok(())
}

/// Overwrite `slot` with the parsed input, keeping it untouched on a
/// blank answer and reporting anything unparseable.
fn apply_parsed<T: std::str::FromStr>(input: &str, slot: &mut T, label: &str) {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return;
    }
    match trimmed.parse() {
        Ok(value) => *slot = value,
        Err(_) => println!("Could not read {:?} as a {}; keeping the previous value.", trimmed, label),
    }
}

/// Run the discover search behind a spinner and print the result list.
fn run_search(api: &MovieApi, options: &SearchOptions) -> Result<Vec<Movie>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Searching...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = api.discover(options);
    spinner.finish_and_clear();

    let movies = result?;
    println!(
        "\nSearch query - Year: {} Language: {} Vote Threshold: {} Rating: {}\n",
        options.year, options.language, options.vote_threshold, options.vote_score
    );
    for (index, movie) in movies.iter().enumerate() {
        println!("{}. {}", index + 1, movie.title);
    }
    Ok(movies)
}

/// Offer the freshly searched movies for saving, one pick at a time,
/// until the user answers with a blank line.
fn add_to_watchlist(
    watchlist: &WatchlistClient,
    session: &Session,
    movies: &[Movie],
) -> Result<()> {
    println!("Would you like to add any of these movies to your watchlist?");
    loop {
        let answer: String = Input::new()
            .with_prompt("Please input movie number or press Enter to continue")
            .allow_empty(true)
            .interact_text()?;
        let Some(index) = parse_pick(&answer, movies.len()) else {
            if answer.trim().is_empty() {
                break;
            }
            println!("Please pick a number between 1 and {}.", movies.len());
            continue;
        };
        let movie = &movies[index];
        println!("Adding {} to your watch list.", movie.title);
        if let Err(e) = watchlist.store(session.user_id, movie.id) {
            // The store did not go through; the list is unchanged.
            println!("Could not add {}: {}", movie.title, e);
        }
        println!("Would you like to add another movie to your watchlist?");
    }
    Ok(())
}

/// Fetch and print the user's watchlist, resolving each stored id to a
/// title. A single failed lookup renders a placeholder row; a transport
/// failure is reported and the session continues.
fn show_watchlist(api: &MovieApi, watchlist: &WatchlistClient, session: &Session) {
    match watchlist.retrieve(session.user_id) {
        Ok(ids) if ids.is_empty() => println!("Watch list is empty."),
        Ok(ids) => {
            println!("Watch list:");
            for movie_id in ids {
                match api.movie_title(movie_id) {
                    Ok(title) => println!("{}", title),
                    Err(_) => println!("(title unavailable for movie {})", movie_id),
                }
            }
        }
        Err(e) => println!("Could not reach the watchlist service: {}", e),
    }
}

/// Turn a one-based menu answer into a zero-based index into a list of
/// `len` movies. Blank, non-numeric, and out-of-range answers are all
/// `None`.
fn parse_pick(input: &str, len: usize) -> Option<usize> {
    let number: usize = input.trim().parse().ok()?;
    if number >= 1 && number <= len {
        Some(number - 1)
    } else {
        None
    }
}

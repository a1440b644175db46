// Entrypoint for the CLI application.
// - Keeps `main` small: build the collaborators, hand them to the UI
//   loop, persist the user directory on the way out.
// - Returns `anyhow::Result` so configuration errors print with context.

use topmovie_cli::{api::MovieApi, directory::UserDirectory, ui, watchlist::WatchlistClient};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // `API_KEY` must be set; `TMDB_BASE_URL` and `WATCHLIST_ADDR` fall
    // back to defaults. See `api::MovieApi::from_env` and
    // `watchlist::WatchlistClient::from_env`.
    let api = MovieApi::from_env()?;
    let watchlist = WatchlistClient::from_env()?;
    let mut directory = UserDirectory::load_default()?;

    // Start the interactive loop. This call blocks until the user exits.
    ui::run(api, watchlist, &mut directory)?;

    directory.save()?;
    Ok(())
}

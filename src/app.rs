use crate::command::CommandManager;
use crate::config::AppConfig;
use crate::controller::MovieController;
use crate::error::ReelResult;
use crate::service::MovieService;
use crate::store::gateway::{InMemoryGateway, JsonFileGateway};

/// Wire a controller over the JSON file named in `config.storage.path`.
pub fn build_controller(config: &AppConfig) -> ReelResult<MovieController> {
    let gateway = JsonFileGateway::open(&config.storage.path)?;
    let service = MovieService::open(Box::new(gateway))?;
    let commands = CommandManager::with_max_depth(config.history.max_depth);

    tracing::info!(
        path = %config.storage.path.display(),
        movies = service.all().len(),
        max_depth = commands.max_depth(),
        "Catalog opened"
    );

    Ok(MovieController::new(service, commands))
}

/// A controller over an in-memory catalog that is never written to disk.
pub fn build_ephemeral(max_depth: usize) -> ReelResult<MovieController> {
    let service = MovieService::open(Box::new(InMemoryGateway::new()))?;
    Ok(MovieController::new(
        service,
        CommandManager::with_max_depth(max_depth),
    ))
}

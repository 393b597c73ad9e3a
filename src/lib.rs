pub mod app;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod notify;
pub mod query;
pub mod service;
pub mod store;

pub use app::{build_controller, build_ephemeral};
pub use command::{Command, CommandKind, CommandManager, HistoryEntry};
pub use config::{load_config, AppConfig};
pub use controller::MovieController;
pub use error::{ReelError, ReelResult};
pub use model::*;
pub use notify::{ChangeFlag, ChangeNotifier, Observer, ObserverId};
pub use query::{QueryConfig, SortDirection, SortKey};
pub use service::MovieService;

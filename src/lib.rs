pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod query;
pub mod reader;
pub mod schema;
pub mod session;
pub mod writer;

pub use cli::{Cli, Commands};
pub use dashboard::{Chart, Dashboard, DashboardView, TrendLine};
pub use error::{QueryError, StoreError};
pub use query::QueryLayer;
pub use reader::{Reader, SqliteReader};
pub use session::{Selection, SelectionRequest};

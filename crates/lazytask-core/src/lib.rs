pub mod actions;
pub mod active;
pub mod command;
pub mod error;
pub mod layout;
pub mod reconcile;
pub mod refresh;
pub mod snapshot;
pub mod table;

pub use actions::{SwitchOutcome, TaskCommands};
pub use active::ActiveSet;
pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use error::{ActionError, CommandError, FetchError};
pub use layout::{ColumnLayout, Row};
pub use reconcile::{reconcile, PanelPolicy, Reconciliation, DEFAULT_INTERVAL_ID_COLUMN};
pub use refresh::{PanelId, PanelSource, RefreshEvent, RefreshHandle, RefreshWorker};
pub use snapshot::{ColumnarReport, ReportQuery, ReportFormat, Snapshot};
pub use table::{Cell, CellTone, TableModel};

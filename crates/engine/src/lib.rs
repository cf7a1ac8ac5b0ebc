pub use error::EngineError;
pub use goals::Goal;
pub use notifications::{Notification, NotificationKind};
pub use ops::{Engine, EngineBuilder, NotificationFilter};
pub use period::{Frequency, due_periods};
pub use recurring::{DefinitionKind, RecurringDefinition};
pub use transactions::Transaction;

pub mod conditions;
mod error;
mod fire_records;
mod goals;
mod notifications;
mod ops;
mod period;
mod recurring;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

pub mod pool;
pub mod db;
pub mod sql;
pub mod models;
pub mod store;
pub mod pg_store;
pub mod memory;
pub mod offline;
pub mod observe;

pub use pool::{
    DatabasePool,
    PoolStatus,
    initialize_dbpool,
};

pub use db::{
    initialize_db,
};

pub use models::{
    ANALYTICS_DAYS,
    DailyCount,
    RECENT_LOG_LIMIT,
    REDIRECT_MODE_KEY,
    RequestLogEntry,
};

pub use store::Store;
pub use pg_store::PgStore;
pub use memory::MemoryStore;
pub use offline::OfflineStore;
pub use observe::{FailureCounter, StoreObserver, StoreOp};

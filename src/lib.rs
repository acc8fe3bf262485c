// Library exports for testing

pub mod config;
pub mod controller;
pub mod debounce;
pub mod dom;
pub mod events;
pub mod notify;
pub mod page;
pub mod replay;
pub mod runtime;
pub mod timers;
pub mod widgets;
pub mod window;

// Re-export commonly used types for tests
pub use config::SiteConfig;
pub use dom::{Document, NodeId};
pub use events::{DispatchOutcome, PageInput};
pub use notify::NotificationKind;
pub use page::{Page, PageError};
pub use replay::{ReplayReport, ReplayScript, ReplayStep};

//! Desktop notification delivery for tracker activity

pub mod desktop;
pub mod dispatcher;
pub mod sink;
pub mod store;

pub use desktop::DesktopSink;
pub use dispatcher::Notifier;
pub use sink::{Notification, NotificationSink, SendResult};
pub use store::{NotificationRecord, NotificationStore};

//! Email adapters implementing `NotificationSender`.

mod logging_sender;
mod resend_sender;

pub use logging_sender::{LoggingNotificationSender, RecordingNotificationSender};
pub use resend_sender::ResendNotificationSender;

//! Error alerts via freedesktop D-Bus notifications.

use std::collections::HashMap;

use async_trait::async_trait;
use zbus::{Connection, proxy};

use crate::export::dependencies::Notifier;

const APP_NAME: &str = "dashexport";
const ALERT_ICON: &str = "dialog-error";

/// D-Bus interface for freedesktop Notifications.
#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    /// Send a notification.
    ///
    /// # Returns
    /// Notification ID
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: Vec<&str>,
        hints: HashMap<&str, zbus::zvariant::Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Send a system notification.
///
/// # Arguments
/// * `summary` - Notification title
/// * `body` - Notification body text
/// * `icon` - Optional icon name (defaults to "dialog-error")
pub async fn send_notification(summary: &str, body: &str, icon: Option<&str>) -> Result<(), String> {
    let connection = Connection::session()
        .await
        .map_err(|e| format!("Failed to connect to session bus: {}", e))?;

    let proxy = NotificationsProxy::new(&connection)
        .await
        .map_err(|e| format!("Failed to create notifications proxy: {}", e))?;

    proxy
        .notify(
            APP_NAME,
            0,
            icon.unwrap_or(ALERT_ICON),
            summary,
            body,
            vec![],
            HashMap::new(),
            5000,
        )
        .await
        .map_err(|e| format!("Failed to send notification: {}", e))?;

    Ok(())
}

/// Alerts through the desktop notification daemon, falling back to stderr
/// when no session bus is reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn alert(&self, summary: &str, body: &str) {
        if let Err(e) = send_notification(summary, body, None).await {
            log::warn!("Failed to send notification: {}", e);
            eprintln!("{}: {}", summary, body);
        }
    }
}

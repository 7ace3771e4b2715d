//! System clipboard access.
//!
//! Uses the native clipboard APIs through `arboard`, never OSC 52 escapes.
//! Failures are logged and otherwise ignored.

use tracing::{debug, warn};

/// Copy `text` in the background.
///
/// On Linux the clipboard owner has to stay alive until a clipboard manager
/// takes the data, so the copy waits on its own thread.
pub fn copy_text(text: String) {
    debug!(chars = text.chars().count(), "Copying to clipboard");

    #[cfg(target_os = "linux")]
    std::thread::spawn(move || match arboard::Clipboard::new() {
        Ok(mut clipboard) => {
            use arboard::SetExtLinux;
            if let Err(e) = clipboard.set().wait().text(text) {
                warn!("Failed to copy to clipboard: {}", e);
            }
        }
        Err(e) => warn!("Clipboard unavailable: {}", e),
    });

    #[cfg(not(target_os = "linux"))]
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(text) {
                warn!("Failed to copy to clipboard: {}", e);
            }
        }
        Err(e) => warn!("Clipboard unavailable: {}", e),
    }
}

//! Terminal notice sink.

use shopline_storefront::notify::{Notice, NoticeLevel, Notifier};

/// Shows notices as log lines on the terminal.
///
/// Both levels log at INFO.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let mark = match notice.level {
            NoticeLevel::Success => "✔",
            NoticeLevel::Error => "✘",
        };
        tracing::info!("{mark} {}", notice.message);
    }
}

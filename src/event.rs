//! Outward notifications
//!
//! The screen stays decoupled from its host through `EventSink`: one
//! method per event, every method defaulted to a no-op so hosts only
//! implement what they care about.

/// Callback interface for events the screen cannot handle itself.
pub trait EventSink {
    /// The active buffer switched; `is_main` is true when the main
    /// buffer became active.
    fn buf_toggled(&mut self, _is_main: bool) {}

    /// BEL was received.
    fn bell(&mut self) {}

    /// Bytes that must reach the child process (device reports).
    fn write_to_child(&mut self, _data: &[u8]) {}

    /// The input decoding changed; true means UTF-8, false latin-1.
    fn use_utf8(&mut self, _utf8: bool) {}

    /// The window title changed.
    fn title_changed(&mut self, _title: &str) {}

    /// The icon name changed.
    fn icon_changed(&mut self, _icon: &str) {}

    /// A dynamic color (OSC 10-19) was set; empty value means reset.
    fn set_dynamic_color(&mut self, _code: u32, _value: &str) {}

    /// A color-table entry (OSC 4/104) was set; empty value means reset.
    fn set_color_table_color(&mut self, _code: u32, _value: &str) {}

    /// A terminfo capability query (XTGETTCAP) arrived.
    fn request_capabilities(&mut self, _query: &str) {}
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {}

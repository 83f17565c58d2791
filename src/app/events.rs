#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    System(SystemEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Click on the first element carrying `class`.
    Click { class: String },
    Status,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    /// `(prefers-color-scheme: dark)` started or stopped matching.
    ColorSchemeChanged { dark: bool },
}

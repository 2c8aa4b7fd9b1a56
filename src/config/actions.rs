#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Theme,
    Back,
    Suspend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAction {
    Toggle,
    Exit,
}

/// Actions available on every entity listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Reload,
    Create,
    Delete,
    Mark,
    MarkAll,
    NextPage,
    PrevPage,
    CopyId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederationAction {
    Mappers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientsAction {
    InitialAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Confirm,
    Cancel,
    Dismiss,
}

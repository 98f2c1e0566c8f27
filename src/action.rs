use crate::view::Tab;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    SelectTab(Tab),
    NextTab,
    PrevTab,
    RequestGc,
    Export,
    DismissExportSuccess,
    DismissExportFailure,
    /// Shift every threshold by the given number of percentage points.
    ShiftThresholds(f32),
    ToggleHelp,
    None,
}

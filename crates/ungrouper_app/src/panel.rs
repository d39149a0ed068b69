// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sidebar panel exposing the operator.

use crate::operator::{StatusLevel, StatusReport, OPERATOR_ID, OPERATOR_LABEL};

/// Panel title
pub const PANEL_LABEL: &str = "Scene Ungrouper";

/// Sidebar tab the panel lives in
pub const PANEL_CATEGORY: &str = "Ungrouper";

/// Add-on metadata shown by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddonInfo {
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Add-on version
    pub version: (u32, u32),
    /// Oldest supported host version
    pub host_version: (u32, u32, u32),
    /// Where the UI appears
    pub location: &'static str,
    /// Host category
    pub category: &'static str,
}

/// Metadata for this add-on
pub const ADDON_INFO: AddonInfo = AddonInfo {
    name: "Ungrouper",
    description: "Ungroups shader node groups in materials for selected objects.",
    version: (2, 0),
    host_version: (3, 0, 0),
    location: "View3D > Sidebar > Ungrouper",
    category: "3D View",
};

/// Requests from the panel to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Start the ungroup operator
    RunOperator,
}

impl StatusLevel {
    fn color(&self) -> egui::Color32 {
        match self {
            StatusLevel::Info => egui::Color32::from_rgb(200, 200, 200),
            StatusLevel::Warning => egui::Color32::from_rgb(230, 180, 60),
            StatusLevel::Error => egui::Color32::from_rgb(230, 80, 80),
        }
    }
}

/// The "Scene Ungrouper" sidebar panel
#[derive(Debug, Default)]
pub struct UngrouperPanel {
    status: Option<StatusReport>,
    running: bool,
}

impl UngrouperPanel {
    /// Create a new panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the latest status report
    pub fn set_status(&mut self, report: StatusReport) {
        self.status = Some(report);
    }

    /// Latest status report
    pub fn status(&self) -> Option<&StatusReport> {
        self.status.as_ref()
    }

    /// Disable the button while the operator runs
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Render the panel
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<PanelAction> {
        let mut action = None;

        ui.heading(PANEL_LABEL);
        ui.separator();

        let button = ui
            .add_enabled(!self.running, egui::Button::new(OPERATOR_LABEL))
            .on_hover_text(OPERATOR_ID);
        if button.clicked() {
            action = Some(PanelAction::RunOperator);
        }

        if let Some(status) = &self.status {
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(&status.message)
                    .monospace()
                    .color(status.level.color()),
            );
        }

        ui.add_space(8.0);
        ui.weak(format!(
            "{} v{}.{}",
            ADDON_INFO.name, ADDON_INFO.version.0, ADDON_INFO.version.1
        ));

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(panel: &mut UngrouperPanel) -> Option<PanelAction> {
        let ctx = egui::Context::default();
        let mut action = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::SidePanel::right(PANEL_CATEGORY).show(ctx, |ui| {
                action = panel.ui(ui);
            });
        });
        action
    }

    #[test]
    fn test_renders_without_input() {
        let mut panel = UngrouperPanel::new();
        assert_eq!(render(&mut panel), None);

        panel.set_running(true);
        panel.set_status(StatusReport {
            level: StatusLevel::Info,
            message: "Processing materials: [==========          ] 50.00% done".to_string(),
        });
        assert_eq!(render(&mut panel), None);
        assert!(panel.status().unwrap().message.contains("50.00%"));
    }

    #[test]
    fn test_addon_info() {
        assert_eq!(ADDON_INFO.name, PANEL_CATEGORY);
        assert_eq!(ADDON_INFO.version, (2, 0));
    }
}

// ReelMend - gui.rs
//
// Top-level eframe::App implementation.
// Wires the tab panels to the application state and drives the job
// controller once per frame.

use crate::app::job::{JobController, StartOutcome};
use crate::app::state::{AppState, Tab};
use crate::ui;
use std::time::Duration;

/// The ReelMend application.
pub struct ReelMendApp {
    pub state: AppState,
    pub controller: JobController,
    tick: Duration,
}

impl ReelMendApp {
    pub fn new(state: AppState, controller: JobController, tick: Duration) -> Self {
        Self {
            state,
            controller,
            tick,
        }
    }

    /// Start whatever a panel requested on the previous frame.
    fn start_pending_job(&mut self) {
        let Some(request) = self.state.pending_job.take() else {
            return;
        };
        self.controller.set_settings(self.state.settings);
        match self.controller.start(request, &mut self.state) {
            Ok(StartOutcome::Started) => {}
            Ok(StartOutcome::AlreadyRunning) => {
                tracing::debug!("Start ignored: a job is already running");
            }
            // Argument errors were already shown to the user.
            Err(e) => tracing::debug!(error = %e, "Job not started"),
        }
    }
}

impl eframe::App for ReelMendApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pump worker output, dispatched actions and progress.
        let running = self.controller.tick(&mut self.state);
        self.start_pending_job();

        ctx.set_visuals(if self.state.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        // Closing waits for a running job; there is no cancellation.
        if ctx.input(|i| i.viewport().close_requested()) {
            self.controller.shutdown(&mut self.state);
        }
        if self.state.quit_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let idle_ui = self.state.current_notice().is_none();

        // Top menu bar and tabs
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.add_enabled_ui(idle_ui, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("Exit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    for tab in Tab::ALL {
                        ui.selectable_value(&mut self.state.tab, tab, tab.label());
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if running {
                    ui.spinner();
                }
                ui.label(&self.state.status_message);
                if self.state.debug_mode {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new("debug").small().weak());
                    });
                }
            });
        });

        // Central panel (selected tab)
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(idle_ui, |ui| match self.state.tab {
                Tab::Repair => ui::panels::repair::render(ui, &mut self.state),
                Tab::Analyze => ui::panels::analyze::render(ui, &mut self.state),
                Tab::Settings => ui::panels::settings::render(ui, &mut self.state),
                Tab::About => ui::panels::about::render(ui),
            });
        });

        ui::panels::notices::render(ctx, &mut self.state);

        // Periodic tick: keeps output flowing even without input events.
        ctx.request_repaint_after(self.tick);
    }

    /// Called by eframe when the application is about to close.
    ///
    /// Waits for a running job so its output files are complete.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.shutdown(&mut self.state);
    }
}

// crates/gifer-ui/src/modules/params_panel.rs
//
// ParamsPanel: left-panel form for every clip parameter plus Generate.
//
// Each numeric field keeps its own text buffer. While a field has focus the
// buffer is the user's; when it loses focus the text is parsed and, if it
// differs from the model, turned into a GiferCommand. Unfocused buffers are
// re-synced from ClipParameters every frame, so values the model derives
// (the auto-filled dimension, a reset, a newly opened video) show up without
// any extra plumbing.
//
// Text that is not a number is reported through ReportInvalidField and the
// buffer snaps back to the model value on the next frame.

use egui::{Checkbox, Margin, ProgressBar, RichText, TextEdit, Ui};

use gifer_core::commands::GiferCommand;
use gifer_core::helpers::time::format_seconds;
use gifer_core::params::{Axis, ClipParameters};

use super::GiferModule;
use crate::helpers::format::{format_optional, parse_field};
use crate::state::{ExportState, SessionState};
use crate::theme::{ACCENT, BG_CARD, TEXT_DIM};

const FIELD_W: f32 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Start,
    End,
    Width,
    Height,
    Scale,
    Fps,
    Speed,
    Fuzz,
}

impl Field {
    const COUNT: usize = 8;

    fn label(self) -> &'static str {
        match self {
            Field::Start  => "Start",
            Field::End    => "End",
            Field::Width  => "Width",
            Field::Height => "Height",
            Field::Scale  => "Scale",
            Field::Fps    => "FPS",
            Field::Speed  => "Speed",
            Field::Fuzz   => "Fuzz",
        }
    }

    fn unit(self) -> &'static str {
        match self {
            Field::Start | Field::End    => "s",
            Field::Width | Field::Height => "px",
            Field::Scale | Field::Speed  => "×",
            Field::Fps                   => "fps",
            Field::Fuzz                  => "%",
        }
    }

    fn model_value(self, p: &ClipParameters) -> Option<f64> {
        match self {
            Field::Start  => p.trim_start(),
            Field::End    => p.trim_end(),
            Field::Width  => p.target_dimension(Axis::Width),
            Field::Height => p.target_dimension(Axis::Height),
            Field::Scale  => p.target_scale(),
            Field::Fps    => p.output_fps(),
            Field::Speed  => Some(p.playback_speed()),
            Field::Fuzz   => p.color_fuzz(),
        }
    }

    fn command(self, value: Option<f64>) -> GiferCommand {
        match self {
            Field::Start  => GiferCommand::SetTrimStart(value),
            Field::End    => GiferCommand::SetTrimEnd(value),
            Field::Width  => GiferCommand::SetTargetDimension { axis: Axis::Width, value },
            Field::Height => GiferCommand::SetTargetDimension { axis: Axis::Height, value },
            Field::Scale  => GiferCommand::SetScale(value),
            Field::Fps    => GiferCommand::SetOutputFps(value),
            Field::Speed  => GiferCommand::SetPlaybackSpeed(value),
            Field::Fuzz   => GiferCommand::SetColorFuzz(value),
        }
    }

    /// Width/height and scale are mutually exclusive, switched by the Scale
    /// checkbox.
    fn enabled(self, state: &SessionState) -> bool {
        match self {
            Field::Width | Field::Height => !state.scale_enabled,
            Field::Scale                 => state.scale_enabled,
            _                            => true,
        }
    }
}

/// What a committed buffer turns into, if anything.
fn commit(field: Field, text: &str, current: Option<f64>) -> Option<GiferCommand> {
    match parse_field(text) {
        // Compare as displayed so tabbing through a field is not an edit.
        Ok(v) if format_optional(v) == format_optional(current) => None,
        Ok(v)  => Some(field.command(v)),
        Err(_) => Some(GiferCommand::ReportInvalidField {
            field: field.label(),
            text:  text.trim().to_string(),
        }),
    }
}

#[derive(Default)]
pub struct ParamsPanel {
    buffers: [String; Field::COUNT],
}

impl ParamsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn field(&mut self, ui: &mut Ui, field: Field, state: &SessionState, cmd: &mut Vec<GiferCommand>) {
        let current = field.model_value(&state.params);
        let enabled = field.enabled(state) && !state.export.is_running();
        let buf     = &mut self.buffers[field as usize];

        ui.label(field.label());
        let resp = ui.add_enabled(
            enabled,
            TextEdit::singleline(&mut *buf).desired_width(FIELD_W),
        );
        ui.label(RichText::new(field.unit()).color(TEXT_DIM));
        ui.end_row();

        if resp.lost_focus() {
            if let Some(c) = commit(field, buf, current) {
                cmd.push(c);
            }
        } else if !resp.has_focus() {
            *buf = format_optional(current);
        }
    }

    fn source_header(&self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<GiferCommand>) {
        egui::Frame::new()
            .fill(BG_CARD)
            .inner_margin(Margin::symmetric(8, 6))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("🎞 Video").strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let idle = !state.export.is_running();
                        if ui.add_enabled(idle, egui::Button::new("Browse…")).clicked() {
                            cmd.push(GiferCommand::ShowOpenVideoDialog);
                        }
                    });
                });
                match (state.params.source_path(), state.params.source()) {
                    (Some(path), Some(src)) => {
                        let name = path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string());
                        ui.label(RichText::new(name).color(ACCENT))
                            .on_hover_text(path.display().to_string());
                        ui.label(
                            RichText::new(format!(
                                "{}  ·  {:.0}×{:.0}  ·  {:.2} fps",
                                format_seconds(src.duration), src.width, src.height, src.fps,
                            ))
                            .size(11.0)
                            .color(TEXT_DIM),
                        );
                    }
                    _ => {
                        let text = if state.pending_probe.is_some() { "Opening…" } else { "No video selected" };
                        ui.label(RichText::new(text).color(TEXT_DIM));
                    }
                }
            });
    }

    fn output_summary(&self, ui: &mut Ui, params: &ClipParameters) {
        let mut parts = Vec::new();
        if let Some((w, h)) = params.output_size() {
            parts.push(format!("{:.0}×{:.0}", w.round().max(1.0), h.round().max(1.0)));
        }
        if let (Some(s), Some(e)) = (params.trim_start(), params.trim_end()) {
            let secs = (e - s).max(0.0) / params.playback_speed();
            let secs = if params.mirrored() { secs * 2.0 } else { secs };
            parts.push(format_seconds(secs));
        }
        if !parts.is_empty() {
            ui.label(RichText::new(format!("Output: {}", parts.join("  ·  "))).color(TEXT_DIM));
        }
    }

    fn export_controls(&self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<GiferCommand>) {
        match &state.export {
            ExportState::Running { job_id, output, progress } => {
                let (fraction, text) = match progress {
                    Some(p) => (p.fraction(), p.message()),
                    None    => (0.0, "Starting ffmpeg…".to_string()),
                };
                ui.add(ProgressBar::new(fraction).text(text).animate(progress.is_none()));
                ui.label(RichText::new(output.display().to_string()).size(10.0).color(TEXT_DIM));
                if ui.button("✖ Cancel").clicked() {
                    cmd.push(GiferCommand::CancelExport(*job_id));
                }
            }
            ExportState::Idle => {
                ui.horizontal(|ui| {
                    let has_source = state.params.source_path().is_some();
                    if ui.add_enabled(has_source, egui::Button::new("↺ Reset")).clicked() {
                        cmd.push(GiferCommand::ResetParameters);
                    }

                    let ready = state.params.is_render_ready() && state.ffmpeg.is_some();
                    let generate = ui.add_enabled(
                        ready,
                        egui::Button::new(RichText::new("Generate GIF").strong()),
                    );
                    let generate = if state.ffmpeg.is_none() {
                        generate.on_disabled_hover_text("ffmpeg was not found")
                    } else {
                        generate.on_disabled_hover_text("Open a video and set start and end times")
                    };
                    if generate.clicked() {
                        cmd.push(GiferCommand::Generate);
                    }
                });
            }
        }
    }
}

impl GiferModule for ParamsPanel {
    fn name(&self) -> &str { "Parameters" }

    fn ui(&mut self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<GiferCommand>) {
        self.source_header(ui, state, cmd);
        ui.add_space(6.0);

        let idle       = !state.export.is_running();
        let has_source = state.params.source().is_some();

        egui::Grid::new("params_grid")
            .num_columns(3)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                self.field(ui, Field::Start, state, cmd);
                self.field(ui, Field::End, state, cmd);
                self.field(ui, Field::Width, state, cmd);
                self.field(ui, Field::Height, state, cmd);

                let mut scale_on = state.scale_enabled;
                if ui.add_enabled(idle && has_source, Checkbox::new(&mut scale_on, "Scale")).changed() {
                    cmd.push(GiferCommand::SetScaleEnabled(scale_on));
                }
                ui.end_row();
                self.field(ui, Field::Scale, state, cmd);

                self.field(ui, Field::Fps, state, cmd);
                self.field(ui, Field::Speed, state, cmd);
                self.field(ui, Field::Fuzz, state, cmd);
            });

        ui.add_space(4.0);
        let mut mirrored = state.params.mirrored();
        if ui.add_enabled(idle, Checkbox::new(&mut mirrored, "Mirror (play forward, then backward)")).changed() {
            cmd.push(GiferCommand::SetMirrored(mirrored));
        }

        ui.add_space(8.0);
        self.output_summary(ui, &state.params);
        ui.separator();
        self.export_controls(ui, state, cmd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_text_emits_nothing() {
        assert_eq!(commit(Field::Width, "640", Some(640.0)), None);
        assert_eq!(commit(Field::Fuzz, "", None), None);
    }

    #[test]
    fn edited_dimension_becomes_command() {
        assert_eq!(
            commit(Field::Height, "240", Some(480.0)),
            Some(GiferCommand::SetTargetDimension { axis: Axis::Height, value: Some(240.0) })
        );
    }

    #[test]
    fn cleared_field_sends_none() {
        assert_eq!(commit(Field::Scale, " ", Some(0.5)), Some(GiferCommand::SetScale(None)));
    }

    #[test]
    fn garbage_is_reported_not_applied() {
        assert_eq!(
            commit(Field::Fps, " ten ", Some(10.0)),
            Some(GiferCommand::ReportInvalidField { field: "FPS", text: "ten".into() })
        );
    }

    #[test]
    fn scale_checkbox_swaps_enabled_fields() {
        let mut state = SessionState::new(None);
        assert!(Field::Width.enabled(&state));
        assert!(!Field::Scale.enabled(&state));
        state.scale_enabled = true;
        assert!(!Field::Height.enabled(&state));
        assert!(Field::Scale.enabled(&state));
    }
}

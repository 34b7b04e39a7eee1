// crates/gifer-ui/src/theme.rs
use egui::{Color32, Context, Stroke, Style, Visuals};

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:       Color32 = Color32::from_rgb( 64, 196, 170);
pub const ACCENT_DIM:   Color32 = Color32::from_rgb( 30, 120, 104);
pub const ACCENT_HOVER: Color32 = Color32::from_rgb(110, 220, 198);

pub const BG_VIEWER:    Color32 = Color32::from_rgb(  8,   8,  10);
pub const BG_PANEL:     Color32 = Color32::from_rgb( 22,  23,  27);
pub const BG_CARD:      Color32 = Color32::from_rgb( 30,  32,  38);
pub const BG_WIDGET:    Color32 = Color32::from_rgb( 40,  43,  51);
pub const BG_HOVER:     Color32 = Color32::from_rgb( 52,  56,  66);

pub const TEXT:         Color32 = Color32::from_rgb(222, 224, 230);
pub const TEXT_DIM:     Color32 = Color32::from_rgb(128, 132, 146);
pub const BORDER:       Color32 = Color32::from_rgb( 58,  62,  74);

pub const OK_GREEN:     Color32 = Color32::from_rgb( 96, 210, 120);
pub const ERROR_RED:    Color32 = Color32::from_rgb(232,  88,  88);

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();
    style.spacing.item_spacing   = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 4.0);
    style.spacing.interact_size.y = 22.0;

    let cr = egui::CornerRadius::same(3);

    let mut v = Visuals::dark();
    v.panel_fill       = BG_PANEL;
    v.window_fill      = BG_CARD;
    v.extreme_bg_color = BG_VIEWER;
    v.window_stroke    = Stroke::new(1.0, BORDER);
    v.selection.bg_fill = ACCENT_DIM;
    v.selection.stroke  = Stroke::new(1.0, ACCENT_HOVER);

    let w = &mut v.widgets;
    w.noninteractive.bg_stroke = Stroke::new(1.0, BORDER);
    w.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_DIM);
    w.inactive.bg_fill         = BG_WIDGET;
    w.inactive.weak_bg_fill    = BG_WIDGET;
    w.inactive.fg_stroke       = Stroke::new(1.0, TEXT);
    w.hovered.bg_fill          = BG_HOVER;
    w.hovered.weak_bg_fill     = BG_HOVER;
    w.hovered.bg_stroke        = Stroke::new(1.0, ACCENT_DIM);
    w.active.bg_fill           = ACCENT_DIM;
    w.active.weak_bg_fill      = ACCENT_DIM;
    w.active.bg_stroke         = Stroke::new(1.0, ACCENT);
    for state in [&mut w.noninteractive, &mut w.inactive, &mut w.hovered, &mut w.active, &mut w.open] {
        state.corner_radius = cr;
    }

    v.override_text_color = Some(TEXT);
    style.visuals = v;

    // Keep the dark palette when the OS switches to light mode.
    ctx.options_mut(|o| o.theme_preference = egui::ThemePreference::Dark);
    ctx.set_style(style);
}

use crate::message::Message;
use crate::model::OverlayMode;
use iced::border::{Border, Radius};
use iced::theme::palette::Pair;
use iced::widget::text::Wrapping;
use iced::widget::{button, container, row, text, Button, Container};
use iced::{Alignment, Background, Color, Length, Shadow, Theme};

const PILL: f32 = 999.0;
const SEAM: f32 = 10.0;

/// Pressing the active pill turns its overlay off; pressing the other one
/// switches to it.
pub fn overlay_toggle(current: OverlayMode) -> Container<'static, Message> {
    let pills = row![
        overlay_pill(OverlayMode::Segmentation, current, Side::Left),
        overlay_pill(OverlayMode::Progression, current, Side::Right),
    ];

    container(pills)
        .padding(3)
        .width(Length::Fixed(340.0))
        .style(move |theme| track_style(theme, current))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn radius(self) -> Radius {
        let (outer, inner) = match self {
            Side::Left => (PILL, SEAM),
            Side::Right => (SEAM, PILL),
        };
        Radius {
            top_left: outer,
            bottom_left: outer,
            top_right: inner,
            bottom_right: inner,
        }
    }
}

fn overlay_pill(
    overlay: OverlayMode,
    current: OverlayMode,
    side: Side,
) -> Button<'static, Message> {
    let active = overlay == current;
    let (name, on_press) = match overlay {
        OverlayMode::Progression => ("Progression", Message::ToggleProgression),
        _ => ("Segmentation", Message::ToggleSegmentation),
    };
    let label = format!("{} {name}", if active { "Hide" } else { "Show" });

    button(
        container(text(label).size(14).wrapping(Wrapping::None))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(32.0))
            .padding([6, 16]),
    )
    .width(Length::FillPortion(1))
    .padding(0)
    .on_press(on_press)
    .style(move |theme, status| pill_style(theme, status, overlay, active, side))
}

/// Strong and base shades for an overlay: danger for progression, primary
/// otherwise.
fn accent(theme: &Theme, overlay: OverlayMode) -> (Pair, Pair) {
    let palette = theme.extended_palette();
    match overlay {
        OverlayMode::Progression => (palette.danger.strong, palette.danger.base),
        _ => (palette.primary.strong, palette.primary.base),
    }
}

fn track_style(theme: &Theme, current: OverlayMode) -> container::Style {
    let palette = theme.extended_palette();
    let outline = match current {
        OverlayMode::None => palette.background.weak.color,
        mode => accent(theme, mode).1.color.scale_alpha(0.6),
    };

    container::Style {
        background: Some(Background::Color(palette.background.strong.color)),
        border: Border {
            color: outline,
            width: 1.0,
            radius: Radius::new(PILL),
        },
        ..container::Style::default()
    }
}

fn pill_style(
    theme: &Theme,
    status: button::Status,
    overlay: OverlayMode,
    active: bool,
    side: Side,
) -> button::Style {
    let (strong, base) = accent(theme, overlay);
    let idle = theme.extended_palette().background.strong.color;

    let fill = match (active, status) {
        (true, button::Status::Hovered | button::Status::Pressed) => base.color,
        (true, _) => strong.color,
        (false, button::Status::Hovered) => base.color.scale_alpha(0.25),
        (false, button::Status::Pressed) => base.color.scale_alpha(0.4),
        (false, _) => idle.scale_alpha(0.4),
    };
    let fill = if status == button::Status::Disabled {
        fill.scale_alpha(0.5)
    } else {
        fill
    };

    button::Style {
        background: Some(Background::Color(fill)),
        text_color: if active { strong.text } else { base.color },
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: side.radius(),
        },
        shadow: Shadow::default(),
    }
}

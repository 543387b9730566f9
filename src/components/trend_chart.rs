use crate::model::report::{TrendPoint, TREND_LABEL, TREND_POINTS, TREND_X_TITLE, TREND_Y_TITLE};
use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Cache, Frame, Geometry, Path, Stroke, Text};
use iced::{mouse, Color, Pixels, Point, Rectangle, Renderer, Size, Theme};

const MARGIN_LEFT: f32 = 64.0;
const MARGIN_RIGHT: f32 = 24.0;
const MARGIN_TOP: f32 = 28.0;
const MARGIN_BOTTOM: f32 = 48.0;
const POINT_RADIUS: f32 = 6.0;
const Y_TICKS: usize = 4;

fn line_color() -> Color {
    Color::from_rgb8(0x34, 0x98, 0xDB)
}

pub struct TrendChart {
    points: &'static [TrendPoint],
    cache: Cache,
}

impl TrendChart {
    pub fn new() -> Self {
        Self {
            points: &TREND_POINTS,
            cache: Cache::new(),
        }
    }

    /// Y axis bounds, padded so the line never touches the plot edges.
    pub fn value_range(&self) -> (f32, f32) {
        let (min, max) = self
            .points
            .iter()
            .fold((f32::MAX, f32::MIN), |(min, max), point| {
                (min.min(point.value), max.max(point.value))
            });
        if self.points.is_empty() {
            return (0.0, 1.0);
        }
        let pad = ((max - min) * 0.1).max(0.05);
        (min - pad, max + pad)
    }

    pub fn plot_area(size: Size) -> Rectangle {
        Rectangle {
            x: MARGIN_LEFT,
            y: MARGIN_TOP,
            width: (size.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (size.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        }
    }

    pub fn plot_points(&self, size: Size) -> Vec<Point> {
        let area = Self::plot_area(size);
        let (low, high) = self.value_range();
        let steps = self.points.len().saturating_sub(1).max(1) as f32;
        self.points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let x = if self.points.len() == 1 {
                    area.center_x()
                } else {
                    area.x + area.width * index as f32 / steps
                };
                let ratio = (point.value - low) / (high - low);
                Point::new(x, area.y + area.height * (1.0 - ratio))
            })
            .collect()
    }

    fn draw_chart(&self, frame: &mut Frame, theme: &Theme) {
        let palette = theme.extended_palette();
        let text_color = palette.background.base.text;
        let grid_color = text_color.scale_alpha(0.08);
        let size = frame.size();
        let area = Self::plot_area(size);
        let (low, high) = self.value_range();

        for tick in 0..=Y_TICKS {
            let ratio = tick as f32 / Y_TICKS as f32;
            let y = area.y + area.height * (1.0 - ratio);
            frame.stroke(
                &Path::line(Point::new(area.x, y), Point::new(area.x + area.width, y)),
                Stroke::default().with_width(1.0).with_color(grid_color),
            );
            frame.fill_text(Text {
                content: format!("{:.2}", low + (high - low) * ratio),
                position: Point::new(area.x - 8.0, y),
                color: text_color,
                size: Pixels(12.0),
                horizontal_alignment: Horizontal::Right,
                vertical_alignment: Vertical::Center,
                ..Text::default()
            });
        }

        let points = self.plot_points(size);
        let line = Path::new(|builder| {
            for (index, point) in points.iter().enumerate() {
                if index == 0 {
                    builder.move_to(*point);
                } else {
                    builder.line_to(*point);
                }
            }
        });
        frame.stroke(&line, Stroke::default().with_width(3.0).with_color(line_color()));

        for (point, data) in points.iter().zip(self.points) {
            frame.fill(&Path::circle(*point, POINT_RADIUS + 2.0), Color::WHITE);
            frame.fill(&Path::circle(*point, POINT_RADIUS), line_color());
            frame.fill_text(Text {
                content: data.date.to_string(),
                position: Point::new(point.x, area.y + area.height + 8.0),
                color: text_color,
                size: Pixels(12.0),
                horizontal_alignment: Horizontal::Center,
                vertical_alignment: Vertical::Top,
                ..Text::default()
            });
        }

        frame.fill_text(Text {
            content: TREND_X_TITLE.to_string(),
            position: Point::new(area.center_x(), size.height - 4.0),
            color: text_color,
            size: Pixels(13.0),
            horizontal_alignment: Horizontal::Center,
            vertical_alignment: Vertical::Bottom,
            ..Text::default()
        });
        frame.fill_text(Text {
            content: format!("{TREND_Y_TITLE}  ·  {TREND_LABEL}"),
            position: Point::new(area.x, 4.0),
            color: text_color,
            size: Pixels(13.0),
            horizontal_alignment: Horizontal::Left,
            vertical_alignment: Vertical::Top,
            ..Text::default()
        });
    }
}

impl<Message> canvas::Program<Message> for TrendChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self
            .cache
            .draw(renderer, bounds.size(), |frame| self.draw_chart(frame, theme));
        vec![geometry]
    }
}
